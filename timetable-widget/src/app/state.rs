use crate::config::WidgetConfig;
use crate::session::SettingsUpdate;

/// Single-line dialog field. `cursor` is a byte offset that always sits on
/// a char boundary of `value`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TextInput {
    pub value: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn with_value(s: &str) -> Self {
        Self {
            value: s.to_string(),
            cursor: s.len(),
        }
    }

    pub fn insert(&mut self, c: char) {
        self.value.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(c) = self.char_before() {
            self.cursor -= c.len_utf8();
            self.value.remove(self.cursor);
        }
    }

    pub fn move_left(&mut self) {
        if let Some(c) = self.char_before() {
            self.cursor -= c.len_utf8();
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.char_after() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.value.len();
    }

    /// Text before and after the cursor, for drawing the caret between them.
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.value.split_at(self.cursor)
    }

    fn char_before(&self) -> Option<char> {
        self.value[..self.cursor].chars().next_back()
    }

    fn char_after(&self) -> Option<char> {
        self.value[self.cursor..].chars().next()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginDialog {
    pub email: TextInput,
    pub password: TextInput,
    pub focused: LoginField,
    pub error: Option<String>,
}

impl LoginDialog {
    pub fn focused_input(&mut self) -> &mut TextInput {
        match self.focused {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn next_field(&mut self) {
        self.focused = match self.focused {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    pub fn credentials(&self) -> (String, String) {
        (self.email.value.clone(), self.password.value.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettingsField {
    #[default]
    BackendUrl,
    Group,
    Transparency,
    UpdateInterval,
}

impl SettingsField {
    pub const ALL: [SettingsField; 4] = [
        SettingsField::BackendUrl,
        SettingsField::Group,
        SettingsField::Transparency,
        SettingsField::UpdateInterval,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingsField::BackendUrl => "Backend URL",
            SettingsField::Group => "Subgroup (0 = all)",
            SettingsField::Transparency => "Opacity %",
            SettingsField::UpdateInterval => "Refresh (s)",
        }
    }

    fn next(self) -> Self {
        match self {
            SettingsField::BackendUrl => SettingsField::Group,
            SettingsField::Group => SettingsField::Transparency,
            SettingsField::Transparency => SettingsField::UpdateInterval,
            SettingsField::UpdateInterval => SettingsField::BackendUrl,
        }
    }

    fn previous(self) -> Self {
        match self {
            SettingsField::BackendUrl => SettingsField::UpdateInterval,
            SettingsField::Group => SettingsField::BackendUrl,
            SettingsField::Transparency => SettingsField::Group,
            SettingsField::UpdateInterval => SettingsField::Transparency,
        }
    }
}

/// Editable copy of the settings shown in the settings overlay. Opacity is
/// edited as a whole percentage.
#[derive(Debug, Clone)]
pub struct SettingsDialog {
    pub backend_url: TextInput,
    pub group: TextInput,
    pub transparency: TextInput,
    pub update_interval: TextInput,
    pub focused: SettingsField,
    pub error: Option<String>,
}

impl SettingsDialog {
    pub fn from_config(config: &WidgetConfig) -> Self {
        let percent = (config.transparency * 100.0).round() as i64;
        Self {
            backend_url: TextInput::with_value(&config.backend_url),
            group: TextInput::with_value(&config.group.to_string()),
            transparency: TextInput::with_value(&percent.to_string()),
            update_interval: TextInput::with_value(&config.update_interval.to_string()),
            focused: SettingsField::default(),
            error: None,
        }
    }

    pub fn input(&self, field: SettingsField) -> &TextInput {
        match field {
            SettingsField::BackendUrl => &self.backend_url,
            SettingsField::Group => &self.group,
            SettingsField::Transparency => &self.transparency,
            SettingsField::UpdateInterval => &self.update_interval,
        }
    }

    pub fn focused_input(&mut self) -> &mut TextInput {
        match self.focused {
            SettingsField::BackendUrl => &mut self.backend_url,
            SettingsField::Group => &mut self.group,
            SettingsField::Transparency => &mut self.transparency,
            SettingsField::UpdateInterval => &mut self.update_interval,
        }
    }

    pub fn next_field(&mut self) {
        self.focused = self.focused.next();
    }

    pub fn previous_field(&mut self) {
        self.focused = self.focused.previous();
    }

    /// Parse the inputs. Range checks happen in the config store; this only
    /// rejects text that is not a number at all.
    pub fn to_update(&self) -> Result<SettingsUpdate, String> {
        let group = self
            .group
            .value
            .trim()
            .parse::<u32>()
            .map_err(|_| "Subgroup must be a whole number".to_string())?;
        let percent = self
            .transparency
            .value
            .trim()
            .parse::<f64>()
            .map_err(|_| "Opacity must be a number".to_string())?;
        let update_interval = self
            .update_interval
            .value
            .trim()
            .parse::<u64>()
            .map_err(|_| "Refresh interval must be a whole number of seconds".to_string())?;

        Ok(SettingsUpdate {
            backend_url: self.backend_url.value.trim().to_string(),
            group,
            transparency: percent / 100.0,
            update_interval,
        })
    }
}
