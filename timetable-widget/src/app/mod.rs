use crate::config::WidgetConfig;
use crate::session::PollMode;

mod lessons;
mod state;
pub use lessons::visible_lessons;
pub use state::{LoginDialog, LoginField, SettingsDialog, SettingsField};

/// UI-local state. Session data (auth, snapshot, status) lives in the
/// session controller and is read from there when drawing.
pub struct App {
    pub running: bool,
    pub mode: PollMode,
    pub login_dialog: Option<LoginDialog>,
    pub settings_dialog: Option<SettingsDialog>,
    pub throbber_state: throbber_widgets_tui::ThrobberState,
}

impl App {
    pub fn new(mode: PollMode) -> Self {
        Self {
            running: true,
            mode,
            login_dialog: None,
            settings_dialog: None,
            throbber_state: throbber_widgets_tui::ThrobberState::default(),
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn open_login(&mut self) {
        if self.mode.manual_login() {
            self.settings_dialog = None;
            self.login_dialog = Some(LoginDialog::default());
        }
    }

    pub fn close_login(&mut self) {
        self.login_dialog = None;
    }

    pub fn login_set_error(&mut self, err: String) {
        if let Some(dialog) = &mut self.login_dialog {
            dialog.error = Some(err);
        }
    }

    pub fn open_settings(&mut self, config: &WidgetConfig) {
        if self.mode.manual_login() {
            self.login_dialog = None;
            self.settings_dialog = Some(SettingsDialog::from_config(config));
        }
    }

    pub fn close_settings(&mut self) {
        self.settings_dialog = None;
    }

    pub fn settings_set_error(&mut self, err: String) {
        if let Some(dialog) = &mut self.settings_dialog {
            dialog.error = Some(err);
        }
    }
}
