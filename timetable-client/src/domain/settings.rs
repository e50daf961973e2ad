use serde::{Deserialize, Serialize};

/// Widget settings stored on the backend (`/api/settings`).
///
/// `transparency` is a percentage (0..=100), unlike the local config which
/// keeps opacity as a fraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteSettings {
    pub x: i32,
    pub y: i32,
    pub session: i32,
    pub group: i32,
    pub transparency: i32,
    pub draggable: bool,
    pub debug_mode: bool,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            session: 0,
            group: 0,
            transparency: 100,
            draggable: true,
            debug_mode: false,
        }
    }
}
