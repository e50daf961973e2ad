use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Message used when the backend answered `success: false` without one.
pub const UNKNOWN_LOGIN_ERROR: &str = "Unknown error";

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub success: bool,
    pub message: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthStatusResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub is_authenticated: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub state: String,
}

/// Result of a login attempt. Never carries a transport error; those are
/// folded into `message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub success: bool,
    pub message: String,
}

impl LoginOutcome {
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

impl From<LoginResponse> for LoginOutcome {
    fn from(resp: LoginResponse) -> Self {
        let message = match resp.message {
            Some(m) if !m.is_empty() => m,
            _ if resp.success => String::new(),
            _ => UNKNOWN_LOGIN_ERROR.to_string(),
        };
        Self {
            success: resp.success,
            message,
        }
    }
}

/// Answer of `GET /api/auth/status`, or a sentinel when the call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthStatus {
    pub authenticated: bool,
    pub state: String,
}

impl AuthStatus {
    pub fn unauthenticated(state: impl Into<String>) -> Self {
        Self {
            authenticated: false,
            state: state.into(),
        }
    }
}

impl From<AuthStatusResponse> for AuthStatus {
    fn from(resp: AuthStatusResponse) -> Self {
        Self {
            authenticated: resp.is_authenticated,
            state: resp.state,
        }
    }
}
