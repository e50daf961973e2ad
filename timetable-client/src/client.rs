use std::sync::Arc;
use std::time::Duration;

use reqwest::{cookie::Jar, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::{
    AuthStatus, AuthStatusResponse, Day, LoginOutcome, LoginRequest, LoginResponse,
    RemoteSettings, TimetableSnapshot,
};
use crate::{BackendUrl, InvalidBackendUrl};

/// Every call gives up after this long.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub const CONNECTION_ERROR: &str = "Connection error";
pub const INVALID_RESPONSE: &str = "Invalid response";
pub const INVALID_RESPONSE_FROM_SERVER: &str = "Invalid response from server";

const LOGIN_PATH: &str = "/api/auth/login";
const LOGOUT_PATH: &str = "/api/auth/logout";
const STATUS_PATH: &str = "/api/auth/status";
const SETTINGS_PATH: &str = "/api/settings";
const RESET_POSITION_PATH: &str = "/api/settings/reset-position";

/// HTTP client for the timetable backend.
///
/// One instance owns one cookie jar, i.e. one server-side session. Pointing
/// the widget at a different backend means building a new client; the old
/// session is not carried over.
#[derive(Debug, Clone)]
pub struct TimetableClient {
    http: Client,
    base_url: BackendUrl,
}

#[derive(Error, Debug)]
pub enum ClientBuildError {
    #[error(transparent)]
    InvalidUrl(#[from] InvalidBackendUrl),
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Why a timetable could not be fetched. The display text is meant for the
/// status line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Session expired, log in again")]
    Unauthorized,
    #[error("Failed to fetch timetable: server returned {0}")]
    Status(u16),
    #[error("Failed to fetch timetable: {0}")]
    Transport(String),
    #[error("Invalid timetable data: {0}")]
    Parse(String),
}

/// Internal three-way split of a finished call: the server never answered,
/// answered with a non-success status, or answered with a body we cannot read.
#[derive(Error, Debug)]
enum CallError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {0}")]
    Status(StatusCode),
    #[error("{0}")]
    Parse(#[from] serde_json::Error),
}

impl From<CallError> for FetchError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Status(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                FetchError::Unauthorized
            }
            CallError::Status(status) => FetchError::Status(status.as_u16()),
            CallError::Transport(e) => FetchError::Transport(e.to_string()),
            CallError::Parse(e) => FetchError::Parse(e.to_string()),
        }
    }
}

impl TimetableClient {
    pub fn new(base_url: &str) -> Result<Self, ClientBuildError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientBuildError> {
        let base_url = BackendUrl::parse(base_url)?;
        let jar = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(jar)
            .timeout(timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &BackendUrl {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        self.base_url.append_path(path)
    }

    async fn send(
        &self,
        request: RequestBuilder,
        call_name: &str,
    ) -> Result<(StatusCode, Vec<u8>), CallError> {
        debug!("calling {}", call_name);
        let response = request.send().await.map_err(|e| {
            warn!("{} failed: {}", call_name, e);
            CallError::Transport(e)
        })?;

        let status = response.status();
        let body = response.bytes().await?.to_vec();
        debug!("{} answered {}", call_name, status);
        Ok((status, body))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        call_name: &str,
    ) -> Result<T, CallError> {
        let (status, body) = self.send(request, call_name).await?;
        if !status.is_success() {
            return Err(CallError::Status(status));
        }

        serde_json::from_slice(&body).map_err(|e| {
            warn!("failed to parse {} response: {}", call_name, e);
            CallError::Parse(e)
        })
    }

    /// Log in with the user's university credentials. A rejection carries
    /// the backend's own message; transport and parse failures become a
    /// generic message instead of an error.
    pub async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        let request = self
            .http
            .post(self.endpoint(LOGIN_PATH))
            .json(&LoginRequest { email, password });

        let (status, body) = match self.send(request, "POST /api/auth/login").await {
            Ok(answer) => answer,
            Err(e) => return LoginOutcome::failed(format!("{CONNECTION_ERROR}: {e}")),
        };

        // Bad credentials come back as 401 with a regular login body.
        match serde_json::from_slice::<LoginResponse>(&body) {
            Ok(resp) if status.is_success() || !resp.success => LoginOutcome::from(resp),
            Ok(_) => LoginOutcome::failed(format!("{CONNECTION_ERROR}: server returned {status}")),
            Err(_) if !status.is_success() => {
                LoginOutcome::failed(format!("{CONNECTION_ERROR}: server returned {status}"))
            }
            Err(e) => {
                warn!("failed to parse login response: {}", e);
                LoginOutcome::failed(INVALID_RESPONSE_FROM_SERVER)
            }
        }
    }

    /// Best effort. Any 2xx counts as success; everything else, including a
    /// dead backend, is reported as `false`.
    pub async fn logout(&self) -> bool {
        let request = self.http.post(self.endpoint(LOGOUT_PATH));
        matches!(
            self.send(request, "POST /api/auth/logout").await,
            Ok((status, _)) if status.is_success()
        )
    }

    pub async fn check_auth_status(&self) -> AuthStatus {
        let request = self.http.get(self.endpoint(STATUS_PATH));
        match self
            .get_json::<AuthStatusResponse>(request, "GET /api/auth/status")
            .await
        {
            Ok(resp) => resp.into(),
            Err(CallError::Parse(_)) => AuthStatus::unauthenticated(INVALID_RESPONSE),
            Err(_) => AuthStatus::unauthenticated(CONNECTION_ERROR),
        }
    }

    pub async fn get_timetable(&self, day: Day) -> Result<TimetableSnapshot, FetchError> {
        let request = self.http.get(self.endpoint(day.path()));
        let call_name = format!("GET {}", day.path());
        Ok(self.get_json(request, &call_name).await?)
    }

    pub async fn get_settings(&self) -> Option<RemoteSettings> {
        let request = self.http.get(self.endpoint(SETTINGS_PATH));
        self.get_json(request, "GET /api/settings").await.ok()
    }

    pub async fn save_settings(&self, settings: &RemoteSettings) -> bool {
        let request = self.http.put(self.endpoint(SETTINGS_PATH)).json(settings);
        matches!(
            self.send(request, "PUT /api/settings").await,
            Ok((status, _)) if status.is_success()
        )
    }

    /// Ask the backend to move the widget back to its default position.
    /// Returns the settings after the reset.
    pub async fn reset_position(&self) -> Option<RemoteSettings> {
        let request = self.http.post(self.endpoint(RESET_POSITION_PATH));
        self.get_json(request, "POST /api/settings/reset-position")
            .await
            .ok()
    }
}
