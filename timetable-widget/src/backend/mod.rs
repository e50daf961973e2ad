use anyhow::Result;
use async_trait::async_trait;
use timetable_client::domain::{
    AuthStatus, Day, LoginOutcome, RemoteSettings, TimetableSnapshot,
};
use timetable_client::{FetchError, TimetableClient};

#[cfg(test)]
pub mod mock;

/// The calls the session controller makes against the timetable backend.
///
/// Only `get_timetable` can fail; every other call folds its failures into
/// a sentinel value.
#[async_trait]
pub trait TimetableBackend: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> LoginOutcome;

    async fn logout(&self) -> bool;

    async fn check_auth_status(&self) -> AuthStatus;

    async fn get_timetable(&self, day: Day) -> Result<TimetableSnapshot, FetchError>;

    async fn get_settings(&self) -> Option<RemoteSettings>;

    async fn save_settings(&self, settings: &RemoteSettings) -> bool;

    /// Build a fresh backend for `base_url`. The new instance starts without
    /// a session.
    fn reconnect(&self, base_url: &str) -> Result<Self>
    where
        Self: Sized;
}

#[async_trait]
impl TimetableBackend for TimetableClient {
    async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        TimetableClient::login(self, email, password).await
    }

    async fn logout(&self) -> bool {
        TimetableClient::logout(self).await
    }

    async fn check_auth_status(&self) -> AuthStatus {
        TimetableClient::check_auth_status(self).await
    }

    async fn get_timetable(&self, day: Day) -> Result<TimetableSnapshot, FetchError> {
        TimetableClient::get_timetable(self, day).await
    }

    async fn get_settings(&self) -> Option<RemoteSettings> {
        TimetableClient::get_settings(self).await
    }

    async fn save_settings(&self, settings: &RemoteSettings) -> bool {
        TimetableClient::save_settings(self, settings).await
    }

    fn reconnect(&self, base_url: &str) -> Result<Self> {
        Ok(TimetableClient::new(base_url)?)
    }
}
