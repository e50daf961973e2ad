//! Scripted backend for controller tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use timetable_client::domain::{
    AuthStatus, Day, LoginOutcome, RemoteSettings, TimetableSnapshot,
};
use timetable_client::{FetchError, CONNECTION_ERROR};

use super::TimetableBackend;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Login(String),
    Logout,
    CheckAuth,
    GetTimetable(Day),
    GetSettings,
    SaveSettings(RemoteSettings),
}

#[derive(Default)]
struct Script {
    authenticated: bool,
    valid_password: Option<String>,
    timetable_results: VecDeque<Result<TimetableSnapshot, FetchError>>,
    fallback_timetable: Option<TimetableSnapshot>,
    remote_settings: Option<RemoteSettings>,
    calls: Vec<Call>,
    reconnects: Vec<String>,
}

/// Mock backend whose state is shared between clones, so tests can keep a
/// handle after moving one into the controller.
#[derive(Clone, Default)]
pub struct MockBackend {
    script: Arc<Mutex<Script>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Server-side session already exists.
    pub fn authenticated(self) -> Self {
        self.script.lock().unwrap().authenticated = true;
        self
    }

    /// Accept `password` for any email.
    pub fn accepting_password(self, password: &str) -> Self {
        self.script.lock().unwrap().valid_password = Some(password.to_string());
        self
    }

    /// Returned by every fetch that has no queued result.
    pub fn with_timetable(self, snapshot: TimetableSnapshot) -> Self {
        self.script.lock().unwrap().fallback_timetable = Some(snapshot);
        self
    }

    pub fn with_remote_settings(self, settings: RemoteSettings) -> Self {
        self.script.lock().unwrap().remote_settings = Some(settings);
        self
    }

    /// Queue a one-off fetch result ahead of the fallback.
    pub fn push_timetable_result(&self, result: Result<TimetableSnapshot, FetchError>) {
        self.script
            .lock()
            .unwrap()
            .timetable_results
            .push_back(result);
    }

    pub fn set_authenticated(&self, authenticated: bool) {
        self.script.lock().unwrap().authenticated = authenticated;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script.lock().unwrap().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.script.lock().unwrap().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn fetch_count(&self) -> usize {
        self.count(|c| matches!(c, Call::GetTimetable(_)))
    }

    pub fn reconnects(&self) -> Vec<String> {
        self.script.lock().unwrap().reconnects.clone()
    }

    fn record(&self, call: Call) {
        self.script.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl TimetableBackend for MockBackend {
    async fn login(&self, email: &str, password: &str) -> LoginOutcome {
        self.record(Call::Login(email.to_string()));
        let mut script = self.script.lock().unwrap();
        match &script.valid_password {
            Some(valid) if valid == password => {
                script.authenticated = true;
                LoginOutcome {
                    success: true,
                    message: "Welcome".to_string(),
                }
            }
            Some(_) => LoginOutcome::failed("Invalid password"),
            None => LoginOutcome::failed(format!("{CONNECTION_ERROR}: refused")),
        }
    }

    async fn logout(&self) -> bool {
        self.record(Call::Logout);
        self.script.lock().unwrap().authenticated = false;
        true
    }

    async fn check_auth_status(&self) -> AuthStatus {
        self.record(Call::CheckAuth);
        if self.script.lock().unwrap().authenticated {
            AuthStatus {
                authenticated: true,
                state: "Ok".to_string(),
            }
        } else {
            AuthStatus::unauthenticated("NotAuthenticated")
        }
    }

    async fn get_timetable(&self, day: Day) -> Result<TimetableSnapshot, FetchError> {
        self.record(Call::GetTimetable(day));
        let mut script = self.script.lock().unwrap();
        if let Some(result) = script.timetable_results.pop_front() {
            return result;
        }
        script
            .fallback_timetable
            .clone()
            .ok_or_else(|| FetchError::Transport("no timetable scripted".to_string()))
    }

    async fn get_settings(&self) -> Option<RemoteSettings> {
        self.record(Call::GetSettings);
        self.script.lock().unwrap().remote_settings.clone()
    }

    async fn save_settings(&self, settings: &RemoteSettings) -> bool {
        self.record(Call::SaveSettings(settings.clone()));
        self.script.lock().unwrap().remote_settings = Some(settings.clone());
        true
    }

    fn reconnect(&self, base_url: &str) -> Result<Self> {
        // Same script, so tests observe calls made through the new instance.
        self.script
            .lock()
            .unwrap()
            .reconnects
            .push(base_url.to_string());
        Ok(self.clone())
    }
}
