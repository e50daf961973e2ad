//! Authentication state and the refresh timer.
//!
//! The controller is driven from the event loop: user actions call
//! [`SessionController::login`], [`SessionController::logout`] and friends,
//! and every loop iteration calls [`SessionController::tick`] with the current
//! instant so that due auth checks and refreshes run. Nothing here spawns
//! tasks, so all calls are serialized by the loop.

use std::time::{Duration, Instant};

use strum::Display;
use time::OffsetDateTime;
use timetable_client::domain::{Day, LoginOutcome, RemoteSettings, TimetableSnapshot};
use timetable_client::CONNECTION_ERROR;
use tracing::{debug, info, warn};

use crate::backend::TimetableBackend;
use crate::config::{ConfigError, ConfigKey, ConfigStore, ConfigValue};

/// Delay before the first auth check, so the UI can draw once.
pub const STARTUP_AUTH_DELAY: Duration = Duration::from_millis(100);
/// Companion mode re-checks auth this long after a negative answer.
pub const AUTH_RETRY_DELAY: Duration = Duration::from_secs(10);
/// Companion mode ignores the configured interval and polls this often.
pub const COMPANION_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

pub const FILL_ALL_FIELDS: &str = "Fill in all fields";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollMode {
    /// Login and settings are driven by the user.
    Interactive,
    /// No controls; auth is retried on a fixed backoff until it succeeds.
    Companion,
}

impl PollMode {
    pub fn manual_login(self) -> bool {
        self == PollMode::Interactive
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SessionState {
    Unknown,
    CheckingAuth,
    Authenticated,
    Unauthenticated,
    LoggingIn,
    LoggingOut,
}

/// Identifies one arming of the refresh timer. A re-armed timer gets a new
/// handle even when the period is unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(u64);

#[derive(Debug)]
struct RefreshTimer {
    handle: TimerHandle,
    period: Duration,
    /// `None` once the next firing lies past the clock's range.
    next_fire: Option<Instant>,
}

/// The user-editable subset of the config, as submitted by the settings dialog.
#[derive(Debug, Clone, PartialEq)]
pub struct SettingsUpdate {
    pub backend_url: String,
    pub group: u32,
    pub transparency: f64,
    pub update_interval: u64,
}

impl SettingsUpdate {
    fn entries(&self) -> [(ConfigKey, ConfigValue); 4] {
        [
            (
                ConfigKey::BackendUrl,
                ConfigValue::Text(self.backend_url.clone()),
            ),
            (ConfigKey::Group, ConfigValue::Int(self.group.into())),
            (ConfigKey::Transparency, ConfigValue::Float(self.transparency)),
            (
                ConfigKey::UpdateInterval,
                ConfigValue::Int(i64::try_from(self.update_interval).unwrap_or(i64::MAX)),
            ),
        ]
    }
}

pub struct SessionController<B> {
    backend: B,
    config: ConfigStore,
    mode: PollMode,
    state: SessionState,
    day: Day,
    snapshot: Option<TimetableSnapshot>,
    status: String,
    updated_at: Option<OffsetDateTime>,
    refresh_timer: Option<RefreshTimer>,
    auth_check_at: Option<Instant>,
    next_timer_id: u64,
}

impl<B: TimetableBackend> SessionController<B> {
    pub fn new(backend: B, config: ConfigStore, mode: PollMode, now: Instant) -> Self {
        Self {
            backend,
            config,
            mode,
            state: SessionState::Unknown,
            day: Day::Today,
            snapshot: None,
            status: "Loading...".to_string(),
            updated_at: None,
            refresh_timer: None,
            auth_check_at: Some(now.checked_add(STARTUP_AUTH_DELAY).unwrap_or(now)),
            next_timer_id: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == SessionState::Authenticated
    }

    pub fn day(&self) -> Day {
        self.day
    }

    pub fn snapshot(&self) -> Option<&TimetableSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn updated_at(&self) -> Option<OffsetDateTime> {
        self.updated_at
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Handle of the repeating refresh timer, if one is armed.
    #[cfg(test)]
    pub fn active_timer(&self) -> Option<TimerHandle> {
        self.refresh_timer.as_ref().map(|t| t.handle)
    }

    pub fn timer_period(&self) -> Option<Duration> {
        self.refresh_timer.as_ref().map(|t| t.period)
    }

    /// When the next one-shot auth check is due, if one is pending.
    pub fn pending_auth_check(&self) -> Option<Instant> {
        self.auth_check_at
    }

    fn refresh_period(&self) -> Duration {
        match self.mode {
            PollMode::Interactive => self.config.update_interval(),
            PollMode::Companion => COMPANION_REFRESH_INTERVAL,
        }
    }

    /// Run whatever is due at `now`: first a pending auth check, then the
    /// refresh timer.
    pub async fn tick(&mut self, now: Instant) {
        if self.auth_check_at.is_some_and(|at| now >= at) {
            self.auth_check_at = None;
            self.check_auth(now).await;
        }

        let refresh_due = match self.refresh_timer.as_mut() {
            Some(timer) if timer.next_fire.is_some_and(|at| now >= at) => {
                timer.next_fire = now.checked_add(timer.period);
                true
            }
            _ => false,
        };
        if refresh_due {
            debug!("refresh timer fired");
            self.refresh().await;
        }
    }

    /// Ask the backend whether the current session is valid and move to
    /// `Authenticated` or `Unauthenticated` accordingly.
    pub async fn check_auth(&mut self, now: Instant) {
        self.state = SessionState::CheckingAuth;
        let status = self.backend.check_auth_status().await;

        if status.authenticated {
            self.on_authenticated(now).await;
            return;
        }

        info!("not authenticated ({})", status.state);
        self.cancel_refresh_timer();
        self.snapshot = None;
        self.state = SessionState::Unauthenticated;
        self.status = if status.state == CONNECTION_ERROR {
            "Backend unavailable".to_string()
        } else {
            "Not logged in".to_string()
        };

        if !self.mode.manual_login() {
            self.auth_check_at = Some(now.checked_add(AUTH_RETRY_DELAY).unwrap_or(now));
        }
    }

    async fn on_authenticated(&mut self, now: Instant) {
        info!("authenticated");
        self.state = SessionState::Authenticated;
        self.auth_check_at = None;
        self.status = "Connected".to_string();
        self.refresh().await;
        self.arm_refresh_timer(now);
    }

    /// Log in with the given credentials. Empty fields are rejected without
    /// a backend call. A failed login leaves the state `Unauthenticated`.
    pub async fn login(&mut self, email: &str, password: &str, now: Instant) -> LoginOutcome {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return LoginOutcome::failed(FILL_ALL_FIELDS);
        }
        if self.is_authenticated() {
            return LoginOutcome {
                success: true,
                message: "Already logged in".to_string(),
            };
        }

        self.state = SessionState::LoggingIn;
        let outcome = self.backend.login(email, password).await;
        if outcome.success {
            self.on_authenticated(now).await;
        } else {
            warn!("login rejected: {}", outcome.message);
            self.state = SessionState::Unauthenticated;
        }
        outcome
    }

    /// Drop the session, stop refreshing and forget the snapshot. The local
    /// side is cleared even if the backend call fails.
    pub async fn logout(&mut self, now: Instant) {
        self.state = SessionState::LoggingOut;
        if !self.backend.logout().await {
            warn!("backend logout failed, clearing local session anyway");
        }

        self.cancel_refresh_timer();
        self.snapshot = None;
        self.updated_at = None;
        self.state = SessionState::Unauthenticated;
        self.status = "Logged out".to_string();

        if !self.mode.manual_login() {
            self.auth_check_at = Some(now.checked_add(AUTH_RETRY_DELAY).unwrap_or(now));
        }
    }

    /// Fetch the timetable now, if logged in. Returns whether a fetch ran.
    pub async fn refresh_now(&mut self) -> bool {
        if !self.is_authenticated() {
            return false;
        }
        self.refresh().await;
        true
    }

    /// Switch between today and tomorrow and fetch the new day.
    pub async fn toggle_day(&mut self) {
        self.day = self.day.toggled();
        debug!("showing {}", self.day.label());
        self.refresh_now().await;
    }

    /// A failed fetch only changes the status line; the timer and the auth
    /// state are left alone so the next tick retries.
    async fn refresh(&mut self) {
        match self.backend.get_timetable(self.day).await {
            Ok(snapshot) => {
                debug!(
                    "fetched {} lessons for {}",
                    snapshot.items.len(),
                    self.day.label()
                );
                self.status = if snapshot.state.is_empty() {
                    "OK".to_string()
                } else {
                    snapshot.state.clone()
                };
                self.snapshot = Some(snapshot);
                self.updated_at = Some(OffsetDateTime::now_utc());
            }
            Err(e) => {
                warn!("timetable refresh failed: {}", e);
                self.status = format!("Error: {}", e);
            }
        }
    }

    fn arm_refresh_timer(&mut self, now: Instant) -> TimerHandle {
        self.cancel_refresh_timer();

        self.next_timer_id += 1;
        let handle = TimerHandle(self.next_timer_id);
        let period = self.refresh_period();
        let next_fire = now.checked_add(period);
        if next_fire.is_none() {
            warn!("refresh period {:?} is out of the clock's range", period);
        }
        self.refresh_timer = Some(RefreshTimer {
            handle,
            period,
            next_fire,
        });
        debug!("refresh timer {:?} armed every {:?}", handle, period);
        handle
    }

    fn cancel_refresh_timer(&mut self) -> Option<TimerHandle> {
        let timer = self.refresh_timer.take()?;
        debug!("refresh timer {:?} cancelled", timer.handle);
        Some(timer.handle)
    }

    /// Validate and persist the dialog values, then bring the session in line
    /// with them. Nothing is written if any value is rejected.
    pub async fn apply_settings(
        &mut self,
        update: SettingsUpdate,
        now: Instant,
    ) -> Result<(), ConfigError> {
        let entries = update.entries();
        let mut candidate = self.config.config().clone();
        for (key, value) in &entries {
            candidate.apply(*key, value)?;
        }

        let url_changed = candidate.backend_url != self.config.backend_url();
        for (key, value) in entries {
            self.config.set(key, value)?;
        }
        info!("settings saved");

        if url_changed {
            match self.backend.reconnect(self.config.backend_url()) {
                Ok(backend) => {
                    info!("switched backend to {}", self.config.backend_url());
                    self.backend = backend;
                    // A new client has no session; let the new backend decide.
                    self.check_auth(now).await;
                }
                Err(e) => {
                    warn!("failed to switch backend: {:#}", e);
                    self.status = format!("Error: {:#}", e);
                }
            }
        } else if self.is_authenticated() {
            self.arm_refresh_timer(now);
            self.refresh().await;
        }

        if self.is_authenticated() {
            self.push_remote_settings().await;
        }
        Ok(())
    }

    /// Mirror the group and opacity to the backend. Best effort.
    async fn push_remote_settings(&self) {
        let current = self.backend.get_settings().await.unwrap_or_default();
        let settings = RemoteSettings {
            group: i32::try_from(self.config.group()).unwrap_or(0),
            transparency: (self.config.transparency() * 100.0).round() as i32,
            ..current
        };
        if !self.backend.save_settings(&settings).await {
            warn!("failed to save settings to backend");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{Call, MockBackend};
    use crate::config::MAX_UPDATE_INTERVAL;
    use timetable_client::domain::Lesson;
    use timetable_client::FetchError;

    fn snapshot(day_name: &str) -> TimetableSnapshot {
        TimetableSnapshot {
            day_name: day_name.to_string(),
            week_day_name: "Week 1".to_string(),
            state: "OK".to_string(),
            items: vec![Lesson {
                discipline: "Math".to_string(),
                ..Default::default()
            }],
            last_update: None,
        }
    }

    struct Harness {
        _dir: tempfile::TempDir,
        backend: MockBackend,
        controller: SessionController<MockBackend>,
        start: Instant,
    }

    fn harness(backend: MockBackend, mode: PollMode) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigStore::load(dir.path().join("config.json"));
        let start = Instant::now();
        let controller = SessionController::new(backend.clone(), config, mode, start);
        Harness {
            _dir: dir,
            backend,
            controller,
            start,
        }
    }

    impl Harness {
        fn at(&self, offset: Duration) -> Instant {
            self.start + offset
        }

        async fn startup(&mut self) {
            let t = self.at(STARTUP_AUTH_DELAY);
            self.controller.tick(t).await;
        }
    }

    fn update(interval: u64) -> SettingsUpdate {
        SettingsUpdate {
            backend_url: "http://localhost:5000".to_string(),
            group: 0,
            transparency: 0.95,
            update_interval: interval,
        }
    }

    #[tokio::test]
    async fn auth_check_waits_for_startup_delay() {
        let mut h = harness(MockBackend::new().authenticated(), PollMode::Interactive);
        assert_eq!(h.controller.state(), SessionState::Unknown);

        h.controller.tick(h.start).await;
        assert_eq!(h.controller.state(), SessionState::Unknown);
        assert!(h.backend.calls().is_empty());

        h.startup().await;
        assert_eq!(h.controller.state(), SessionState::Authenticated);
        assert_eq!(h.controller.pending_auth_check(), None);
    }

    #[tokio::test]
    async fn positive_auth_check_refreshes_and_arms_timer() {
        let backend = MockBackend::new()
            .authenticated()
            .with_timetable(snapshot("Monday"));
        let mut h = harness(backend, PollMode::Interactive);

        h.startup().await;

        assert_eq!(h.backend.fetch_count(), 1);
        assert_eq!(h.controller.snapshot().unwrap().day_name, "Monday");
        assert!(h.controller.active_timer().is_some());
        assert_eq!(h.controller.timer_period(), Some(Duration::from_secs(300)));
    }

    #[tokio::test]
    async fn timer_keeps_firing_at_configured_period() {
        let backend = MockBackend::new()
            .authenticated()
            .with_timetable(snapshot("Monday"));
        let mut h = harness(backend, PollMode::Interactive);
        h.startup().await;
        let armed_at = h.at(STARTUP_AUTH_DELAY);

        h.controller.tick(armed_at + Duration::from_secs(299)).await;
        assert_eq!(h.backend.fetch_count(), 1);

        h.controller.tick(armed_at + Duration::from_secs(300)).await;
        assert_eq!(h.backend.fetch_count(), 2);

        h.controller.tick(armed_at + Duration::from_secs(600)).await;
        assert_eq!(h.backend.fetch_count(), 3);
    }

    #[tokio::test]
    async fn interactive_mode_waits_for_login() {
        let mut h = harness(MockBackend::new(), PollMode::Interactive);
        h.startup().await;

        assert_eq!(h.controller.state(), SessionState::Unauthenticated);
        assert_eq!(h.controller.pending_auth_check(), None);
        assert!(h.controller.active_timer().is_none());

        h.controller.tick(h.at(Duration::from_secs(60))).await;
        assert_eq!(h.backend.count(|c| *c == Call::CheckAuth), 1);
    }

    #[tokio::test]
    async fn companion_mode_retries_auth_until_authenticated() {
        let backend = MockBackend::new().with_timetable(snapshot("Monday"));
        let mut h = harness(backend, PollMode::Companion);
        h.startup().await;

        let first_check = h.at(STARTUP_AUTH_DELAY);
        assert_eq!(h.controller.state(), SessionState::Unauthenticated);
        assert_eq!(
            h.controller.pending_auth_check(),
            Some(first_check + AUTH_RETRY_DELAY)
        );

        h.controller.tick(first_check + AUTH_RETRY_DELAY).await;
        assert_eq!(h.backend.count(|c| *c == Call::CheckAuth), 2);
        assert_eq!(h.controller.state(), SessionState::Unauthenticated);

        h.backend.set_authenticated(true);
        let third_check = first_check + AUTH_RETRY_DELAY * 2;
        h.controller.tick(third_check).await;
        assert_eq!(h.controller.state(), SessionState::Authenticated);
        assert_eq!(h.controller.timer_period(), Some(COMPANION_REFRESH_INTERVAL));
        assert_eq!(h.controller.pending_auth_check(), None);

        h.controller.tick(third_check + COMPANION_REFRESH_INTERVAL).await;
        assert_eq!(h.backend.fetch_count(), 2);
    }

    #[tokio::test]
    async fn repeated_auth_checks_are_idempotent() {
        let backend = MockBackend::new()
            .authenticated()
            .with_timetable(snapshot("Monday"));
        let mut h = harness(backend, PollMode::Interactive);
        h.startup().await;

        for i in 1..=3 {
            h.controller.check_auth(h.at(Duration::from_secs(i))).await;
            assert!(h.controller.is_authenticated());
            assert!(h.controller.active_timer().is_some());
        }

        let mut h = harness(MockBackend::new(), PollMode::Interactive);
        for i in 1..=3 {
            h.controller.check_auth(h.at(Duration::from_secs(i))).await;
            assert!(!h.controller.is_authenticated());
        }
    }

    #[tokio::test]
    async fn valid_login_authenticates_refreshes_and_arms_timer() {
        let backend = MockBackend::new()
            .accepting_password("secret")
            .with_timetable(snapshot("Monday"));
        let mut h = harness(backend, PollMode::Interactive);
        h.startup().await;

        let outcome = h
            .controller
            .login("student@example.com", "secret", h.at(Duration::from_secs(1)))
            .await;

        assert!(outcome.success);
        assert_eq!(h.controller.state(), SessionState::Authenticated);
        assert_eq!(h.backend.fetch_count(), 1);
        assert_eq!(h.controller.timer_period(), Some(Duration::from_secs(300)));
    }

    #[tokio::test]
    async fn invalid_login_surfaces_message_and_arms_nothing() {
        let backend = MockBackend::new().accepting_password("secret");
        let mut h = harness(backend, PollMode::Interactive);
        h.startup().await;

        let outcome = h
            .controller
            .login("student@example.com", "nope", h.at(Duration::from_secs(1)))
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.message, "Invalid password");
        assert_eq!(h.controller.state(), SessionState::Unauthenticated);
        assert!(h.controller.active_timer().is_none());
        assert_eq!(h.backend.fetch_count(), 0);
    }

    #[tokio::test]
    async fn empty_credentials_never_reach_backend() {
        let mut h = harness(MockBackend::new(), PollMode::Interactive);
        h.startup().await;

        let outcome = h.controller.login("  ", "secret", h.start).await;
        assert_eq!(outcome, LoginOutcome::failed(FILL_ALL_FIELDS));
        let outcome = h.controller.login("a@b.c", "", h.start).await;
        assert_eq!(outcome.message, FILL_ALL_FIELDS);

        assert_eq!(h.backend.count(|c| matches!(c, Call::Login(_))), 0);
    }

    #[tokio::test]
    async fn refresh_failure_keeps_session_and_timer() {
        let backend = MockBackend::new()
            .authenticated()
            .with_timetable(snapshot("Monday"));
        let mut h = harness(backend, PollMode::Interactive);
        h.startup().await;
        let timer = h.controller.active_timer();
        let armed_at = h.at(STARTUP_AUTH_DELAY);

        h.backend
            .push_timetable_result(Err(FetchError::Transport("operation timed out".into())));
        h.controller.tick(armed_at + Duration::from_secs(300)).await;

        assert!(h.controller.status().starts_with("Error: "));
        assert!(h.controller.status().contains("operation timed out"));
        assert_eq!(h.controller.state(), SessionState::Authenticated);
        assert_eq!(h.controller.active_timer(), timer);
        // The previous snapshot stays on screen.
        assert_eq!(h.controller.snapshot().unwrap().day_name, "Monday");

        h.controller.tick(armed_at + Duration::from_secs(600)).await;
        assert_eq!(h.backend.fetch_count(), 3);
        assert_eq!(h.controller.status(), "OK");
    }

    #[tokio::test]
    async fn logout_cancels_timer_and_clears_snapshot() {
        let backend = MockBackend::new()
            .authenticated()
            .with_timetable(snapshot("Monday"));
        let mut h = harness(backend, PollMode::Interactive);
        h.startup().await;
        let armed_at = h.at(STARTUP_AUTH_DELAY);

        h.controller.logout(h.at(Duration::from_secs(1))).await;

        assert_eq!(h.controller.state(), SessionState::Unauthenticated);
        assert!(h.controller.active_timer().is_none());
        assert!(h.controller.snapshot().is_none());
        assert_eq!(h.backend.count(|c| *c == Call::Logout), 1);

        h.controller.tick(armed_at + Duration::from_secs(900)).await;
        assert_eq!(h.backend.fetch_count(), 1);
    }

    #[tokio::test]
    async fn at_most_one_timer_across_actions() {
        let backend = MockBackend::new()
            .accepting_password("secret")
            .with_timetable(snapshot("Monday"));
        let mut h = harness(backend, PollMode::Interactive);
        h.startup().await;

        let mut seen = Vec::new();
        for round in 0..3u64 {
            let t = h.at(Duration::from_secs(round * 10 + 1));
            h.controller.login("a@b.c", "secret", t).await;
            seen.push(h.controller.active_timer().unwrap());

            h.controller.apply_settings(update(60 + round), t).await.unwrap();
            let rearmed = h.controller.active_timer().unwrap();
            assert_ne!(Some(&rearmed), seen.last());
            assert_eq!(h.controller.timer_period(), Some(Duration::from_secs(60 + round)));
            seen.push(rearmed);

            h.controller.logout(t).await;
            assert!(h.controller.active_timer().is_none());
        }

        // Ticking long after never fires more than the stored single timer.
        let fetches = h.backend.fetch_count();
        h.controller.tick(h.at(Duration::from_secs(10_000))).await;
        assert_eq!(h.backend.fetch_count(), fetches);
    }

    #[tokio::test]
    async fn interval_change_rearms_and_refreshes_immediately() {
        let backend = MockBackend::new()
            .authenticated()
            .with_timetable(snapshot("Monday"));
        let mut h = harness(backend, PollMode::Interactive);
        h.startup().await;
        let before = h.controller.active_timer();

        let t = h.at(Duration::from_secs(30));
        h.controller.apply_settings(update(120), t).await.unwrap();

        assert_eq!(h.backend.fetch_count(), 2);
        assert_ne!(h.controller.active_timer(), before);
        assert_eq!(h.controller.timer_period(), Some(Duration::from_secs(120)));
        assert_eq!(h.controller.config().config().update_interval, 120);

        h.controller.tick(t + Duration::from_secs(120)).await;
        assert_eq!(h.backend.fetch_count(), 3);
    }

    #[tokio::test]
    async fn settings_push_group_and_opacity_to_backend() {
        let backend = MockBackend::new()
            .authenticated()
            .with_timetable(snapshot("Monday"))
            .with_remote_settings(RemoteSettings {
                x: 5,
                ..Default::default()
            });
        let mut h = harness(backend, PollMode::Interactive);
        h.startup().await;

        let settings = SettingsUpdate {
            group: 2,
            transparency: 0.8,
            ..update(300)
        };
        h.controller.apply_settings(settings, h.start).await.unwrap();

        let saved = h
            .backend
            .calls()
            .into_iter()
            .find_map(|c| match c {
                Call::SaveSettings(s) => Some(s),
                _ => None,
            })
            .unwrap();
        assert_eq!(saved.group, 2);
        assert_eq!(saved.transparency, 80);
        assert_eq!(saved.x, 5);
    }

    #[tokio::test]
    async fn rejected_settings_change_nothing() {
        let mut h = harness(MockBackend::new().authenticated(), PollMode::Interactive);
        h.startup().await;
        let before = h.controller.config().config().clone();

        let bad = SettingsUpdate {
            group: 4,
            update_interval: 0,
            ..update(300)
        };
        assert!(h.controller.apply_settings(bad, h.start).await.is_err());
        assert_eq!(h.controller.config().config(), &before);
        assert!(!h.controller.config().path().exists());
    }

    #[tokio::test]
    async fn url_change_reconnects_and_rechecks_auth() {
        let backend = MockBackend::new()
            .authenticated()
            .with_timetable(snapshot("Monday"));
        let mut h = harness(backend, PollMode::Interactive);
        h.startup().await;

        let settings = SettingsUpdate {
            backend_url: "http://192.168.1.20:5000".to_string(),
            ..update(300)
        };
        h.controller.apply_settings(settings, h.start).await.unwrap();

        assert_eq!(h.backend.reconnects(), vec!["http://192.168.1.20:5000"]);
        assert_eq!(h.backend.count(|c| *c == Call::CheckAuth), 2);
        assert!(h.controller.is_authenticated());

        // Same URL again: no new client.
        let settings = SettingsUpdate {
            backend_url: "http://192.168.1.20:5000".to_string(),
            ..update(300)
        };
        h.controller.apply_settings(settings, h.start).await.unwrap();
        assert_eq!(h.backend.reconnects().len(), 1);
    }

    #[tokio::test]
    async fn longest_interval_arms_and_fires() {
        let backend = MockBackend::new()
            .authenticated()
            .with_timetable(snapshot("Monday"));
        let mut h = harness(backend, PollMode::Interactive);
        h.startup().await;

        let t = h.at(Duration::from_secs(1));
        h.controller
            .apply_settings(update(MAX_UPDATE_INTERVAL), t)
            .await
            .unwrap();
        assert_eq!(
            h.controller.timer_period(),
            Some(Duration::from_secs(MAX_UPDATE_INTERVAL))
        );

        let fetches = h.backend.fetch_count();
        h.controller
            .tick(t + Duration::from_secs(MAX_UPDATE_INTERVAL))
            .await;
        assert_eq!(h.backend.fetch_count(), fetches + 1);
    }

    #[tokio::test]
    async fn oversized_interval_is_rejected_before_arming() {
        let backend = MockBackend::new()
            .authenticated()
            .with_timetable(snapshot("Monday"));
        let mut h = harness(backend, PollMode::Interactive);
        h.startup().await;
        let timer = h.controller.active_timer();

        let result = h.controller.apply_settings(update(u64::MAX), h.start).await;
        assert!(result.is_err());
        assert_eq!(h.controller.active_timer(), timer);
        assert_eq!(h.controller.timer_period(), Some(Duration::from_secs(300)));
    }

    /// The latest instant this platform can represent, to within a second.
    fn far_instant() -> Instant {
        let mut far = Instant::now();
        let mut step = Duration::from_secs(u64::MAX / 4);
        while step > Duration::from_secs(1) {
            match far.checked_add(step) {
                Some(later) => far = later,
                None => step /= 2,
            }
        }
        far
    }

    #[tokio::test]
    async fn timer_at_end_of_clock_range_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigStore::load(dir.path().join("config.json"));
        let backend = MockBackend::new()
            .authenticated()
            .with_timetable(snapshot("Monday"));
        let far = far_instant();
        let mut controller =
            SessionController::new(backend.clone(), config, PollMode::Interactive, far);

        let due = far.checked_add(STARTUP_AUTH_DELAY).unwrap_or(far);
        controller.tick(due).await;
        controller.tick(due).await;

        assert!(controller.is_authenticated());
        assert!(controller.active_timer().is_some());
        assert_eq!(backend.fetch_count(), 1);
    }

    #[tokio::test]
    async fn toggle_day_fetches_other_day() {
        let backend = MockBackend::new()
            .authenticated()
            .with_timetable(snapshot("Monday"));
        let mut h = harness(backend, PollMode::Interactive);
        h.startup().await;

        h.controller.toggle_day().await;
        assert_eq!(h.controller.day(), Day::Tomorrow);
        assert_eq!(
            h.backend.calls().last(),
            Some(&Call::GetTimetable(Day::Tomorrow))
        );
    }

    #[tokio::test]
    async fn refresh_now_requires_session() {
        let mut h = harness(MockBackend::new(), PollMode::Interactive);
        h.startup().await;
        assert!(!h.controller.refresh_now().await);
        assert_eq!(h.backend.fetch_count(), 0);
    }
}
