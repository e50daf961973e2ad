use crate::app::App;
use crate::backend::TimetableBackend;
use crate::session::SessionController;
use std::time::Instant;
use tracing::debug;

use super::action_queue::Action;

pub(super) async fn run_action<B: TimetableBackend>(
    action: Action,
    app: &mut App,
    session: &mut SessionController<B>,
) {
    debug!("action {:?}", action);
    match action {
        Action::LoginOrRefresh => {
            if session.is_authenticated() {
                session.refresh_now().await;
            } else {
                app.open_login();
            }
        }
        Action::SubmitLogin => handle_login_submit(app, session).await,
        Action::Logout => {
            if session.is_authenticated() {
                session.logout(Instant::now()).await;
            }
        }
        Action::OpenSettings => app.open_settings(session.config().config()),
        Action::SubmitSettings => handle_settings_submit(app, session).await,
        Action::Refresh => {
            session.refresh_now().await;
        }
        Action::ToggleDay => session.toggle_day().await,
    }
}

async fn handle_login_submit<B: TimetableBackend>(
    app: &mut App,
    session: &mut SessionController<B>,
) {
    let (email, password) = match &app.login_dialog {
        Some(dialog) => dialog.credentials(),
        None => return,
    };

    let outcome = session.login(&email, &password, Instant::now()).await;
    if outcome.success {
        app.close_login();
    } else {
        app.login_set_error(outcome.message);
    }
}

async fn handle_settings_submit<B: TimetableBackend>(
    app: &mut App,
    session: &mut SessionController<B>,
) {
    let update = match app.settings_dialog.as_ref().map(|d| d.to_update()) {
        Some(Ok(update)) => update,
        Some(Err(msg)) => {
            app.settings_set_error(msg);
            return;
        }
        None => return,
    };

    match session.apply_settings(update, Instant::now()).await {
        Ok(()) => app.close_settings(),
        Err(e) => app.settings_set_error(e.to_string()),
    }
}
