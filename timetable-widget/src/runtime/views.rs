use crate::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::action_queue::{Action, ActionTx};

fn enqueue_action(action_tx: &ActionTx, action: Action) {
    let _ = action_tx.send(action);
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

pub(super) fn handle_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    if is_ctrl_c(&key) {
        app.quit();
    } else if app.login_dialog.is_some() {
        handle_login_key(key, app, action_tx);
    } else if app.settings_dialog.is_some() {
        handle_settings_key(key, app, action_tx);
    } else if app.mode.manual_login() {
        handle_main_key(key, app, action_tx);
    } else {
        handle_companion_key(key, app, action_tx);
    }
}

fn handle_main_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('l') | KeyCode::Char('L') => {
            enqueue_action(action_tx, Action::LoginOrRefresh)
        }
        KeyCode::Char('o') | KeyCode::Char('O') => enqueue_action(action_tx, Action::Logout),
        KeyCode::Char('s') | KeyCode::Char('S') => {
            enqueue_action(action_tx, Action::OpenSettings)
        }
        KeyCode::Char('r') | KeyCode::Char('R') | KeyCode::F(5) => {
            enqueue_action(action_tx, Action::Refresh)
        }
        KeyCode::Char('t') | KeyCode::Char('T') => enqueue_action(action_tx, Action::ToggleDay),
        _ => {}
    }
}

fn handle_companion_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('t') | KeyCode::Char('T') => enqueue_action(action_tx, Action::ToggleDay),
        _ => {}
    }
}

fn handle_login_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    let Some(dialog) = app.login_dialog.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => dialog.next_field(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            dialog.focused_input().insert(c)
        }
        KeyCode::Backspace => dialog.focused_input().backspace(),
        KeyCode::Left => dialog.focused_input().move_left(),
        KeyCode::Right => dialog.focused_input().move_right(),
        KeyCode::Home => dialog.focused_input().home(),
        KeyCode::End => dialog.focused_input().end(),
        KeyCode::Enter => enqueue_action(action_tx, Action::SubmitLogin),
        KeyCode::Esc => app.close_login(),
        _ => {}
    }
}

fn handle_settings_key(key: KeyEvent, app: &mut App, action_tx: &ActionTx) {
    let Some(dialog) = app.settings_dialog.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Tab | KeyCode::Down => dialog.next_field(),
        KeyCode::BackTab | KeyCode::Up => dialog.previous_field(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            dialog.focused_input().insert(c)
        }
        KeyCode::Backspace => dialog.focused_input().backspace(),
        KeyCode::Left => dialog.focused_input().move_left(),
        KeyCode::Right => dialog.focused_input().move_right(),
        KeyCode::Home => dialog.focused_input().home(),
        KeyCode::End => dialog.focused_input().end(),
        KeyCode::Enter => enqueue_action(action_tx, Action::SubmitSettings),
        KeyCode::Esc => app.close_settings(),
        _ => {}
    }
}
