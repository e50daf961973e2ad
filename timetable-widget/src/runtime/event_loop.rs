use crate::app::App;
use crate::backend::TimetableBackend;
use crate::session::{SessionController, SessionState};
use crate::ui;
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::{Duration, Instant};

use super::action_queue::channel;
use super::actions::run_action;
use super::views::handle_key;

pub async fn run_app<B: TimetableBackend>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    session: &mut SessionController<B>,
) -> Result<()> {
    let (action_tx, mut action_rx) = channel();

    loop {
        terminal.draw(|f| ui::render(f, app, session))?;

        if matches!(
            session.state(),
            SessionState::Unknown | SessionState::CheckingAuth
        ) {
            app.throbber_state.calc_next();
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(key, app, &action_tx);
                }
            }
        }

        while let Ok(action) = action_rx.try_recv() {
            run_action(action, app, session).await;
        }

        session.tick(Instant::now()).await;

        if !app.running {
            break;
        }
    }

    Ok(())
}
