use crate::app::App;
use crate::backend::TimetableBackend;
use crate::session::SessionController;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Padding, Paragraph, Wrap},
    Frame,
};

mod login_dialog;
mod settings_dialog;
mod timetable_view;
mod utils;

pub fn render<B: TimetableBackend>(frame: &mut Frame, app: &mut App, session: &SessionController<B>) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(frame.area());

    timetable_view::render_title_bar(frame, root[0], app, session);
    timetable_view::render_timetable_view(frame, root[1], app, session);

    // Dialogs render on top of the timetable.
    if let Some(dialog) = &app.login_dialog {
        login_dialog::render_login_dialog(frame, dialog);
    } else if let Some(dialog) = &app.settings_dialog {
        settings_dialog::render_settings_dialog(frame, dialog);
    }
}

fn key_hint(key: &'static str, label: &'static str) -> [Span<'static>; 2] {
    [
        Span::styled(key, Style::default().fg(Color::Yellow)),
        Span::raw(label),
    ]
}

fn dialog_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(Span::styled(title, Style::default().fg(Color::Yellow)))
        .padding(Padding::horizontal(2))
}

/// Label plus value, highlighted when focused. A cursor block is drawn at
/// the cursor position of the focused field.
fn input_line<'a>(label: &'a str, before: &'a str, after: &'a str, focused: bool) -> Line<'a> {
    let label_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let value_style = if focused {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let mut spans = vec![
        Span::styled(format!("{label}: "), label_style),
        Span::styled(before, value_style),
    ];
    if focused {
        spans.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
    }
    spans.push(Span::styled(after, value_style));
    Line::from(spans)
}
