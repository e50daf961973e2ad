use super::utils::format_clock;
use super::*;
use crate::app::visible_lessons;
use crate::session::SessionState;
use std::time::{Duration, Instant};
use timetable_client::domain::Lesson;

const TITLE: &str = " Timetable";

pub fn render_title_bar<B: TimetableBackend>(
    frame: &mut Frame,
    area: Rect,
    app: &mut App,
    session: &SessionController<B>,
) {
    let checking = matches!(
        session.state(),
        SessionState::Unknown | SessionState::CheckingAuth
    );

    let throbber_area = Rect {
        x: area.x + 1,
        y: area.y,
        width: 1,
        height: 1,
    };
    let label_area = Rect {
        x: throbber_area.x + 1,
        y: area.y,
        width: area.width.saturating_sub(2),
        height: 1,
    };

    let throbber = throbber_widgets_tui::Throbber::default()
        .style(Style::default().fg(Color::Yellow))
        .throbber_style(Style::default().fg(Color::Yellow))
        .throbber_set(throbber_widgets_tui::BRAILLE_SIX)
        .use_type(if checking {
            throbber_widgets_tui::WhichUse::Spin
        } else {
            throbber_widgets_tui::WhichUse::Full
        });
    frame.render_stateful_widget(throbber, throbber_area, &mut app.throbber_state);

    let session_label = if checking {
        "checking session…".to_string()
    } else if session.is_authenticated() {
        "logged in".to_string()
    } else if let Some(at) = session.pending_auth_check() {
        let wait = at.saturating_duration_since(Instant::now());
        format!("logged out, retrying in {}s", wait.as_secs())
    } else {
        "logged out".to_string()
    };
    let line = Line::from(vec![
        Span::styled(TITLE, Style::default().fg(Color::Yellow)),
        Span::styled(
            format!("  {}  ", session.day().label()),
            Style::default().fg(Color::White),
        ),
        Span::styled(session_label, Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), label_area);
}

pub fn render_timetable_view<B: TimetableBackend>(
    frame: &mut Frame,
    body: Rect,
    app: &App,
    session: &SessionController<B>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(5),    // Lessons
            Constraint::Length(3), // Status
            Constraint::Length(3), // Controls
        ])
        .split(body);

    render_lessons(frame, chunks[0], session);
    render_status(frame, chunks[1], session);
    render_controls(frame, chunks[2], app);
}

fn render_lessons<B: TimetableBackend>(
    frame: &mut Frame,
    area: Rect,
    session: &SessionController<B>,
) {
    let Some(snapshot) = session.snapshot() else {
        let message = if session.is_authenticated() {
            "Loading timetable..."
        } else {
            "Log in to see your timetable"
        };
        let placeholder = Paragraph::new(message)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" Timetable "));
        frame.render_widget(placeholder, area);
        return;
    };

    let title = format!(" Timetable for {} ", snapshot.day_name);
    let mut lines = vec![Line::from(Span::styled(
        snapshot.week_day_name.clone(),
        Style::default().fg(Color::DarkGray),
    ))];

    let visible = visible_lessons(&snapshot.items, session.config().group());
    if visible.lessons.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "No classes",
            Style::default().fg(Color::Green),
        )));
    }
    for lesson in &visible.lessons {
        lines.push(Line::from(""));
        lines.extend(lesson_card(lesson));
    }
    if let Some(overflow) = visible.overflow_label() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            overflow,
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::ITALIC),
        )));
    }

    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(title, Style::default().fg(Color::White)))
        .padding(Padding::horizontal(1));
    if let Some(updated) = session.updated_at() {
        block = block.title_bottom(
            Line::from(Span::styled(
                format!(" Updated {} ", format_clock(updated)),
                Style::default().fg(Color::DarkGray),
            ))
            .right_aligned(),
        );
    }

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn lesson_card(lesson: &Lesson) -> [Line<'_>; 2] {
    let mut heading = vec![Span::styled(
        lesson.discipline.as_str(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    )];
    if !lesson.is_shared() {
        heading.push(Span::styled(
            format!("  (subgroup {})", lesson.subgroup),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let details = Line::from(vec![
        Span::styled(
            format!("{} - {}", lesson.start_time, lesson.end_time),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw("   "),
        Span::styled(lesson.cabinet.as_str(), Style::default().fg(Color::Magenta)),
        Span::raw("   "),
        Span::styled(lesson.kind.as_str(), Style::default().fg(Color::DarkGray)),
    ]);

    [Line::from(heading), details]
}

fn render_status<B: TimetableBackend>(
    frame: &mut Frame,
    area: Rect,
    session: &SessionController<B>,
) {
    let status_text = session.status();
    let status_lower = status_text.to_lowercase();
    let is_error = status_lower.contains("error")
        || status_lower.contains("unavailable")
        || status_lower.contains("expired");
    let is_success = session.is_authenticated() && !is_error;

    let color = if is_error {
        Color::Red
    } else if is_success {
        Color::Green
    } else {
        Color::White
    };

    let status = Paragraph::new(status_text)
        .style(Style::default().fg(color))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(status_title(session.timer_period()))
                .border_style(Style::default().fg(color))
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(status, area);
}

fn status_title(period: Option<Duration>) -> String {
    match period {
        Some(period) => format!(" Status (every {}s) ", period.as_secs()),
        None => " Status ".to_string(),
    }
}

fn render_controls(frame: &mut Frame, area: Rect, app: &App) {
    let mut spans = Vec::new();
    if app.mode.manual_login() {
        spans.extend(key_hint("L", ": Login  "));
        spans.extend(key_hint("O", ": Logout  "));
        spans.extend(key_hint("S", ": Settings  "));
        spans.extend(key_hint("R", ": Refresh  "));
    }
    spans.extend(key_hint("T", ": Today/Tomorrow  "));
    spans.extend(key_hint("Q", ": Quit"));

    let controls = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" Controls ", Style::default().fg(Color::DarkGray)))
                .border_style(Style::default().fg(Color::DarkGray)),
        );
    frame.render_widget(controls, area);
}
