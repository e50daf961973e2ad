use super::utils::centered_rect;
use super::*;
use crate::app::{LoginDialog, LoginField};

pub fn render_login_dialog(frame: &mut Frame, dialog: &LoginDialog) {
    let area = centered_rect(60, 12, frame.area());
    frame.render_widget(Clear, area);

    let email_focused = dialog.focused == LoginField::Email;
    let password_focused = dialog.focused == LoginField::Password;

    // Password is masked; the cursor position is kept in characters.
    let (before, after) = dialog.password.split_at_cursor();
    let masked_before = "•".repeat(before.chars().count());
    let masked_after = "•".repeat(after.chars().count());
    let (email_before, email_after) = dialog.email.split_at_cursor();

    let mut lines = vec![
        Line::from(""),
        input_line("Email", email_before, email_after, email_focused),
        input_line("Password", &masked_before, &masked_after, password_focused),
        Line::from(""),
    ];

    if let Some(err) = &dialog.error {
        lines.push(Line::from(Span::styled(
            err.as_str(),
            Style::default().fg(Color::Red),
        )));
        lines.push(Line::from(""));
    }

    let mut hints = Vec::new();
    hints.extend(key_hint("Tab", ": Switch field  "));
    hints.extend(key_hint("Enter", ": Log in  "));
    hints.extend(key_hint("Esc", ": Cancel"));
    lines.push(Line::from(hints));

    let paragraph = Paragraph::new(lines)
        .block(dialog_block(" Log in "))
        .alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}
