use super::utils::centered_rect;
use super::*;
use crate::app::{SettingsDialog, SettingsField};

pub fn render_settings_dialog(frame: &mut Frame, dialog: &SettingsDialog) {
    let area = centered_rect(64, 14, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    for field in SettingsField::ALL {
        let (before, after) = dialog.input(field).split_at_cursor();
        lines.push(input_line(
            field.label(),
            before,
            after,
            dialog.focused == field,
        ));
    }
    lines.push(Line::from(""));

    if let Some(err) = &dialog.error {
        lines.push(Line::from(Span::styled(
            err.as_str(),
            Style::default().fg(Color::Red),
        )));
        lines.push(Line::from(""));
    }

    let mut hints = Vec::new();
    hints.extend(key_hint("Tab / ↑↓", ": Switch field  "));
    hints.extend(key_hint("Enter", ": Save  "));
    hints.extend(key_hint("Esc", ": Cancel"));
    lines.push(Line::from(hints));

    let paragraph = Paragraph::new(lines)
        .block(dialog_block(" Settings "))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
