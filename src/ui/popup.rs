use ratatui::layout::{Alignment, Constraint, Direction, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use super::centered_rect;
use crate::listing::FileEntry;
use crate::mode_state::{DeleteConfirmationState, PromptState};

fn dismiss_hint() -> Line<'static> {
    Line::from(Span::styled(
        "Press Enter or Esc to dismiss",
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    ))
}

/// Full-width message box sized to the wrapped message.
fn draw_message_popup(
    area: Rect,
    title: &str,
    color: Color,
    message: &str,
    frame: &mut ratatui::Frame<'_>,
) {
    let popup_w = area.width.saturating_sub(4);
    let inner_w = popup_w.saturating_sub(2).max(1);
    let estimated_lines: u16 = message
        .lines()
        .map(|l| (l.chars().count() as u16).div_ceil(inner_w).max(1))
        .sum();
    let content_h = estimated_lines.max(1) + 4; // borders + blank + hint
    let popup = centered_rect(popup_w, content_h.min(area.height.saturating_sub(2)), area);

    frame.render_widget(Clear, popup);
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(Span::styled(
            title.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
    let mut lines: Vec<Line<'static>> = message
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(color))))
        .collect();
    lines.push(Line::from(""));
    lines.push(dismiss_hint());

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(body, popup);
}

// Error popup renderer
pub fn draw_error_popup(area: Rect, message: &str, frame: &mut ratatui::Frame<'_>) {
    draw_message_popup(area, "Error", Color::Red, message, frame);
}

// Info popup renderer
pub fn draw_info_popup(area: Rect, message: &str, frame: &mut ratatui::Frame<'_>) {
    draw_message_popup(area, "Info", Color::Green, message, frame);
}

/// Delete confirmation naming the target, or the count for a batch.
pub fn draw_delete_confirmation_popup(
    area: Rect,
    state: &DeleteConfirmationState,
    frame: &mut ratatui::Frame<'_>,
) {
    let popup_w = area.width.saturating_sub(10).clamp(20, 60);
    let popup = centered_rect(popup_w, 8, area);

    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(Span::styled(
            "Delete",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )));
    frame.render_widget(block, popup);

    let inner = popup.inner(Margin::new(1, 1));
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // warning message
            Constraint::Length(1), // target
            Constraint::Length(1), // empty line
            Constraint::Length(1), // irreversibility note
            Constraint::Length(1), // buttons hint
        ])
        .split(inner);

    let warning = Paragraph::new(Line::from(Span::styled(
        "⚠️  Permanently delete from the device?",
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )));
    frame.render_widget(warning, layout[0]);

    let target = Paragraph::new(Line::from(vec![
        Span::styled("Target: ", Style::default().fg(Color::Gray)),
        Span::styled(
            state.description(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    frame.render_widget(target, layout[1]);

    let note = Paragraph::new(Line::from(Span::styled(
        "Folders are removed with their contents. This cannot be undone.",
        Style::default().fg(Color::Red),
    )));
    frame.render_widget(note, layout[3]);

    let buttons = Paragraph::new(Line::from(vec![
        Span::styled(
            "Y",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::styled(" - Delete   ", Style::default().fg(Color::White)),
        Span::styled(
            "N/Esc",
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" - Cancel", Style::default().fg(Color::White)),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(buttons, layout[4]);
}

/// Get Info modal.
pub fn draw_file_info_popup(area: Rect, entry: &FileEntry, frame: &mut ratatui::Frame<'_>) {
    let popup = centered_rect(area.width.saturating_sub(10).clamp(30, 70), 10, area);
    frame.render_widget(Clear, popup);

    let label = Style::default().fg(Color::Gray);
    let value = Style::default().fg(Color::White);
    let field = |name: &str, text: String| {
        Line::from(vec![
            Span::styled(format!("{name:<12}"), label),
            Span::styled(text, value),
        ])
    };

    let mut size = entry.size_display();
    if let Some(bytes) = entry.size.filter(|_| !entry.is_dir) {
        size.push_str(&format!(" ({bytes} bytes)"));
    }

    let lines = vec![
        field("Name", entry.name.clone()),
        field("Type", entry.file_type()),
        field("Path", entry.path.clone()),
        field("Size", size),
        field("Modified", entry.modified.clone()),
        field("Permissions", entry.permissions.clone()),
        Line::from(""),
        dismiss_hint(),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(Span::styled(
            " Info ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        popup,
    );
}

/// Text prompt with a hint line; Tab completion applies to local paths.
pub fn draw_prompt_popup(area: Rect, prompt: &mut PromptState, frame: &mut ratatui::Frame<'_>) {
    let popup = centered_rect(area.width.saturating_sub(10).clamp(30, 80), 5, area);
    frame.render_widget(Clear, popup);

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(popup);

    prompt.input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", prompt.kind.title()))
            .style(Style::default().fg(Color::Cyan)),
    );
    prompt.input.set_cursor_line_style(Style::default());
    frame.render_widget(&prompt.input, layout[0]);

    let hint = if prompt.kind.is_local() {
        "Enter: Confirm   Tab: Complete   Esc: Cancel"
    } else {
        "Enter: Go   Esc: Cancel"
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        hint,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(footer, layout[1]);
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::mode_state::PromptKind;

    fn screen(draw: impl FnOnce(&mut ratatui::Frame<'_>)) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(draw).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    fn entry(name: &str, is_dir: bool) -> FileEntry {
        FileEntry {
            name: name.to_string(),
            path: format!("/sdcard/{name}"),
            is_dir,
            is_symlink: false,
            link_target: None,
            size: if is_dir { None } else { Some(2048) },
            modified: "2023-03-04 08:15".to_string(),
            permissions: "-rw-rw----".to_string(),
        }
    }

    #[test]
    fn test_delete_confirmation_names_target() {
        let single = DeleteConfirmationState::new(vec![entry("notes.txt", false)]);
        let text = screen(|f| draw_delete_confirmation_popup(f.area(), &single, f));
        assert!(text.contains("Target: notes.txt"));

        let batch =
            DeleteConfirmationState::new(vec![entry("a.txt", false), entry("DCIM", true)]);
        let text = screen(|f| draw_delete_confirmation_popup(f.area(), &batch, f));
        assert!(text.contains("Target: 2 items"));
    }

    #[test]
    fn test_file_info_fields() {
        let text = screen(|f| draw_file_info_popup(f.area(), &entry("notes.txt", false), f));
        assert!(text.contains("/sdcard/notes.txt"));
        assert!(text.contains("2 KB (2048 bytes)"));
        assert!(text.contains("TXT"));
        assert!(text.contains("-rw-rw----"));
    }

    #[test]
    fn test_prompt_shows_title_and_value() {
        let mut prompt = PromptState::new(PromptKind::GoTo, "/sdcard/DCIM");
        let text = screen(|f| draw_prompt_popup(f.area(), &mut prompt, f));
        assert!(text.contains("Go to device path"));
        assert!(text.contains("/sdcard/DCIM"));
    }

    #[test]
    fn test_error_popup() {
        let text = screen(|f| draw_error_popup(f.area(), "Permission denied: /data", f));
        assert!(text.contains("Error"));
        assert!(text.contains("Permission denied: /data"));
    }
}
