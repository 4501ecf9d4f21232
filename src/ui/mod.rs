pub mod context_menu;
pub mod devices;
pub mod explorer;
pub mod popup;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::Focus;

// Re-export commonly used items for convenience
pub use context_menu::draw_context_menu;
pub use devices::draw_device_list;
pub use explorer::{draw_file_table, draw_path_bar};
pub use popup::{
    draw_delete_confirmation_popup, draw_error_popup, draw_file_info_popup, draw_info_popup,
    draw_prompt_popup,
};

const DEVICE_PANEL_WIDTH: u16 = 30;

/// Screen split: path bar on top, devices and files side by side, footer.
#[derive(Clone, Copy, Debug)]
pub struct MainLayout {
    pub path_bar: Rect,
    pub devices: Rect,
    pub files: Rect,
    pub footer: Rect,
}

pub fn main_layout(area: Rect) -> MainLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Path bar
            Constraint::Min(1),    // Panels
            Constraint::Length(1), // Footer
        ])
        .split(area);

    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(DEVICE_PANEL_WIDTH), Constraint::Min(20)])
        .split(rows[1]);

    MainLayout {
        path_bar: rows[0],
        devices: panels[0],
        files: panels[1],
        footer: rows[2],
    }
}

/// Centered rectangle of at most `width` x `height` inside `area`.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn footer_hints(focus: Focus) -> &'static str {
    match focus {
        Focus::Files => {
            "↑↓/jk: Move  Enter: Open  ⌫: Up  Space: Select  m: Menu  1-4: Sort  G: Group  g: Go to  r: Refresh  Tab: Devices  q: Quit"
        }
        Focus::Devices => "↑↓/jk: Move  Enter: Browse  r: Rescan  Tab: Files  q: Quit",
    }
}

/// Footer: running work or a notice when present, key hints otherwise, and
/// the version on the right.
pub fn draw_footer(
    frame: &mut Frame<'_>,
    area: Rect,
    focus: Focus,
    busy: Option<(&str, &str)>,
    notice: Option<&str>,
) {
    let footer_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(80), Constraint::Percentage(20)])
        .split(area);

    let left = if let Some((spinner, message)) = busy {
        Line::from(vec![
            Span::styled(format!("{spinner} "), Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{message}..."),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    } else if let Some(notice) = notice {
        Line::from(Span::styled(notice, Style::default().fg(Color::Green)))
    } else {
        Line::from(Span::styled(
            footer_hints(focus),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::DIM),
        ))
    };

    let right = Paragraph::new(Line::from(Span::styled(
        format!("Droidex v{}", env!("CARGO_PKG_VERSION")),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )))
    .alignment(Alignment::Right);

    frame.render_widget(
        Paragraph::new(left).alignment(Alignment::Left),
        footer_layout[0],
    );
    frame.render_widget(right, footer_layout[1]);
}
