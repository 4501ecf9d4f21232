use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
};

use super::centered_rect;
use crate::explorer::ContextMenu;

const MENU_WIDTH: u16 = 30;

/// Draw the context menu centered over `area`; returns its outer rect.
pub fn draw_context_menu(frame: &mut Frame<'_>, area: Rect, menu: &ContextMenu) -> Rect {
    let popup = centered_rect(MENU_WIDTH, menu.items.len() as u16 + 2, area);
    frame.render_widget(Clear, popup);

    let title = match &menu.target {
        Some(entry) => format!(" {} ", entry.name),
        None => " This folder ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Line::from(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )))
        .border_style(Style::default().fg(Color::Cyan));

    let items: Vec<ListItem<'static>> = menu
        .items
        .iter()
        .map(|action| {
            let style = if action.is_destructive() {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(Span::styled(action.label(), style)))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Cyan)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    let mut state = ListState::default().with_selected(Some(menu.selected));
    frame.render_stateful_widget(list, popup, &mut state);
    popup
}
