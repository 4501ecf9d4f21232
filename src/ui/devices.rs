//! Device sidebar.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::adb::DeviceHandle;
use crate::mode_state::DeviceListState;

fn state_color(device: &DeviceHandle) -> Color {
    match device.state.as_str() {
        "device" => Color::Green,
        "unauthorized" => Color::Yellow,
        _ => Color::Red,
    }
}

fn device_item(device: &DeviceHandle, active: bool) -> ListItem<'static> {
    let name = device.model().unwrap_or_else(|| device.id.clone());
    let marker = if active { "● " } else { "  " };
    let name_style = if active {
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };
    let transport = if device.is_tcp() { "wifi" } else { "usb" };

    ListItem::new(vec![
        Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Green)),
            Span::styled(name, name_style),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(device.state.clone(), Style::default().fg(state_color(device))),
            Span::styled(
                format!(" · {transport} · {}", device.id),
                Style::default().fg(Color::DarkGray),
            ),
        ]),
    ])
}

pub fn draw_device_list(
    frame: &mut Frame<'_>,
    area: Rect,
    state: &mut DeviceListState,
    focused: bool,
) {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Devices ({}) ", state.devices.len()))
        .border_style(border_style);

    if state.devices.is_empty() {
        let body = Paragraph::new(vec![
            Line::from(Span::styled(
                "No devices",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Connect a device with USB debugging enabled.",
                Style::default().fg(Color::Gray),
            )),
        ])
        .wrap(Wrap { trim: true })
        .block(block);
        frame.render_widget(body, area);
        return;
    }

    let items: Vec<ListItem<'static>> = state
        .devices
        .iter()
        .map(|d| device_item(d, state.active.as_deref() == Some(d.id.as_str())))
        .collect();

    let highlight = if focused {
        Style::default().bg(Color::Cyan).fg(Color::White)
    } else {
        Style::default()
    };
    let list = List::new(items).block(block).highlight_style(highlight);

    state.list_state.select(Some(state.selected));
    frame.render_stateful_widget(list, area, &mut state.list_state);
}
