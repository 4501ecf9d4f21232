//! Path bar and file table.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, TableState,
    },
};

use crate::explorer::{ExplorerRow, ExplorerState, LoadState, SortKey};
use crate::listing::FileEntry;
use crate::mode_state::DeviceListState;

const COLUMN_CONSTRAINTS: [Constraint; 6] = [
    Constraint::Length(1),  // Selection marker
    Constraint::Min(20),    // Name
    Constraint::Length(8),  // Type
    Constraint::Length(10), // Size
    Constraint::Length(19), // Date
    Constraint::Length(1),  // Scrollbar
];

const SORT_COLUMNS: [SortKey; 4] = [SortKey::Name, SortKey::Type, SortKey::Size, SortKey::Date];

/// Device and current directory, with the up control greyed out at the root.
pub fn draw_path_bar(
    frame: &mut Frame<'_>,
    area: Rect,
    explorer: &ExplorerState,
    devices: &DeviceListState,
) {
    let device = match devices.active_device() {
        Some(d) => d.model().unwrap_or_else(|| d.id.clone()),
        None => "no device".to_string(),
    };
    let up_style = if explorer.at_root() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let mut spans = vec![
        Span::styled(" ⌫ Up ", up_style),
        Span::styled("│ ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{device}:"),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            explorer.current_path().to_string(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if let LoadState::Loading { path } = explorer.load_state()
        && path != explorer.current_path()
    {
        spans.push(Span::styled(
            format!("  → {path}"),
            Style::default().fg(Color::Yellow),
        ));
    }

    let bar = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Droidex ")
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(bar, area);
}

fn header_row(explorer: &ExplorerState) -> Row<'static> {
    let sort = explorer.sort();
    let mut cells = vec![Cell::from("")];
    cells.extend(SORT_COLUMNS.iter().enumerate().map(|(idx, key)| {
        Cell::from(format!(
            "{} {}{}",
            key.label(),
            sort.indicator(*key),
            if sort.indicator(*key).is_empty() {
                format!("[{}]", idx + 1)
            } else {
                String::new()
            }
        ))
    }));
    Row::new(cells)
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .height(1)
}

fn entry_row(entry: &FileEntry, selected: bool) -> Row<'static> {
    let (name, name_style) = if entry.is_dir {
        (
            format!("{}/", entry.name),
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        )
    } else if entry.is_symlink {
        let name = match &entry.link_target {
            Some(target) => format!("{} -> {}", entry.name, target),
            None => entry.name.clone(),
        };
        (name, Style::default().fg(Color::LightCyan))
    } else {
        (entry.name.clone(), Style::default().fg(Color::White))
    };

    let row = Row::new(vec![
        Cell::from(if selected { "✓" } else { " " }).style(Style::default().fg(Color::Green)),
        Cell::from(name).style(name_style),
        Cell::from(entry.file_type()).style(Style::default().fg(Color::Gray)),
        Cell::from(entry.size_display()).style(Style::default().fg(Color::Gray)),
        Cell::from(entry.modified.clone()).style(Style::default().fg(Color::Gray)),
    ]);
    if selected {
        row.style(Style::default().bg(Color::DarkGray))
    } else {
        row
    }
}

fn group_row(key: &str, count: usize, collapsed: bool) -> Row<'static> {
    let marker = if collapsed { "▸" } else { "▾" };
    Row::new(vec![
        Cell::from(""),
        Cell::from(format!("{marker} {key} ({count})")),
    ])
    .style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )
}

fn placeholder(frame: &mut Frame<'_>, area: Rect, block: Block<'_>, text: &str, color: Color) {
    let body = Paragraph::new(Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(color).add_modifier(Modifier::DIM),
    )))
    .alignment(Alignment::Center)
    .block(block);
    frame.render_widget(body, area);
}

/// Draw the file table and return the area of its body rows for hit testing.
/// Nothing is clickable while a listing is loading.
pub fn draw_file_table(
    frame: &mut Frame<'_>,
    area: Rect,
    explorer: &ExplorerState,
    table_state: &mut TableState,
    focused: bool,
    spinner: &str,
) -> Rect {
    let border_style = if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let selected_count = explorer.selection().len();
    let mut title = format!(" Files ({})", explorer.entries().len());
    if selected_count > 0 {
        title.push_str(&format!(" · {selected_count} selected"));
    }
    if explorer.is_grouped() {
        title.push_str(" · grouped by type");
    }
    title.push(' ');

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style);

    if explorer.is_loading() {
        placeholder(
            frame,
            area,
            block,
            &format!("{spinner} Loading..."),
            Color::Yellow,
        );
        return Rect::default();
    }

    let rows = explorer.rows();
    if rows.is_empty() {
        let text = match explorer.load_state() {
            LoadState::Idle => "Waiting for a device...",
            LoadState::Error(reason) => reason.as_str(),
            _ => "Empty directory",
        };
        placeholder(frame, area, block, text, Color::White);
        return Rect::default();
    }

    let total = rows.len();
    let table_rows: Vec<Row<'static>> = rows
        .iter()
        .map(|row| match row {
            ExplorerRow::Group {
                key,
                count,
                collapsed,
            } => group_row(key, *count, *collapsed),
            ExplorerRow::Entry(entry) => entry_row(entry, explorer.is_selected(&entry.path)),
        })
        .collect();

    let highlight = if focused {
        Style::default()
            .bg(Color::Cyan)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::REVERSED)
    };

    let table = Table::new(table_rows, COLUMN_CONSTRAINTS)
        .header(header_row(explorer))
        .block(block)
        .row_highlight_style(highlight)
        .highlight_symbol("▶ ");

    table_state.select(Some(explorer.cursor().min(total - 1)));
    frame.render_stateful_widget(table, area, table_state);

    render_scrollbar(frame, area, table_state.offset(), total);

    // Inside the borders, below the header
    let inner = area.inner(Margin::new(1, 1));
    Rect {
        x: inner.x,
        y: inner.y + 1,
        width: inner.width,
        height: inner.height.saturating_sub(1),
    }
}

/// Render vertical scrollbar only if content exceeds visible rows.
fn render_scrollbar(frame: &mut Frame<'_>, table_area: Rect, top_index: usize, total_items: usize) {
    let inner_area = table_area.inner(Margin::new(1, 2));
    let visible_rows = inner_area.height.saturating_sub(1) as usize; // -1 for header

    if total_items <= visible_rows {
        return;
    }

    let max_top = total_items.saturating_sub(visible_rows);
    let mut scroll_state = ScrollbarState::new(max_top.saturating_add(1)).position(top_index);

    let scrollbar = Scrollbar::default()
        .orientation(ScrollbarOrientation::VerticalRight)
        .begin_symbol(None)
        .end_symbol(None);

    frame.render_stateful_widget(scrollbar, inner_area, &mut scroll_state);
}

#[cfg(test)]
mod tests {
    use ratatui::{Terminal, backend::TestBackend};

    use super::*;
    use crate::explorer::SortKey;

    const LISTING: &str = "\
drwxrwx--x 2 root sdcard_rw 4096 2023-03-04 08:15 DCIM
-rw-rw---- 1 root sdcard_rw 1234 2023-02-01 09:30 notes.txt
-rw-rw---- 1 root sdcard_rw 2097152 2023-02-02 10:00 song.mp3
";

    fn loaded() -> ExplorerState {
        let mut state = ExplorerState::new("/sdcard");
        let ticket = state.refresh();
        state.finish_load(&ticket, Ok(LISTING.to_string()));
        state
    }

    fn render(state: &ExplorerState, table_state: &mut TableState) -> (String, Rect) {
        let backend = TestBackend::new(80, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut rows_area = Rect::default();
        terminal
            .draw(|f| {
                rows_area = draw_file_table(f, f.area(), state, table_state, true, "*");
            })
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        let text = buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|line| line.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n");
        (text, rows_area)
    }

    #[test]
    fn test_table_shows_rows_and_sort_indicator() {
        let mut state = loaded();
        state.select_sort(SortKey::Size);
        let (text, rows_area) = render(&state, &mut TableState::default());

        assert!(text.contains("Files (3)"));
        assert!(text.contains("Size ↑"));
        assert!(text.contains("DCIM/"));
        assert!(text.contains("2 MB"));
        assert!(text.contains("--"));
        assert_eq!(rows_area, Rect::new(1, 2, 78, 9));
    }

    #[test]
    fn test_loading_placeholder_hides_rows() {
        let mut state = loaded();
        state.begin_load("/sdcard/DCIM");
        let (text, rows_area) = render(&state, &mut TableState::default());

        assert!(text.contains("* Loading..."));
        assert!(!text.contains("notes.txt"));
        assert_eq!(rows_area, Rect::default());
    }

    #[test]
    fn test_group_headers() {
        let mut state = loaded();
        state.toggle_grouping();
        state.toggle_group("TXT");
        let (text, _) = render(&state, &mut TableState::default());

        assert!(text.contains("▾ Folder (1)"));
        assert!(text.contains("▸ TXT (1)"));
        assert!(!text.contains("notes.txt"));
    }
}
