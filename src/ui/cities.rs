use ratatui::layout::{Constraint, Direction, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};
use ratatui::Frame;

use crate::browser::CityBrowser;
use crate::view::Column;

use super::popup;

const WIDTHS: [Constraint; 3] = [
    Constraint::Percentage(40),
    Constraint::Percentage(30),
    Constraint::Percentage(30),
];

const COLUMN_SPACING: u16 = 1;

pub fn render(frame: &mut Frame, browser: &CityBrowser, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    render_search(frame, browser, chunks[0]);
    render_table(frame, browser, chunks[1]);

    if let Some(column) = browser.dropdowns.focused() {
        let anchor = header_cell(chunks[1], column);
        popup::render_select(
            frame,
            column.title(),
            &browser.picker_options(column),
            browser.picker_index,
            anchor,
            chunks[1],
        );
    }
}

fn render_search(frame: &mut Frame, browser: &CityBrowser, area: Rect) {
    let term = browser.loader.term();
    let (text, style) = if browser.search_mode {
        (format!("{}█", term), Style::default().fg(Color::Yellow))
    } else if term.is_empty() {
        ("Search cities...".to_string(), Style::default().fg(Color::DarkGray))
    } else {
        (term.to_string(), Style::default())
    };

    let border_style = if browser.search_mode {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let search = Paragraph::new(Line::from(Span::styled(text, style))).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" / Search "),
    );
    frame.render_widget(search, area);
}

fn header_label(browser: &CityBrowser, column: Column) -> Line<'static> {
    let mut spans = vec![Span::styled(
        column.title(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if browser.sort.key == Some(column) {
        spans.push(Span::raw(format!(" {}", browser.sort.direction.arrow())));
    }
    let marker_style = if browser.dropdowns.is_open(column) {
        Style::default().fg(Color::Yellow)
    } else if !browser.filter.pattern(column).is_empty() {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    spans.push(Span::styled(" ▼", marker_style));
    Line::from(spans)
}

/// Screen rect of a column's header cell inside the table block
fn header_cell(table_area: Rect, column: Column) -> Rect {
    let inner = Rect::new(
        table_area.x + 1,
        table_area.y + 1,
        table_area.width.saturating_sub(2),
        1,
    );
    // same split the table does for its columns
    let cells = Layout::horizontal(WIDTHS)
        .flex(Flex::Start)
        .spacing(COLUMN_SPACING)
        .split(inner);
    match column {
        Column::Name => cells[0],
        Column::Country => cells[1],
        Column::Timezone => cells[2],
    }
}

fn render_table(frame: &mut Frame, browser: &CityBrowser, area: Rect) {
    let rows = browser.rows();
    let total = browser.loader.records().len();

    let page = browser.loader.page();
    let mut title = if browser.filter.is_active() {
        format!(" Cities ({} of {}) · page {} ", rows.len(), total, page)
    } else {
        format!(" Cities ({}) · page {} ", total, page)
    };
    if browser.loader.is_loading() {
        title.push_str("Loading... ");
    } else if browser.loader.is_exhausted() {
        title.push_str("· end of results ");
    }

    let block = Block::default().borders(Borders::ALL).title(title);

    let header = Row::new(
        Column::ALL
            .iter()
            .map(|c| Cell::from(header_label(browser, *c)))
            .collect::<Vec<_>>(),
    )
    .style(Style::default().fg(Color::Cyan));

    if rows.is_empty() && !browser.loader.is_loading() {
        let message = if browser.filter.is_active() {
            "No cities match the current filters"
        } else {
            "No cities found"
        };
        let table = Table::new(vec![Row::new(vec![Cell::from(message)])], WIDTHS)
            .column_spacing(COLUMN_SPACING)
            .flex(Flex::Start)
            .header(header)
            .block(block)
            .style(Style::default().fg(Color::Gray));
        frame.render_widget(table, area);
        return;
    }

    let table_rows: Vec<Row> = rows
        .iter()
        .map(|city| {
            Row::new(vec![
                Cell::from(city.name.as_str()).style(Style::default().fg(Color::Blue)),
                Cell::from(city.country.as_str()),
                Cell::from(city.timezone.as_str()).style(Style::default().fg(Color::Gray)),
            ])
        })
        .collect();

    let table = Table::new(table_rows, WIDTHS)
        .column_spacing(COLUMN_SPACING)
        .flex(Flex::Start)
        .header(header)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = TableState::default();
    if !rows.is_empty() {
        state.select(Some(browser.selected));
    }

    frame.render_stateful_widget(table, area, &mut state);
}
