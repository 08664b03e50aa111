mod cities;
mod popup;
mod weather;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::app::{App, ScreenKind};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    match &app.current().kind {
        ScreenKind::Cities(browser) => cities::render(frame, browser, chunks[1]),
        ScreenKind::Weather(detail) => weather::render(frame, detail, chunks[1]),
    }

    render_status_bar(frame, app, chunks[2]);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        "cityscope",
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    for (i, view) in app.views.iter().enumerate() {
        let label = format!(" [{}] {} ", i + 1, view.current().route);
        let style = if i == app.active {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(label, style));
    }

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let screen = app.current();
    let loader_error = match &screen.kind {
        ScreenKind::Cities(browser) => browser.loader.last_error(),
        ScreenKind::Weather(_) => None,
    };

    let status = if let Some(error) = &app.error {
        Line::from(vec![Span::styled(
            format!("Error: {}", error),
            Style::default().fg(Color::Red),
        )])
    } else if let Some(error) = loader_error {
        Line::from(vec![Span::styled(
            format!("Error loading cities: {} (r: retry)", error),
            Style::default().fg(Color::Red),
        )])
    } else if let Some(notice) = &app.notice {
        Line::from(vec![Span::styled(
            notice.clone(),
            Style::default().fg(Color::Green),
        )])
    } else {
        let help = match &screen.kind {
            ScreenKind::Cities(browser) if browser.search_mode => {
                "type to search | Backspace: delete | Enter/Esc: done"
            }
            ScreenKind::Cities(browser) if browser.dropdowns.focused().is_some() => {
                "j/k: choose | Enter: apply filter | !/@/#: toggle picker"
            }
            ScreenKind::Cities(_) => {
                "/: search | 1/2/3: sort | !/@/#: filter | Enter: weather | o: new view | y: yank | q: back"
            }
            ScreenKind::Weather(_) => "r: refresh | b: open in browser | y: yank | Tab: views | q: back",
        };
        Line::from(vec![Span::styled(help, Style::default().fg(Color::Gray))])
    };

    let status_bar = Paragraph::new(status).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status_bar, area);
}
