use chrono::Local;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use crate::detail::{condition_icon, WeatherDetail, FORECAST_CARDS};
use crate::types::{CurrentWeather, ForecastEntry};

use super::popup::centered_rect;

pub fn render(frame: &mut Frame, detail: &WeatherDetail, area: Rect) {
    let Some(city) = detail.city() else {
        render_message(frame, area, "No city selected", Color::Gray);
        return;
    };

    if let Some(error) = detail.error() {
        render_message(frame, area, error, Color::Red);
        return;
    }

    let Some(current) = detail.current() else {
        let text = if detail.is_loading() {
            format!("Loading weather for {}...", city)
        } else {
            format!("No weather data for {}", city)
        };
        render_message(frame, area, &text, Color::Yellow);
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(9), Constraint::Min(0)])
        .split(area);

    render_current(frame, city, current, chunks[0]);
    render_forecast(frame, detail.forecast_cards(), chunks[1]);
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let rect = centered_rect(60, 5, area);
    let paragraph = Paragraph::new(vec![Line::from(""), Line::from(message)])
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL).title(" Weather "));
    frame.render_widget(paragraph, rect);
}

fn render_current(frame: &mut Frame, city: &str, current: &CurrentWeather, area: Rect) {
    let (label, description) = current
        .primary_condition()
        .map(|c| (c.main.as_str(), c.description.as_str()))
        .unwrap_or(("", "unknown"));

    let lines = vec![
        Line::from(vec![
            Span::styled(
                city.to_string(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                Local::now().format("%Y-%m-%d").to_string(),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("{:.1}°C", current.temperature),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::raw(condition_icon(label)),
            Span::raw(" "),
            Span::raw(description.to_string()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Humidity: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{}%", current.humidity)),
            Span::raw(" | "),
            Span::styled("Wind: ", Style::default().fg(Color::Gray)),
            Span::raw(format!("{:.1} m/s", current.wind_speed)),
        ]),
    ];

    let title = if current.location.is_empty() || current.location == city {
        " Current Weather ".to_string()
    } else {
        format!(" Current Weather · {} ", current.location)
    };

    let paragraph =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);
}

fn render_forecast(frame: &mut Frame, entries: &[ForecastEntry], area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" 5-Day Forecast ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if entries.is_empty() {
        let empty = Paragraph::new("No forecast available").style(Style::default().fg(Color::Gray));
        frame.render_widget(empty, inner);
        return;
    }

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, FORECAST_CARDS as u32); FORECAST_CARDS])
        .split(inner);

    for (entry, rect) in entries.iter().zip(cards.iter()) {
        render_card(frame, entry, *rect);
    }
}

fn render_card(frame: &mut Frame, entry: &ForecastEntry, area: Rect) {
    let (label, description) = entry
        .primary_condition()
        .map(|c| (c.main.as_str(), c.description.as_str()))
        .unwrap_or(("", ""));
    let time = entry.time.with_timezone(&Local);

    let lines = vec![
        Line::from(Span::styled(
            time.format("%Y-%m-%d").to_string(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            time.format("%H:%M").to_string(),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(condition_icon(label)),
        Line::from(Span::styled(
            format!("{:.1}°C", entry.temperature),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(description.to_string()),
    ];

    let card = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(card, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detail::{WeatherFailure, NOT_FOUND_MESSAGE};
    use crate::types::{Condition, Forecast};
    use chrono::{TimeZone, Utc};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen_text(detail: &WeatherDetail) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal
            .draw(|frame| render(frame, detail, frame.area()))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn not_found_renders_message_without_temperature() {
        let mut detail = WeatherDetail::new(Some("Atlantis".to_string()));
        let (id, _) = detail.begin_load().unwrap();
        detail.apply(id, Err(WeatherFailure::NotFound));
        let text = screen_text(&detail);
        assert!(text.contains("City not found"));
        assert!(!text.contains("°C"));
        assert!(NOT_FOUND_MESSAGE.starts_with("City not found"));
    }

    #[test]
    fn success_renders_current_and_cards() {
        let mut detail = WeatherDetail::new(Some("Tokyo".to_string()));
        let (id, _) = detail.begin_load().unwrap();
        let current = CurrentWeather {
            city_id: None,
            location: "Tokyo".to_string(),
            temperature: 21.34,
            humidity: 40,
            wind_speed: 5.0,
            conditions: vec![Condition {
                main: "Clear".to_string(),
                description: "clear sky".to_string(),
            }],
        };
        let forecast = Forecast {
            entries: (0..8)
                .map(|i| ForecastEntry {
                    time: Utc.timestamp_opt(1_700_000_000 + i * 10_800, 0).unwrap(),
                    temperature: 10.0 + i as f64,
                    humidity: 40,
                    wind_speed: 1.0,
                    conditions: vec![],
                })
                .collect(),
        };
        detail.apply(id, Ok((current, forecast)));

        let text = screen_text(&detail);
        assert!(text.contains("21.3°C"));
        assert!(text.contains("Humidity: 40%"));
        assert!(text.contains("14.0°C"));
        assert!(!text.contains("15.0°C"));
    }
}
