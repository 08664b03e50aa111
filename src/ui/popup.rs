use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};
use ratatui::Frame;

/// Render a selectable list popup anchored below `anchor` (a column header
/// cell), clipped to `bounds`
pub fn render_select(
    frame: &mut Frame,
    title: &str,
    items: &[String],
    selected: usize,
    anchor: Rect,
    bounds: Rect,
) {
    let height = (items.len() + 2).min(14) as u16; // +2 for borders
    let area = dropdown_rect(anchor, height, bounds);
    frame.render_widget(Clear, area);

    let list_items: Vec<ListItem> = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let style = if i == selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else if i == 0 {
                Style::default().fg(Color::Gray)
            } else {
                Style::default()
            };
            let prefix = if i == selected { "> " } else { "  " };
            ListItem::new(Line::from(Span::styled(
                format!("{}{}", prefix, item),
                style,
            )))
        })
        .collect();

    let list = List::new(list_items).block(
        Block::default().borders(Borders::ALL).title(Span::styled(
            format!(" {} ", title),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
    );

    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Rect of `height` rows directly under `anchor`, at least 24 columns wide,
/// kept inside `bounds`
fn dropdown_rect(anchor: Rect, height: u16, bounds: Rect) -> Rect {
    let width = anchor.width.max(24).min(bounds.width);
    let x = anchor.x.min(bounds.right().saturating_sub(width));
    let y = anchor.bottom().min(bounds.bottom());
    let height = height.min(bounds.bottom().saturating_sub(y));
    Rect::new(x, y, width, height)
}

/// Create a centered rect of the given size inside `outer`
pub fn centered_rect(width: u16, height: u16, outer: Rect) -> Rect {
    let popup_width = width.min(outer.width);
    let popup_height = height.min(outer.height);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((outer.height.saturating_sub(popup_height)) / 2),
            Constraint::Length(popup_height),
            Constraint::Min(0),
        ])
        .split(outer);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((outer.width.saturating_sub(popup_width)) / 2),
            Constraint::Length(popup_width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropdown_sits_under_anchor() {
        let bounds = Rect::new(0, 0, 100, 40);
        let anchor = Rect::new(30, 3, 30, 1);
        assert_eq!(dropdown_rect(anchor, 10, bounds), Rect::new(30, 4, 30, 10));
    }

    #[test]
    fn dropdown_is_kept_inside_bounds() {
        let bounds = Rect::new(0, 0, 80, 20);
        let anchor = Rect::new(70, 15, 10, 1);
        let rect = dropdown_rect(anchor, 12, bounds);
        assert_eq!(rect, Rect::new(56, 16, 24, 4));
    }

    #[test]
    fn centered_rect_is_clamped() {
        let outer = Rect::new(0, 0, 20, 10);
        let rect = centered_rect(40, 4, outer);
        assert_eq!(rect, Rect::new(0, 3, 20, 4));
    }
}
