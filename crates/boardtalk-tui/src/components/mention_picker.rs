use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

use crate::mention::MentionEngine;

const MAX_VISIBLE: u16 = 6;
const WIDTH: u16 = 32;

/// Approximate line/column of the trigger inside the input text: newlines
/// before it count as rows, chars since the last newline as the column. Good
/// enough to anchor the popup near the "@"; not exact for wrapped lines, by
/// design.
pub fn anchor(text: &str, trigger: usize) -> (u16, u16) {
    let before = &text[..trigger.min(text.len())];
    let line = before.matches('\n').count() as u16;
    let column = before
        .rsplit_once('\n')
        .map(|(_, tail)| tail)
        .unwrap_or(before)
        .chars()
        .count() as u16;
    (line, column)
}

/// Popup placement: horizontally at the trigger's column inside the input
/// box, vertically stacked above it, clamped to the frame.
pub fn popup_rect(input_area: Rect, frame_area: Rect, text: &str, trigger: usize, rows: u16) -> Rect {
    let (_, column) = anchor(text, trigger);
    let height = rows.min(MAX_VISIBLE) + 2;
    let width = WIDTH.min(frame_area.width);
    let x = (input_area.x + 1 + column).min(frame_area.right().saturating_sub(width));
    let y = input_area.y.saturating_sub(height);
    Rect {
        x,
        y,
        width,
        height: height.min(frame_area.height),
    }
}

pub fn render(frame: &mut Frame, engine: &MentionEngine, input_area: Rect, text: &str) {
    let suggestions = engine.suggestions();
    let (Some(trigger), false) = (engine.trigger_offset(), suggestions.is_empty()) else {
        return;
    };

    let area = popup_rect(input_area, frame.area(), text, trigger, suggestions.len() as u16);
    frame.render_widget(Clear, area);

    let items: Vec<ListItem> = suggestions
        .iter()
        .map(|identity| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("@{}", identity.handle),
                    Style::default().fg(Color::Cyan).bold(),
                ),
                Span::styled(
                    format!("  {}", identity.display_name),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(" Mention ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        )
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan));

    let mut state = ListState::default();
    state.select(engine.selected_index());
    frame.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_on_first_line() {
        assert_eq!(anchor("hi @al", 3), (0, 3));
    }

    #[test]
    fn anchor_counts_newlines_and_column_after_last() {
        let text = "first line\nsecond @bo";
        let trigger = text.find('@').unwrap();
        assert_eq!(anchor(text, trigger), (1, 7));
    }

    #[test]
    fn anchor_at_start() {
        assert_eq!(anchor("@x", 0), (0, 0));
    }

    #[test]
    fn anchor_counts_chars_not_bytes() {
        let text = "héé @a";
        let trigger = text.find('@').unwrap();
        assert_eq!(anchor(text, trigger), (0, 4));
    }

    #[test]
    fn popup_sits_above_the_input_at_the_trigger_column() {
        let frame = Rect::new(0, 0, 80, 24);
        let input = Rect::new(0, 21, 80, 3);
        let rect = popup_rect(input, frame, "hi @al", 3, 2);
        assert_eq!(rect.x, 4); // input x + border + column
        assert_eq!(rect.bottom(), input.y);
    }

    #[test]
    fn popup_clamps_to_frame_edge() {
        let frame = Rect::new(0, 0, 40, 24);
        let input = Rect::new(0, 21, 40, 3);
        let long = "a".repeat(38) + "@x";
        let rect = popup_rect(input, frame, &long, 38, 1);
        assert!(rect.right() <= frame.right());
    }
}
