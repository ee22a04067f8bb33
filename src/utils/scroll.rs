use crate::core::transcript::{Role, Turn};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Handles all scroll-related calculations and line building
pub struct ScrollCalculator;

impl ScrollCalculator {
    /// Build display lines for the transcript. The leading system prompt is
    /// part of the conversation payload but never shown.
    pub fn build_display_lines(turns: &[Turn]) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        for turn in turns {
            Self::add_turn_lines(&mut lines, turn);
        }

        lines
    }

    /// Add lines for a single turn to the lines vector
    fn add_turn_lines(lines: &mut Vec<Line<'static>>, turn: &Turn) {
        match turn.role {
            Role::System => {}
            Role::User => {
                lines.push(Line::from(vec![
                    Span::styled(
                        "You: ",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(turn.content.clone(), Style::default().fg(Color::Cyan)),
                ]));
                lines.push(Line::from("")); // Empty line for spacing
            }
            Role::Notice => {
                lines.push(Line::from(Span::styled(
                    turn.content.clone(),
                    Style::default().fg(Color::DarkGray),
                )));
                lines.push(Line::from("")); // Empty line for spacing
            }
            Role::Assistant => {
                if turn.content.is_empty() {
                    return;
                }
                // Split content into lines for proper wrapping
                for content_line in turn.content.lines() {
                    if content_line.trim().is_empty() {
                        lines.push(Line::from(""));
                    } else {
                        lines.push(Line::from(Span::styled(
                            content_line.to_string(),
                            Style::default().fg(Color::White),
                        )));
                    }
                }
                lines.push(Line::from("")); // Empty line for spacing
            }
        }
    }

    /// Calculate how many wrapped lines the given lines will take
    pub fn calculate_wrapped_line_count(lines: &[Line], terminal_width: u16) -> u16 {
        let mut total_wrapped_lines = 0u16;

        for line in lines {
            let line_text = line.to_string();
            // Trim whitespace to match ratatui's Wrap { trim: true } behavior
            let trimmed_text = line_text.trim();

            if trimmed_text.is_empty() || terminal_width == 0 {
                total_wrapped_lines = total_wrapped_lines.saturating_add(1);
            } else {
                // Word-based wrapping to match ratatui's behavior
                let wrapped_count =
                    Self::calculate_word_wrapped_lines(trimmed_text, terminal_width);
                total_wrapped_lines = total_wrapped_lines.saturating_add(wrapped_count);
            }
        }

        total_wrapped_lines
    }

    /// Calculate how many lines a single text string will wrap to
    fn calculate_word_wrapped_lines(text: &str, terminal_width: u16) -> u16 {
        let mut current_line_len = 0;
        let mut line_count = 1u16;

        for word in text.split_whitespace() {
            let word_len = word.chars().count();

            // Start new line if adding this word would exceed width
            if current_line_len > 0 && current_line_len + 1 + word_len > terminal_width as usize {
                line_count = line_count.saturating_add(1);
                current_line_len = word_len;
            } else {
                if current_line_len > 0 {
                    current_line_len += 1; // Add space
                }
                current_line_len += word_len;
            }
        }

        line_count
    }

    /// Calculate scroll offset to show the bottom of the transcript
    pub fn calculate_scroll_to_bottom(
        turns: &[Turn],
        terminal_width: u16,
        available_height: u16,
    ) -> u16 {
        let lines = Self::build_display_lines(turns);
        let total_wrapped_lines = Self::calculate_wrapped_line_count(&lines, terminal_width);

        if total_wrapped_lines > available_height {
            total_wrapped_lines.saturating_sub(available_height)
        } else {
            0
        }
    }

    /// Calculate maximum scroll offset
    pub fn calculate_max_scroll_offset(
        turns: &[Turn],
        terminal_width: u16,
        available_height: u16,
    ) -> u16 {
        Self::calculate_scroll_to_bottom(turns, terminal_width, available_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_turns() -> Vec<Turn> {
        vec![
            Turn::system("You are a test assistant."),
            Turn::user("Hello"),
            Turn::assistant("Hi there!"),
            Turn::user("How are you?"),
            Turn::assistant("I'm doing well, thank you for asking!"),
        ]
    }

    #[test]
    fn test_build_display_lines_basic() {
        let turns = create_test_turns();
        let lines = ScrollCalculator::build_display_lines(&turns);

        // The system turn is hidden; the other four turns get 2 lines each
        // (content + empty spacing)
        assert_eq!(lines.len(), 8);

        // Check that user turns start with "You: "
        assert!(lines[0].to_string().starts_with("You: "));
        assert!(lines[4].to_string().starts_with("You: "));

        // Check that assistant turns don't have a prefix
        assert!(!lines[2].to_string().starts_with("You: "));
        assert!(!lines[6].to_string().starts_with("You: "));
    }

    #[test]
    fn test_system_turns_are_hidden() {
        let turns = vec![Turn::system("You are a test assistant."), Turn::user("Hello")];
        let lines = ScrollCalculator::build_display_lines(&turns);

        assert_eq!(lines.len(), 2);
        assert!(lines[0].to_string().starts_with("You: Hello"));
    }

    #[test]
    fn test_notice_turns_render_dim() {
        let turns = vec![Turn::notice("Response cancelled.")];
        let lines = ScrollCalculator::build_display_lines(&turns);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].to_string(), "Response cancelled.");
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::DarkGray));
    }

    #[test]
    fn test_empty_assistant_turn_adds_no_lines() {
        let turns = vec![Turn::assistant("")];
        let lines = ScrollCalculator::build_display_lines(&turns);
        assert_eq!(lines.len(), 0);
    }

    #[test]
    fn test_multiline_assistant_turn() {
        let turns = vec![Turn::assistant("Line 1\nLine 2\n\nLine 4")];
        let lines = ScrollCalculator::build_display_lines(&turns);
        // Line 1, Line 2, empty line, Line 4, spacing
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn test_calculate_word_wrapped_lines_single_line() {
        let wrapped = ScrollCalculator::calculate_word_wrapped_lines("Hello world", 20);
        assert_eq!(wrapped, 1);
    }

    #[test]
    fn test_calculate_word_wrapped_lines_multiple_lines() {
        let text = "This is a very long sentence that will definitely need to wrap";
        let wrapped = ScrollCalculator::calculate_word_wrapped_lines(text, 20);
        assert!(wrapped > 1);
    }

    #[test]
    fn test_calculate_word_wrapped_lines_single_word_too_long() {
        // Single word longer than width still counts as 1 line
        let wrapped = ScrollCalculator::calculate_word_wrapped_lines(
            "supercalifragilisticexpialidocious",
            10,
        );
        assert_eq!(wrapped, 1);
    }

    #[test]
    fn test_calculate_wrapped_line_count_mixed_content() {
        let lines = vec![
            Line::from("Short line"),
            Line::from(""),
            Line::from("This is a much longer line that might wrap depending on terminal width"),
            Line::from("Another short one"),
        ];

        // With wide terminal, should not wrap
        let count_wide = ScrollCalculator::calculate_wrapped_line_count(&lines, 100);
        assert_eq!(count_wide, 4);

        // With narrow terminal, long line should wrap
        let count_narrow = ScrollCalculator::calculate_wrapped_line_count(&lines, 20);
        assert!(count_narrow > 4);
    }

    #[test]
    fn test_calculate_wrapped_line_count_zero_width() {
        let lines = vec![Line::from("Any content")];
        let count = ScrollCalculator::calculate_wrapped_line_count(&lines, 0);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_calculate_scroll_to_bottom_no_scroll_needed() {
        let turns = create_test_turns();
        let scroll = ScrollCalculator::calculate_scroll_to_bottom(&turns, 80, 20);
        assert_eq!(scroll, 0);
    }

    #[test]
    fn test_calculate_scroll_to_bottom_scroll_needed() {
        let mut turns = vec![Turn::system("You are a test assistant.")];
        for i in 0..10 {
            turns.push(Turn::user(format!("Message {}", i)));
            turns.push(Turn::assistant(format!("Response {}", i)));
        }

        let scroll = ScrollCalculator::calculate_scroll_to_bottom(&turns, 80, 5);
        assert!(scroll > 0);
    }

    #[test]
    fn test_trimming_behavior() {
        let lines = vec![
            Line::from("  "),
            Line::from("   content   "),
            Line::from(""),
        ];

        let count = ScrollCalculator::calculate_wrapped_line_count(&lines, 80);
        // All should count as single lines due to trimming
        assert_eq!(count, 3);
    }
}
