use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Widget};

use yomifall::quiz::resolver::Outcome;

use crate::ui::theme::Theme;

/// What the lane shows between questions.
pub struct Flash<'a> {
    pub outcome: Outcome,
    pub shown: &'a str,
    pub answer: &'a str,
}

/// The column a question falls down. The bottom row is the deadline.
pub struct FallLane<'a> {
    shown: Option<&'a str>,
    progress: f64,
    flash: Option<Flash<'a>>,
    theme: &'a Theme,
}

impl<'a> FallLane<'a> {
    pub fn new(shown: Option<&'a str>, progress: f64, theme: &'a Theme) -> Self {
        Self {
            shown,
            progress,
            flash: None,
            theme,
        }
    }

    pub fn flash(mut self, flash: Option<Flash<'a>>) -> Self {
        self.flash = flash;
        self
    }
}

/// Row offset of the falling text inside a lane with `rows` usable rows.
pub fn fall_row(progress: f64, rows: u16) -> u16 {
    if rows == 0 {
        return 0;
    }
    let max = rows - 1;
    ((progress.clamp(0.0, 1.0) * max as f64).round() as u16).min(max)
}

fn display_width(text: &str) -> u16 {
    // CJK glyphs take two cells.
    text.chars()
        .map(|c| if c.is_ascii() { 1 } else { 2 })
        .sum::<u16>()
}

impl Widget for FallLane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height < 2 || inner.width == 0 {
            return;
        }

        let deadline_y = inner.y + inner.height - 1;
        let rule = "─".repeat(inner.width as usize);
        buf.set_string(
            inner.x,
            deadline_y,
            &rule,
            Style::default().fg(colors.deadline()),
        );

        let fall_rows = inner.height - 1;
        let centered_x = |text: &str| {
            inner.x + inner.width.saturating_sub(display_width(text)) / 2
        };

        if let Some(shown) = self.shown {
            let y = inner.y + fall_row(self.progress, fall_rows);
            buf.set_string(
                centered_x(shown),
                y,
                shown,
                Style::default()
                    .fg(colors.falling())
                    .add_modifier(Modifier::BOLD),
            );
            return;
        }

        if let Some(flash) = self.flash {
            let (mark, color) = match flash.outcome {
                Outcome::Correct => ("○", colors.correct()),
                Outcome::Incorrect => ("×", colors.incorrect()),
            };
            let mid = inner.y + fall_rows / 2;
            let headline = format!("{mark} {}", flash.shown);
            buf.set_string(
                centered_x(&headline),
                mid.saturating_sub(1).max(inner.y),
                &headline,
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            );
            if mid < deadline_y {
                buf.set_string(
                    centered_x(flash.answer),
                    mid,
                    flash.answer,
                    Style::default().fg(colors.fg()),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fall_row_spans_the_lane() {
        assert_eq!(fall_row(0.0, 10), 0);
        assert_eq!(fall_row(0.5, 11), 5);
        assert_eq!(fall_row(1.0, 10), 9);
        assert_eq!(fall_row(3.0, 10), 9);
        assert_eq!(fall_row(0.4, 0), 0);
    }

    #[test]
    fn wide_glyphs_count_double() {
        assert_eq!(display_width("やま"), 4);
        assert_eq!(display_width("ab"), 2);
    }

    #[test]
    fn renders_word_and_deadline() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 12, 8);
        let mut buf = Buffer::empty(area);
        FallLane::new(Some("山"), 0.0, &theme).render(area, &mut buf);
        assert_eq!(buf[(5, 1)].symbol(), "山");
        assert_eq!(buf[(1, 6)].symbol(), "─");
    }
}
