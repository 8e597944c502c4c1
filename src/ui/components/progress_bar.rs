use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Solved-so-far gauge, labelled `solved / goal`.
pub struct ProgressBar<'a> {
    pub solved: usize,
    pub goal: usize,
    pub theme: &'a Theme,
}

impl<'a> ProgressBar<'a> {
    pub fn new(solved: usize, goal: usize, theme: &'a Theme) -> Self {
        Self {
            solved,
            goal,
            theme,
        }
    }

    pub fn ratio(&self) -> f64 {
        if self.goal == 0 {
            return 0.0;
        }
        (self.solved as f64 / self.goal as f64).clamp(0.0, 1.0)
    }
}

impl Widget for ProgressBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Solved ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let filled_width = (self.ratio() * inner.width as f64) as u16;
        let label = format!("{} / {}", self.solved, self.goal);

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(colors.bar_filled())
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_handles_empty_goal() {
        let theme = Theme::default();
        assert_eq!(ProgressBar::new(0, 0, &theme).ratio(), 0.0);
        assert_eq!(ProgressBar::new(3, 4, &theme).ratio(), 0.75);
    }
}
