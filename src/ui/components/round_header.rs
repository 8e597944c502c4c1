use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};

use yomifall::quiz::clock::format_elapsed;

use crate::ui::theme::Theme;

/// One-line status strip: set, direction, timer, solved count and lives.
pub struct RoundHeader<'a> {
    pub set_label: &'a str,
    pub direction: &'a str,
    pub elapsed_ms: u64,
    pub solved: usize,
    pub goal: usize,
    pub lives: u32,
    pub lives_max: u32,
    pub theme: &'a Theme,
}

pub fn hearts(lives: u32, lives_max: u32) -> (String, String) {
    let full = lives.min(lives_max) as usize;
    let empty = lives_max.saturating_sub(lives) as usize;
    ("♥".repeat(full), "♡".repeat(empty))
}

impl Widget for RoundHeader<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        let base = Style::default().bg(colors.header_bg());
        let (full, empty) = hearts(self.lives, self.lives_max);

        let line = Line::from(vec![
            Span::styled(
                " yomifall ",
                base.fg(colors.header_fg()).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "| {} | {} | {} | {}/{} ",
                    self.set_label,
                    self.direction,
                    format_elapsed(self.elapsed_ms),
                    self.solved,
                    self.goal
                ),
                base.fg(colors.header_fg()),
            ),
            Span::styled(full, base.fg(colors.heart())),
            Span::styled(empty, base.fg(colors.heart_empty())),
        ]);

        Paragraph::new(line).style(base).render(area, buf);
    }
}
