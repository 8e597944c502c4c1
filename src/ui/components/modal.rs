use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::ui::theme::Theme;

/// Centered dialog. With `with_cancel` it offers yes/no, otherwise it is a
/// notice dismissed by any key.
pub struct Modal<'a> {
    message: &'a str,
    with_cancel: bool,
    theme: &'a Theme,
}

impl<'a> Modal<'a> {
    pub fn new(message: &'a str, with_cancel: bool, theme: &'a Theme) -> Self {
        Self {
            message,
            with_cancel,
            theme,
        }
    }
}

impl Widget for Modal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;
        Clear.render(area, buf);

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.warning()))
            .style(Style::default().bg(colors.bg()));

        let hint = if self.with_cancel {
            "[y/Enter] Yes   [n/Esc] No"
        } else {
            "Press any key"
        };
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.message,
                Style::default().fg(colors.fg()).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(hint, Style::default().fg(colors.accent()))),
        ];

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block)
            .render(area, buf);
    }
}
