use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

/// Row of answer buttons, picked with the number keys.
pub struct ChoiceBar<'a> {
    labels: &'a [String],
    enabled: bool,
    theme: &'a Theme,
}

impl<'a> ChoiceBar<'a> {
    pub fn new(labels: &'a [String], enabled: bool, theme: &'a Theme) -> Self {
        Self {
            labels,
            enabled,
            theme,
        }
    }
}

impl Widget for ChoiceBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        if self.labels.is_empty() {
            let block = Block::bordered().border_style(Style::default().fg(colors.border()));
            block.render(area, buf);
            return;
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(
                self.labels
                    .iter()
                    .map(|_| Constraint::Ratio(1, self.labels.len() as u32))
                    .collect::<Vec<_>>(),
            )
            .split(area);

        let border = if self.enabled {
            colors.border_focused()
        } else {
            colors.border()
        };
        let text = if self.enabled {
            colors.fg()
        } else {
            colors.accent_dim()
        };

        for (i, label) in self.labels.iter().enumerate() {
            let block = Block::bordered()
                .title(format!(" {} ", i + 1))
                .border_style(Style::default().fg(border));
            let inner = block.inner(cols[i]);
            block.render(cols[i], buf);

            let line = Line::from(Span::styled(
                label.as_str(),
                Style::default().fg(text).add_modifier(Modifier::BOLD),
            ));
            Paragraph::new(line)
                .alignment(ratatui::layout::Alignment::Center)
                .render(inner, buf);
        }
    }
}
