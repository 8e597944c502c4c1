use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, Cell, Paragraph, Row, Table, Widget};

use yomifall::quiz::clock::format_elapsed;
use yomifall::store::schema::HistoryRecord;

use crate::ui::theme::Theme;

/// Best-times table. `highlight` is a 1-based rank to emphasise.
pub struct RankingTable<'a> {
    records: &'a [HistoryRecord],
    highlight: Option<usize>,
    theme: &'a Theme,
}

impl<'a> RankingTable<'a> {
    pub fn new(records: &'a [HistoryRecord], theme: &'a Theme) -> Self {
        Self {
            records,
            highlight: None,
            theme,
        }
    }

    pub fn highlight(mut self, rank: Option<usize>) -> Self {
        self.highlight = rank;
        self
    }
}

impl Widget for RankingTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Best times ")
            .border_style(Style::default().fg(colors.accent()));

        if self.records.is_empty() {
            Paragraph::new("  No finished rounds yet.")
                .style(Style::default().fg(colors.accent_dim()))
                .block(block)
                .render(area, buf);
            return;
        }

        let header = Row::new(["#", "Date", "Mode", "Set", "Time"])
            .style(Style::default().fg(colors.accent()).add_modifier(Modifier::BOLD));

        let rows: Vec<Row> = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let rank = i + 1;
                let style = if Some(rank) == self.highlight {
                    Style::default()
                        .fg(colors.success())
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(colors.fg())
                };
                Row::new(vec![
                    Cell::from(format!("{rank:>2}")),
                    Cell::from(r.date.clone()),
                    Cell::from(r.mode.label()),
                    Cell::from(r.set_label.clone()),
                    Cell::from(format_elapsed(r.elapsed_ms)),
                ])
                .style(style)
            })
            .collect();

        Table::new(
            rows,
            [
                Constraint::Length(3),
                Constraint::Length(11),
                Constraint::Length(12),
                Constraint::Min(10),
                Constraint::Length(6),
            ],
        )
        .header(header)
        .block(block)
        .render(area, buf);
    }
}
