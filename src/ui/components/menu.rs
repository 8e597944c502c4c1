use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuItem {
    Set,
    Quantity,
    Direction,
    Difficulty,
    Start,
    History,
    Quit,
}

pub const MENU_ITEMS: [MenuItem; 7] = [
    MenuItem::Set,
    MenuItem::Quantity,
    MenuItem::Direction,
    MenuItem::Difficulty,
    MenuItem::Start,
    MenuItem::History,
    MenuItem::Quit,
];

impl MenuItem {
    fn label(self) -> &'static str {
        match self {
            MenuItem::Set => "Question set",
            MenuItem::Quantity => "Questions",
            MenuItem::Direction => "Direction",
            MenuItem::Difficulty => "Speed",
            MenuItem::Start => "Start",
            MenuItem::History => "Best times",
            MenuItem::Quit => "Quit",
        }
    }

    pub fn is_option(self) -> bool {
        matches!(
            self,
            MenuItem::Set | MenuItem::Quantity | MenuItem::Direction | MenuItem::Difficulty
        )
    }
}

/// Current option values, refreshed by the app whenever one changes.
#[derive(Clone, Debug, Default)]
pub struct MenuValues {
    pub set_label: String,
    pub quantity: String,
    pub direction: String,
    pub difficulty: u8,
}

pub struct Menu<'a> {
    pub selected: usize,
    pub values: MenuValues,
    pub theme: &'a Theme,
}

impl<'a> Menu<'a> {
    pub fn new(theme: &'a Theme, values: MenuValues) -> Self {
        Self {
            selected: MENU_ITEMS
                .iter()
                .position(|i| *i == MenuItem::Start)
                .unwrap_or(0),
            values,
            theme,
        }
    }

    pub fn current(&self) -> MenuItem {
        MENU_ITEMS[self.selected]
    }

    pub fn next(&mut self) {
        self.selected = (self.selected + 1) % MENU_ITEMS.len();
    }

    pub fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        } else {
            self.selected = MENU_ITEMS.len() - 1;
        }
    }

    fn value_of(&self, item: MenuItem) -> Option<String> {
        match item {
            MenuItem::Set => Some(self.values.set_label.clone()),
            MenuItem::Quantity => Some(self.values.quantity.clone()),
            MenuItem::Direction => Some(self.values.direction.clone()),
            MenuItem::Difficulty => {
                let level = self.values.difficulty as usize;
                Some(format!("{}{} {}", "●".repeat(level), "○".repeat(5 - level.min(5)), level))
            }
            _ => None,
        }
    }
}

impl Widget for &Menu<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .border_style(Style::default().fg(colors.border()))
            .style(Style::default().bg(colors.bg()));
        let inner = block.inner(area);
        block.render(area, buf);

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        let title_lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "yomifall",
                Style::default()
                    .fg(colors.accent())
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "Catch the falling kanji",
                Style::default().fg(colors.fg()),
            )),
        ];
        Paragraph::new(title_lines)
            .alignment(Alignment::Center)
            .render(layout[0], buf);

        let lines: Vec<Line> = MENU_ITEMS
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let is_selected = i == self.selected;
                let indicator = if is_selected { ">" } else { " " };
                let style = Style::default()
                    .fg(if is_selected { colors.accent() } else { colors.fg() })
                    .add_modifier(if is_selected {
                        Modifier::BOLD
                    } else {
                        Modifier::empty()
                    });
                let mut spans = vec![Span::styled(
                    format!(" {indicator} {:<14}", item.label()),
                    style,
                )];
                if let Some(value) = self.value_of(*item) {
                    let arrows = if is_selected { "◂ " } else { "  " };
                    spans.push(Span::styled(
                        format!("{arrows}{value}"),
                        Style::default().fg(colors.falling()),
                    ));
                    if is_selected {
                        spans.push(Span::styled(" ▸", Style::default().fg(colors.falling())));
                    }
                }
                Line::from(spans)
            })
            .collect();

        Paragraph::new(lines).render(layout[2], buf);
    }
}
