use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Screen regions while a round is on.
pub struct GameLayout {
    pub header: Rect,
    pub progress: Option<Rect>,
    pub lane: Rect,
    pub choices: Rect,
    pub footer: Rect,
}

impl GameLayout {
    pub fn new(area: Rect) -> Self {
        // Drop the progress bar first when the terminal is short.
        let show_progress = area.height >= 20;
        let mut constraints = vec![Constraint::Length(1)];
        if show_progress {
            constraints.push(Constraint::Length(3));
        }
        constraints.extend([
            Constraint::Min(6),
            Constraint::Length(5),
            Constraint::Length(1),
        ]);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        if show_progress {
            Self {
                header: rows[0],
                progress: Some(rows[1]),
                lane: rows[2],
                choices: rows[3],
                footer: rows[4],
            }
        } else {
            Self {
                header: rows[0],
                progress: None,
                lane: rows[1],
                choices: rows[2],
                footer: rows[3],
            }
        }
    }
}

pub fn pack_hint_lines(hints: &[&str], width: usize) -> Vec<String> {
    if width == 0 || hints.is_empty() {
        return Vec::new();
    }

    let prefix = " ";
    let separator = "  ";
    let mut out: Vec<String> = Vec::new();
    let mut current = prefix.to_string();
    let mut has_hint = false;

    for hint in hints.iter().filter(|h| !h.is_empty()) {
        let candidate = if has_hint {
            format!("{current}{separator}{hint}")
        } else {
            format!("{current}{hint}")
        };
        if candidate.chars().count() <= width || !has_hint {
            current = candidate;
        } else {
            out.push(current);
            current = format!("{prefix}{hint}");
        }
        has_hint = true;
    }

    if has_hint {
        out.push(current);
    }
    out
}

pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let left = area.x.saturating_add((area.width - w) / 2);
    let top = area.y.saturating_add((area.height - h) / 2);
    Rect::new(left, top, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_terminals_lose_the_progress_bar() {
        let tall = GameLayout::new(Rect::new(0, 0, 80, 30));
        assert!(tall.progress.is_some());
        let short = GameLayout::new(Rect::new(0, 0, 80, 15));
        assert!(short.progress.is_none());
        assert!(short.lane.height >= 6);
    }

    #[test]
    fn hints_wrap_to_width() {
        let lines = pack_hint_lines(&["[1-3] Answer", "[Esc] Quit", "[r] Retry"], 26);
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.chars().count() <= 26));
    }

    #[test]
    fn centered_rect_fits_inside_area() {
        let area = Rect::new(10, 5, 40, 10);
        let r = centered_rect(60, 4, area);
        assert_eq!(r.width, 40);
        assert_eq!(r.height, 4);
        assert_eq!(r.y, 8);
    }
}
