use ratatui::layout::{Constraint, Direction, Layout, Rect};

const STATUS_HEIGHT: u16 = 1;
const MAX_TOASTS: u16 = 5;

#[derive(Debug, Clone, Copy)]
pub struct ScreenLayout {
    pub body: Rect,
    pub toasts: Rect,
    pub status: Rect,
}

impl ScreenLayout {
    /// Splits the frame into body, a toast strip sized to `toast_count`
    /// (bordered, capped), and a one-line status bar.
    pub fn calculate(area: Rect, toast_count: usize) -> Self {
        let toast_height = if toast_count == 0 {
            0
        } else {
            (toast_count as u16).min(MAX_TOASTS) + 2
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(toast_height),
                Constraint::Length(STATUS_HEIGHT),
            ])
            .split(area);

        Self {
            body: chunks[0],
            toasts: chunks[1],
            status: chunks[2],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_strip_collapses_when_empty() {
        let layout = ScreenLayout::calculate(Rect::new(0, 0, 80, 24), 0);
        assert_eq!(layout.toasts.height, 0);
        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.body.height, 23);
    }

    #[test]
    fn toast_strip_is_capped() {
        let layout = ScreenLayout::calculate(Rect::new(0, 0, 80, 24), 12);
        assert_eq!(layout.toasts.height, 7);
    }
}
