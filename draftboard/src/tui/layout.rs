// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +-------------------------------+------------------+
// | Board (68%)                   | Detail (32%)     |
// |                               |                  |
// +-------------------------------+------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Counts, filter, sort, search, metrics, updated time.
    pub status_bar: Rect,
    /// Player table.
    pub board: Rect,
    /// Selected player's details.
    pub detail: Rect,
    /// Keyboard shortcut hints.
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(6),    // board + detail
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
        .split(vertical[1]);

    AppLayout {
        status_bar: vertical[0],
        board: horizontal[0],
        detail: horizontal[1],
        help_bar: vertical[2],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_area() -> Rect {
        Rect::new(0, 0, 160, 50)
    }

    fn all_rects(layout: &AppLayout) -> [Rect; 4] {
        [layout.status_bar, layout.board, layout.detail, layout.help_bar]
    }

    #[test]
    fn layout_all_rects_nonzero() {
        let layout = build_layout(test_area());
        for rect in all_rects(&layout) {
            assert!(rect.width > 0 && rect.height > 0, "zero area: {:?}", rect);
        }
    }

    #[test]
    fn layout_bars_are_one_row() {
        let layout = build_layout(test_area());
        assert_eq!(layout.status_bar.height, 1);
        assert_eq!(layout.help_bar.height, 1);
    }

    #[test]
    fn layout_board_wider_than_detail() {
        let layout = build_layout(test_area());
        assert!(layout.board.width > layout.detail.width);
        assert_eq!(layout.board.y, layout.detail.y);
    }

    #[test]
    fn layout_fits_within_area() {
        let area = test_area();
        let layout = build_layout(area);
        for rect in all_rects(&layout) {
            assert!(rect.x + rect.width <= area.width, "{:?} too wide", rect);
            assert!(rect.y + rect.height <= area.height, "{:?} too tall", rect);
        }
    }

    #[test]
    fn layout_small_terminal_still_valid() {
        let layout = build_layout(Rect::new(0, 0, 40, 10));
        for rect in all_rects(&layout) {
            assert!(rect.width > 0 && rect.height > 0, "small terminal: {:?}", rect);
        }
    }
}
