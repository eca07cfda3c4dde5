//! Screen geometry, shared by the renderer and mouse hit-testing

use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

use crate::journey::{LAST_STAGE, STAGE_COUNT};

pub const MARKER_WIDTH: u16 = 5;
pub const MARKER_HEIGHT: u16 = 3;
const RAIL_PADDING: u16 = 2;
const PREVIOUS_WIDTH: u16 = 14;
const NEXT_WIDTH: u16 = 12;

/// Something clickable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    Marker(usize),
    Previous,
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JourneyLayout {
    pub header: Rect,
    pub track: Rect,
    pub markers: [Rect; STAGE_COUNT],
    pub tooltip_row: Rect,
    pub stage_panel: Rect,
    pub chat_panel: Rect,
    pub previous: Rect,
    pub next: Rect,
    pub footer: Rect,
}

impl JourneyLayout {
    pub fn new(area: Rect) -> Self {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),             // Brand header
                Constraint::Length(1),             // Spacer
                Constraint::Length(MARKER_HEIGHT), // Progress rail + markers
                Constraint::Length(1),             // Tooltip
                Constraint::Length(1),             // Spacer
                Constraint::Min(6),                // Stage + chat panels
                Constraint::Length(3),             // Previous / Next
                Constraint::Length(1),             // Footer
            ])
            .split(area);

        let rail = rows[2];
        let inner_x = rail.x + RAIL_PADDING.min(rail.width / 2);
        let inner_width = rail.width.saturating_sub(RAIL_PADDING * 2);
        let span = inner_width.saturating_sub(MARKER_WIDTH);

        let markers = std::array::from_fn(|i| {
            let offset = (span as usize * i / LAST_STAGE) as u16;
            Rect::new(
                inner_x + offset,
                rail.y,
                MARKER_WIDTH.min(inner_width),
                rail.height,
            )
        });

        // Track runs between the first and last marker centres
        let track = Rect::new(
            inner_x + MARKER_WIDTH / 2,
            rail.y + rail.height / 2,
            span.max(1).min(inner_width),
            rail.height.min(1),
        );

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .spacing(2)
            .split(rows[5]);

        let nav = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(PREVIOUS_WIDTH),
                Constraint::Min(0),
                Constraint::Length(NEXT_WIDTH),
            ])
            .split(rows[6]);

        Self {
            header: rows[0],
            track,
            markers,
            tooltip_row: rows[3],
            stage_panel: panels[0],
            chat_panel: panels[1],
            previous: nav[0],
            next: nav[2],
            footer: rows[7],
        }
    }

    /// What sits under the given terminal cell, if anything clickable
    pub fn hit(&self, column: u16, row: u16) -> Option<Hit> {
        let pos = Position::new(column, row);

        if let Some(i) = self.markers.iter().position(|m| m.contains(pos)) {
            return Some(Hit::Marker(i));
        }
        if self.previous.contains(pos) {
            return Some(Hit::Previous);
        }
        if self.next.contains(pos) {
            return Some(Hit::Next);
        }
        None
    }

    /// Where the tooltip for marker `index` goes, centred under it
    pub fn tooltip(&self, index: usize, text_width: u16) -> Rect {
        let marker = self.markers[index.min(LAST_STAGE)];
        let row = self.tooltip_row;
        let width = (text_width + 2).min(row.width);
        let centre = marker.x + marker.width / 2;
        let x = centre
            .saturating_sub(width / 2)
            .max(row.x)
            .min((row.x + row.width).saturating_sub(width));
        Rect::new(x, row.y, width, row.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> JourneyLayout {
        JourneyLayout::new(Rect::new(0, 0, 100, 40))
    }

    #[test]
    fn test_markers_span_the_rail_in_order() {
        let l = layout();
        assert_eq!(l.markers[0].x, 2);
        assert_eq!(l.markers[LAST_STAGE].x + MARKER_WIDTH, 98);
        for pair in l.markers.windows(2) {
            assert!(pair[0].right() <= pair[1].x, "markers overlap");
        }
    }

    #[test]
    fn test_hit_testing() {
        let l = layout();
        let m = l.markers[3];
        assert_eq!(l.hit(m.x, m.y), Some(Hit::Marker(3)));
        assert_eq!(l.hit(l.previous.x + 2, l.previous.y + 1), Some(Hit::Previous));
        assert_eq!(l.hit(l.next.x + 2, l.next.y + 1), Some(Hit::Next));
        assert_eq!(l.hit(50, 0), None);
    }

    #[test]
    fn test_tooltip_stays_on_screen() {
        let l = layout();
        let first = l.tooltip(0, 20);
        assert_eq!(first.x, 0);
        let last = l.tooltip(LAST_STAGE, 20);
        assert!(last.right() <= 100);
    }

    #[test]
    fn test_nav_buttons_sit_at_the_edges() {
        let l = layout();
        assert_eq!(l.previous.x, 0);
        assert_eq!(l.next.right(), 100);
        assert_eq!(l.previous.y, l.footer.y - 3);
    }
}
