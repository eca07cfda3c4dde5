//! Small display pieces: stage icons, the chat bubble and the confetti overlay.
//!
//! Everything here is a pure function of its inputs; the caller passes in
//! whatever state and elapsed time it needs.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Padding, Paragraph, Widget, Wrap},
};
use std::time::Duration;
use tokio::time::Instant;

use crate::confetti::Confetti;
use crate::journey::{IconSet, MessageDirection, StageIcon};
use crate::theme::Theme;

/// Length of the bubble's bounce-in
pub const BOUNCE_IN: Duration = Duration::from_millis(500);

/// Longest line a bubble will hold before wrapping
const BUBBLE_MAX_WIDTH: u16 = 48;

/// (progress, scale, opacity)
const BOUNCE_KEYFRAMES: [(f32, f32, f32); 4] = [
    (0.0, 0.3, 0.0),
    (0.5, 1.05, 0.8),
    (0.7, 0.9, 0.9),
    (1.0, 1.0, 1.0),
];

/// Icon for stage `index`, styled by whether the journey has reached it
pub fn stage_icon(index: usize, is_active: bool, set: IconSet, theme: &Theme) -> Span<'static> {
    let style = if is_active {
        Style::default().fg(theme.bubble_text).bg(theme.accent)
    } else {
        Style::default().fg(theme.text_dim)
    };
    Span::styled(StageIcon::for_stage(index).glyph(set), style)
}

/// Scale and opacity of the bounce-in `elapsed` after it started
pub fn bounce_in(elapsed: Duration) -> (f32, f32) {
    if elapsed >= BOUNCE_IN {
        return (1.0, 1.0);
    }
    let t = elapsed.as_secs_f32() / BOUNCE_IN.as_secs_f32();

    for pair in BOUNCE_KEYFRAMES.windows(2) {
        let (t0, s0, o0) = pair[0];
        let (t1, s1, o1) = pair[1];
        if t <= t1 {
            let k = (t - t0) / (t1 - t0);
            return (s0 + (s1 - s0) * k, o0 + (o1 - o0) * k);
        }
    }
    (1.0, 1.0)
}

/// Rows `text` takes when greedily word-wrapped to `width` columns
pub fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = width.max(1) as usize;
    let mut rows = 0usize;

    for paragraph in text.split('\n') {
        let mut line = 0usize;
        rows += 1;
        for word in paragraph.split_whitespace() {
            let len = word.chars().count();
            if line == 0 {
                line = len;
            } else if line + 1 + len <= width {
                line += 1 + len;
            } else {
                rows += 1;
                line = len;
            }
            // Words longer than the line spill over
            while line > width {
                rows += 1;
                line -= width;
            }
        }
    }

    rows.min(u16::MAX as usize) as u16
}

/// One chat bubble. Received bubbles hug the left edge, sent ones the right.
pub struct MessagePreview<'a> {
    pub text: &'a str,
    pub direction: MessageDirection,
    pub animate: bool,
    /// Time since the bubble appeared
    pub elapsed: Duration,
    pub theme: &'a Theme,
}

impl MessagePreview<'_> {
    /// Area the bubble occupies inside `area`
    pub fn bubble_area(&self, area: Rect) -> Rect {
        let full_width = BUBBLE_MAX_WIDTH.min(area.width);
        let (scale, _) = if self.animate {
            bounce_in(self.elapsed)
        } else {
            (1.0, 1.0)
        };

        let width = ((full_width as f32 * scale).round() as u16).clamp(4.min(full_width), full_width.max(1));
        let height = (wrapped_height(self.text, full_width.saturating_sub(2)) + 2).min(area.height);
        // Shrink height along with width so the bubble grows from its corner
        let height = ((height as f32 * scale.min(1.0)).round() as u16).clamp(1.min(height), height);

        let x = match self.direction {
            MessageDirection::Received => area.x,
            MessageDirection::Sent => area.x + area.width.saturating_sub(width),
        };
        Rect::new(x, area.y, width, height)
    }
}

impl Widget for MessagePreview<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bubble = self.bubble_area(area);
        if bubble.width < 3 || bubble.height == 0 {
            return;
        }

        let opacity = if self.animate { bounce_in(self.elapsed).1 } else { 1.0 };
        let mut style = match self.direction {
            MessageDirection::Received => Style::default().fg(self.theme.bubble_text).bg(self.theme.accent),
            MessageDirection::Sent => Style::default().fg(self.theme.text).bg(self.theme.inactive),
        };
        if opacity < 0.85 {
            style = style.add_modifier(Modifier::DIM);
        }

        // Hide text until the bubble is close to full size
        let text = if bubble.width + 2 >= BUBBLE_MAX_WIDTH.min(area.width) {
            self.text
        } else {
            ""
        };

        Paragraph::new(text)
            .style(style)
            .wrap(Wrap { trim: true })
            .block(Block::default().padding(Padding::uniform(1)).style(style))
            .render(bubble, buf);
    }
}

const SPIN_GLYPHS: [&str; 4] = ["◐", "◓", "◑", "◒"];

/// Falling confetti drawn over whatever is already in the buffer
pub struct ConfettiLayer<'a> {
    pub confetti: &'a Confetti,
    pub now: Instant,
}

impl Widget for ConfettiLayer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        for (pose, color) in self.confetti.poses(self.now) {
            if !(0.0..1.0).contains(&pose.y) {
                continue;
            }
            let col = area.x + ((pose.x * area.width as f32) as u16).min(area.width - 1);
            let row = area.y + ((pose.y * area.height as f32) as u16).min(area.height - 1);

            let quarter = (pose.rotation_deg / 90.0) as usize % SPIN_GLYPHS.len();
            let mut style = Style::default().fg(color);
            if pose.opacity < 0.35 {
                style = style.add_modifier(Modifier::DIM);
            }

            if let Some(cell) = buf.cell_mut((col, row)) {
                cell.set_symbol(SPIN_GLYPHS[quarter]).set_style(style);
            }
        }
    }
}

/// Key hint as `key label │ ` spans, the way the footer lists them
pub fn key_hint<'a>(key: &'a str, label: &'a str, theme: &Theme) -> [Span<'a>; 2] {
    [
        Span::styled(key, Style::default().fg(theme.accent)),
        Span::styled(format!(" {} │ ", label), Style::default().fg(theme.text_dim)),
    ]
}

/// A centred single-line label
pub fn centered_line<'a>(spans: Vec<Span<'a>>) -> Line<'a> {
    Line::from(spans).centered()
}
