pub mod catalog;
pub mod effects;

pub use catalog::{stage, Stage, LAST_STAGE, STAGES, STAGE_COUNT};

use serde::{Deserialize, Serialize};

/// Decorative marker for a stage, one per lifecycle step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageIcon {
    Chat,      // Booking confirmation
    Hotel,     // Pre-arrival
    Key,       // Check-in
    Home,      // In-stay
    Checklist, // Check-out
    Heart,     // Post-stay feedback
}

/// Which glyph table to draw icons from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconSet {
    /// Nerd Font glyphs (needs a patched terminal font)
    #[default]
    Nerd,
    /// Plain Unicode symbols that render everywhere
    Plain,
}

impl StageIcon {
    pub fn for_stage(index: usize) -> Self {
        stage(index).icon
    }

    pub fn glyph(self, set: IconSet) -> &'static str {
        match (set, self) {
            (IconSet::Nerd, StageIcon::Chat) => "󰍡",
            (IconSet::Nerd, StageIcon::Hotel) => "\u{f1ad}",
            (IconSet::Nerd, StageIcon::Key) => "󰌋",
            (IconSet::Nerd, StageIcon::Home) => "󰋜",
            (IconSet::Nerd, StageIcon::Checklist) => "󰄲",
            (IconSet::Nerd, StageIcon::Heart) => "󰋑",
            (IconSet::Plain, StageIcon::Chat) => "✉",
            (IconSet::Plain, StageIcon::Hotel) => "▦",
            (IconSet::Plain, StageIcon::Key) => "⚷",
            (IconSet::Plain, StageIcon::Home) => "⌂",
            (IconSet::Plain, StageIcon::Checklist) => "☑",
            (IconSet::Plain, StageIcon::Heart) => "♥",
        }
    }
}

/// Chat bubble direction. The walkthrough only ever shows received messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageDirection {
    Received,
    #[allow(dead_code)]
    Sent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_lookup_by_stage() {
        assert_eq!(StageIcon::for_stage(0), StageIcon::Chat);
        assert_eq!(StageIcon::for_stage(2), StageIcon::Key);
        assert_eq!(StageIcon::for_stage(5), StageIcon::Heart);
    }

    #[test]
    fn test_plain_glyphs_are_distinct() {
        let glyphs: std::collections::HashSet<_> = STAGES
            .iter()
            .map(|s| s.icon.glyph(IconSet::Plain))
            .collect();
        assert_eq!(glyphs.len(), STAGE_COUNT);
    }
}
