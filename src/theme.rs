//! Brand colours for the walkthrough, with optional overrides from config

use ratatui::style::Color;

use crate::config::ThemeOverrides;

/// Theme colors for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,      // Active markers, progress fill, buttons (blue-500)
    pub accent_soft: Color, // Ring around the current marker (blue-200)
    pub text: Color,        // Primary text
    pub text_dim: Color,    // Secondary text, disabled buttons
    pub inactive: Color,    // Unreached markers, empty progress track
    pub online: Color,      // Presence dot in the chat header
    pub bubble_text: Color, // Text inside a received bubble
    pub card: Color,        // Action card borders
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(59, 130, 246),
            accent_soft: Color::Rgb(191, 219, 254),
            text: Color::Rgb(229, 231, 235),
            text_dim: Color::Rgb(156, 163, 175),
            inactive: Color::Rgb(75, 85, 99),
            online: Color::Rgb(34, 197, 94),
            bubble_text: Color::Rgb(255, 255, 255),
            card: Color::Rgb(107, 114, 128),
        }
    }
}

impl Theme {
    /// Defaults with any valid overrides applied
    pub fn with_overrides(overrides: &ThemeOverrides) -> Self {
        let mut theme = Self::default();

        let slots: [(&Option<String>, &mut Color, &str); 6] = [
            (&overrides.accent, &mut theme.accent, "accent"),
            (&overrides.accent_soft, &mut theme.accent_soft, "accent_soft"),
            (&overrides.text, &mut theme.text, "text"),
            (&overrides.text_dim, &mut theme.text_dim, "text_dim"),
            (&overrides.inactive, &mut theme.inactive, "inactive"),
            (&overrides.online, &mut theme.online, "online"),
        ];

        for (value, slot, key) in slots {
            let Some(value) = value else { continue };
            match Self::parse_hex_color(value) {
                Some(color) => *slot = color,
                None => tracing::warn!("Ignoring theme.{}: {:?} is not a hex colour", key, value),
            }
        }

        theme
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');

        if !s.is_ascii() {
            return None;
        }

        if s.len() == 6 {
            let r = u8::from_str_radix(&s[0..2], 16).ok()?;
            let g = u8::from_str_radix(&s[2..4], 16).ok()?;
            let b = u8::from_str_radix(&s[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        } else if s.len() == 3 {
            let r = u8::from_str_radix(&s[0..1], 16).ok()? * 17;
            let g = u8::from_str_radix(&s[1..2], 16).ok()? * 17;
            let b = u8::from_str_radix(&s[2..3], 16).ok()? * 17;
            Some(Color::Rgb(r, g, b))
        } else {
            None
        }
    }
}
