//! Four-color terminal theme.

use serde::{Deserialize, Serialize};

use crate::backend::Color;

/// Colors a program may draw with. The presentation layer owns the palette;
/// programs only pick among these roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    /// Background fill.
    pub bg: Color,
    /// Primary text and foreground shapes.
    pub text: Color,
    /// Secondary text, grid lines, hints.
    pub dim: Color,
    /// Highlights: cursor, food, selected square, the ball.
    pub accent: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg: Color::rgb(12, 12, 20),
            text: Color::rgb(0, 200, 0),
            dim: Color::rgb(100, 130, 110),
            accent: Color::rgb(100, 200, 255),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_theme_keeps_defaults() {
        let theme: Theme = toml::from_str("accent = \"#ff0000\"").unwrap();
        assert_eq!(theme.accent, Color::rgb(255, 0, 0));
        assert_eq!(theme.bg, Theme::default().bg);
    }

    #[test]
    fn invalid_color_is_rejected() {
        let parsed: std::result::Result<Theme, _> = toml::from_str("bg = \"nope\"");
        assert!(parsed.is_err());
    }
}
