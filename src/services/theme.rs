//! Color palette for the UI.

use ratatui::style::Color;
use serde::{Deserialize, Serialize};

/// Optional `#RRGGBB` overrides from the `[theme]` config section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default)]
    pub accent: Option<String>,
    #[serde(default)]
    pub foreground: Option<String>,
    #[serde(default)]
    pub muted: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub success: Option<String>,
}

/// Theme with ratatui colors.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Navigation bar, focused borders, links
    pub accent: Color,
    pub foreground: Color,
    /// Bylines, dates, hints
    pub muted: Color,
    /// Inline error messages
    pub error: Color,
    /// Confirmation messages and the liked marker
    pub success: Color,
    /// Background of the selected list row
    pub highlight: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Rgb(0x25, 0x63, 0xeb),
            foreground: Color::White,
            muted: Color::Gray,
            error: Color::LightRed,
            success: Color::LightGreen,
            highlight: Color::DarkGray,
        }
    }
}

impl Theme {
    /// Build the palette, applying any valid overrides.
    pub fn from_config(config: &ThemeConfig) -> Self {
        let base = Self::default();
        let pick = |value: &Option<String>, fallback: Color| {
            value.as_deref().and_then(parse_hex).unwrap_or(fallback)
        };

        Self {
            accent: pick(&config.accent, base.accent),
            foreground: pick(&config.foreground, base.foreground),
            muted: pick(&config.muted, base.muted),
            error: pick(&config.error, base.error),
            success: pick(&config.success, base.success),
            highlight: base.highlight,
        }
    }
}

/// Parse a hex color string like "#RRGGBB" to a ratatui Color.
fn parse_hex(hex: &str) -> Option<Color> {
    let hex = hex.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some(Color::Rgb(r, g, b))
}
