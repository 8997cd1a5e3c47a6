//! Colors, text and image styling, and the default theme.
//!
//! Declarative sources carry colors as strings. An empty attribute means
//! "use the theme"; anything else goes through [`Color::parse`].

use serde::{Deserialize, Serialize};

/// RGBA color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    /// Red component (0-1).
    pub r: f32,
    /// Green component (0-1).
    pub g: f32,
    /// Blue component (0-1).
    pub b: f32,
    /// Alpha component (0-1).
    pub a: f32,
}

impl Color {
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    /// Solid black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Solid white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    /// Solid red.
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    /// Solid green.
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    /// Solid blue.
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);

    /// Creates a color from RGBA values (0-1).
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from RGB values (0-1) with full alpha.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Creates a color from hex value (0xRRGGBBAA).
    #[must_use]
    pub const fn hex(hex: u32) -> Self {
        let r = ((hex >> 24) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let b = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let a = (hex & 0xFF) as f32 / 255.0;
        Self::rgba(r, g, b, a)
    }

    /// Parses `#rgb`, `#rrggbb`, `#rrggbbaa` or one of the basic color names.
    ///
    /// Returns `None` for anything else, including the empty string.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if let Some(digits) = text.strip_prefix('#') {
            if !digits.is_ascii() {
                return None;
            }
            let expanded: String = match digits.len() {
                3 => digits.chars().flat_map(|c| [c, c]).chain("ff".chars()).collect(),
                6 => format!("{digits}ff"),
                8 => digits.to_string(),
                _ => return None,
            };
            return u32::from_str_radix(&expanded, 16).ok().map(Self::hex);
        }

        match text {
            "black" => Some(Self::BLACK),
            "white" => Some(Self::WHITE),
            "red" => Some(Self::RED),
            "green" => Some(Self::GREEN),
            "blue" => Some(Self::BLUE),
            _ => None,
        }
    }

    /// Parses `text`, using `fallback` when it is empty.
    ///
    /// Unparseable non-empty text becomes black.
    #[must_use]
    pub fn parse_or(text: &str, fallback: Self) -> Self {
        if text.trim().is_empty() {
            return fallback;
        }
        Self::parse(text).unwrap_or_else(|| {
            tracing::debug!(color = text, "unrecognized color, using black");
            Self::BLACK
        })
    }

    /// Converts to array format.
    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Horizontal placement of content inside a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalAlign {
    /// Flush with the left edge.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush with the right edge.
    Right,
}

/// Vertical placement of content inside a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalAlign {
    /// Flush with the top edge.
    #[default]
    Top,
    /// Centered.
    Middle,
    /// Flush with the bottom edge.
    Bottom,
}

/// Line breaking for text that overflows its node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextWrap {
    /// Never break.
    #[default]
    None,
    /// Break between words.
    Word,
    /// Break between any two characters.
    Rune,
}

/// How an image is scaled into its node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageStretch {
    /// Natural size.
    #[default]
    None,
    /// Stretched to the node, ignoring aspect ratio.
    Fill,
    /// Scaled to fit inside the node, keeping aspect ratio.
    Cover,
    /// Like `Cover`, snapped to whole multiples.
    Nearest,
}

/// Defaults for widgets whose attributes are left blank.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    /// Fill color.
    pub background: Color,
    /// Text color.
    pub foreground: Color,
    /// Border color.
    pub border: Color,
    /// Border line width.
    pub border_width: f32,
    /// Font size, and the base that percent font sizes scale.
    pub font_size: f32,
}

impl Theme {
    /// Dark theme.
    pub const DARK: Self = Self {
        background: Color::rgba(0.05, 0.05, 0.08, 0.95),
        foreground: Color::rgba(0.9, 0.9, 0.9, 1.0),
        border: Color::rgba(0.15, 0.2, 0.15, 0.8),
        border_width: 1.0,
        font_size: 12.0,
    };

    /// Light theme.
    pub const LIGHT: Self = Self {
        background: Color::rgba(0.96, 0.96, 0.97, 1.0),
        foreground: Color::rgba(0.08, 0.08, 0.1, 1.0),
        border: Color::rgba(0.7, 0.7, 0.75, 1.0),
        border_width: 1.0,
        font_size: 12.0,
    };

    /// Parses a border width, using the theme's for blank, zero or
    /// unparseable text.
    #[must_use]
    pub fn border_width_or_default(&self, text: &str) -> f32 {
        text.trim()
            .parse::<f32>()
            .ok()
            .filter(|width| *width != 0.0)
            .unwrap_or(self.border_width)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::DARK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_matches_parsed_text() {
        let packed = Color::hex(0x3366_99CC);
        let parsed = Color::parse("#336699cc").unwrap();
        for (a, b) in packed.to_array().iter().zip(parsed.to_array()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(Color::parse("#f00"), Some(Color::RED));
        assert_eq!(Color::parse("#00ff00"), Some(Color::GREEN));
        assert_eq!(Color::parse("#0000ff80").map(|c| c.to_array()[3] < 0.51), Some(true));
        assert_eq!(Color::parse("white"), Some(Color::WHITE));
        assert_eq!(Color::parse("#12"), None);
        assert_eq!(Color::parse("teal"), None);
    }

    #[test]
    fn test_parse_or_fallbacks() {
        assert_eq!(Color::parse_or("", Color::WHITE), Color::WHITE);
        assert_eq!(Color::parse_or("nonsense", Color::WHITE), Color::BLACK);
        assert_eq!(Color::parse_or("blue", Color::WHITE), Color::BLUE);
    }

    #[test]
    fn test_border_width_fallback() {
        let theme = Theme {
            border_width: 3.0,
            ..Theme::DARK
        };
        assert_eq!(theme.border_width_or_default(""), 3.0);
        assert_eq!(theme.border_width_or_default("0"), 3.0);
        assert_eq!(theme.border_width_or_default("thick"), 3.0);
        assert_eq!(theme.border_width_or_default(" 2.5 "), 2.5);
    }
}
