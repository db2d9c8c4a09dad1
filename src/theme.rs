//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::game::ShapeKind;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Theme keys for the seven piece colours, in template order.
const PIECE_KEYS: [&str; 7] = [
    "piece_i", "piece_o", "piece_t", "piece_l", "piece_j", "piece_z", "piece_s",
];

/// Piece palette and UI colours.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// One colour per shape kind, indexed by template index.
    pub pieces: [Color; 7],
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, state).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Help text and empty-cell dots.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            pieces: [
                Color::Rgb(0xEF, 0x44, 0x44), // red
                Color::Rgb(0x3B, 0x82, 0xF6), // blue
                Color::Rgb(0x22, 0xC5, 0x5E), // green
                Color::Rgb(0xEA, 0xB3, 0x08), // yellow
                Color::Rgb(0xA8, 0x55, 0xF7), // purple
                Color::Rgb(0xF9, 0x73, 0x16), // orange
                Color::Rgb(0xEC, 0x48, 0x99), // pink
            ],
            bg: Color::Rgb(0x1F, 0x29, 0x37),
            div_line: Color::Rgb(0x37, 0x41, 0x51),
            main_fg: Color::Rgb(0xF9, 0xFA, 0xFB),
            title: Color::Rgb(0xEA, 0xB3, 0x08),
            inactive_fg: Color::Rgb(0x9C, 0xA3, 0xAF),
        }
    }
}

impl Theme {
    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// No path means the built-in palette. Keys missing from the file keep their defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let s = std::fs::read_to_string(path)?;
        Self::from_map(&parse_theme_file(&s))
    }

    fn from_map(map: &HashMap<String, String>) -> Result<Self, ThemeError> {
        let mut theme = Self::default();
        let get = |key: &str| map.get(key).map(|v| parse_hex(v)).transpose();
        for (slot, key) in theme.pieces.iter_mut().zip(PIECE_KEYS) {
            if let Some(c) = get(key)? {
                *slot = c;
            }
        }
        for (slot, key) in [
            (&mut theme.bg, "main_bg"),
            (&mut theme.div_line, "div_line"),
            (&mut theme.main_fg, "main_fg"),
            (&mut theme.title, "title"),
            (&mut theme.inactive_fg, "inactive_fg"),
        ] {
            if let Some(c) = get(key)? {
                *slot = c;
            }
        }
        Ok(theme)
    }

    /// Colour for a shape kind.
    #[inline]
    pub fn piece_color(&self, kind: ShapeKind) -> Color {
        self.pieces[kind.index()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| invalid());
    let (r, g, b) = match s.len() {
        6 if s.is_ascii() => (channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?),
        3 if s.is_ascii() => (
            channel(&s[0..1])? * 17,
            channel(&s[1..2])? * 17,
            channel(&s[2..3])? * 17,
        ),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#EF4444").unwrap();
        assert!(matches!(c, Color::Rgb(0xEF, 0x44, 0x44)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(matches!(parse_hex("#12"), Err(ThemeError::InvalidHex(_))));
        assert!(matches!(parse_hex("#GGGGGG"), Err(ThemeError::InvalidHex(_))));
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[main_bg]="#31353F""##);
        assert_eq!(map.get("main_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_overrides_piece_colour() {
        let map = parse_theme_file(
            "# comment\ntheme[piece_t]='#000000'\ntheme[div_line]=\"#112233\"\n",
        );
        let theme = Theme::from_map(&map).unwrap();
        assert_eq!(theme.piece_color(ShapeKind::T), Color::Rgb(0, 0, 0));
        assert_eq!(theme.div_line, Color::Rgb(0x11, 0x22, 0x33));
        assert_eq!(theme.piece_color(ShapeKind::I), Theme::default().pieces[0]);
    }

    #[test]
    fn test_theme_bad_value_is_error() {
        let map = parse_theme_file("theme[piece_i]=\"nope\"");
        assert!(Theme::from_map(&map).is_err());
    }

    #[test]
    fn test_load_without_path_is_default() {
        assert_eq!(Theme::load(None).unwrap(), Theme::default());
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let path = Path::new("/nonexistent/blockfall/theme");
        assert!(matches!(Theme::load(Some(path)), Err(ThemeError::Io(_))));
    }
}
