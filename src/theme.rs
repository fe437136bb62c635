//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::Palette;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Piece and UI colours.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Piece colours in catalog order: O, T, I, J, L, S, Z.
    pub pieces: [Color; 7],
    /// Playfield background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score, level).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Secondary text (key hints).
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

// One Dark.
const ONEDARK_PIECES: [Color; 7] = [
    rgb(0xE5C07B), // yellow
    rgb(0xC678DD), // magenta
    rgb(0x56B6C2), // cyan
    rgb(0x61AFEF), // blue
    rgb(0xD19A66), // orange
    rgb(0x98C379), // green
    rgb(0xE06C75), // red
];

const HIGH_CONTRAST_PIECES: [Color; 7] = [
    rgb(0xFFFF00),
    rgb(0xFF00FF),
    rgb(0x00FFFF),
    rgb(0x0088FF),
    rgb(0xFF8800),
    rgb(0x00FF00),
    rgb(0xFF0000),
];

// Tol "bright"/"vibrant" mix; avoids relying on red vs green.
const COLORBLIND_PIECES: [Color; 7] = [
    rgb(0xBBBB00),
    rgb(0xEE3377),
    rgb(0x33BBEE),
    rgb(0x0077BB),
    rgb(0xEE7733),
    rgb(0x009988),
    rgb(0xCC3311),
];

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    pub fn onedark_default() -> Self {
        Self {
            pieces: ONEDARK_PIECES,
            bg: rgb(0x31353F),
            div_line: rgb(0x3F444F),
            main_fg: rgb(0xABB2BF),
            title: rgb(0xE5C07B),
            inactive_fg: rgb(0x5C6370),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// A missing path gives the One Dark defaults; `palette` is applied on top either way.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) => Self::from_map(&parse_theme_file(&std::fs::read_to_string(p)?)),
            None => Self::onedark_default(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Swap piece colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => self.pieces = HIGH_CONTRAST_PIECES,
            Palette::Colorblind => self.pieces = COLORBLIND_PIECES,
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let d = Self::onedark_default();
        let [o, t, i, j, l, s, z] = d.pieces;
        Self {
            pieces: [
                get("title").or_else(|| get("cpu_mid")).unwrap_or(o),
                get("net_box").unwrap_or(t),
                get("hi_fg").or_else(|| get("proc_misc")).unwrap_or(i),
                get("cpu_box").unwrap_or(j),
                get("temp_mid").unwrap_or(l),
                get("mem_box").or_else(|| get("cpu_start")).unwrap_or(s),
                get("cpu_end").or_else(|| get("temp_end")).unwrap_or(z),
            ],
            bg: get("meter_bg").unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
        }
    }

    /// Colour for a piece's colour index (0..7).
    #[inline]
    pub fn piece_color(&self, index: u8) -> Color {
        self.pieces[index as usize % self.pieces.len()]
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
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GG0000").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_theme_file_overrides_and_falls_back() {
        let map = parse_theme_file(
            "# comment\ntheme[cpu_box]='#000080'\ntheme[main_fg]=\"#FFFFFF\"\n",
        );
        let theme = Theme::from_map(&map);
        assert_eq!(theme.pieces[3], Color::Rgb(0, 0, 0x80));
        assert_eq!(theme.main_fg, Color::Rgb(255, 255, 255));
        assert_eq!(theme.pieces[0], ONEDARK_PIECES[0]);
    }

    #[test]
    fn test_palette_changes_pieces_only() {
        let mut theme = Theme::default();
        theme.apply_palette(Palette::HighContrast);
        assert_eq!(theme.piece_color(6), Color::Rgb(255, 0, 0));
        assert_eq!(theme.bg, Theme::default().bg);
    }
}
