//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::Palette;

/// Number of distinct gem colours a theme provides.
pub const GEM_COLOURS: usize = 8;

/// One Dark palette and UI colours loaded from a theme file.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Gem colours by kind: green, yellow, red, blue, magenta, cyan, orange, white.
    pub gems: [Color; GEM_COLOURS],
    /// Board background.
    pub bg: Color,
    /// Grid / border.
    pub div_line: Color,
    /// Text (score).
    pub main_fg: Color,
    /// Highlight / titles / cursor.
    pub title: Color,
    /// Secondary text (debug stats, hints).
    pub inactive_fg: Color,
    /// Flash colour of a rejected swap.
    pub reject: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

const fn hex(v: u32) -> Color {
    Color::Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
}

const ONEDARK_GEMS: [Color; GEM_COLOURS] = [
    hex(0x98C379),
    hex(0xE5C07B),
    hex(0xE06C75),
    hex(0x61AFEF),
    hex(0xC678DD),
    hex(0x56B6C2),
    hex(0xD19A66),
    hex(0xDCDFE4),
];

/// btop keys read for each gem colour, first hit wins.
const GEM_KEYS: [&[&str]; GEM_COLOURS] = [
    &["mem_box", "cpu_start"],
    &["title", "cpu_mid"],
    &["cpu_end", "temp_end"],
    &["cpu_box"],
    &["net_box"],
    &["hi_fg", "proc_misc"],
    &["temp_mid", "used_mid"],
    &["selected_fg"],
];

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// Hardcoded One Dark defaults: exact hex values from onedark.theme.
    pub fn onedark_default() -> Self {
        Self {
            gems: ONEDARK_GEMS,
            bg: hex(0x31353F),
            div_line: hex(0x3F444F),
            main_fg: hex(0xABB2BF),
            title: hex(0xE5C07B),
            inactive_fg: hex(0x5C6370),
            reject: hex(0xBE5046),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            Some(p) => {
                log::warn!("theme file {} not found, using defaults", p.display());
                return Ok(Self::default_for_palette(palette));
            }
            None => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        log::debug!("loaded theme {} ({} keys)", path.display(), map.len());
        Ok(theme)
    }

    fn default_for_palette(palette: Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override gem colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.gems = [
                    hex(0x00FF00),
                    hex(0xFFFF00),
                    hex(0xFF0000),
                    hex(0x0088FF),
                    hex(0xFF00FF),
                    hex(0x00FFFF),
                    hex(0xFF8800),
                    hex(0xFFFFFF),
                ];
            }
            Palette::Colorblind => {
                // Paul Tol's bright + vibrant sets.
                self.gems = [
                    hex(0x0077BB),
                    hex(0xEE7733),
                    hex(0x009988),
                    hex(0xCC3311),
                    hex(0xEE3377),
                    hex(0xBBBB00),
                    hex(0x33BBEE),
                    hex(0xBBBBBB),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let defaults = Self::onedark_default();
        let mut gems = defaults.gems;
        for (slot, keys) in gems.iter_mut().zip(GEM_KEYS) {
            if let Some(c) = keys.iter().find_map(|k| get(k)) {
                *slot = c;
            }
        }
        Self {
            gems,
            bg: get("meter_bg").unwrap_or(defaults.bg),
            div_line: get("div_line").unwrap_or(defaults.div_line),
            main_fg: get("main_fg").unwrap_or(defaults.main_fg),
            title: get("title").unwrap_or(defaults.title),
            inactive_fg: get("inactive_fg").unwrap_or(defaults.inactive_fg),
            reject: get("temp_end").unwrap_or(defaults.reject),
        }
    }

    /// Colour for a gem kind. Kinds past the palette wrap around.
    #[inline]
    pub fn gem_color(&self, kind: u8) -> Color {
        self.gems[kind as usize % GEM_COLOURS]
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
            .and_then(|d| u8::from_str_radix(d, 16).ok())
            .ok_or_else(invalid)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}
