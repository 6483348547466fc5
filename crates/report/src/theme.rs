//! Colours and fonts used by the composers and the renderer

use crate::model::AttendanceStatus;
use crate::summary::Tier;
use pdf_core::Color;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// An sRGB colour written as `#rrggbb` in JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const WHITE: HexColor = HexColor::rgb(0xff, 0xff, 0xff);
    pub const BLACK: HexColor = HexColor::rgb(0, 0, 0);
    pub const GRAY: HexColor = HexColor::rgb(0x80, 0x80, 0x80);
    pub const LIGHTGREY: HexColor = HexColor::rgb(0xd3, 0xd3, 0xd3);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let hex = value.strip_prefix('#').unwrap_or(value);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        HexColor::parse(&value).ok_or_else(|| format!("invalid colour: {value}"))
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl From<HexColor> for Color {
    fn from(color: HexColor) -> Self {
        Color::from_rgb(color.r, color.g, color.b)
    }
}

/// Font family used for all report text
///
/// `helvetica` selects the built-in PDF fonts. Any other family needs at
/// least a `regular` TrueType file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub family: String,
    pub regular: Option<PathBuf>,
    pub bold: Option<PathBuf>,
    pub italic: Option<PathBuf>,
    pub bold_italic: Option<PathBuf>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: pdf_core::STANDARD_FAMILY.to_string(),
            regular: None,
            bold: None,
            italic: None,
            bold_italic: None,
        }
    }
}

/// Report palette and font
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub primary: HexColor,
    pub secondary: HexColor,
    pub accent: HexColor,
    pub light: HexColor,
    pub success: HexColor,
    pub danger: HexColor,
    pub warning: HexColor,
    /// Muted text such as the footer
    pub muted: HexColor,
    pub font: FontConfig,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: HexColor::rgb(0x1a, 0x23, 0x7e),
            secondary: HexColor::rgb(0x0d, 0x47, 0xa1),
            accent: HexColor::rgb(0xff, 0xd7, 0x00),
            light: HexColor::rgb(0xe8, 0xea, 0xf6),
            success: HexColor::rgb(0x2e, 0x7d, 0x32),
            danger: HexColor::rgb(0xc6, 0x28, 0x28),
            warning: HexColor::rgb(0xf5, 0x7c, 0x00),
            muted: HexColor::rgb(0x54, 0x6e, 0x7a),
            font: FontConfig::default(),
        }
    }
}

impl Theme {
    pub fn tier_color(&self, tier: Tier) -> HexColor {
        match tier {
            Tier::Excellent => self.success,
            Tier::Satisfactory => self.warning,
            Tier::NeedsImprovement => self.danger,
        }
    }

    pub fn status_color(&self, status: AttendanceStatus) -> HexColor {
        match status {
            AttendanceStatus::Present => self.success,
            AttendanceStatus::Absent => self.danger,
            AttendanceStatus::Leave => self.warning,
        }
    }
}
