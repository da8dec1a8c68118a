//! RGB colors and text-contrast selection.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing color strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("Invalid hex color: {0:?}")]
    InvalidHex(String),
    #[error("Invalid text color: {0:?} (expected \"black\" or \"white\")")]
    InvalidTextColor(String),
}

/// An opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#RRGGBB` string. The leading `#` is optional and digits are
    /// case-insensitive.
    pub fn from_hex(s: &str) -> Result<Self, ColorParseError> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        let bytes = digits.as_bytes();
        if bytes.len() != 6 {
            return Err(ColorParseError::InvalidHex(s.to_string()));
        }

        let byte = |hi: u8, lo: u8| -> Option<u8> { Some(hex_digit(hi)? << 4 | hex_digit(lo)?) };
        match (
            byte(bytes[0], bytes[1]),
            byte(bytes[2], bytes[3]),
            byte(bytes[4], bytes[5]),
        ) {
            (Some(r), Some(g), Some(b)) => Ok(Self::new(r, g, b)),
            _ => Err(ColorParseError::InvalidHex(s.to_string())),
        }
    }

    /// Format as uppercase `#RRGGBB`.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Squared Euclidean distance in RGB space.
    pub fn distance_sq(self, other: Rgb) -> u32 {
        let d = |a: u8, b: u8| {
            let diff = i32::from(a) - i32::from(b);
            (diff * diff) as u32
        };
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b)
    }

    /// Perceived brightness in `0.0..=1.0`.
    pub fn luminance(self) -> f32 {
        (0.299 * f32::from(self.r) + 0.587 * f32::from(self.g) + 0.114 * f32::from(self.b)) / 255.0
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

const fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Label text color drawn on top of a custom background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextColor {
    Black,
    White,
}

impl TextColor {
    /// Pick whichever of black or white reads better on `background`.
    pub fn for_background(background: Rgb) -> Self {
        if background.luminance() > 0.5 {
            Self::Black
        } else {
            Self::White
        }
    }

    /// CSS color keyword.
    pub const fn css(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::White => "white",
        }
    }
}

impl fmt::Display for TextColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css())
    }
}

impl FromStr for TextColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "black" => Ok(Self::Black),
            "white" => Ok(Self::White),
            other => Err(ColorParseError::InvalidTextColor(other.to_string())),
        }
    }
}
