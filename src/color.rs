//! # Colors
//!
//! Furniture and room colors are stored as 8-bit RGB and exchanged with the
//! user as 6-hex-digit strings (`#8B4513`). The renderer consumes them as
//! linear-ish `[f32; 4]` RGBA.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Reasons a color string is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("expected 6 hex digits, got {0} characters")]
    Length(usize),
    #[error("invalid hex digit in '{0}'")]
    Digit(String),
}

/// An opaque 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` or `RRGGBB` (case-insensitive, surrounding whitespace ignored)
    pub fn from_hex(text: &str) -> Result<Self, ColorParseError> {
        let digits = text.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);

        if digits.len() != 6 {
            return Err(ColorParseError::Length(digits.chars().count()));
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorParseError::Digit(text.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ColorParseError::Digit(text.to_string()))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }

    /// Uppercase `#RRGGBB` form
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Normalized RGBA for GPU uniforms (alpha always 1)
    pub fn to_rgba_f32(&self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            1.0,
        ]
    }

    /// Normalized RGB, the layout imgui's color editor works with
    pub fn to_rgb_f32(&self) -> [f32; 3] {
        let [r, g, b, _] = self.to_rgba_f32();
        [r, g, b]
    }

    /// Inverse of [`Color::to_rgb_f32`], channels are clamped to `0.0..=1.0`
    pub fn from_rgb_f32(rgb: [f32; 3]) -> Self {
        let quantize = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::rgb(quantize(rgb[0]), quantize(rgb[1]), quantize(rgb[2]))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Color::from_hex(&text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_with_and_without_hash() {
        assert_eq!(Color::from_hex("#8B4513"), Ok(Color::rgb(0x8B, 0x45, 0x13)));
        assert_eq!(Color::from_hex("8b4513"), Ok(Color::rgb(0x8B, 0x45, 0x13)));
        assert_eq!(Color::from_hex("  #ffffff "), Ok(Color::WHITE));
    }

    #[test]
    fn rejects_bad_input() {
        assert_eq!(Color::from_hex("#fff"), Err(ColorParseError::Length(3)));
        assert_eq!(Color::from_hex(""), Err(ColorParseError::Length(0)));
        assert!(matches!(
            Color::from_hex("#12345g"),
            Err(ColorParseError::Digit(_))
        ));
        assert!(Color::from_hex("#1234567").is_err());
        // multi-byte characters must not panic on slicing
        assert!(Color::from_hex("#ééé").is_err());
    }

    #[test]
    fn hex_output_is_uppercase() {
        assert_eq!(Color::rgb(0x41, 0x69, 0xe1).to_hex(), "#4169E1");
    }

    #[test]
    fn float_conversion_quantizes() {
        let color = Color::rgb(255, 128, 0);
        assert_eq!(Color::from_rgb_f32(color.to_rgb_f32()), color);
        assert_eq!(Color::from_rgb_f32([2.0, -1.0, 0.5]), Color::rgb(255, 0, 128));
    }
}
