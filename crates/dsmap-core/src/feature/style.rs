//! Path styling for vector features.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Fill opacity applied to freshly drawn features.
pub const DRAWN_FILL_OPACITY: f64 = 0.8;

/// Style errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StyleError {
    #[error("Invalid color: {0}")]
    InvalidColor(String),
    #[error("Style property {0} does not accept this value")]
    Mismatch(StyleProperty),
    #[error("Opacity out of range: {0}")]
    OpacityOutOfRange(f64),
}

/// Opaque RGB color, serialized as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl HexColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn red() -> Self {
        Self::new(0xff, 0, 0)
    }

    /// Default path color of the map library.
    pub const fn path_blue() -> Self {
        Self::new(0x33, 0x88, 0xff)
    }

    /// Parse `#rgb` or `#rrggbb` (leading `#` optional).
    pub fn parse(s: &str) -> Result<Self, StyleError> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let invalid = || StyleError::InvalidColor(s.to_string());
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        match hex.len() {
            3 => Ok(Self::new(
                channel(0..1)? * 17,
                channel(1..2)? * 17,
                channel(2..3)? * 17,
            )),
            6 => Ok(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl TryFrom<String> for HexColor {
    type Error = StyleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

/// Addressable style properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleProperty {
    /// Stroke color.
    Color,
    FillColor,
    FillOpacity,
}

impl fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StyleProperty::Color => "color",
            StyleProperty::FillColor => "fillColor",
            StyleProperty::FillOpacity => "fillOpacity",
        };
        f.write_str(name)
    }
}

/// A value for one style property.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StyleValue {
    Color(HexColor),
    Opacity(f64),
}

/// Style of a vector feature, mirroring the map library's path options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureStyle {
    /// Stroke color.
    pub color: HexColor,
    pub fill_color: HexColor,
    pub fill_opacity: f64,
}

impl Default for FeatureStyle {
    fn default() -> Self {
        Self {
            color: HexColor::path_blue(),
            fill_color: HexColor::path_blue(),
            fill_opacity: 0.2,
        }
    }
}

impl FeatureStyle {
    /// Style for a freshly drawn feature: `fill` inside, `stroke` outline.
    pub fn drawn(fill: HexColor, stroke: HexColor) -> Self {
        Self {
            color: stroke,
            fill_color: fill,
            fill_opacity: DRAWN_FILL_OPACITY,
        }
    }

    pub fn get(&self, property: StyleProperty) -> StyleValue {
        match property {
            StyleProperty::Color => StyleValue::Color(self.color),
            StyleProperty::FillColor => StyleValue::Color(self.fill_color),
            StyleProperty::FillOpacity => StyleValue::Opacity(self.fill_opacity),
        }
    }

    pub fn set(&mut self, property: StyleProperty, value: StyleValue) -> Result<(), StyleError> {
        match (property, value) {
            (StyleProperty::Color, StyleValue::Color(c)) => self.color = c,
            (StyleProperty::FillColor, StyleValue::Color(c)) => self.fill_color = c,
            (StyleProperty::FillOpacity, StyleValue::Opacity(o)) => {
                if !(0.0..=1.0).contains(&o) {
                    return Err(StyleError::OpacityOutOfRange(o));
                }
                self.fill_opacity = o;
            }
            (property, _) => return Err(StyleError::Mismatch(property)),
        }
        Ok(())
    }
}
