//! Color handling for arc presentation metadata
//!
//! This module provides the [`Color`] type which wraps the `DynamicColor` type
//! from the color crate. Colors arrive as CSS strings from configuration and
//! leave as `#rrggbb` strings in the routed edge records.

use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
};

use color::{DynamicColor, Srgb};

/// Default stroke used for arcs and their arrow markers.
pub const DEFAULT_EDGE_COLOR: &str = "#333";

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, Debug)]
pub struct Color {
    color: DynamicColor,
}

// Named and hex spellings of the same color compare equal.
impl PartialEq for Color {
    fn eq(&self, other: &Self) -> bool {
        self.to_hex_string() == other.to_hex_string()
    }
}

impl Eq for Color {}

impl Hash for Color {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_hex_string().hash(state);
    }
}

impl Color {
    /// Create a new `Color` from a CSS color string such as "#333",
    /// "rgb(51, 51, 51)" or "slategray".
    ///
    /// # Examples
    ///
    /// ```
    /// use petri_layout_core::color::Color;
    ///
    /// let stroke = Color::new("#333").unwrap();
    /// assert_eq!(stroke.to_hex_string(), "#333333");
    /// assert!(Color::new("not-a-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }

    /// Returns the color as an opaque `#rrggbb` string.
    pub fn to_hex_string(self) -> String {
        let rgba = self.color.to_alpha_color::<Srgb>().to_rgba8();
        format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new(DEFAULT_EDGE_COLOR).expect("'#333' is a valid CSS color")
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_new() {
        assert!(Color::new("#ff0000").is_ok());
        assert!(Color::new("not-a-color").is_err());
    }

    #[test]
    fn test_color_default_is_edge_gray() {
        assert_eq!(Color::default().to_hex_string(), "#333333");
    }

    #[test]
    fn test_named_color_to_hex() {
        let blue = Color::new("blue").unwrap();
        assert_eq!(blue.to_string(), "#0000ff");
    }

    #[test]
    fn test_color_eq_hash() {
        use std::collections::HashSet;

        let color1 = Color::new("red").unwrap();
        let color2 = Color::new("#f00").unwrap();
        let color3 = Color::new("blue").unwrap();

        let mut set = HashSet::new();
        set.insert(color1);
        assert!(set.contains(&color2));
        assert!(!set.contains(&color3));
    }
}
