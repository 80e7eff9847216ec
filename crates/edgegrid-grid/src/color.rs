//! Validated cell colors.
//!
//! Cell values arrive from arbitrary peers, so they are parsed into a closed
//! form before any replica stores them: a CSS hex color, `#rgb` or `#rrggbb`,
//! normalized to lowercase.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing a color string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// No leading `#`
    #[error("color must start with '#': {0:?}")]
    MissingHash(String),

    /// Wrong number of digits
    #[error("color must have 3 or 6 hex digits, got {0}")]
    BadLength(usize),

    /// Non-hex character
    #[error("invalid hex digit {0:?} in color")]
    BadDigit(char),
}

/// A CSS hex color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    /// Parse `#rgb` or `#rrggbb` (any case).
    pub fn parse(s: &str) -> Result<Self, ColorError> {
        let digits = s
            .strip_prefix('#')
            .ok_or_else(|| ColorError::MissingHash(s.to_string()))?;

        if let Some(bad) = digits.chars().find(|c| !c.is_ascii_hexdigit()) {
            return Err(ColorError::BadDigit(bad));
        }

        match digits.len() {
            3 | 6 => Ok(Self(format!("#{}", digits.to_ascii_lowercase()))),
            n => Err(ColorError::BadLength(n)),
        }
    }

    /// Normalized string form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ColorError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_short_and_long_forms() {
        assert_eq!(Color::parse("#000").unwrap().as_str(), "#000");
        assert_eq!(Color::parse("#FF0000").unwrap().as_str(), "#ff0000");
    }

    #[test]
    fn rejects_malformed_colors() {
        assert!(matches!(Color::parse("red"), Err(ColorError::MissingHash(_))));
        assert_eq!(Color::parse("#ff00"), Err(ColorError::BadLength(4)));
        assert_eq!(Color::parse("#"), Err(ColorError::BadLength(0)));
        assert_eq!(Color::parse("#gg0000"), Err(ColorError::BadDigit('g')));
        assert_eq!(Color::parse("#ff 000"), Err(ColorError::BadDigit(' ')));
    }

    #[test]
    fn deserialize_validates() {
        let ok: Color = serde_json::from_str("\"#ABCDEF\"").unwrap();
        assert_eq!(ok.as_str(), "#abcdef");

        assert!(serde_json::from_str::<Color>("\"javascript:alert(1)\"").is_err());
    }
}
