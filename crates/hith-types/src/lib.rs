//! Small validated types shared by the fixture loader and the explanation renderer.

use serde::{Deserialize, Serialize};

/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// Returns `Err(TextError::Empty)` if the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// Direction in which a piece of evidence pushed the eligibility decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    Positive,
    Negative,
    #[default]
    Neutral,
}

impl Polarity {
    /// Parse a polarity from its wire spelling.
    ///
    /// Accepts the lowercase names as well as `+`, `-` and `0`, case-insensitively.
    pub fn from_wire(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" | "+" => Some(Polarity::Positive),
            "negative" | "-" => Some(Polarity::Negative),
            "neutral" | "0" => Some(Polarity::Neutral),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Polarity::Positive => "positive",
            Polarity::Negative => "negative",
            Polarity::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_input() {
        let text = NonEmptyText::new("  Pneumonia \n").expect("valid text");
        assert_eq!(text.as_str(), "Pneumonia");
    }

    #[test]
    fn non_empty_text_rejects_whitespace() {
        assert!(matches!(NonEmptyText::new("   "), Err(TextError::Empty)));
    }

    #[test]
    fn non_empty_text_deserialize_rejects_empty() {
        let err = serde_json::from_str::<NonEmptyText>("\"\"").expect_err("empty string");
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn polarity_parses_wire_spellings() {
        assert_eq!(Polarity::from_wire("Positive"), Some(Polarity::Positive));
        assert_eq!(Polarity::from_wire("-"), Some(Polarity::Negative));
        assert_eq!(Polarity::from_wire(" neutral "), Some(Polarity::Neutral));
        assert_eq!(Polarity::from_wire("maybe"), None);
    }

    #[test]
    fn polarity_serialises_lowercase() {
        let json = serde_json::to_string(&Polarity::Negative).expect("serialise");
        assert_eq!(json, "\"negative\"");
    }
}
