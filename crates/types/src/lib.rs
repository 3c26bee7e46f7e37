//! Validated domain types for the Kedai CMS.
//!
//! These newtypes enforce their invariant at construction and on deserialize,
//! so records read back from storage carry the same guarantees as records
//! built in code.

/// Errors that can occur when creating validated domain types.
#[derive(Debug, thiserror::Error)]
pub enum TypeError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input contained no phone digits at all
    #[error("Phone number contains no digits")]
    NoDigits,
}

/// A string type that guarantees non-empty content.
///
/// Wraps a `String` and ensures it contains at least one non-whitespace
/// character; input is trimmed during construction. Used for fields such as
/// participant and class names where a blank value is never meaningful.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::Empty` when the trimmed input is empty.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TypeError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TypeError::Empty);
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

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A WhatsApp contact number held in canonical `62…` form.
///
/// Construction accepts any of the input shapes users actually type
/// (`0812…`, `+62 812…`, bare `812…`) and normalises once; the canonical form
/// is what gets persisted and what the `wa.me` link is built from. Display
/// and form-prefill renditions are derived on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhatsappNumber(String);

impl WhatsappNumber {
    /// Parses a raw phone number input into canonical form.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::NoDigits` when the input contains no digits —
    /// the one input shape that cannot be normalised into a number.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, TypeError> {
        let canonical = kedai_rules::phone::normalize_whatsapp(raw.as_ref());
        if canonical.is_empty() {
            return Err(TypeError::NoDigits);
        }
        Ok(Self(canonical))
    }

    /// The canonical `62…` digit string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable rendition, e.g. `+62 8123-4567-890`.
    pub fn display_form(&self) -> String {
        kedai_rules::phone::format_whatsapp_display(&self.0)
    }

    /// Local `0…` rendition for pre-filling editable form fields.
    pub fn local_form(&self) -> String {
        kedai_rules::phone::to_local_whatsapp(&self.0)
    }

    /// Deep link to open a chat with this number.
    pub fn wa_link(&self) -> String {
        format!("https://wa.me/{}", self.0)
    }
}

impl std::fmt::Display for WhatsappNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for WhatsappNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for WhatsappNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        WhatsappNumber::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_text_trims_and_validates() {
        assert_eq!(NonEmptyText::new("  Budi  ").unwrap().as_str(), "Budi");
        assert!(matches!(NonEmptyText::new("   "), Err(TypeError::Empty)));
    }

    #[test]
    fn whatsapp_number_normalises_on_parse() {
        let number = WhatsappNumber::parse("0812-3456-7890").unwrap();
        assert_eq!(number.as_str(), "6281234567890");
        assert_eq!(number.display_form(), "+62 8123-4567-890");
        assert_eq!(number.local_form(), "081234567890");
        assert_eq!(number.wa_link(), "https://wa.me/6281234567890");
    }

    #[test]
    fn whatsapp_number_rejects_digitless_input() {
        assert!(matches!(
            WhatsappNumber::parse("call me"),
            Err(TypeError::NoDigits)
        ));
    }

    #[test]
    fn whatsapp_number_serde_roundtrip() {
        let number = WhatsappNumber::parse("+62 812 3456 7890").unwrap();
        let json = serde_json::to_string(&number).unwrap();
        assert_eq!(json, "\"6281234567890\"");

        let back: WhatsappNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, number);
    }

    #[test]
    fn whatsapp_number_deserialize_renormalises_legacy_values() {
        // Older records stored the local form; deserialize fixes them up.
        let number: WhatsappNumber = serde_json::from_str("\"081234567890\"").unwrap();
        assert_eq!(number.as_str(), "6281234567890");
    }
}
