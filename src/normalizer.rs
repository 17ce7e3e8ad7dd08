use crate::error::TagError;

/// Maximum length of a tag name after trimming, in characters.
pub const MAX_TAG_NAME_LEN: usize = 50;

/// Characters that may never appear in a tag name.
const RESERVED: &[char] = &['<', '>', '{', '}', '[', ']', '\\', '/', '|', '"', '\''];

/// Canonicalization and shape validation for user-typed tag labels.
///
/// Normalization produces the matching key stored in `tags.name`; the
/// display casing the user typed is kept separately and never rewritten.
pub struct TagNormalizer;

impl TagNormalizer {
    /// Normalizes a label to its canonical matching key.
    ///
    /// Trims surrounding whitespace and lower-cases.
    /// Idempotent: `normalize(normalize(x)) == normalize(x)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use gutlog::TagNormalizer;
    ///
    /// assert_eq!(TagNormalizer::normalize("  Vacation "), "vacation");
    /// assert_eq!(TagNormalizer::normalize("New Medicine"), "new medicine");
    /// assert_eq!(TagNormalizer::normalize(" X "), TagNormalizer::normalize("x"));
    /// ```
    #[must_use]
    pub fn normalize(name: &str) -> String {
        name.trim().to_lowercase()
    }

    /// Validates the shape of a tag label, collecting every violation
    /// rather than stopping at the first.
    ///
    /// After trimming, the label must be non-empty, at most
    /// [`MAX_TAG_NAME_LEN`] characters, built from letters, digits,
    /// spaces, `_` and `-`, and free of reserved punctuation. Validation
    /// never mutates its input.
    ///
    /// # Examples
    ///
    /// ```
    /// use gutlog::TagNormalizer;
    ///
    /// assert!(TagNormalizer::validate("New Medicine").is_ok());
    /// assert!(TagNormalizer::validate("low_fodmap-2").is_ok());
    /// assert!(TagNormalizer::validate("   ").is_err());
    /// assert!(TagNormalizer::validate("<script>").is_err());
    /// ```
    pub fn validate(name: &str) -> Result<(), TagError> {
        let trimmed = name.trim();
        let mut reasons = Vec::new();

        if trimmed.is_empty() {
            reasons.push("name is empty".to_string());
        }
        if trimmed.chars().count() > MAX_TAG_NAME_LEN {
            reasons.push(format!("name is longer than {MAX_TAG_NAME_LEN} characters"));
        }
        if trimmed.contains(RESERVED) {
            reasons.push("name contains reserved punctuation".to_string());
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '_' || c == '-')
        {
            reasons.push("only letters, digits, spaces, '_' and '-' are allowed".to_string());
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(TagError::InvalidName { reasons })
        }
    }
}
