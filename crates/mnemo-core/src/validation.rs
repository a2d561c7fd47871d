//! Card input validation.

use crate::error::{ErrorCode, MnemoError, MnemoResult};
use crate::types::CardType;

/// Maximum concept length, in characters.
pub const MAX_CONCEPT_CHARS: usize = 100;
/// Maximum answer length, in characters.
pub const MAX_ANSWER_CHARS: usize = 200;

/// Checks concept, answer and card type before anything is persisted.
#[derive(Debug, Clone, Copy, Default)]
pub struct CardValidator;

impl CardValidator {
    pub fn validate_concept(&self, concept: &str) -> MnemoResult<()> {
        check_text("concept", concept, MAX_CONCEPT_CHARS)
    }

    pub fn validate_answer(&self, answer: &str) -> MnemoResult<()> {
        check_text("answer", answer, MAX_ANSWER_CHARS)
    }

    /// Parse a raw card type string.
    pub fn validate_card_type(&self, card_type: &str) -> MnemoResult<CardType> {
        CardType::parse(card_type)
    }

    /// Validate concept and answer together, concept first.
    pub fn validate(&self, concept: &str, answer: &str) -> MnemoResult<()> {
        self.validate_concept(concept)?;
        self.validate_answer(answer)
    }
}

fn check_text(field: &str, value: &str, max_chars: usize) -> MnemoResult<()> {
    if value.trim().is_empty() {
        return Err(MnemoError::invalid_field(
            field,
            format!("{} must not be empty", field),
            ErrorCode::ValEmptyField,
        ));
    }
    let len = value.chars().count();
    if len > max_chars {
        return Err(MnemoError::invalid_field(
            field,
            format!("{} must be at most {} characters, got {}", field, max_chars, len),
            ErrorCode::ValTooLong,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concept_length_boundary() {
        let v = CardValidator;
        assert!(v.validate_concept(&"a".repeat(100)).is_ok());
        let err = v.validate_concept(&"a".repeat(101)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValTooLong);
    }

    #[test]
    fn test_answer_length_boundary() {
        let v = CardValidator;
        assert!(v.validate_answer(&"b".repeat(200)).is_ok());
        assert!(v.validate_answer(&"b".repeat(201)).is_err());
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let v = CardValidator;
        // 100 Hangul syllables are 300 bytes.
        assert!(v.validate_concept(&"가".repeat(100)).is_ok());
    }

    #[test]
    fn test_empty_fields() {
        let v = CardValidator;
        let err = v.validate("", "answer").unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValEmptyField);
        assert!(v.validate("concept", "   ").is_err());
    }

    #[test]
    fn test_card_type() {
        let v = CardValidator;
        assert_eq!(v.validate_card_type("concept").unwrap(), CardType::Concept);
        assert!(v.validate_card_type("phrase").is_err());
    }
}
