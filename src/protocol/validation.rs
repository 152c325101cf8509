//! Input validation for names and room codes arriving at the admission
//! surface and inside envelope payloads.

use super::room_codes;

const MAX_NAME_LEN: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty,
    TooLong { max: usize },
    BadRoomCodeShape,
}

impl ValidationError {
    pub fn message(&self) -> String {
        match self {
            Self::Empty => "must not be empty".to_string(),
            Self::TooLong { max } => format!("must be at most {max} characters"),
            Self::BadRoomCodeShape => "must be 6 uppercase letters or digits".to_string(),
        }
    }
}

/// A host or player display name: non-empty after trimming, at most
/// `MAX_NAME_LEN` characters.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty);
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong { max: MAX_NAME_LEN });
    }
    Ok(())
}

/// A room code as supplied by a client (join request or `?room=` query
/// parameter): must match the generator's own shape.
pub fn validate_room_code(code: &str) -> Result<(), ValidationError> {
    if room_codes::is_well_formed(code) {
        Ok(())
    } else {
        Err(ValidationError::BadRoomCodeShape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rejects_empty_and_whitespace_only_names() {
        assert_eq!(validate_name(""), Err(ValidationError::Empty));
        assert_eq!(validate_name("   "), Err(ValidationError::Empty));
    }

    #[test]
    fn accepts_trimmed_name_within_bounds() {
        assert!(validate_name("  Ada  ").is_ok());
    }

    #[test]
    fn rejects_overlong_name() {
        let long = "a".repeat(MAX_NAME_LEN + 1);
        assert_eq!(validate_name(&long), Err(ValidationError::TooLong { max: MAX_NAME_LEN }));
    }

    #[test]
    fn validate_room_code_matches_generator_shape() {
        assert!(validate_room_code("ABC123").is_ok());
        assert_eq!(validate_room_code("abc123"), Err(ValidationError::BadRoomCodeShape));
        assert_eq!(validate_room_code("ABC"), Err(ValidationError::BadRoomCodeShape));
    }

    fn expected_name_ok(raw: &str) -> bool {
        let trimmed = raw.trim();
        !trimmed.is_empty() && trimmed.chars().count() <= MAX_NAME_LEN
    }

    fn expected_room_code_ok(raw: &str) -> bool {
        raw.len() == 6 && raw.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    }

    proptest! {
        #[test]
        fn name_validation_matches_predicate(raw in proptest::collection::vec(proptest::char::range('a', 'z'), 0..=40)) {
            let candidate: String = raw.into_iter().collect();
            prop_assert_eq!(validate_name(&candidate).is_ok(), expected_name_ok(&candidate));
        }

        #[test]
        fn room_code_validation_matches_predicate(raw in proptest::collection::vec(any::<char>(), 0..=10)) {
            let candidate: String = raw.into_iter().collect();
            prop_assert_eq!(validate_room_code(&candidate).is_ok(), expected_room_code_ok(&candidate));
        }
    }
}
