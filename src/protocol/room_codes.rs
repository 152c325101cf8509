//! Room code generation and shape validation.
//!
//! Codes are 6 characters drawn from the full `A-Z0-9` alphabet (36 symbols).
//! Generation never retries on collision: the registry either lands on a
//! free code (overwhelmingly likely at any population this server is sized
//! for) or, on the rare collision, the caller treats it as a fresh room
//! replacing the old code's entry. See the registry for how that's handled.

use rand::Rng;

const ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LEN: usize = 6;

/// Generate a single random 6-character room code. No collision check: the
/// registry is the only thing that knows which codes are taken.
pub fn generate() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..ALPHABET.len());
            ALPHABET[idx] as char
        })
        .collect()
}

/// A code is well-formed if it is exactly 6 characters, all uppercase
/// ASCII letters or digits.
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LEN && code.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_codes_are_well_formed() {
        for _ in 0..200 {
            let code = generate();
            assert!(is_well_formed(&code), "{code} is not well-formed");
        }
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(!is_well_formed("ABC12"));
        assert!(!is_well_formed("ABCDEFG"));
        assert!(!is_well_formed(""));
    }

    #[test]
    fn rejects_lowercase_and_punctuation() {
        assert!(!is_well_formed("abcdef"));
        assert!(!is_well_formed("ABC-12"));
        assert!(!is_well_formed("ABC 12"));
    }

    #[test]
    fn accepts_all_digit_and_all_letter_codes() {
        assert!(is_well_formed("123456"));
        assert!(is_well_formed("ABCDEF"));
    }
}
