//! Random password generation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use filler_types::{FillerError, Result};

use crate::entropy::SecureRandom;

/// Random bytes behind every password (128 bits).
pub const PASSWORD_BYTES: usize = 16;

/// Longest possible password: unpadded base64 of [`PASSWORD_BYTES`].
pub const PASSWORD_MAX_LEN: usize = 22;

// A source that keeps producing passwords made only of trimmed characters
// is not random.
const MAX_DRAWS: usize = 4;

/// Produces random passwords.
#[derive(Debug, Clone)]
pub struct SecretFactory {
    random: SecureRandom,
}

impl SecretFactory {
    /// Create a factory drawing from `random`.
    pub fn new(random: SecureRandom) -> Self {
        Self { random }
    }

    /// Generate one password.
    pub fn new_password(&self) -> Result<String> {
        for _ in 0..MAX_DRAWS {
            let bytes: [u8; PASSWORD_BYTES] = self.random.bytes()?;
            let password = encode_password(&bytes);
            if !password.is_empty() {
                return Ok(password);
            }
        }

        Err(FillerError::RandomSource(format!(
            "random source '{}' produced {} unusable passwords in a row",
            self.random.source_name(),
            MAX_DRAWS
        )))
    }

    /// Generate `count` passwords, in order.
    pub fn new_password_array(&self, count: usize) -> Result<Vec<String>> {
        (0..count).map(|_| self.new_password()).collect()
    }
}

/// Render random bytes as a password.
///
/// URL-safe base64 without padding, with leading and trailing `-`/`_`
/// trimmed so the result never looks like a command-line flag.
pub fn encode_password(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD
        .encode(bytes)
        .trim_matches(|c| c == '-' || c == '_')
        .to_string()
}

/// Whether `s` satisfies the password policy.
pub fn is_valid_password(s: &str) -> bool {
    let in_alphabet = s
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    let trimmed = !s.starts_with(['-', '_']) && !s.ends_with(['-', '_']);

    !s.is_empty() && s.len() <= PASSWORD_MAX_LEN && in_alphabet && trimmed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::testing::{ConstantEntropy, FailingEntropy};
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_passwords_follow_policy_and_are_unique() {
        let factory = SecretFactory::new(SecureRandom::system());
        let mut seen = HashSet::new();

        for _ in 0..10_000 {
            let password = factory.new_password().unwrap();
            assert!(is_valid_password(&password), "bad password: {}", password);
            assert!(seen.insert(password), "duplicate password generated");
        }
    }

    #[test]
    fn test_password_array_length_and_order() {
        let factory = SecretFactory::new(SecureRandom::system());
        let passwords = factory.new_password_array(3).unwrap();

        assert_eq!(passwords.len(), 3);
        assert_ne!(passwords[0], passwords[1]);
        assert!(factory.new_password_array(0).unwrap().is_empty());
    }

    #[test]
    fn test_random_source_failure_propagates() {
        let factory = SecretFactory::new(SecureRandom::from_source(FailingEntropy));
        assert!(matches!(factory.new_password(), Err(FillerError::RandomSource(_))));
    }

    #[test]
    fn test_degenerate_source_is_rejected() {
        // 0xff bytes encode to nothing but underscores
        let factory = SecretFactory::new(SecureRandom::from_source(ConstantEntropy(0xff)));
        assert!(matches!(factory.new_password(), Err(FillerError::RandomSource(_))));
    }

    #[test]
    fn test_encode_trims_punctuation() {
        assert_eq!(encode_password(&[0xfb, 0xef, 0xbe]), "");
        assert_eq!(encode_password(&[0x00; 3]), "AAAA");
        assert!(!is_valid_password("-abc"));
        assert!(!is_valid_password("abc_"));
        assert!(!is_valid_password("a+b"));
        assert!(is_valid_password("a-b_c"));
    }

    proptest! {
        #[test]
        fn prop_encoded_bytes_fit_policy(bytes in proptest::array::uniform16(any::<u8>())) {
            let password = encode_password(&bytes);
            prop_assume!(!password.is_empty());
            prop_assert!(is_valid_password(&password));
        }
    }
}
