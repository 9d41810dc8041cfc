//! Pseudonym generation

use rand::distributions::{Alphanumeric, Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Character space a domain's pseudonyms are drawn from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PseudonymAlphabet {
    /// Decimal digits only
    #[default]
    Numeric,
    /// Upper- and lowercase ASCII letters plus digits
    Alphanumeric,
}

impl PseudonymAlphabet {
    pub fn as_str(self) -> &'static str {
        match self {
            PseudonymAlphabet::Numeric => "numeric",
            PseudonymAlphabet::Alphanumeric => "alphanumeric",
        }
    }
}

impl std::fmt::Display for PseudonymAlphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Source of fresh pseudonym strings
pub trait PseudonymGenerator: Send + Sync {
    /// Returns one pseudonym of exactly `length` characters
    fn generate(&self, length: usize, alphabet: PseudonymAlphabet) -> String;
}

/// Draws every character independently from the thread-local generator.
///
/// Pseudonyms only need to be fresh, not secret, and collisions between them
/// are tolerated.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPseudonymGenerator;

impl PseudonymGenerator for RandomPseudonymGenerator {
    fn generate(&self, length: usize, alphabet: PseudonymAlphabet) -> String {
        let mut rng = rand::thread_rng();
        match alphabet {
            PseudonymAlphabet::Numeric => {
                let digits = Uniform::from(b'0'..=b'9');
                digits
                    .sample_iter(&mut rng)
                    .take(length)
                    .map(char::from)
                    .collect()
            }
            PseudonymAlphabet::Alphanumeric => (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(length)
                .map(char::from)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_pseudonym() {
        let pseudonym = RandomPseudonymGenerator.generate(12, PseudonymAlphabet::Numeric);
        assert_eq!(pseudonym.len(), 12);
        assert!(pseudonym.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_alphanumeric_pseudonym() {
        let pseudonym = RandomPseudonymGenerator.generate(40, PseudonymAlphabet::Alphanumeric);
        assert_eq!(pseudonym.len(), 40);
        assert!(pseudonym.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_zero_length() {
        assert!(RandomPseudonymGenerator
            .generate(0, PseudonymAlphabet::Numeric)
            .is_empty());
    }

    #[test]
    fn test_alphabet_serde() {
        let alphabet: PseudonymAlphabet = serde_json::from_str("\"alphanumeric\"").unwrap();
        assert_eq!(alphabet, PseudonymAlphabet::Alphanumeric);
        assert_eq!(PseudonymAlphabet::default(), PseudonymAlphabet::Numeric);
    }
}
