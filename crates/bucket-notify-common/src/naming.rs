//! Readable random suffixes for resource names
//!
//! Bucket names are globally unique, so the desired base names are usually
//! taken. A suffix of alternating consonants and vowels (`-kotebisa`) keeps
//! the final name easy to read and type.

use rand::Rng;
use rand::seq::SliceRandom;

const CONSONANTS: &[u8] = b"bcdfghjklmnpqrstvwxyz";
const VOWELS: &[u8] = b"aeiou";

/// Number of consonant-vowel pairs in a suffix
pub const SUFFIX_PAIRS: usize = 4;

/// Random name suffix made of [`SUFFIX_PAIRS`] consonant-vowel pairs
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display, derive_more::Deref)]
pub struct Suffix(String);

impl Suffix {
    /// Wrap an existing suffix, e.g. for tests
    pub fn new(s: impl Into<String>) -> Self {
        Suffix(s.into())
    }

    /// Append this suffix to a base name
    pub fn apply(&self, base: &str) -> String {
        format!("{}-{}", base, self.0)
    }
}

/// Generate a new suffix from the given random source
pub fn generate_suffix<R: Rng + ?Sized>(rng: &mut R) -> Suffix {
    let mut suffix = String::with_capacity(SUFFIX_PAIRS * 2);
    for _ in 0..SUFFIX_PAIRS {
        // Both alphabets are non-empty, choose never returns None
        suffix.push(char::from(*CONSONANTS.choose(rng).unwrap_or(&b'b')));
        suffix.push(char::from(*VOWELS.choose(rng).unwrap_or(&b'a')));
    }
    Suffix(suffix)
}

/// Check that a string is shaped like a generated suffix
pub fn is_valid_suffix(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == SUFFIX_PAIRS * 2
        && bytes.chunks(2).all(|pair| {
            CONSONANTS.contains(&pair[0]) && VOWELS.contains(&pair[1])
        })
}

/// Name with an optional suffix applied
pub fn suffixed(base: &str, suffix: Option<&Suffix>) -> String {
    match suffix {
        Some(s) => s.apply(base),
        None => base.to_string(),
    }
}
