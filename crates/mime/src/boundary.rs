//! Multipart boundary tokens.

use crate::ensure;
use crate::protocol::MultipartError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng, thread_rng};
use std::sync::{Mutex, PoisonError};

/// Length of generated boundaries
pub const DEFAULT_BOUNDARY_LEN: usize = 16;

/// Shortest boundary the generator accepts
pub const MIN_BOUNDARY_LEN: usize = 8;

/// Longest boundary RFC 2046 allows
pub const MAX_BOUNDARY_LEN: usize = 70;

/// URL-safe base64 alphabet; every symbol is also an RFC 2045 token character
const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Produces random boundary tokens from `[A-Za-z0-9_-]`.
///
/// Tokens come from the thread-local CSPRNG unless the generator is
/// [seeded](Self::with_seed), in which case the sequence is reproducible.
#[derive(Debug)]
pub struct BoundaryGenerator {
    len: usize,
    rng: Option<Mutex<StdRng>>,
}

impl BoundaryGenerator {
    pub fn new() -> Self {
        Default::default()
    }

    /// A generator for tokens of `len` characters, between 8 and 70
    pub fn with_len(len: usize) -> Result<Self, MultipartError> {
        ensure!(
            (MIN_BOUNDARY_LEN..=MAX_BOUNDARY_LEN).contains(&len),
            MultipartError::invalid_field(format!(
                "boundary length {len} is outside {MIN_BOUNDARY_LEN}..={MAX_BOUNDARY_LEN}"
            ))
        );
        Ok(Self { len, rng: None })
    }

    /// Draws tokens from a deterministic generator seeded with `seed`
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Some(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    pub fn token_len(&self) -> usize {
        self.len
    }

    pub fn generate(&self) -> String {
        match &self.rng {
            Some(rng) => {
                let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
                self.token(&mut *rng)
            }
            None => self.token(&mut thread_rng()),
        }
    }

    fn token<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        (0..self.len).map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())])).collect()
    }
}

impl Default for BoundaryGenerator {
    fn default() -> Self {
        Self { len: DEFAULT_BOUNDARY_LEN, rng: None }
    }
}

/// Checks a caller supplied boundary against the RFC 2046 `boundary` grammar.
pub fn validate_boundary(boundary: &str) -> Result<(), MultipartError> {
    ensure!(
        (1..=MAX_BOUNDARY_LEN).contains(&boundary.len()),
        MultipartError::invalid_field(format!("boundary must be 1 to {MAX_BOUNDARY_LEN} characters long"))
    );
    ensure!(
        boundary.bytes().all(|b| b.is_ascii_alphanumeric() || b"'()+_,-./:=? ".contains(&b)),
        MultipartError::invalid_field(format!("boundary {boundary:?} contains a character outside bchars"))
    );
    ensure!(!boundary.ends_with(' '), MultipartError::invalid_field("boundary must not end with a space"));
    Ok(())
}
