// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Salted, iterated password hashing for cached credentials.
//!
//! ## Parameters
//!
//! | Parameter | Value |
//! |-----------|-------|
//! | KDF | PBKDF2-HMAC-SHA256 |
//! | Iterations | 1024 |
//! | Output | 32 bytes |
//! | Salt | 16 bytes from the system CSPRNG |
//!
//! Hashing is CPU-bound and deliberately slow. Callers on an async runtime
//! should run it on a blocking thread and must not hold locks across it.

use std::num::NonZeroU32;

use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};

use super::password::Password;
use crate::error::HashingError;

/// Salt length in bytes.
pub const SALT_LEN: usize = 16;

/// Digest length in bytes (256 bits).
pub const HASH_LEN: usize = 32;

/// PBKDF2 iteration count.
pub const ITERATIONS: u32 = 1024;

const PBKDF2_ITERATIONS: NonZeroU32 = match NonZeroU32::new(ITERATIONS) {
    Some(n) => n,
    None => panic!("iteration count must be non-zero"),
};

/// Password hashing primitive.
#[derive(Clone, Debug)]
pub struct PasswordHasher {
    rng: SystemRandom,
}

impl PasswordHasher {
    /// Create a hasher, checking once that the system random source works.
    ///
    /// A failure here means the runtime cannot produce secure salts at all and
    /// should abort startup.
    pub fn new() -> Result<Self, HashingError> {
        let rng = SystemRandom::new();
        let mut first_salt = [0u8; SALT_LEN];
        rng.fill(&mut first_salt)
            .map_err(|_| HashingError::EntropyUnavailable)?;
        Ok(Self { rng })
    }

    /// Produce a fresh random salt.
    pub fn next_salt(&self) -> Result<[u8; SALT_LEN], HashingError> {
        let mut salt = [0u8; SALT_LEN];
        self.rng
            .fill(&mut salt)
            .map_err(|_| HashingError::EntropyUnavailable)?;
        Ok(salt)
    }

    /// Derive the digest for `password` under `salt`.
    ///
    /// The password is consumed and scrubbed when this returns.
    pub fn hash(&self, password: Password, salt: &[u8]) -> [u8; HASH_LEN] {
        let mut digest = [0u8; HASH_LEN];
        pbkdf2::derive(
            pbkdf2::PBKDF2_HMAC_SHA256,
            PBKDF2_ITERATIONS,
            salt,
            password.as_bytes(),
            &mut digest,
        );
        digest
    }

    /// Check `candidate` against a previously derived digest.
    ///
    /// Returns `false` for a digest of the wrong length instead of deriving a
    /// truncated key. The comparison itself is constant time.
    pub fn is_correct(&self, candidate: Password, salt: &[u8], expected_hash: &[u8]) -> bool {
        if expected_hash.len() != HASH_LEN {
            return false;
        }
        pbkdf2::verify(
            pbkdf2::PBKDF2_HMAC_SHA256,
            PBKDF2_ITERATIONS,
            salt,
            candidate.as_bytes(),
            expected_hash,
        )
        .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// PBKDF2-HMAC-SHA256("password123", [1, 2, 3], 1024, 32).
    const PASSWORD123_DIGEST: [u8; HASH_LEN] = [
        0xa5, 0x82, 0xf8, 0x66, 0xa3, 0x3a, 0x25, 0x9f, 0x5f, 0x8f, 0xcf, 0x84, 0x53, 0xea, 0x43,
        0xb0, 0x56, 0x49, 0x16, 0x4e, 0x46, 0x1e, 0x0e, 0xcd, 0x8a, 0xf8, 0xac, 0x26, 0xe7, 0xac,
        0x5b, 0x11,
    ];

    fn hasher() -> PasswordHasher {
        PasswordHasher::new().unwrap()
    }

    #[test]
    fn salt_is_sixteen_random_bytes() {
        let hasher = hasher();
        let a = hasher.next_salt().unwrap();
        let b = hasher.next_salt().unwrap();
        assert_eq!(a.len(), SALT_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn hash_matches_known_vector() {
        let digest = hasher().hash(Password::from("password123"), &[1, 2, 3]);
        assert_eq!(digest.len(), HASH_LEN);
        assert_eq!(digest, PASSWORD123_DIGEST);
    }

    #[test]
    fn hash_is_deterministic_for_same_salt() {
        let hasher = hasher();
        let salt = hasher.next_salt().unwrap();
        let first = hasher.hash(Password::from("s3cret"), &salt);
        let second = hasher.hash(Password::from("s3cret"), &salt);
        assert_eq!(first, second);
    }

    #[test]
    fn different_salts_give_different_hashes() {
        let hasher = hasher();
        let first = hasher.hash(Password::from("s3cret"), &[1, 2, 3]);
        let second = hasher.hash(Password::from("s3cret"), &[3, 2, 1]);
        assert_ne!(first, second);
    }

    #[test]
    fn is_correct_accepts_matching_password() {
        let hasher = hasher();
        let digest = hasher.hash(Password::from("password123"), &[1, 2, 3]);
        assert!(hasher.is_correct(Password::from("password123"), &[1, 2, 3], &digest));
    }

    #[test]
    fn is_correct_rejects_wrong_password() {
        let hasher = hasher();
        assert!(!hasher.is_correct(Password::from("wrong"), &[1, 2, 3], &PASSWORD123_DIGEST));
    }

    #[test]
    fn is_correct_rejects_wrong_salt() {
        let hasher = hasher();
        assert!(!hasher.is_correct(
            Password::from("password123"),
            &[1, 2, 4],
            &PASSWORD123_DIGEST
        ));
    }

    #[test]
    fn is_correct_returns_false_on_length_mismatch() {
        let hasher = hasher();
        // A truncated PBKDF2 output is a prefix of the full one; it must not verify.
        assert!(!hasher.is_correct(
            Password::from("password123"),
            &[1, 2, 3],
            &PASSWORD123_DIGEST[..16]
        ));
        assert!(!hasher.is_correct(Password::from("password123"), &[1, 2, 3], &[]));
        assert!(!hasher.is_correct(Password::from("u"), &[1, 2, 3], &[1, 2, 3]));
    }
}
