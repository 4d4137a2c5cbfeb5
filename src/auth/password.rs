// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Plaintext password holder.

use zeroize::Zeroizing;

/// A plaintext password that is zeroed when dropped.
///
/// Every path that consumes a `Password` (hashing, verification, a failed
/// login) releases the buffer through `Drop`, so the plaintext never outlives
/// the call that needed it. Clones are independent buffers and are scrubbed
/// the same way.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    pub fn new(plaintext: impl Into<String>) -> Self {
        Self(Zeroizing::new(plaintext.into()))
    }

    /// Borrow the plaintext bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Borrow the plaintext, e.g. to hand it to a directory transport.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Password {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Password {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Password(***)")
    }
}
