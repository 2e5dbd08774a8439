//! Vault token holder
//!
//! The token is the only credential the client handles. It is copied at every
//! ownership transfer and zero-filled when it is invalidated or dropped, so a
//! secret never outlives the value that owns it.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Character used to overwrite an invalidated token
const NUL: char = '\0';

/// Owned, zero-on-drop vault token.
///
/// Not `Clone`: use [`VaultToken::copy_of`] to make
/// the copy explicit at each hand-off.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct VaultToken {
    secret: String,
}

impl VaultToken {
    /// Creates a token holding an owned copy of `secret`
    pub fn of(secret: &str) -> Self {
        VaultToken {
            secret: String::from(secret),
        }
    }

    /// Returns an independent copy. Invalidating either copy does not affect the other.
    pub fn copy_of(&self) -> Self {
        VaultToken::of(&self.secret)
    }

    /// Overwrites every character with NUL. Safe to call more than once.
    pub fn invalidate(&mut self) {
        let len = self.secret.chars().count();
        // zeroize wipes the whole allocation and truncates the string
        self.secret.zeroize();
        self.secret.extend(std::iter::repeat(NUL).take(len));
    }

    /// True if the token was invalidated, or was never set
    pub fn is_invalidated(&self) -> bool {
        self.secret.chars().all(|c| c == NUL)
    }

    /// Borrow the secret. The borrow cannot outlive the token, so callers
    /// must use it immediately (e.g. to build a request header).
    pub fn expose_secret(&self) -> &str {
        &self.secret
    }
}

impl fmt::Debug for VaultToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultToken(***)")
    }
}
