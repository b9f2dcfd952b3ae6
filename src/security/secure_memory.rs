//! Secure Memory Utilities
//!
//! Private key scratch handling:
//! - A fixed region the element derives into
//! - A scope guard that wipes it on every exit path
//! - A helper for checking that sensitive bytes were wiped

use std::fmt;
use std::ops::{Deref, DerefMut};
use zeroize::Zeroize;

/// Length of a secp256k1 private scalar
pub const PRIVATE_KEY_LEN: usize = 32;

/// Working region for one derived private scalar.
///
/// Owned by the session and lent to the element for a single
/// derive-and-use call. Outside such a call it must read as all zeros.
pub struct KeyScratch {
    data: [u8; PRIVATE_KEY_LEN],
}

impl KeyScratch {
    pub fn new() -> Self {
        Self {
            data: [0u8; PRIVATE_KEY_LEN],
        }
    }

    pub fn as_bytes(&self) -> &[u8; PRIVATE_KEY_LEN] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8; PRIVATE_KEY_LEN] {
        &mut self.data
    }

    pub fn is_zeroized(&self) -> bool {
        is_zeroized(&self.data)
    }

    pub fn zeroize(&mut self) {
        self.data.zeroize();
    }
}

impl Default for KeyScratch {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for KeyScratch {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for KeyScratch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyScratch")
            .field("zeroized", &self.is_zeroized())
            .finish()
    }
}

/// Borrow of the scratch region that wipes it when dropped.
///
/// Every derive-and-use call holds one of these for its whole body so
/// that `?` returns, early exits and panics all leave the region clean.
pub struct ScratchGuard<'a> {
    scratch: &'a mut KeyScratch,
}

impl<'a> ScratchGuard<'a> {
    pub fn new(scratch: &'a mut KeyScratch) -> Self {
        Self { scratch }
    }
}

impl Deref for ScratchGuard<'_> {
    type Target = KeyScratch;

    fn deref(&self) -> &Self::Target {
        self.scratch
    }
}

impl DerefMut for ScratchGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.scratch
    }
}

impl Drop for ScratchGuard<'_> {
    fn drop(&mut self) {
        self.scratch.zeroize();
    }
}

/// Validate that data appears to be properly zeroized
pub fn is_zeroized(data: &[u8]) -> bool {
    data.iter().all(|&b| b == 0)
}
