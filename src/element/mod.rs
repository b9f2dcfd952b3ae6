//! Secure element boundary
//!
//! The element owns key derivation and the raw ECDSA primitive. The core
//! asks it to derive the key at a path and use it for one operation; it
//! lends the element a scratch region for the derived scalar and wipes
//! that region as soon as the call returns.
//!
//! Implementations:
//! - [`SoftwareElement`]: BIP-32 from a seed, RFC 6979 ECDSA (host builds, CLI)
//! - [`MockElement`]: fixed key, fault injection and call counting (tests)

pub mod mock;
pub mod software;

pub use mock::MockElement;
pub use software::SoftwareElement;

use thiserror::Error;

use crate::security::KeyScratch;
use crate::session::DerivationPath;
use crate::types::UncompressedPoint;

/// What to do with the derived key
#[derive(Debug)]
pub enum Operation<'a> {
    /// Produce the public point for the key
    PublicKey,
    /// Sign a 32-byte digest with a deterministic nonce, DER into `out`
    Sign {
        digest: &'a [u8; 32],
        out: &'a mut [u8],
    },
}

impl Operation<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::PublicKey => "public_key",
            Operation::Sign { .. } => "sign",
        }
    }
}

/// Result of a derive-and-use call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleOutput {
    Point(UncompressedPoint),
    /// Number of signature bytes written into the operation's `out`
    Signature { len: usize },
}

/// Opaque element fault.
///
/// The detail is for the log only; callers see `ledger_api_error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("secure element fault: {detail}")]
pub struct OracleFault {
    detail: String,
}

impl OracleFault {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// Capability to derive a key at a path and use it without exposing it
/// past the call.
pub trait SecureElement {
    /// Derive the key at `path` into `scratch` and run `operation` with it.
    ///
    /// The caller clears `scratch` afterwards regardless of the outcome.
    fn derive_and_use(
        &mut self,
        path: &DerivationPath,
        operation: Operation<'_>,
        scratch: &mut KeyScratch,
    ) -> Result<OracleOutput, OracleFault>;
}

impl<E: SecureElement + ?Sized> SecureElement for Box<E> {
    fn derive_and_use(
        &mut self,
        path: &DerivationPath,
        operation: Operation<'_>,
        scratch: &mut KeyScratch,
    ) -> Result<OracleOutput, OracleFault> {
        (**self).derive_and_use(path, operation, scratch)
    }
}
