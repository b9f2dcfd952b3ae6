//! Signing session
//!
//! Holds what the device keeps between requests: the derivation path,
//! the Bech32 prefix, the element handle and the private key scratch
//! region. Operations take `&mut self`, so only one runs at a time, and
//! each one snapshots the path and prefix when it starts.
//!
//! - [`Session::build_address`]: derive key, write pubkey + address
//! - [`Session::extract_public_key`]: derive key, write compressed pubkey
//! - [`Session::sign`]: Keccak-256 the transaction, sign the digest

pub mod address;
pub mod derivation_path;
pub mod hrp;
pub mod signing;

pub use derivation_path::{DerivationComponent, DerivationPath, HARDENED};
pub use hrp::HrpRegistry;
pub use signing::keccak_hash_message;

use crate::element::{OracleOutput, Operation, SecureElement};
use crate::error::{SignerError, SignerResult};
use crate::security::{KeyScratch, ScratchGuard};
use crate::types::UncompressedPoint;

pub struct Session<E: SecureElement> {
    element: E,
    path: Option<DerivationPath>,
    hrp: HrpRegistry,
    scratch: KeyScratch,
}

impl<E: SecureElement> Session<E> {
    /// New session with no path and the default prefix
    pub fn new(element: E) -> Self {
        Self {
            element,
            path: None,
            hrp: HrpRegistry::new(),
            scratch: KeyScratch::new(),
        }
    }

    pub fn with_path(element: E, path: DerivationPath) -> Self {
        let mut session = Self::new(element);
        session.set_path(path);
        session
    }

    pub fn set_path(&mut self, path: DerivationPath) {
        crate::log_debug!("session", "path configured", path = path);
        self.path = Some(path);
    }

    pub fn path(&self) -> Option<DerivationPath> {
        self.path
    }

    pub fn hrp(&self) -> &str {
        self.hrp.hrp()
    }

    /// See [`HrpRegistry::set_hrp`]; oversized values are ignored
    pub fn set_hrp(&mut self, value: &str) {
        self.hrp.set_hrp(value);
    }

    /// See [`HrpRegistry::extract_hrp`]
    pub fn extract_hrp(&mut self, request: &[u8], offset: usize) -> SignerResult<u8> {
        self.hrp.extract_hrp(request, offset)
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut E {
        &mut self.element
    }

    /// The private key region; all zeros whenever no call is running
    pub fn scratch(&self) -> &KeyScratch {
        &self.scratch
    }

    pub fn into_element(self) -> E {
        self.element
    }

    fn configured_path(&self) -> SignerResult<DerivationPath> {
        self.path
            .ok_or_else(|| SignerError::invalid_crypto_settings("derivation path not configured"))
    }

    /// Run one derive-and-use call. The scratch region is wiped when the
    /// guard drops, whatever the element returned.
    fn derive_and_use(&mut self, path: &DerivationPath, operation: Operation<'_>) -> SignerResult<OracleOutput> {
        let mut guard = ScratchGuard::new(&mut self.scratch);
        let op = operation.name();

        self.element
            .derive_and_use(path, operation, &mut guard)
            .map_err(|fault| {
                crate::log_error!("session", "element fault", op = op, path = path, detail = fault.detail());
                SignerError::from(fault)
            })
    }

    /// Public point for the key at `path`
    fn public_point(&mut self, path: &DerivationPath) -> SignerResult<UncompressedPoint> {
        match self.derive_and_use(path, Operation::PublicKey)? {
            OracleOutput::Point(point) => Ok(point),
            OracleOutput::Signature { .. } => {
                crate::log_error!("session", "element answered public key request with a signature");
                Err(SignerError::ledger_api_error())
            }
        }
    }
}

impl<E: SecureElement + std::fmt::Debug> std::fmt::Debug for Session<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("element", &self.element)
            .field("path", &self.path.map(|p| p.to_string()))
            .field("hrp", &self.hrp.hrp())
            .field("scratch", &self.scratch)
            .finish()
    }
}
