//! In-memory element double for host-side tests.
//!
//! Holds one fixed secp256k1 scalar, signs with RFC 6979 so repeated
//! requests are byte-identical, and can be told to fault. Each call
//! writes the scalar into the lent scratch region first, the same way
//! a device derives into application RAM, so tests can check that the
//! core wipes it afterwards.

use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

use super::{OracleFault, OracleOutput, Operation, SecureElement};
use crate::security::KeyScratch;
use crate::session::DerivationPath;
use crate::types::UncompressedPoint;

pub struct MockElement {
    secret: [u8; 32],
    point: Option<UncompressedPoint>,
    fault: Option<String>,
    calls: usize,
    dirty_entries: usize,
    last_path: Option<DerivationPath>,
}

impl MockElement {
    /// Element whose every path derives to `secret`
    pub fn new(secret: [u8; 32]) -> Self {
        Self {
            secret,
            point: None,
            fault: None,
            calls: 0,
            dirty_entries: 0,
            last_path: None,
        }
    }

    /// Element holding the scalar 1, whose public point is the generator
    pub fn generator() -> Self {
        let mut secret = [0u8; 32];
        secret[31] = 1;
        Self::new(secret)
    }

    /// Return `point` for public key requests instead of deriving it
    pub fn with_point(mut self, point: UncompressedPoint) -> Self {
        self.point = Some(point);
        self
    }

    /// Make every following call fail after the scalar was written
    pub fn fail_with(&mut self, detail: impl Into<String>) {
        self.fault = Some(detail.into());
    }

    pub fn clear_fault(&mut self) {
        self.fault = None;
    }

    /// Number of derive-and-use calls received
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Calls that were handed a scratch region that was not all zeros
    pub fn dirty_entries(&self) -> usize {
        self.dirty_entries
    }

    pub fn last_path(&self) -> Option<DerivationPath> {
        self.last_path
    }

    pub fn secret(&self) -> &[u8; 32] {
        &self.secret
    }
}

impl SecureElement for MockElement {
    fn derive_and_use(
        &mut self,
        path: &DerivationPath,
        operation: Operation<'_>,
        scratch: &mut KeyScratch,
    ) -> Result<OracleOutput, OracleFault> {
        self.calls += 1;
        self.last_path = Some(*path);
        if !scratch.is_zeroized() {
            self.dirty_entries += 1;
        }

        scratch.as_bytes_mut().copy_from_slice(&self.secret);
        if let Some(detail) = &self.fault {
            return Err(OracleFault::new(detail.clone()));
        }

        let secp = Secp256k1::new();
        let secret = SecretKey::from_slice(scratch.as_bytes())
            .map_err(|e| OracleFault::new(format!("scalar: {}", e)))?;

        match operation {
            Operation::PublicKey => {
                let point = match self.point {
                    Some(point) => point,
                    None => UncompressedPoint(PublicKey::from_secret_key(&secp, &secret).serialize_uncompressed()),
                };
                Ok(OracleOutput::Point(point))
            }
            Operation::Sign { digest, out } => {
                let der = secp.sign_ecdsa(&Message::from_digest(*digest), &secret).serialize_der();
                if der.len() > out.len() {
                    return Err(OracleFault::new("signature output too small"));
                }
                out[..der.len()].copy_from_slice(&der);
                Ok(OracleOutput::Signature { len: der.len() })
            }
        }
    }
}
