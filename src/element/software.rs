//! Software secure element
//!
//! Derives BIP-32 nodes from a seed held in a `secrecy` box and signs with
//! RFC 6979 deterministic ECDSA. Host builds and the CLI use it; device
//! builds bind [`SecureElement`] to the hardware instead.
//!
//! SECURITY: the derived scalar only lives in the lent scratch region and
//! in secp256k1 key values that are erased before returning.

use bitcoin::bip32::{ChildNumber, Xpriv};
use bitcoin::secp256k1::{All, Message, PublicKey, Secp256k1, SecretKey};
use bitcoin::Network;
use bip39::Mnemonic;
use secrecy::{ExposeSecret, SecretSlice};
use zeroize::Zeroizing;

use super::{OracleFault, OracleOutput, Operation, SecureElement};
use crate::error::{SignerError, SignerResult};
use crate::security::KeyScratch;
use crate::session::DerivationPath;
use crate::types::UncompressedPoint;

/// BIP-32 seed length bounds
const MIN_SEED_LEN: usize = 16;
const MAX_SEED_LEN: usize = 64;

pub struct SoftwareElement {
    seed: SecretSlice<u8>,
    secp: Secp256k1<All>,
}

impl SoftwareElement {
    pub fn from_seed(seed: &[u8]) -> SignerResult<Self> {
        if !(MIN_SEED_LEN..=MAX_SEED_LEN).contains(&seed.len()) {
            return Err(SignerError::invalid_crypto_settings(format!(
                "seed must be {}..={} bytes, got {}",
                MIN_SEED_LEN,
                MAX_SEED_LEN,
                seed.len()
            )));
        }

        Ok(Self {
            seed: SecretSlice::from(seed.to_vec()),
            secp: Secp256k1::new(),
        })
    }

    /// Build from a BIP-39 phrase (English wordlist, NFKD-normalized input)
    pub fn from_mnemonic(phrase: &str, passphrase: &str) -> SignerResult<Self> {
        let mnemonic = Mnemonic::parse_normalized(phrase)
            .map_err(|e| SignerError::invalid_crypto_settings(format!("mnemonic: {}", e)))?;
        let seed = Zeroizing::new(mnemonic.to_seed_normalized(passphrase));
        Self::from_seed(&seed[..])
    }

    /// Write the private scalar for `path` into `scratch`
    fn derive_node(&self, path: &DerivationPath, scratch: &mut KeyScratch) -> Result<(), OracleFault> {
        let mut master = Xpriv::new_master(Network::Bitcoin, self.seed.expose_secret())
            .map_err(|e| OracleFault::new(format!("master key: {}", e)))?;

        let children: Vec<ChildNumber> = path.indices().iter().map(|&i| ChildNumber::from(i)).collect();
        let derived = master.derive_priv(&self.secp, &children);
        master.private_key.non_secure_erase();

        let mut child = derived.map_err(|e| OracleFault::new(format!("derive {}: {}", path, e)))?;
        scratch
            .as_bytes_mut()
            .copy_from_slice(&Zeroizing::new(child.private_key.secret_bytes())[..]);
        child.private_key.non_secure_erase();
        Ok(())
    }
}

impl SecureElement for SoftwareElement {
    fn derive_and_use(
        &mut self,
        path: &DerivationPath,
        operation: Operation<'_>,
        scratch: &mut KeyScratch,
    ) -> Result<OracleOutput, OracleFault> {
        self.derive_node(path, scratch)?;
        let mut secret = SecretKey::from_slice(scratch.as_bytes())
            .map_err(|e| OracleFault::new(format!("scalar: {}", e)))?;

        let result = match operation {
            Operation::PublicKey => {
                let public = PublicKey::from_secret_key(&self.secp, &secret);
                Ok(OracleOutput::Point(UncompressedPoint(public.serialize_uncompressed())))
            }
            Operation::Sign { digest, out } => {
                let message = Message::from_digest(*digest);
                let der = self.secp.sign_ecdsa(&message, &secret).serialize_der();
                if der.len() > out.len() {
                    Err(OracleFault::new(format!(
                        "signature needs {} bytes, {} available",
                        der.len(),
                        out.len()
                    )))
                } else {
                    out[..der.len()].copy_from_slice(&der);
                    Ok(OracleOutput::Signature { len: der.len() })
                }
            }
        };

        secret.non_secure_erase();
        result
    }
}

impl std::fmt::Debug for SoftwareElement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareElement").field("seed", &self.seed).finish()
    }
}
