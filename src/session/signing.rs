//! Transaction signing
//!
//! The transaction bytes are hashed with Keccak-256 here; the element
//! signs the digest with the key at the session path and writes a DER
//! signature whose length it reports.

use crate::crypto::keccak256;
use crate::element::{OracleOutput, Operation, SecureElement};
use crate::error::{SignerError, SignerResult};
use crate::types::DER_SIGNATURE_MAX_LEN;

use super::Session;

/// Digest that gets signed for `message`
pub fn keccak_hash_message(message: &[u8]) -> [u8; 32] {
    keccak256(message)
}

impl<E: SecureElement> Session<E> {
    /// Sign `transaction` and write the DER signature into `signature`.
    ///
    /// Returns the signature length. The transaction content is not
    /// interpreted. On error `signature` is left all zeros.
    pub fn sign(&mut self, transaction: &[u8], signature: &mut [u8]) -> SignerResult<usize> {
        if signature.len() < DER_SIGNATURE_MAX_LEN {
            return Err(SignerError::buffer_too_small(format!(
                "signature buffer needs {} bytes, got {}",
                DER_SIGNATURE_MAX_LEN,
                signature.len()
            )));
        }

        let path = self.configured_path()?;
        let digest = keccak_hash_message(transaction);
        crate::log_debug!("signing", "signing transaction", path = path, digest = hex::encode(digest));

        let result = self.derive_and_use(
            &path,
            Operation::Sign {
                digest: &digest,
                out: &mut *signature,
            },
        );

        match result {
            Ok(OracleOutput::Signature { len }) if len > 0 && len <= signature.len() => Ok(len),
            Ok(other) => {
                crate::log_error!("signing", "unexpected element output", output = format!("{:?}", other));
                signature.fill(0);
                Err(SignerError::ledger_api_error())
            }
            Err(e) => {
                signature.fill(0);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::MockElement;
    use crate::error::ErrorCode;
    use crate::session::DerivationPath;
    use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};

    fn session() -> Session<MockElement> {
        Session::with_path(MockElement::generator(), DerivationPath::default())
    }

    #[test]
    fn test_keccak_hash_message() {
        assert_eq!(
            hex::encode(keccak_hash_message(b"hello")),
            "1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_sign_verifies_against_element_key() {
        let mut s = session();
        let tx = b"{\"chain_id\":\"evmos_9001-2\",\"msgs\":[]}";
        let mut sig = [0u8; 80];
        let len = s.sign(tx, &mut sig).unwrap();

        assert!(len > 0 && len <= DER_SIGNATURE_MAX_LEN);
        assert!(sig[len..].iter().all(|&b| b == 0));

        let secp = Secp256k1::new();
        let secret = SecretKey::from_slice(s.element().secret()).unwrap();
        let public = PublicKey::from_secret_key(&secp, &secret);
        let parsed = Signature::from_der(&sig[..len]).unwrap();
        let message = Message::from_digest(keccak_hash_message(tx));
        assert!(secp.verify_ecdsa(&message, &parsed, &public).is_ok());
    }

    #[test]
    fn test_sign_is_deterministic() {
        let mut s = session();
        let mut first = [0u8; 72];
        let mut second = [0u8; 72];
        let a = s.sign(b"payload", &mut first).unwrap();
        let b = s.sign(b"payload", &mut second).unwrap();
        assert_eq!(first[..a], second[..b]);
        assert_eq!(s.element().dirty_entries(), 0);
    }

    #[test]
    fn test_empty_transaction_is_signed() {
        let mut s = session();
        let mut sig = [0u8; 72];
        assert!(s.sign(&[], &mut sig).unwrap() > 0);
    }

    #[test]
    fn test_small_signature_buffer_skips_element() {
        let mut s = session();
        let mut sig = [0u8; 71];
        let err = s.sign(b"payload", &mut sig).unwrap_err();
        assert_eq!(err.code, ErrorCode::BufferTooSmall);
        assert_eq!(s.element().calls(), 0);
    }

    #[test]
    fn test_unconfigured_path() {
        let mut s = Session::new(MockElement::generator());
        let mut sig = [0u8; 72];
        let err = s.sign(b"payload", &mut sig).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCryptoSettings);
        assert_eq!(s.element().calls(), 0);
    }

    #[test]
    fn test_fault_wipes_scratch() {
        let mut s = session();
        s.element_mut().fail_with("CX_EC_INVALID_POINT");
        let mut sig = [0u8; 72];
        let err = s.sign(b"payload", &mut sig).unwrap_err();

        assert_eq!(err.code, ErrorCode::LedgerApiError);
        assert!(s.scratch().is_zeroized());
        assert!(sig.iter().all(|&b| b == 0));

        s.element_mut().clear_fault();
        assert!(s.sign(b"payload", &mut sig).is_ok());
        assert_eq!(s.element().dirty_entries(), 0);
    }
}
