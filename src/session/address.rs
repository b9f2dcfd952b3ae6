//! Address builder
//!
//! Response layout, written into the caller's buffer:
//!
//! ```text
//! [0 .. 33)        compressed public key
//! [33 .. 33 + n)   address string (n = Bech32 length, or 42 for "0x" hex)
//! ```
//!
//! The returned length is `33 + n`. Nothing follows the address; there is
//! no terminator. Capacity is checked against `33 + reserved_suffix`
//! before the element is touched (50 for Bech32, 20 for hex).

use crate::crypto::bech32_address;
use crate::crypto::{checksum_hex, compress_in_place, hash160, keccak256};
use crate::element::SecureElement;
use crate::error::{SignerError, SignerResult};
use crate::types::{
    AddressFamily, CompressedPublicKey, UncompressedPoint, ADDR_HASH_LEN, ETH_ADDR_STR_LEN,
    PK_LEN_SECP256K1,
};

use super::Session;

/// Scratch size that fits any response `build_address` can produce
const ADDRESS_RESPONSE_MAX: usize = 128;

impl<E: SecureElement> Session<E> {
    /// Derive the session key and write `pubkey || address` into `buffer`.
    ///
    /// On error the buffer holds no response: anything already written
    /// is cleared before returning.
    pub fn build_address(&mut self, buffer: &mut [u8], family: AddressFamily) -> SignerResult<usize> {
        if buffer.len() < family.min_capacity() {
            return Err(SignerError::buffer_too_small(format!(
                "{} address response needs at least {} bytes, got {}",
                family,
                family.min_capacity(),
                buffer.len()
            )));
        }

        let path = self.configured_path()?;
        let hrp = self.hrp.hrp().to_string();
        let mut point = self.public_point(&path)?;

        let written = match family {
            AddressFamily::Native => write_native(buffer, &mut point, &hrp),
            AddressFamily::Ethereum => write_ethereum(buffer, &mut point),
        };

        match written {
            Ok(len) => {
                crate::log_debug!(
                    "address",
                    "address built",
                    family = family,
                    path = path,
                    address = String::from_utf8_lossy(&buffer[PK_LEN_SECP256K1..len]),
                );
                Ok(len)
            }
            Err(e) => {
                buffer[..PK_LEN_SECP256K1].fill(0);
                Err(e)
            }
        }
    }

    /// Native (Bech32) address response
    pub fn fill_address(&mut self, buffer: &mut [u8]) -> SignerResult<usize> {
        self.build_address(buffer, AddressFamily::Native)
    }

    /// Ethereum-style address response
    pub fn fill_eth_address(&mut self, buffer: &mut [u8]) -> SignerResult<usize> {
        self.build_address(buffer, AddressFamily::Ethereum)
    }

    /// Write only the compressed public key for the session path
    pub fn extract_public_key(&mut self, out: &mut [u8]) -> SignerResult<CompressedPublicKey> {
        if out.len() < PK_LEN_SECP256K1 {
            return Err(SignerError::invalid_crypto_settings(format!(
                "public key output needs {} bytes, got {}",
                PK_LEN_SECP256K1,
                out.len()
            )));
        }

        let path = self.configured_path()?;
        let mut point = self.public_point(&path)?;
        let key = compress_in_place(&mut point);
        out[..PK_LEN_SECP256K1].copy_from_slice(key.as_bytes());
        Ok(key)
    }

    /// Build an address response and split it into key and string
    pub fn address(&mut self, family: AddressFamily) -> SignerResult<(CompressedPublicKey, String)> {
        let mut buffer = [0u8; ADDRESS_RESPONSE_MAX];
        let len = self.build_address(&mut buffer, family)?;

        let mut key = [0u8; PK_LEN_SECP256K1];
        key.copy_from_slice(&buffer[..PK_LEN_SECP256K1]);
        let address = String::from_utf8_lossy(&buffer[PK_LEN_SECP256K1..len]).into_owned();
        Ok((CompressedPublicKey(key), address))
    }
}

fn write_native(buffer: &mut [u8], point: &mut UncompressedPoint, hrp: &str) -> SignerResult<usize> {
    let key = compress_in_place(point);
    buffer[..PK_LEN_SECP256K1].copy_from_slice(key.as_bytes());

    let id = hash160(key.as_bytes());
    let addr_len = bech32_address::encode_into(&mut buffer[PK_LEN_SECP256K1..], hrp, &id, true)?;
    Ok(PK_LEN_SECP256K1 + addr_len)
}

fn write_ethereum(buffer: &mut [u8], point: &mut UncompressedPoint) -> SignerResult<usize> {
    let key = compress_in_place(point);
    buffer[..PK_LEN_SECP256K1].copy_from_slice(key.as_bytes());

    // X || Y is untouched by the in-place compression
    let digest = keccak256(point.coordinates());
    let mut id = [0u8; ADDR_HASH_LEN];
    id.copy_from_slice(&digest[32 - ADDR_HASH_LEN..]);

    let total = PK_LEN_SECP256K1 + ETH_ADDR_STR_LEN;
    let capacity = buffer.len();
    let out = buffer.get_mut(PK_LEN_SECP256K1..total).ok_or_else(|| {
        SignerError::buffer_too_small(format!(
            "ethereum address response needs {} bytes, got {}",
            total, capacity
        ))
    })?;
    out.copy_from_slice(&checksum_hex(&id));
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::MockElement;
    use crate::error::ErrorCode;
    use crate::session::DerivationPath;

    const G_COMPRESSED: &str = "0279be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798";

    fn session(element: MockElement) -> Session<MockElement> {
        Session::with_path(element, DerivationPath::new([0; 5]))
    }

    fn six() -> MockElement {
        let mut secret = [0u8; 32];
        secret[31] = 6;
        MockElement::new(secret)
    }

    #[test]
    fn test_native_generator_vector() {
        let mut s = session(MockElement::generator());
        let mut buffer = [0u8; 100];
        let len = s.fill_address(&mut buffer).unwrap();

        assert_eq!(len, 33 + 45);
        assert_eq!(hex::encode(&buffer[..33]), G_COMPRESSED);
        assert_eq!(&buffer[33..len], b"cosmos1w508d6qejxtdg4y5r3zarvary0c5xw7k6ah60c");
        assert!(buffer[len..].iter().all(|&b| b == 0));
        assert_eq!(s.element().last_path(), Some(DerivationPath::new([0; 5])));
    }

    #[test]
    fn test_native_uses_session_hrp() {
        let mut s = session(MockElement::generator());
        s.set_hrp("evmos");
        let (_, address) = s.address(AddressFamily::Native).unwrap();
        assert_eq!(address, "evmos1w508d6qejxtdg4y5r3zarvary0c5xw7kcux54s");
    }

    #[test]
    fn test_native_odd_y_vector() {
        let mut s = session(six());
        let (key, address) = s.address(AddressFamily::Native).unwrap();
        assert_eq!(key.to_hex(), "03fff97bd5755eeea420453a14355235d382f6472f8568a18b2f057a1460297556");
        assert_eq!(address, "cosmos10ldfeupqc9k2eaffep7cm6yml3ct3jwtcc7q6m");
    }

    #[test]
    fn test_ethereum_generator_vector() {
        let mut s = session(MockElement::generator());
        let mut buffer = [0u8; 75];
        let len = s.fill_eth_address(&mut buffer).unwrap();

        assert_eq!(len, 75);
        assert_eq!(hex::encode(&buffer[..33]), G_COMPRESSED);
        assert_eq!(&buffer[33..], b"0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf");
    }

    #[test]
    fn test_ethereum_odd_y_vector() {
        let mut s = session(six());
        let (_, address) = s.address(AddressFamily::Ethereum).unwrap();
        assert_eq!(address, "0xE57bFE9F44b819898F47BF37E5AF72a0783e1141");
    }

    #[test]
    fn test_capacity_gate_skips_element() {
        let mut s = session(MockElement::generator());

        let mut native = [0u8; 82];
        let err = s.build_address(&mut native, AddressFamily::Native).unwrap_err();
        assert_eq!(err.code, ErrorCode::BufferTooSmall);

        let mut eth = [0u8; 52];
        let err = s.build_address(&mut eth, AddressFamily::Ethereum).unwrap_err();
        assert_eq!(err.code, ErrorCode::BufferTooSmall);

        assert_eq!(s.element().calls(), 0);
    }

    #[test]
    fn test_ethereum_gate_passed_but_response_too_long() {
        let mut s = session(MockElement::generator());
        let mut buffer = [0u8; 60];
        let err = s.fill_eth_address(&mut buffer).unwrap_err();

        assert_eq!(err.code, ErrorCode::BufferTooSmall);
        assert_eq!(s.element().calls(), 1);
        assert!(buffer.iter().all(|&b| b == 0));
        assert!(s.scratch().is_zeroized());
    }

    #[test]
    fn test_long_hrp_overflows_minimum_buffer() {
        let mut s = session(MockElement::generator());
        s.set_hrp("averyveryverylonghrp");
        let mut buffer = [0u8; 83];
        let err = s.fill_address(&mut buffer).unwrap_err();

        assert_eq!(err.code, ErrorCode::BufferTooSmall);
        assert!(buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_empty_hrp_after_aborted_extract() {
        let mut s = session(MockElement::generator());
        assert!(s.extract_hrp(&[0], 0).is_err());
        let mut buffer = [0u8; 100];
        let err = s.fill_address(&mut buffer).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCryptoSettings);
        assert!(buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_fault_maps_to_ledger_api_error() {
        let mut s = session(MockElement::generator());
        s.element_mut().fail_with("os_perso_derive_node_bip32 exception");
        let mut buffer = [0u8; 100];

        for family in [AddressFamily::Native, AddressFamily::Ethereum] {
            let err = s.build_address(&mut buffer, family).unwrap_err();
            assert_eq!(err.code, ErrorCode::LedgerApiError);
            assert!(s.scratch().is_zeroized());
        }
        assert!(buffer.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_unconfigured_path_skips_element() {
        let mut s = Session::new(MockElement::generator());
        let mut buffer = [0u8; 100];
        let err = s.fill_address(&mut buffer).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCryptoSettings);
        assert_eq!(s.element().calls(), 0);
    }

    #[test]
    fn test_extract_public_key() {
        let mut s = session(MockElement::generator());
        let mut out = [0u8; 33];
        let key = s.extract_public_key(&mut out).unwrap();
        assert_eq!(hex::encode(out), G_COMPRESSED);
        assert_eq!(key.as_bytes(), &out);

        let mut short = [0u8; 32];
        let err = s.extract_public_key(&mut short).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCryptoSettings);
        assert_eq!(s.element().calls(), 1);
    }

    #[test]
    fn test_fixed_point_from_element() {
        let mut x = [0u8; 32];
        x[0] = 0xAB;
        let mut y = [0u8; 32];
        y[31] = 0x01;
        let element = MockElement::generator().with_point(UncompressedPoint::from_coordinates(&x, &y));
        let mut s = session(element);

        let (key, _) = s.address(AddressFamily::Ethereum).unwrap();
        assert_eq!(key.prefix(), 0x03);
        assert_eq!(key.x(), &x[..]);
    }
}
