//! Shared types for the signer core
//!
//! Byte layouts that cross the element boundary or land in a response
//! buffer are defined here so every module agrees on the offsets.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Lengths
// =============================================================================

/// Number of indices in a session derivation path
pub const HDPATH_LEN_DEFAULT: usize = 5;

/// Compressed secp256k1 public key (prefix + X)
pub const PK_LEN_SECP256K1: usize = 33;

/// Uncompressed SEC1 point (0x04 + X + Y)
pub const PK_LEN_SECP256K1_UNCOMPRESSED: usize = 65;

/// Bytes reserved after the key for a Bech32 address
pub const BECH32_ADDR_RESERVED: usize = 50;

/// Bytes reserved after the key for an Ethereum-style address
pub const ETH_ADDR_RESERVED: usize = 20;

/// "0x" + 40 hex characters
pub const ETH_ADDR_STR_LEN: usize = 42;

/// Raw account identifier length for both address families
pub const ADDR_HASH_LEN: usize = 20;

/// Upper bound of a DER-encoded secp256k1 signature
pub const DER_SIGNATURE_MAX_LEN: usize = 72;

/// Longest HRP accepted from a request
pub const MAX_BECH32_HRP_LEN: usize = 24;

/// HRP used until the session is reconfigured
pub const DEFAULT_HRP: &str = "cosmos";

// =============================================================================
// Address families
// =============================================================================

/// Address formats the builder can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AddressFamily {
    /// HRP + Bech32(RIPEMD160(SHA256(compressed key)))
    Native,
    /// EIP-55 "0x" address from Keccak256(X || Y)
    Ethereum,
}

impl AddressFamily {
    /// Bytes the response buffer must hold beyond the public key
    pub fn reserved_suffix(&self) -> usize {
        match self {
            AddressFamily::Native => BECH32_ADDR_RESERVED,
            AddressFamily::Ethereum => ETH_ADDR_RESERVED,
        }
    }

    /// Minimum response buffer capacity accepted before touching the element
    pub fn min_capacity(&self) -> usize {
        PK_LEN_SECP256K1 + self.reserved_suffix()
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Native => write!(f, "native"),
            AddressFamily::Ethereum => write!(f, "ethereum"),
        }
    }
}

// =============================================================================
// Key encodings
// =============================================================================

/// SEC1 uncompressed point as emitted by the secure element.
///
/// Layout: `0x04 || X (32, big-endian) || Y (32, big-endian)`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct UncompressedPoint(pub [u8; PK_LEN_SECP256K1_UNCOMPRESSED]);

impl UncompressedPoint {
    pub fn from_coordinates(x: &[u8; 32], y: &[u8; 32]) -> Self {
        let mut w = [0u8; PK_LEN_SECP256K1_UNCOMPRESSED];
        w[0] = 0x04;
        w[1..33].copy_from_slice(x);
        w[33..].copy_from_slice(y);
        Self(w)
    }

    pub fn x(&self) -> &[u8] {
        &self.0[1..33]
    }

    pub fn y(&self) -> &[u8] {
        &self.0[33..]
    }

    /// X || Y without the SEC1 tag
    pub fn coordinates(&self) -> &[u8] {
        &self.0[1..]
    }

    pub fn as_bytes(&self) -> &[u8; PK_LEN_SECP256K1_UNCOMPRESSED] {
        &self.0
    }
}

impl fmt::Debug for UncompressedPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UncompressedPoint({})", hex::encode(self.0))
    }
}

/// 33-byte compressed public key: parity prefix || X
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct CompressedPublicKey(pub [u8; PK_LEN_SECP256K1]);

impl CompressedPublicKey {
    pub fn as_bytes(&self) -> &[u8; PK_LEN_SECP256K1] {
        &self.0
    }

    pub fn prefix(&self) -> u8 {
        self.0[0]
    }

    pub fn y_is_odd(&self) -> bool {
        self.0[0] == 0x03
    }

    pub fn x(&self) -> &[u8] {
        &self.0[1..]
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for CompressedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompressedPublicKey({})", self.to_hex())
    }
}

impl fmt::Display for CompressedPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_capacity() {
        assert_eq!(AddressFamily::Native.min_capacity(), 83);
        assert_eq!(AddressFamily::Ethereum.min_capacity(), 53);
    }

    #[test]
    fn test_point_layout() {
        let point = UncompressedPoint::from_coordinates(&[0x11; 32], &[0x22; 32]);
        assert_eq!(point.0[0], 0x04);
        assert_eq!(point.x(), &[0x11; 32][..]);
        assert_eq!(point.y(), &[0x22; 32][..]);
        assert_eq!(point.coordinates().len(), 64);
    }

    #[test]
    fn test_family_serde() {
        let json = serde_json::to_string(&AddressFamily::Ethereum).unwrap();
        assert_eq!(json, "\"ethereum\"");
    }
}
