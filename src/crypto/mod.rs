//! Encoding primitives for the signer core
//!
//! This module provides the formatting side of the element boundary:
//! - Hash functions (SHA-256, Keccak-256, RIPEMD-160)
//! - Public key compression
//! - EIP-55 checksummed hex addresses
//! - Bech32 addresses

pub mod bech32_address;
pub mod checksum;
pub mod hash;
pub mod pubkey;

pub use checksum::{checksum_hex, to_checksum_address};
pub use hash::{hash160, keccak256, ripemd160, sha256};
pub use pubkey::{compress, compress_in_place, decompress};
