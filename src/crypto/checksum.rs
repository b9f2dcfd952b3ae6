//! EIP-55 checksummed hex addresses

use super::hash::keccak256;
use crate::types::{ADDR_HASH_LEN, ETH_ADDR_STR_LEN};

const HEXDIGITS: &[u8; 16] = b"0123456789abcdef";

/// Render a 20-byte account id as `0x` + 40 EIP-55 cased hex digits.
///
/// Letters are uppercased when the matching nibble of
/// `keccak256(lowercase_hex)` is 8 or more; digits never change.
pub fn checksum_hex(address: &[u8; ADDR_HASH_LEN]) -> [u8; ETH_ADDR_STR_LEN] {
    let mut lower = [0u8; 2 * ADDR_HASH_LEN];
    for (i, byte) in address.iter().enumerate() {
        lower[2 * i] = HEXDIGITS[(byte >> 4) as usize];
        lower[2 * i + 1] = HEXDIGITS[(byte & 0x0f) as usize];
    }
    let hash = keccak256(&lower);

    let mut out = [0u8; ETH_ADDR_STR_LEN];
    out[0] = b'0';
    out[1] = b'x';
    for (i, &ch) in lower.iter().enumerate() {
        let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
        out[2 + i] = if ch.is_ascii_alphabetic() && nibble >= 8 {
            ch.to_ascii_uppercase()
        } else {
            ch
        };
    }
    out
}

/// Convert raw address bytes to a checksummed Ethereum address.
///
/// Only the last 20 bytes are used, so a full Keccak digest can be passed.
pub fn to_checksum_address(address: &[u8]) -> String {
    let mut id = [0u8; ADDR_HASH_LEN];
    let take = address.len().min(ADDR_HASH_LEN);
    id[ADDR_HASH_LEN - take..].copy_from_slice(&address[address.len() - take..]);

    let encoded = checksum_hex(&id);
    // checksum_hex only emits ASCII
    encoded.iter().map(|&b| b as char).collect()
}
