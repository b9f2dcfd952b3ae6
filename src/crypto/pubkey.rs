//! Public key codec
//!
//! The element hands back SEC1 uncompressed points. Addresses and
//! responses use the 33-byte compressed form, built in place on the
//! point buffer: the parity of Y is read first, then byte 0 is
//! overwritten with the prefix and the first 33 bytes are taken.

use crate::error::{SignerError, SignerResult};
use crate::types::{CompressedPublicKey, UncompressedPoint, PK_LEN_SECP256K1};

/// Compress a point, reusing its buffer.
///
/// `point.0[64]` is the least significant byte of Y; its low bit decides
/// between `0x02` (even) and `0x03` (odd). Must be sampled before the
/// prefix write since both touch the same buffer.
pub fn compress_in_place(point: &mut UncompressedPoint) -> CompressedPublicKey {
    let y_odd = point.0[64] & 1 == 1;
    point.0[0] = if y_odd { 0x03 } else { 0x02 };

    let mut out = [0u8; PK_LEN_SECP256K1];
    out.copy_from_slice(&point.0[..PK_LEN_SECP256K1]);
    CompressedPublicKey(out)
}

/// Compress without disturbing the caller's point
pub fn compress(point: &UncompressedPoint) -> CompressedPublicKey {
    let mut scratch = *point;
    compress_in_place(&mut scratch)
}

/// Recover the full point from its compressed form
pub fn decompress(key: &CompressedPublicKey) -> SignerResult<UncompressedPoint> {
    let parsed = secp256k1::PublicKey::from_slice(key.as_bytes())
        .map_err(|e| SignerError::invalid_crypto_settings(format!("not a curve point: {}", e)))?;
    Ok(UncompressedPoint(parsed.serialize_uncompressed()))
}
