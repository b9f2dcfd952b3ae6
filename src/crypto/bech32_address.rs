//! Bech32 address encoding
//!
//! Checksum and charset rules come from the `bech32` crate. This module
//! only owns which HRP and which regrouping mode reach it, and the
//! capacity check against the caller's buffer.

use bech32::{u5, ToBase32, Variant};

use crate::error::{SignerError, SignerResult};

/// Encoded length for `payload_len` bytes under `hrp`: hrp + '1' + data + checksum
pub fn encoded_len(hrp: &str, payload_len: usize, pad: bool) -> usize {
    let bits = payload_len * 8;
    let data = if pad { (bits + 4) / 5 } else { bits / 5 };
    hrp.len() + 1 + data + 6
}

/// Encode `payload` under `hrp` into a String.
///
/// `pad` selects whether the 8→5 bit regrouping pads the final group.
pub fn encode(hrp: &str, payload: &[u8], pad: bool) -> SignerResult<String> {
    let data: Vec<u5> = if pad {
        payload.to_base32()
    } else {
        let groups = bech32::convert_bits(payload, 8, 5, false)
            .map_err(|e| SignerError::invalid_crypto_settings(format!("bech32 regroup: {}", e)))?;
        groups
            .into_iter()
            .map(u5::try_from_u8)
            .collect::<Result<_, _>>()
            .map_err(|e| SignerError::invalid_crypto_settings(format!("bech32 regroup: {}", e)))?
    };

    bech32::encode(hrp, data, Variant::Bech32)
        .map_err(|e| SignerError::invalid_crypto_settings(format!("bech32 hrp '{}': {}", hrp, e)))
}

/// Encode into `out`, returning the number of bytes written.
///
/// Fails with `buffer_too_small` when the encoding does not fit; nothing
/// is written in that case.
pub fn encode_into(out: &mut [u8], hrp: &str, payload: &[u8], pad: bool) -> SignerResult<usize> {
    let needed = encoded_len(hrp, payload.len(), pad);
    if needed > out.len() {
        return Err(SignerError::buffer_too_small(format!(
            "bech32 address needs {} bytes, {} available",
            needed,
            out.len()
        )));
    }

    let address = encode(hrp, payload, pad)?;
    let bytes = address.as_bytes();
    out[..bytes.len()].copy_from_slice(bytes);
    Ok(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const G_HASH160: &str = "751e76e8199196d454941c45d1b3a323f1433bd6";

    #[test]
    fn test_encode_generator_hash() {
        let payload = hex::decode(G_HASH160).unwrap();
        assert_eq!(
            encode("cosmos", &payload, true).unwrap(),
            "cosmos1w508d6qejxtdg4y5r3zarvary0c5xw7k6ah60c"
        );
        assert_eq!(
            encode("evmos", &payload, true).unwrap(),
            "evmos1w508d6qejxtdg4y5r3zarvary0c5xw7kcux54s"
        );
    }

    #[test]
    fn test_encode_into_reports_length() {
        let payload = hex::decode(G_HASH160).unwrap();
        let mut out = [0u8; 50];
        let written = encode_into(&mut out, "cosmos", &payload, true).unwrap();
        assert_eq!(written, 45);
        assert_eq!(written, encoded_len("cosmos", 20, true));
        assert_eq!(&out[..written], b"cosmos1w508d6qejxtdg4y5r3zarvary0c5xw7k6ah60c");
        assert!(out[written..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_encode_into_too_small() {
        let payload = [0u8; 20];
        let mut out = [0u8; 44];
        let err = encode_into(&mut out, "cosmos", &payload, true).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::BufferTooSmall);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_rejects_bad_hrp() {
        let payload = [0u8; 20];
        assert!(encode("", &payload, true).is_err());
        assert!(encode("CosMos", &payload, true).is_err());
    }

    #[test]
    fn test_unpadded_rejects_ragged_tail() {
        // 20 bytes = 160 bits, divides by 5 evenly
        assert!(encode("cosmos", &[0u8; 20], false).is_ok());
        // 3 bytes = 24 bits leaves a non-zero remainder
        assert!(encode("cosmos", &[0xff; 3], false).is_err());
    }
}
