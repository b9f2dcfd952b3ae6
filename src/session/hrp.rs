//! Bech32 human-readable prefix for the session
//!
//! Two ways in: [`HrpRegistry::set_hrp`] from configuration and
//! [`HrpRegistry::extract_hrp`] from an inbound request
//! (`[len][len ASCII bytes]` at some offset).

use crate::error::{SignerError, SignerResult};
use crate::types::{DEFAULT_HRP, MAX_BECH32_HRP_LEN};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HrpRegistry {
    hrp: String,
}

impl HrpRegistry {
    pub fn new() -> Self {
        Self {
            hrp: DEFAULT_HRP.to_string(),
        }
    }

    pub fn hrp(&self) -> &str {
        &self.hrp
    }

    pub fn len(&self) -> usize {
        self.hrp.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hrp.is_empty()
    }

    /// Replace the prefix when `value` is shorter than `MAX_BECH32_HRP_LEN`.
    ///
    /// Longer values are ignored without error and the previous prefix
    /// stays in place. Callers that need to know should compare
    /// [`HrpRegistry::hrp`] afterwards.
    // FIXME: silent no-op kept for wire compatibility; an explicit error
    // would be the better contract once the dispatcher can surface it.
    pub fn set_hrp(&mut self, value: &str) {
        if value.len() < MAX_BECH32_HRP_LEN {
            self.hrp = value.to_string();
        } else {
            crate::log_warn!(
                "hrp",
                "ignoring oversized prefix",
                len = value.len(),
                max = MAX_BECH32_HRP_LEN,
            );
        }
    }

    /// Read a length-prefixed prefix out of `request` at `offset`.
    ///
    /// Aborts with `data_invalid` when the length byte is missing, the
    /// declared length is 0 or above `MAX_BECH32_HRP_LEN`, the bytes are
    /// not all there, or they are not printable ASCII. Once the length
    /// byte has been reached the previous prefix is cleared, so an
    /// aborted extraction leaves the registry empty.
    pub fn extract_hrp(&mut self, request: &[u8], offset: usize) -> SignerResult<u8> {
        let len_byte = request
            .get(offset)
            .copied()
            .ok_or_else(|| SignerError::data_invalid(format!("no hrp length at offset {}", offset)))?;

        self.hrp.clear();

        let len = len_byte as usize;
        if len == 0 || len > MAX_BECH32_HRP_LEN {
            return Err(SignerError::data_invalid(format!("hrp length {} out of range", len)));
        }

        let start = offset + 1;
        let bytes = request
            .get(start..start + len)
            .ok_or_else(|| SignerError::data_invalid(format!("hrp needs {} bytes after offset {}", len, offset)))?;

        if !bytes.iter().all(|b| (33..=126).contains(b)) {
            return Err(SignerError::data_invalid("hrp is not printable ascii"));
        }

        self.hrp = bytes.iter().map(|&b| b as char).collect();
        Ok(len_byte)
    }
}

impl Default for HrpRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_default_prefix() {
        let registry = HrpRegistry::new();
        assert_eq!(registry.hrp(), DEFAULT_HRP);
        assert_eq!(registry.len(), DEFAULT_HRP.len());
    }

    #[test]
    fn test_set_hrp() {
        let mut registry = HrpRegistry::new();
        registry.set_hrp("evmos");
        assert_eq!(registry.hrp(), "evmos");
    }

    #[test]
    fn test_set_hrp_overflow_is_ignored() {
        let mut registry = HrpRegistry::new();
        registry.set_hrp("evmos");

        let at_limit = "a".repeat(MAX_BECH32_HRP_LEN);
        registry.set_hrp(&at_limit);
        assert_eq!(registry.hrp(), "evmos");

        let over = "b".repeat(MAX_BECH32_HRP_LEN + 10);
        registry.set_hrp(&over);
        assert_eq!(registry.hrp(), "evmos");

        let just_under = "c".repeat(MAX_BECH32_HRP_LEN - 1);
        registry.set_hrp(&just_under);
        assert_eq!(registry.hrp(), just_under);
    }

    #[test]
    fn test_extract_hrp() {
        let mut registry = HrpRegistry::new();
        let request = [0xE0, 0x01, 0x00, 5, b'e', b'v', b'm', b'o', b's', 0xFF];
        assert_eq!(registry.extract_hrp(&request, 3).unwrap(), 5);
        assert_eq!(registry.hrp(), "evmos");
    }

    #[test]
    fn test_extract_accepts_max_len() {
        // set_hrp rejects this length, extraction does not
        let mut request = vec![MAX_BECH32_HRP_LEN as u8];
        request.extend(std::iter::repeat(b'z').take(MAX_BECH32_HRP_LEN));
        let mut registry = HrpRegistry::new();
        assert_eq!(registry.extract_hrp(&request, 0).unwrap() as usize, MAX_BECH32_HRP_LEN);
    }

    #[test]
    fn test_extract_missing_length_byte_keeps_prefix() {
        let mut registry = HrpRegistry::new();
        let err = registry.extract_hrp(&[1, 2, 3], 3).unwrap_err();
        assert_eq!(err.code, ErrorCode::DataInvalid);
        assert_eq!(registry.hrp(), DEFAULT_HRP);
    }

    #[test]
    fn test_extract_zero_length_clears_prefix() {
        let mut registry = HrpRegistry::new();
        let err = registry.extract_hrp(&[0, b'a'], 0).unwrap_err();
        assert!(err.is_abort());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_extract_oversized_length() {
        let mut request = vec![(MAX_BECH32_HRP_LEN + 1) as u8];
        request.extend(std::iter::repeat(b'a').take(MAX_BECH32_HRP_LEN + 1));
        let mut registry = HrpRegistry::new();
        assert!(registry.extract_hrp(&request, 0).unwrap_err().is_abort());
    }

    #[test]
    fn test_extract_truncated_payload() {
        let mut registry = HrpRegistry::new();
        let err = registry.extract_hrp(&[6, b'c', b'o', b's'], 0).unwrap_err();
        assert!(err.is_abort());
    }

    #[test]
    fn test_extract_rejects_non_printable() {
        let mut registry = HrpRegistry::new();
        assert!(registry.extract_hrp(&[3, b'a', b' ', b'b'], 0).unwrap_err().is_abort());
        assert!(registry.extract_hrp(&[2, 0xC3, 0xA9], 0).unwrap_err().is_abort());
    }
}
