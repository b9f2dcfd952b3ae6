//! Unified error types for the signer core
//!
//! Every operation surfaces a single [`SignerError`] to the dispatcher.
//! Secure-element faults are collapsed into one opaque code so nothing
//! about the hardware state reaches the caller.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::element::OracleFault;

/// Status word sent back when inbound framing is malformed
pub const APDU_CODE_DATA_INVALID: u16 = 0x6984;

/// Main error type for all signer operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerError {
    pub code: ErrorCode,
    pub message: String,
}

impl SignerError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    // Convenience constructors
    pub fn buffer_too_small(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::BufferTooSmall, msg)
    }

    pub fn invalid_crypto_settings(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidCryptoSettings, msg)
    }

    pub fn ledger_api_error() -> Self {
        Self::new(ErrorCode::LedgerApiError, "secure element operation failed")
    }

    pub fn data_invalid(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DataInvalid, msg)
    }

    /// True when the request must be aborted rather than answered
    pub fn is_abort(&self) -> bool {
        self.code == ErrorCode::DataInvalid
    }

    /// Status word for protocol-level aborts
    pub fn status_word(&self) -> Option<u16> {
        match self.code {
            ErrorCode::DataInvalid => Some(APDU_CODE_DATA_INVALID),
            _ => None,
        }
    }
}

impl fmt::Display for SignerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for SignerError {}

/// Error codes surfaced to the command dispatcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Response buffer cannot hold the result
    BufferTooSmall,
    /// Session or key settings are unusable
    InvalidCryptoSettings,
    /// The secure element raised a fault
    LedgerApiError,
    /// Inbound request framing is malformed; the request is aborted
    DataInvalid,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::BufferTooSmall => "buffer_too_small",
            ErrorCode::InvalidCryptoSettings => "invalid_crypto_settings",
            ErrorCode::LedgerApiError => "ledger_api_error",
            ErrorCode::DataInvalid => "data_invalid",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type alias for signer operations
pub type SignerResult<T> = Result<T, SignerError>;

// Conversions from common error types

impl From<OracleFault> for SignerError {
    fn from(_: OracleFault) -> Self {
        SignerError::ledger_api_error()
    }
}

impl From<serde_json::Error> for SignerError {
    fn from(e: serde_json::Error) -> Self {
        SignerError::invalid_crypto_settings(format!("config: {}", e))
    }
}

impl From<hex::FromHexError> for SignerError {
    fn from(e: hex::FromHexError) -> Self {
        SignerError::invalid_crypto_settings(format!("hex: {}", e))
    }
}

impl From<std::io::Error> for SignerError {
    fn from(e: std::io::Error) -> Self {
        SignerError::invalid_crypto_settings(format!("io: {}", e))
    }
}
