//! HD signer core
//!
//! Cryptographic formatting and signing path of an embedded signing
//! device. Key material never leaves the secure element; this crate builds
//! the derivation request, feeds it the right digest and lays the results
//! out the way external verifiers expect.
//!
//! # Architecture
//!
//! - **session**: per-device state (path, HRP, key scratch) and the
//!   address builder and signing pipeline that run against it
//! - **element**: the secure element boundary, plus software and mock
//!   implementations
//! - **crypto**: point compression, hashes, Bech32 and EIP-55 encoding
//! - **security**: zeroizing key scratch and its scope guard
//! - **utils**: session configuration and structured logging
//!
//! # Response layout
//!
//! Address responses are `compressed pubkey (33) || address string`.
//! Signatures are DER, with the length reported by the element.
//!
//! # Example
//!
//! ```rust,ignore
//! use hd_signer_core::{AddressFamily, Session, SessionConfig, SoftwareElement};
//!
//! let element = SoftwareElement::from_mnemonic(phrase, "")?;
//! let mut session = SessionConfig::ethermint().into_session(element)?;
//! let (pubkey, address) = session.address(AddressFamily::Native)?;
//! ```

pub mod crypto;
pub mod element;
pub mod error;
pub mod security;
pub mod session;
pub mod types;
pub mod utils;

pub use error::{ErrorCode, SignerError, SignerResult};
pub use types::*;

pub use crypto::{checksum_hex, compress, decompress, hash160, keccak256, to_checksum_address};
pub use element::{MockElement, OracleFault, SecureElement, SoftwareElement};
pub use security::{KeyScratch, ScratchGuard};
pub use session::{keccak_hash_message, DerivationPath, HrpRegistry, Session};
pub use utils::config::SessionConfig;
