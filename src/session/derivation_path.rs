//! Session derivation path
//!
//! Exactly five BIP-32 indices, parsed from and rendered to the usual
//! `m/44'/60'/0'/0/0` notation. Hardened components carry the top bit.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SignerError;
use crate::types::HDPATH_LEN_DEFAULT;

/// Hardened offset for BIP-32 derivation
pub const HARDENED: u32 = 0x8000_0000;

/// Coin types from SLIP-0044
pub mod coin_types {
    pub const COSMOS: u32 = 118;
    pub const ETHEREUM: u32 = 60;
}

/// Single component of a derivation path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationComponent {
    pub index: u32,
    pub hardened: bool,
}

impl DerivationComponent {
    pub fn new(index: u32, hardened: bool) -> Self {
        Self { index, hardened }
    }

    pub fn from_raw(raw: u32) -> Self {
        Self::new(raw & !HARDENED, raw & HARDENED != 0)
    }

    /// Get the full index including hardened bit
    pub fn full_index(&self) -> u32 {
        if self.hardened {
            self.index | HARDENED
        } else {
            self.index
        }
    }
}

impl fmt::Display for DerivationComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hardened {
            write!(f, "{}'", self.index)
        } else {
            write!(f, "{}", self.index)
        }
    }
}

/// Five-level BIP-32 path used by every derive and sign call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DerivationPath([u32; HDPATH_LEN_DEFAULT]);

impl DerivationPath {
    pub const fn new(indices: [u32; HDPATH_LEN_DEFAULT]) -> Self {
        Self(indices)
    }

    /// `m/44'/coin'/account'/0/index`
    pub const fn bip44(coin_type: u32, account: u32, index: u32) -> Self {
        Self([44 | HARDENED, coin_type | HARDENED, account | HARDENED, 0, index])
    }

    pub fn indices(&self) -> &[u32; HDPATH_LEN_DEFAULT] {
        &self.0
    }

    pub fn components(&self) -> impl Iterator<Item = DerivationComponent> + '_ {
        self.0.iter().map(|&raw| DerivationComponent::from_raw(raw))
    }

    pub fn coin_type(&self) -> u32 {
        self.0[1] & !HARDENED
    }
}

impl Default for DerivationPath {
    /// `m/44'/60'/0'/0/0`
    fn default() -> Self {
        Self::bip44(coin_types::ETHEREUM, 0, 0)
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for component in self.components() {
            write!(f, "/{}", component)?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = SignerError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        let trimmed = path.trim();

        // Must start with m/
        let path_part = trimmed
            .strip_prefix("m/")
            .or_else(|| trimmed.strip_prefix("M/"))
            .ok_or_else(|| SignerError::invalid_crypto_settings("derivation path must start with 'm/'"))?;

        let mut indices = [0u32; HDPATH_LEN_DEFAULT];
        let mut count = 0;
        for component_str in path_part.split('/') {
            if count == HDPATH_LEN_DEFAULT {
                return Err(SignerError::invalid_crypto_settings(format!(
                    "derivation path must have exactly {} components: {}",
                    HDPATH_LEN_DEFAULT, trimmed
                )));
            }
            indices[count] = parse_component(component_str)?.full_index();
            count += 1;
        }

        if count != HDPATH_LEN_DEFAULT {
            return Err(SignerError::invalid_crypto_settings(format!(
                "derivation path must have exactly {} components: {}",
                HDPATH_LEN_DEFAULT, trimmed
            )));
        }

        Ok(Self(indices))
    }
}

impl TryFrom<String> for DerivationPath {
    type Error = SignerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DerivationPath> for String {
    fn from(path: DerivationPath) -> Self {
        path.to_string()
    }
}

/// Parse a single path component
fn parse_component(s: &str) -> Result<DerivationComponent, SignerError> {
    let trimmed = s.trim();

    if trimmed.is_empty() {
        return Err(SignerError::invalid_crypto_settings("empty path component"));
    }

    // Check for hardened indicator
    let (number_str, hardened) = match trimmed.strip_suffix(&['\'', 'h', 'H'][..]) {
        Some(rest) => (rest, true),
        None => (trimmed, false),
    };

    let index: u32 = number_str
        .parse()
        .map_err(|e| SignerError::invalid_crypto_settings(format!("invalid path component '{}': {}", s, e)))?;

    // Check for overflow (excluding hardened bit)
    if index >= HARDENED {
        return Err(SignerError::invalid_crypto_settings(format!(
            "path component {} exceeds maximum value",
            index
        )));
    }

    Ok(DerivationComponent::new(index, hardened))
}
