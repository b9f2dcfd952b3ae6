//! Session configuration
//!
//! What a host hands the core before the first request: the derivation
//! path and the Bech32 prefix. Presets cover the two common setups.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::element::SecureElement;
use crate::error::{SignerError, SignerResult};
use crate::session::derivation_path::coin_types;
use crate::session::{DerivationPath, Session};
use crate::types::{DEFAULT_HRP, MAX_BECH32_HRP_LEN};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Path in `m/a'/b'/c'/d/e` notation
    pub derivation_path: DerivationPath,
    /// Bech32 human-readable prefix
    pub hrp: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            derivation_path: DerivationPath::default(),
            hrp: DEFAULT_HRP.to_string(),
        }
    }
}

impl SessionConfig {
    /// Ethermint chains: Ethereum coin type, `evmos` prefix
    pub fn ethermint() -> Self {
        Self {
            derivation_path: DerivationPath::bip44(coin_types::ETHEREUM, 0, 0),
            hrp: "evmos".to_string(),
        }
    }

    /// Cosmos Hub: coin type 118, `cosmos` prefix
    pub fn cosmos_hub() -> Self {
        Self {
            derivation_path: DerivationPath::bip44(coin_types::COSMOS, 0, 0),
            hrp: "cosmos".to_string(),
        }
    }

    pub fn from_json(json: &str) -> SignerResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> SignerResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    pub fn to_json(&self) -> SignerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject a prefix the registry would silently ignore, and anything
    /// that cannot appear in a Bech32 prefix.
    pub fn validate(&self) -> SignerResult<()> {
        if self.hrp.is_empty() || self.hrp.len() >= MAX_BECH32_HRP_LEN {
            return Err(SignerError::invalid_crypto_settings(format!(
                "hrp length must be 1..{}, got {}",
                MAX_BECH32_HRP_LEN,
                self.hrp.len()
            )));
        }
        if !self.hrp.bytes().all(|b| (33..=126).contains(&b)) {
            return Err(SignerError::invalid_crypto_settings("hrp must be printable ascii"));
        }
        if self.hrp.bytes().any(|b| b.is_ascii_uppercase()) && self.hrp.bytes().any(|b| b.is_ascii_lowercase()) {
            return Err(SignerError::invalid_crypto_settings("hrp must not mix case"));
        }
        Ok(())
    }

    /// Validate, then build a session with this path and prefix
    pub fn into_session<E: SecureElement>(self, element: E) -> SignerResult<Session<E>> {
        self.validate()?;
        let mut session = Session::with_path(element, self.derivation_path);
        session.set_hrp(&self.hrp);
        crate::log_info!(
            "config",
            "session configured",
            path = self.derivation_path,
            hrp = self.hrp,
        );
        Ok(session)
    }
}
