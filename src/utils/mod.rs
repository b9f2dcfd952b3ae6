//! Utility modules
//!
//! - `config`: session presets and JSON loading
//! - `logging`: structured, redacting logger

pub mod config;
pub mod logging;

pub use config::SessionConfig;
