//! Security Module
//!
//! Handling of secret material on the core's side of the element
//! boundary: the private key scratch region and its scope guard.

pub mod secure_memory;

pub use secure_memory::*;
