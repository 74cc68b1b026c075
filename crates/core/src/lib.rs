//! lineage-core
//!
//! Core library for extracting a serializable view of a smart-contract
//! codebase's inheritance structure from an external analyzer's model.
//!
//! This crate defines the analyzer-facing model, the explicit analyzer session,
//! analyzer backends, on-chain target validation, project configuration, and the
//! selection/tree-building services that produce the output document.
//!
//! All substantive logic lives here so it is fully testable and reusable from
//! multiple frontends.

pub mod analyzer;
pub mod config;
pub mod model;
pub mod onchain;
pub mod services;
pub mod session;

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
