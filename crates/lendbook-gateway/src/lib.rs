//! Lendbook Gateway - REST surface for the lending book
//!
//! Exposes offer placement, quoting, loan execution, and rate band
//! queries over HTTP for UI preview and simulation callers. All domain
//! behavior lives in `lendbook-engine`; this crate wires configuration,
//! transport, and error mapping around it.

pub mod api;
pub mod config;

pub use config::GatewayConfig;
