//! Core data types for the Lendbook matching engine

pub mod band;
pub mod fill;
pub mod offer;
pub mod request;

/// Monetary amount in the smallest currency unit (6-decimal stable-token
/// units; see [`crate::UNIT_SCALE`])
pub type Amount = u64;

/// Interest rate in basis points (1 bp = 0.01%; 10_000 bp = 100%)
pub type Bps = u32;
