//! Pure domain logic: matching and rate aggregation.
//!
//! Nothing in this module touches shared state or performs IO. Both
//! submodules are deterministic functions over value types, which is
//! what makes quotes side-effect free and the property tests cheap.

pub mod apy;
pub mod matcher;

pub use apy::{weighted_average_apy, BandPolicy, RateBlend};
pub use matcher::{match_request, MatchPolicy};
