//! # Lendbook Common
//!
//! Shared types, errors, and protocol constants for the Lendbook
//! fixed-rate lending orderbook.
//!
//! ## Core Types
//!
//! - [`LenderOffer`]: one lender's standing liquidity position
//! - [`LoanRequest`]/[`BorrowerClass`]: a borrow request and its derived
//!   small/whale classification
//! - [`MatchChunk`]/[`MatchResult`]: the consumption trail of one match
//! - [`RateBand`]: the allowed band for lender-settable fixed APY
//!
//! ## Numeric model
//!
//! Amounts are `u64` in the smallest currency unit (6 decimals); rates are
//! `u32` basis points. The authoritative computation path is integer-only;
//! [`format`] holds the display-side `rust_decimal` renderers.

pub mod error;
pub mod format;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{BookError, LendbookError, MatchError, RateError, Result};
pub use types::{
    band::RateBand,
    fill::{LoanReceipt, MatchChunk, MatchResult},
    offer::{LenderOffer, OfferError},
    request::{BorrowerClass, LoanRequest},
    Amount, Bps,
};

/// Lendbook version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Decimal places of the pool currency (USDC-equivalent)
pub const UNIT_DECIMALS: u32 = 6;

/// Smallest-unit scale of the pool currency (10^6)
pub const UNIT_SCALE: u64 = 1_000_000;

/// Requests at or above this principal classify as whale borrowers
pub const WHALE_THRESHOLD: Amount = 1_000 * UNIT_SCALE;

/// Basis points in 100%
pub const BPS_DENOM: u64 = 10_000;

/// Absolute floor for any APY band edge (0.01%)
pub const MIN_APY_BPS: Bps = 1;

/// Absolute ceiling for any APY band edge (50%)
pub const MAX_APY_BPS: Bps = 5_000;

/// Default tolerance around the blended reference rate (0.2%)
pub const DEFAULT_BAND_DELTA_BPS: Bps = 20;

/// Permille denominator for reference-rate blend weights
pub const PERMILLE_DENOM: u32 = 1_000;

/// Default primary stable-rate weight (0.7)
pub const DEFAULT_PRIMARY_WEIGHT: u32 = 700;

/// Default secondary stable-rate weight (0.3)
pub const DEFAULT_SECONDARY_WEIGHT: u32 = 300;
