//! Error types for the Lendbook system
//!
//! Provides a unified error type and domain-specific error variants

use thiserror::Error;

use crate::types::{Amount, Bps};

/// Result type alias using LendbookError
pub type Result<T> = std::result::Result<T, LendbookError>;

/// Unified error type for Lendbook operations
#[derive(Debug, Error)]
pub enum LendbookError {
    // Matching errors
    #[error("Matching error: {0}")]
    Match(#[from] MatchError),

    // Rate band / APY errors
    #[error("Rate error: {0}")]
    Rate(#[from] RateError),

    // Offer lifecycle errors
    #[error("Offer error: {0}")]
    Offer(#[from] crate::types::offer::OfferError),

    // Offer book errors
    #[error("Book error: {0}")]
    Book(#[from] BookError),

    // Policy-level rejection of a partial fill
    #[error("Insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: Amount, available: Amount },

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Matching operation errors
///
/// Insufficient liquidity is deliberately absent: the matcher reports a
/// partial fill through `MatchResult::remaining` and leaves the accept or
/// reject decision to the caller.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("Requested amount must be positive")]
    InvalidAmount,
}

/// Rate band and APY aggregation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RateError {
    #[error("Fixed APY {apy_bps}bp outside allowed band [{min_bps}bp, {max_bps}bp]")]
    OutOfRange {
        apy_bps: Bps,
        min_bps: Bps,
        max_bps: Bps,
    },

    #[error("Blend weights must sum to {expected}: got {primary} + {secondary}")]
    InvalidBlend {
        primary: u32,
        secondary: u32,
        expected: u32,
    },

    #[error("Rate feed unavailable: {0}")]
    FeedUnavailable(String),
}

/// Offer book errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("Pool not found: {0}")]
    PoolNotFound(String),

    #[error("Offer not found: {0}")]
    OfferNotFound(uuid::Uuid),

    #[error("Offer {offer_id} is not owned by {caller}")]
    NotOfferOwner { offer_id: uuid::Uuid, caller: String },

    #[error("Version conflict: expected {expected}, found {found}")]
    VersionConflict { expected: u64, found: u64 },
}

// Implement From for common external error types
impl From<serde_json::Error> for LendbookError {
    fn from(err: serde_json::Error) -> Self {
        LendbookError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for LendbookError {
    fn from(err: std::io::Error) -> Self {
        LendbookError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LendbookError::Rate(RateError::OutOfRange {
            apy_bps: 500,
            min_bps: 435,
            max_bps: 475,
        });
        assert!(err.to_string().contains("500bp"));
        assert!(err.to_string().contains("435bp"));
    }

    #[test]
    fn test_insufficient_liquidity_display() {
        let err = LendbookError::InsufficientLiquidity {
            requested: 150,
            available: 100,
        };
        assert!(err.to_string().contains("requested 150"));
        assert!(err.to_string().contains("available 100"));
    }

    #[test]
    fn test_version_conflict_display() {
        let err = BookError::VersionConflict {
            expected: 3,
            found: 5,
        };
        assert!(err.to_string().contains("expected 3"));
    }
}
