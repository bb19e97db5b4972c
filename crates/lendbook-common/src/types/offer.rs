//! LenderOffer - One active liquidity position
//!
//! An offer is the unit of supply in the book: a lender, a remaining
//! capacity in smallest currency units, and a fixed APY in basis points
//! that never changes for the life of the offer. Key characteristics:
//! - `amount` only ever decreases (fills consume capacity)
//! - an offer with zero capacity is skipped by matching even while active
//! - `sequence` is assigned by the book at placement and orders equal-APY
//!   offers deterministically

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::{Amount, Bps};

/// Offer lifecycle errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OfferError {
    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Offer is not active")]
    Inactive,

    #[error("Fill exceeds available capacity: requested {requested}, available {available}")]
    ExceedsAvailable {
        requested: Amount,
        available: Amount,
    },
}

/// A lender's standing liquidity offer
///
/// Created when a lender supplies liquidity; consumed chunk by chunk as
/// loans match against it; deactivated on withdrawal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LenderOffer {
    /// Offer identity
    pub id: Uuid,

    /// Opaque lender identifier (address-equivalent)
    pub lender: String,

    /// Capacity still available to be matched (smallest currency unit)
    pub amount: Amount,

    /// Fixed APY in basis points, immutable for the offer's life
    pub apy_bps: Bps,

    /// Inactive offers are excluded from matching
    pub active: bool,

    /// Book-assigned submission order, tie-break for equal APYs
    pub sequence: u64,

    /// Timestamp of placement (Unix milliseconds)
    pub created_at: i64,

    /// Timestamp of last modification
    pub updated_at: i64,
}

impl LenderOffer {
    /// Create a new active offer
    pub fn new(lender: impl Into<String>, amount: Amount, apy_bps: Bps, sequence: u64) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: Uuid::now_v7(),
            lender: lender.into(),
            amount,
            apy_bps,
            active: true,
            sequence,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether matching may consume this offer
    #[inline]
    pub fn is_matchable(&self) -> bool {
        self.active && self.amount > 0
    }

    /// Consume capacity from the offer (a committed fill)
    pub fn consume(&mut self, amount: Amount) -> Result<(), OfferError> {
        if amount == 0 {
            return Err(OfferError::InvalidAmount);
        }

        if !self.active {
            return Err(OfferError::Inactive);
        }

        if amount > self.amount {
            return Err(OfferError::ExceedsAvailable {
                requested: amount,
                available: self.amount,
            });
        }

        self.amount -= amount;
        self.touch();
        Ok(())
    }

    /// Withdraw the offer, returning the capacity freed back to the lender
    pub fn deactivate(&mut self) -> Amount {
        let freed = self.amount;
        self.amount = 0;
        self.active = false;
        self.touch();
        freed
    }

    /// Update modification timestamp
    fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().timestamp_millis();
    }
}

impl std::fmt::Display for LenderOffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Offer({} by {}, {} @ {}{})",
            self.id,
            self.lender,
            crate::format::format_units(self.amount),
            crate::format::format_bps(self.apy_bps),
            if self.active { "" } else { ", withdrawn" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_decrements_capacity() {
        let mut offer = LenderOffer::new("0xlender", 50_000_000, 360, 0);
        offer.consume(30_000_000).unwrap();
        assert_eq!(offer.amount, 20_000_000);
        assert!(offer.is_matchable());
    }

    #[test]
    fn test_consume_exceeding_capacity_fails() {
        let mut offer = LenderOffer::new("0xlender", 100, 360, 0);
        let err = offer.consume(150).unwrap_err();
        assert_eq!(
            err,
            OfferError::ExceedsAvailable {
                requested: 150,
                available: 100,
            }
        );
        assert_eq!(offer.amount, 100);
    }

    #[test]
    fn test_consume_zero_fails() {
        let mut offer = LenderOffer::new("0xlender", 100, 360, 0);
        assert_eq!(offer.consume(0).unwrap_err(), OfferError::InvalidAmount);
    }

    #[test]
    fn test_consume_inactive_fails() {
        let mut offer = LenderOffer::new("0xlender", 100, 360, 0);
        offer.deactivate();
        assert_eq!(offer.consume(10).unwrap_err(), OfferError::Inactive);
    }

    #[test]
    fn test_zero_capacity_not_matchable() {
        let mut offer = LenderOffer::new("0xlender", 100, 360, 0);
        offer.consume(100).unwrap();
        assert!(offer.active);
        assert!(!offer.is_matchable());
    }

    #[test]
    fn test_deactivate_frees_remaining() {
        let mut offer = LenderOffer::new("0xlender", 75, 400, 1);
        offer.consume(25).unwrap();
        let freed = offer.deactivate();
        assert_eq!(freed, 50);
        assert_eq!(offer.amount, 0);
        assert!(!offer.active);
    }
}
