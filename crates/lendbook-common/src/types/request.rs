//! LoanRequest - One matching operation's input
//!
//! A request carries only the amount and the borrower identity. The
//! borrower class is derived per request by comparing the amount against
//! the pool's whale threshold and is never persisted.

use serde::{Deserialize, Serialize};

use super::Amount;

/// Borrower classification selecting the matching sort order
///
/// Small borrowers consume the cheapest liquidity first; whales consume the
/// most expensive first, leaving cheap liquidity for small borrowers later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BorrowerClass {
    /// Request below the whale threshold, matched lowest-APY-first
    Small,
    /// Request at or above the whale threshold, matched highest-APY-first
    Whale,
}

impl BorrowerClass {
    /// Classify a requested amount against a whale threshold
    ///
    /// The boundary itself classifies as whale.
    #[inline]
    pub fn classify(amount: Amount, whale_threshold: Amount) -> Self {
        if amount >= whale_threshold {
            BorrowerClass::Whale
        } else {
            BorrowerClass::Small
        }
    }
}

impl std::fmt::Display for BorrowerClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BorrowerClass::Small => write!(f, "small"),
            BorrowerClass::Whale => write!(f, "whale"),
        }
    }
}

/// A borrower's loan request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanRequest {
    /// Requested principal (smallest currency unit), must be positive
    pub amount: Amount,

    /// Opaque borrower identifier (address-equivalent)
    pub borrower: String,

    /// Request timestamp (Unix milliseconds)
    pub requested_at: i64,
}

impl LoanRequest {
    /// Create a new loan request
    pub fn new(borrower: impl Into<String>, amount: Amount) -> Self {
        Self {
            amount,
            borrower: borrower.into(),
            requested_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Derive the borrower class for a given whale threshold
    #[inline]
    pub fn class(&self, whale_threshold: Amount) -> BorrowerClass {
        BorrowerClass::classify(self.amount, whale_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WHALE_THRESHOLD;

    #[test]
    fn test_classify_below_threshold() {
        assert_eq!(
            BorrowerClass::classify(WHALE_THRESHOLD - 1, WHALE_THRESHOLD),
            BorrowerClass::Small
        );
    }

    #[test]
    fn test_classify_boundary_is_whale() {
        assert_eq!(
            BorrowerClass::classify(WHALE_THRESHOLD, WHALE_THRESHOLD),
            BorrowerClass::Whale
        );
    }

    #[test]
    fn test_classify_above_threshold() {
        assert_eq!(
            BorrowerClass::classify(WHALE_THRESHOLD * 10, WHALE_THRESHOLD),
            BorrowerClass::Whale
        );
    }

    #[test]
    fn test_request_class_uses_threshold() {
        let request = LoanRequest::new("0xborrower", 70);
        assert_eq!(request.class(50), BorrowerClass::Whale);
        assert_eq!(request.class(100), BorrowerClass::Small);
    }
}
