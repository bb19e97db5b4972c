//! Match output types
//!
//! A match produces an ordered list of chunks (consumption order), the
//! unfilled remainder, and the amount-weighted APY across the chunks. The
//! matcher never applies these to lender state itself; the caller commits
//! the chunk amounts back to the book transactionally.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Amount, Bps};

/// A portion of a single lender's offer consumed by one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchChunk {
    /// Offer the capacity was taken from
    pub offer_id: Uuid,

    /// Lender behind the offer
    pub lender: String,

    /// Capacity consumed (0 < amount <= offer.amount at match time)
    pub amount: Amount,

    /// APY copied from the offer at match time, immutable thereafter
    pub apy_bps: Bps,
}

/// Output of one matching operation
///
/// Invariant: `sum(chunks.amount) + remaining == requested` and
/// `fully_matched == (remaining == 0)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// Consumed chunks in consumption order
    pub chunks: Vec<MatchChunk>,

    /// Originally requested principal
    pub requested: Amount,

    /// Unmatched portion when pool liquidity was insufficient
    pub remaining: Amount,

    /// Whether the request was filled in full
    pub fully_matched: bool,

    /// Amount-weighted mean APY across chunks (0 when no chunks)
    pub weighted_apy_bps: Bps,
}

impl MatchResult {
    /// Assemble a result from the matcher's walk
    pub fn new(
        requested: Amount,
        chunks: Vec<MatchChunk>,
        remaining: Amount,
        weighted_apy_bps: Bps,
    ) -> Self {
        Self {
            chunks,
            requested,
            remaining,
            fully_matched: remaining == 0,
            weighted_apy_bps,
        }
    }

    /// Total principal matched across all chunks
    pub fn matched_amount(&self) -> Amount {
        self.chunks.iter().map(|c| c.amount).sum()
    }

    /// Number of distinct offers consumed
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}

/// Record of an executed loan returned to the borrower
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanReceipt {
    /// Loan identity
    pub loan_id: Uuid,

    /// Pool the loan was drawn from
    pub pool: String,

    /// Borrower identifier
    pub borrower: String,

    /// The committed match
    pub result: MatchResult,

    /// Execution timestamp (Unix milliseconds)
    pub executed_at: i64,
}

impl LoanReceipt {
    /// Create a receipt for a committed match
    pub fn new(pool: impl Into<String>, borrower: impl Into<String>, result: MatchResult) -> Self {
        Self {
            loan_id: Uuid::now_v7(),
            pool: pool.into(),
            borrower: borrower.into(),
            result,
            executed_at: chrono::Utc::now().timestamp_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(amount: Amount, apy_bps: Bps) -> MatchChunk {
        MatchChunk {
            offer_id: Uuid::now_v7(),
            lender: "0xlender".into(),
            amount,
            apy_bps,
        }
    }

    #[test]
    fn test_conservation() {
        let result = MatchResult::new(70, vec![chunk(50, 400), chunk(20, 360)], 0, 388);
        assert_eq!(result.matched_amount() + result.remaining, result.requested);
        assert!(result.fully_matched);
    }

    #[test]
    fn test_partial_fill_not_fully_matched() {
        let result = MatchResult::new(150, vec![chunk(100, 400)], 50, 400);
        assert!(!result.fully_matched);
        assert_eq!(result.matched_amount(), 100);
        assert_eq!(result.remaining, 50);
    }

    #[test]
    fn test_empty_result() {
        let result = MatchResult::new(30, Vec::new(), 30, 0);
        assert!(!result.fully_matched);
        assert_eq!(result.chunk_count(), 0);
        assert_eq!(result.weighted_apy_bps, 0);
    }
}
