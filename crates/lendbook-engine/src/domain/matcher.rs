//! Orderbook matching: fills a loan request by greedily consuming
//! lender offers in class-dependent rate order.
//!
//! The matcher is a pure function over an offer snapshot. It never
//! mutates the offers it is given; committing a fill against the live
//! book is the service layer's job, which lets the same code path serve
//! both dry-run quotes and real loans.

use lendbook_common::{
    Amount, BorrowerClass, LenderOffer, MatchChunk, MatchError, MatchResult, WHALE_THRESHOLD,
};
use serde::{Deserialize, Serialize};

/// Policy knobs for the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchPolicy {
    /// Requests at or above this amount are matched as whales:
    /// highest APY first instead of lowest first.
    pub whale_threshold: Amount,
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            whale_threshold: WHALE_THRESHOLD,
        }
    }
}

/// Matches `requested` micro-units against the given offers.
///
/// Small borrowers walk the book cheapest-first so they always get the
/// best available rate. Whale borrowers walk it most-expensive-first,
/// sweeping high-rate inventory and leaving cheap liquidity for the
/// crowd. Within a rate level, offers fill in book arrival order
/// (ascending `sequence`), so equal-rate lenders drain first-come
/// first-served and the result is deterministic for a given snapshot.
///
/// Offers that are inactive or fully consumed are skipped. The walk
/// stops as soon as the request is covered; a short book yields a
/// partial result with `remaining > 0` rather than an error, and the
/// caller decides whether partial fills are acceptable.
pub fn match_request(
    requested: Amount,
    offers: &[LenderOffer],
    policy: &MatchPolicy,
) -> Result<MatchResult, MatchError> {
    if requested == 0 {
        return Err(MatchError::InvalidAmount);
    }

    let class = BorrowerClass::classify(requested, policy.whale_threshold);

    let mut book: Vec<&LenderOffer> = offers.iter().filter(|o| o.is_matchable()).collect();
    match class {
        BorrowerClass::Small => {
            book.sort_by(|a, b| a.apy_bps.cmp(&b.apy_bps).then(a.sequence.cmp(&b.sequence)))
        }
        BorrowerClass::Whale => {
            book.sort_by(|a, b| b.apy_bps.cmp(&a.apy_bps).then(a.sequence.cmp(&b.sequence)))
        }
    }

    let mut remaining = requested;
    let mut chunks = Vec::new();
    for offer in book {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(offer.amount);
        chunks.push(MatchChunk {
            offer_id: offer.id,
            lender: offer.lender.clone(),
            amount: take,
            apy_bps: offer.apy_bps,
        });
        remaining -= take;
    }

    let weighted_apy_bps = super::apy::weighted_average_apy(&chunks);
    Ok(MatchResult::new(requested, chunks, remaining, weighted_apy_bps))
}
