//! Offer Book Storage Implementations
//!
//! Storage backends for lender offers, keyed by pool.

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use lendbook_common::{
    Amount, BookError, Bps, LenderOffer, MatchChunk, OfferError, Result,
};

/// Immutable view of one pool at a point in time.
///
/// `version` increments on every mutation of the pool, so a snapshot
/// taken before matching can be re-validated at commit time: if the
/// version moved, the match was computed against stale offers and must
/// be recomputed.
#[derive(Debug, Clone, Serialize)]
pub struct PoolSnapshot {
    pub pool: String,
    pub version: u64,
    /// Offers in book arrival order (ascending `sequence`).
    pub offers: Vec<LenderOffer>,
}

impl PoolSnapshot {
    /// Snapshot of a pool that has never seen an offer.
    pub fn empty(pool: impl Into<String>) -> Self {
        Self {
            pool: pool.into(),
            version: 0,
            offers: Vec::new(),
        }
    }
}

/// Aggregate counters for one pool.
#[derive(Debug, Clone, Serialize)]
pub struct PoolStats {
    pub pool: String,
    pub version: u64,
    /// Every offer ever placed, including withdrawn and drained ones.
    pub total_offers: usize,
    /// Offers matching may still consume.
    pub open_offers: usize,
    /// Total capacity across open offers, in micro-units.
    pub available: Amount,
    /// Cheapest open rate, if any.
    pub best_apy_bps: Option<Bps>,
    /// Most expensive open rate, if any.
    pub worst_apy_bps: Option<Bps>,
}

/// Trait for offer book storage backends
#[async_trait]
pub trait OfferBook: Send + Sync {
    /// Place a new offer, returning it with its assigned id and sequence
    async fn place(&self, pool: &str, lender: &str, amount: Amount, apy_bps: Bps)
        -> Result<LenderOffer>;

    /// Get an offer by id
    async fn get(&self, pool: &str, offer_id: &Uuid) -> Result<LenderOffer>;

    /// Consistent view of a pool for matching; empty for unknown pools
    async fn snapshot(&self, pool: &str) -> Result<PoolSnapshot>;

    /// Atomically consume capacity for a committed fill.
    ///
    /// Fails with a version conflict if the pool changed since
    /// `expected_version` was observed, and leaves the pool untouched
    /// on any error. Returns the pool version after the fill.
    async fn apply_fill(&self, pool: &str, expected_version: u64, chunks: &[MatchChunk])
        -> Result<u64>;

    /// Withdraw an offer, returning the capacity freed to the lender
    async fn withdraw(&self, pool: &str, offer_id: &Uuid, lender: &str) -> Result<Amount>;

    /// Aggregate counters for a pool; zeroed for unknown pools
    async fn stats(&self, pool: &str) -> Result<PoolStats>;
}

/// Mutable state of one pool, guarded by its DashMap shard lock.
#[derive(Debug, Default)]
struct PoolState {
    version: u64,
    next_sequence: u64,
    offers: Vec<LenderOffer>,
}

/// In-memory offer book
///
/// Uses DashMap for concurrent access; each pool's state sits behind a
/// single entry, so mutations within one pool are serialized while
/// different pools proceed in parallel.
pub struct InMemoryOfferBook {
    pools: DashMap<String, PoolState>,
}

impl InMemoryOfferBook {
    /// Create an empty book; pools appear on first placement
    pub fn new() -> Self {
        Self {
            pools: DashMap::new(),
        }
    }
}

impl Default for InMemoryOfferBook {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OfferBook for InMemoryOfferBook {
    async fn place(
        &self,
        pool: &str,
        lender: &str,
        amount: Amount,
        apy_bps: Bps,
    ) -> Result<LenderOffer> {
        if amount == 0 {
            return Err(OfferError::InvalidAmount.into());
        }

        let mut state = self.pools.entry(pool.to_string()).or_default();
        let sequence = state.next_sequence;
        state.next_sequence += 1;

        let offer = LenderOffer::new(lender, amount, apy_bps, sequence);
        state.offers.push(offer.clone());
        state.version += 1;

        Ok(offer)
    }

    async fn get(&self, pool: &str, offer_id: &Uuid) -> Result<LenderOffer> {
        let state = self
            .pools
            .get(pool)
            .ok_or_else(|| BookError::PoolNotFound(pool.to_string()))?;

        state
            .offers
            .iter()
            .find(|o| o.id == *offer_id)
            .cloned()
            .ok_or_else(|| BookError::OfferNotFound(*offer_id).into())
    }

    async fn snapshot(&self, pool: &str) -> Result<PoolSnapshot> {
        Ok(self
            .pools
            .get(pool)
            .map(|state| PoolSnapshot {
                pool: pool.to_string(),
                version: state.version,
                offers: state.offers.clone(),
            })
            .unwrap_or_else(|| PoolSnapshot::empty(pool)))
    }

    async fn apply_fill(
        &self,
        pool: &str,
        expected_version: u64,
        chunks: &[MatchChunk],
    ) -> Result<u64> {
        let mut entry = self
            .pools
            .get_mut(pool)
            .ok_or_else(|| BookError::PoolNotFound(pool.to_string()))?;
        let state = entry.value_mut();

        if state.version != expected_version {
            return Err(BookError::VersionConflict {
                expected: expected_version,
                found: state.version,
            }
            .into());
        }

        if chunks.is_empty() {
            return Ok(state.version);
        }

        // Validate everything before touching anything, so a rejected
        // fill leaves the pool exactly as it was. Chunks are summed per
        // offer first: capacity must cover the combined demand.
        let mut totals: HashMap<Uuid, Amount> = HashMap::new();
        for chunk in chunks {
            if chunk.amount == 0 {
                return Err(OfferError::InvalidAmount.into());
            }
            *totals.entry(chunk.offer_id).or_default() += chunk.amount;
        }

        for (offer_id, total) in &totals {
            let offer = state
                .offers
                .iter()
                .find(|o| o.id == *offer_id)
                .ok_or(BookError::OfferNotFound(*offer_id))?;

            if !offer.active {
                return Err(OfferError::Inactive.into());
            }
            if *total > offer.amount {
                return Err(OfferError::ExceedsAvailable {
                    requested: *total,
                    available: offer.amount,
                }
                .into());
            }
        }

        for (offer_id, total) in totals {
            if let Some(offer) = state.offers.iter_mut().find(|o| o.id == offer_id) {
                offer.consume(total)?;
            }
        }

        state.version += 1;
        Ok(state.version)
    }

    async fn withdraw(&self, pool: &str, offer_id: &Uuid, lender: &str) -> Result<Amount> {
        let mut entry = self
            .pools
            .get_mut(pool)
            .ok_or_else(|| BookError::PoolNotFound(pool.to_string()))?;
        let state = entry.value_mut();

        let offer = state
            .offers
            .iter_mut()
            .find(|o| o.id == *offer_id)
            .ok_or(BookError::OfferNotFound(*offer_id))?;

        if offer.lender != lender {
            return Err(BookError::NotOfferOwner {
                offer_id: *offer_id,
                caller: lender.to_string(),
            }
            .into());
        }
        if !offer.active {
            return Err(OfferError::Inactive.into());
        }

        let freed = offer.deactivate();
        state.version += 1;
        Ok(freed)
    }

    async fn stats(&self, pool: &str) -> Result<PoolStats> {
        let Some(state) = self.pools.get(pool) else {
            return Ok(PoolStats {
                pool: pool.to_string(),
                version: 0,
                total_offers: 0,
                open_offers: 0,
                available: 0,
                best_apy_bps: None,
                worst_apy_bps: None,
            });
        };

        let open: Vec<&LenderOffer> = state.offers.iter().filter(|o| o.is_matchable()).collect();

        Ok(PoolStats {
            pool: pool.to_string(),
            version: state.version,
            total_offers: state.offers.len(),
            open_offers: open.len(),
            available: open.iter().map(|o| o.amount).sum(),
            best_apy_bps: open.iter().map(|o| o.apy_bps).min(),
            worst_apy_bps: open.iter().map(|o| o.apy_bps).max(),
        })
    }
}
