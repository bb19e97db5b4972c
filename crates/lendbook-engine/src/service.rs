//! Pool service: the write path of the lending book.
//!
//! Sits between transport (REST gateway, tests, simulations) and the
//! book. Matching itself is pure; this layer supplies the snapshot,
//! enforces rate and fill policy, and commits fills with optimistic
//! concurrency: match against a versioned snapshot, then apply the fill
//! only if the pool version is unchanged, retrying on conflict.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use lendbook_common::{
    Amount, Bps, LendbookError, LenderOffer, LoanReceipt, LoanRequest, MatchResult, RateBand,
    Result,
};
use uuid::Uuid;

use crate::domain::{match_request, BandPolicy, MatchPolicy};
use crate::infra::{OfferBook, PoolSnapshot, PoolStats, RateFeed};
use crate::DEFAULT_COMMIT_RETRIES;

/// What to do when the book cannot cover a request in full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillPolicy {
    /// Reject the loan and leave the book untouched. Mirrors the
    /// settlement contract, which reverts underfunded draws.
    #[default]
    RejectPartial,
    /// Commit whatever was matched and report the shortfall.
    AllowPartial,
}

/// One feed observation, labeled with its venue.
#[derive(Debug, Clone, Serialize)]
pub struct FeedReading {
    pub source: String,
    pub rate_bps: Bps,
}

/// The current band together with the feed readings it was derived from.
#[derive(Debug, Clone, Serialize)]
pub struct RateReport {
    pub primary: FeedReading,
    pub secondary: FeedReading,
    pub band: RateBand,
}

/// Orchestrates offers, matching, and rate policy for all pools.
pub struct PoolService {
    book: Arc<dyn OfferBook>,
    primary_feed: Arc<dyn RateFeed>,
    secondary_feed: Arc<dyn RateFeed>,
    match_policy: MatchPolicy,
    band_policy: BandPolicy,
    fill_policy: FillPolicy,
}

impl PoolService {
    /// Create a service with default policies: whale routing at the
    /// standard threshold, the 700/300 band, and partial fills rejected.
    pub fn new(
        book: Arc<dyn OfferBook>,
        primary_feed: Arc<dyn RateFeed>,
        secondary_feed: Arc<dyn RateFeed>,
    ) -> Self {
        Self {
            book,
            primary_feed,
            secondary_feed,
            match_policy: MatchPolicy::default(),
            band_policy: BandPolicy::default(),
            fill_policy: FillPolicy::default(),
        }
    }

    pub fn with_match_policy(mut self, policy: MatchPolicy) -> Self {
        self.match_policy = policy;
        self
    }

    pub fn with_band_policy(mut self, policy: BandPolicy) -> Self {
        self.band_policy = policy;
        self
    }

    pub fn with_fill_policy(mut self, policy: FillPolicy) -> Self {
        self.fill_policy = policy;
        self
    }

    /// Current validation band from live feed readings.
    pub async fn rate_band(&self) -> Result<RateBand> {
        Ok(self.rate_report().await?.band)
    }

    /// Band plus the raw feed readings behind it, for the rates API.
    pub async fn rate_report(&self) -> Result<RateReport> {
        let (primary_bps, secondary_bps) = tokio::join!(
            self.primary_feed.current_bps(),
            self.secondary_feed.current_bps()
        );
        let primary_bps = primary_bps?;
        let secondary_bps = secondary_bps?;

        Ok(RateReport {
            primary: FeedReading {
                source: self.primary_feed.source().to_string(),
                rate_bps: primary_bps,
            },
            secondary: FeedReading {
                source: self.secondary_feed.source().to_string(),
                rate_bps: secondary_bps,
            },
            band: self.band_policy.band_for(primary_bps, secondary_bps),
        })
    }

    /// Place a lender offer after validating its rate against the band.
    #[instrument(skip(self))]
    pub async fn place_offer(
        &self,
        pool: &str,
        lender: &str,
        amount: Amount,
        apy_bps: Bps,
    ) -> Result<LenderOffer> {
        let band = self.rate_band().await?;
        band.ensure_within(apy_bps)?;

        let offer = self.book.place(pool, lender, amount, apy_bps).await?;
        info!(
            pool,
            offer_id = %offer.id,
            amount,
            apy_bps,
            "Offer placed"
        );
        Ok(offer)
    }

    /// Dry-run a request against the current book. Never mutates.
    #[instrument(skip(self))]
    pub async fn quote(&self, pool: &str, amount: Amount) -> Result<MatchResult> {
        let snapshot = self.book.snapshot(pool).await?;
        let result = match_request(amount, &snapshot.offers, &self.match_policy)?;
        Ok(result)
    }

    /// Execute a loan under the service's configured fill policy.
    pub async fn request_loan(&self, pool: &str, request: &LoanRequest) -> Result<LoanReceipt> {
        self.request_loan_with(pool, request, self.fill_policy).await
    }

    /// Execute a loan: match against a snapshot, then commit the fill.
    ///
    /// A concurrent mutation between snapshot and commit surfaces as a
    /// version conflict; the loan is then re-matched against the fresh
    /// book, up to [`DEFAULT_COMMIT_RETRIES`] attempts. Rejected loans
    /// (insufficient liquidity under `RejectPartial`, invalid amounts)
    /// leave the book exactly as it was.
    #[instrument(skip(self, request), fields(borrower = %request.borrower, amount = request.amount))]
    pub async fn request_loan_with(
        &self,
        pool: &str,
        request: &LoanRequest,
        fill_policy: FillPolicy,
    ) -> Result<LoanReceipt> {
        let mut attempt = 0;
        loop {
            let snapshot = self.book.snapshot(pool).await?;
            let result = match_request(request.amount, &snapshot.offers, &self.match_policy)?;

            if !result.fully_matched && fill_policy == FillPolicy::RejectPartial {
                return Err(LendbookError::InsufficientLiquidity {
                    requested: request.amount,
                    available: result.matched_amount(),
                });
            }

            if result.chunks.is_empty() {
                // AllowPartial against an empty book: nothing to commit.
                return Ok(self.receipt(pool, request, result));
            }

            match self
                .book
                .apply_fill(pool, snapshot.version, &result.chunks)
                .await
            {
                Ok(_) => return Ok(self.receipt(pool, request, result)),
                Err(LendbookError::Book(lendbook_common::BookError::VersionConflict {
                    expected,
                    found,
                })) if attempt + 1 < DEFAULT_COMMIT_RETRIES => {
                    attempt += 1;
                    debug!(
                        pool,
                        expected, found, attempt, "Book moved during match, retrying"
                    );
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Withdraw an offer, returning the unmatched capacity to the lender.
    #[instrument(skip(self))]
    pub async fn withdraw_offer(
        &self,
        pool: &str,
        offer_id: &Uuid,
        lender: &str,
    ) -> Result<Amount> {
        let freed = self.book.withdraw(pool, offer_id, lender).await?;
        info!(pool, %offer_id, freed, "Offer withdrawn");
        Ok(freed)
    }

    /// Look up a single offer.
    pub async fn get_offer(&self, pool: &str, offer_id: &Uuid) -> Result<LenderOffer> {
        self.book.get(pool, offer_id).await
    }

    /// Current offers in a pool, in book arrival order.
    pub async fn pool_snapshot(&self, pool: &str) -> Result<PoolSnapshot> {
        self.book.snapshot(pool).await
    }

    /// Aggregate counters for a pool.
    pub async fn pool_stats(&self, pool: &str) -> Result<PoolStats> {
        self.book.stats(pool).await
    }

    fn receipt(&self, pool: &str, request: &LoanRequest, result: MatchResult) -> LoanReceipt {
        let receipt = LoanReceipt::new(pool, request.borrower.clone(), result);
        info!(
            pool,
            loan_id = %receipt.loan_id,
            borrower = %receipt.borrower,
            matched = receipt.result.matched_amount(),
            remaining = receipt.result.remaining,
            weighted_apy_bps = receipt.result.weighted_apy_bps,
            chunks = receipt.result.chunk_count(),
            "Loan executed"
        );
        receipt
    }
}
