//! Lendbook Engine - Matching and rate aggregation for the lending book
//!
//! The engine turns lender offers into loans:
//!
//! ```text
//!   place_offer ──> OfferBook ──> snapshot ──> match_request ──> apply_fill
//!                      ^              (pure, class-routed)           |
//!                      └──────────── version CAS on commit ─────────┘
//! ```
//!
//! Core pieces:
//! - [`domain::matcher`]: greedy class-routed matching over a snapshot
//! - [`domain::apy`]: weighted averages and the blended reference band
//! - [`infra::offer_book`]: versioned in-memory book, one lock per pool
//! - [`infra::rate_feed`]: external venue rates behind a trait
//! - [`service`]: policy enforcement and optimistic commit

pub mod domain;
pub mod infra;
pub mod service;

pub use domain::{match_request, weighted_average_apy, BandPolicy, MatchPolicy, RateBlend};
pub use infra::{
    InMemoryOfferBook, OfferBook, PoolSnapshot, PoolStats, RateFeed, SharedRateFeed,
    StaticRateFeed,
};
pub use service::{FeedReading, FillPolicy, PoolService, RateReport};

/// How many times a loan is re-matched when the book moves between
/// snapshot and commit before the conflict is surfaced to the caller.
pub const DEFAULT_COMMIT_RETRIES: usize = 3;
