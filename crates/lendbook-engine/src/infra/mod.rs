//! Infrastructure: offer storage and external rate sources.

pub mod offer_book;
pub mod rate_feed;

pub use offer_book::{InMemoryOfferBook, OfferBook, PoolSnapshot, PoolStats};
pub use rate_feed::{RateFeed, SharedRateFeed, StaticRateFeed};
