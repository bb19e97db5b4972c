//! APY aggregation: weighted averages over fills and the blended
//! reference rate that anchors the offer validation band.
//!
//! All rate math is integer-only. Amounts are micro-units (u64), rates
//! are basis points (u32), and intermediate products are widened to
//! u128 so that no realistic book size can overflow. Division always
//! floors, which keeps quoted rates conservative for the borrower.

use lendbook_common::{
    Bps, MatchChunk, RateBand, RateError, DEFAULT_BAND_DELTA_BPS, DEFAULT_PRIMARY_WEIGHT,
    DEFAULT_SECONDARY_WEIGHT, MAX_APY_BPS, MIN_APY_BPS, PERMILLE_DENOM,
};
use serde::{Deserialize, Serialize};

/// Amount-weighted mean APY over a set of match chunks, in basis points.
///
/// Each chunk contributes `amount * apy_bps`; the sum is divided by the
/// total amount with floor semantics. An empty slice (or one whose
/// amounts are all zero) averages to `0` rather than erroring, so
/// callers can fold it straight into a [`lendbook_common::MatchResult`]
/// without a special case.
pub fn weighted_average_apy(chunks: &[MatchChunk]) -> Bps {
    let mut weighted: u128 = 0;
    let mut total: u128 = 0;
    for chunk in chunks {
        weighted += chunk.amount as u128 * chunk.apy_bps as u128;
        total += chunk.amount as u128;
    }
    if total == 0 {
        return 0;
    }
    (weighted / total) as Bps
}

/// Fixed-point weighting of two rate sources, expressed in permille.
///
/// The canonical blend is 700/300: the primary venue dominates but the
/// secondary still tempers outliers. Weights must sum to exactly
/// [`PERMILLE_DENOM`] so the blend can never scale a rate up or down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBlend {
    primary_permille: u32,
    secondary_permille: u32,
}

impl RateBlend {
    /// Creates a blend, rejecting weight pairs that do not sum to 1000.
    pub fn new(primary_permille: u32, secondary_permille: u32) -> Result<Self, RateError> {
        if primary_permille + secondary_permille != PERMILLE_DENOM {
            return Err(RateError::InvalidBlend {
                primary: primary_permille,
                secondary: secondary_permille,
                expected: PERMILLE_DENOM,
            });
        }
        Ok(Self {
            primary_permille,
            secondary_permille,
        })
    }

    /// Blended reference rate, floored to whole basis points.
    pub fn blend(&self, primary_bps: Bps, secondary_bps: Bps) -> Bps {
        let weighted = primary_bps as u64 * self.primary_permille as u64
            + secondary_bps as u64 * self.secondary_permille as u64;
        (weighted / PERMILLE_DENOM as u64) as Bps
    }

    pub fn primary_permille(&self) -> u32 {
        self.primary_permille
    }

    pub fn secondary_permille(&self) -> u32 {
        self.secondary_permille
    }
}

impl Default for RateBlend {
    fn default() -> Self {
        Self {
            primary_permille: DEFAULT_PRIMARY_WEIGHT,
            secondary_permille: DEFAULT_SECONDARY_WEIGHT,
        }
    }
}

/// Policy knobs for deriving the offer validation band from two feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandPolicy {
    /// Half-width of the band on each side of the reference rate.
    pub delta_bps: Bps,
    /// Absolute floor for any rate the book will accept.
    pub floor_bps: Bps,
    /// Absolute ceiling for any rate the book will accept.
    pub ceiling_bps: Bps,
    /// Weighting of the two upstream feeds.
    pub blend: RateBlend,
}

impl BandPolicy {
    /// Computes the acceptance band around the blended reference rate.
    pub fn band_for(&self, primary_bps: Bps, secondary_bps: Bps) -> RateBand {
        let reference = self.blend.blend(primary_bps, secondary_bps);
        RateBand::around(reference, self.delta_bps, self.floor_bps, self.ceiling_bps)
    }
}

impl Default for BandPolicy {
    fn default() -> Self {
        Self {
            delta_bps: DEFAULT_BAND_DELTA_BPS,
            floor_bps: MIN_APY_BPS,
            ceiling_bps: MAX_APY_BPS,
            blend: RateBlend::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use uuid::Uuid;

    fn chunk(amount: u64, apy_bps: u32) -> MatchChunk {
        MatchChunk {
            offer_id: Uuid::now_v7(),
            lender: "lender".to_string(),
            amount,
            apy_bps,
        }
    }

    #[test]
    fn test_weighted_average_empty_is_zero() {
        assert_eq!(weighted_average_apy(&[]), 0);
    }

    #[test]
    fn test_weighted_average_single_chunk() {
        assert_eq!(weighted_average_apy(&[chunk(1_000_000, 425)]), 425);
    }

    #[test]
    fn test_weighted_average_floors() {
        // (10 * 100 + 10 * 101) / 20 = 100.5 -> 100
        let chunks = vec![chunk(10, 100), chunk(10, 101)];
        assert_eq!(weighted_average_apy(&chunks), 100);
    }

    #[test]
    fn test_weighted_average_whale_partial_book() {
        // 50 units at 400bp plus 20 units at 360bp:
        // (50*400 + 20*360) / 70 = 27_200 / 70 = 388.57.. -> 388
        let chunks = vec![chunk(50_000_000, 400), chunk(20_000_000, 360)];
        assert_eq!(weighted_average_apy(&chunks), 388);
    }

    #[test]
    fn test_weighted_average_even_split() {
        // (50*400 + 50*360) / 100 = 380 exactly
        let chunks = vec![chunk(50_000_000, 400), chunk(50_000_000, 360)];
        assert_eq!(weighted_average_apy(&chunks), 380);
    }

    #[test]
    fn test_blend_default_weights() {
        // (500*700 + 350*300) / 1000 = 455
        let blend = RateBlend::default();
        assert_eq!(blend.blend(500, 350), 455);
    }

    #[test]
    fn test_blend_floors_fractional_result() {
        // (501*700 + 350*300) / 1000 = 455.7 -> 455
        let blend = RateBlend::default();
        assert_eq!(blend.blend(501, 350), 455);
    }

    #[test]
    fn test_blend_equal_inputs_are_identity() {
        let blend = RateBlend::default();
        assert_eq!(blend.blend(420, 420), 420);
    }

    #[test]
    fn test_blend_rejects_bad_weights() {
        let err = RateBlend::new(700, 400).unwrap_err();
        match err {
            RateError::InvalidBlend { expected, .. } => assert_eq!(expected, PERMILLE_DENOM),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_band_policy_default_around_blended_reference() {
        let band = BandPolicy::default().band_for(500, 350);
        assert_eq!(band.reference_bps, 455);
        assert_eq!(band.min_bps, 435);
        assert_eq!(band.max_bps, 475);
    }

    #[test]
    fn test_band_policy_clamps_at_floor() {
        let band = BandPolicy::default().band_for(10, 10);
        assert_eq!(band.min_bps, MIN_APY_BPS);
        assert_eq!(band.max_bps, 30);
    }

    proptest! {
        #[test]
        fn prop_weighted_average_within_chunk_bounds(
            raw in prop::collection::vec((1u64..=1_000_000_000_000u64, 0u32..=5_000u32), 1..32)
        ) {
            let chunks: Vec<MatchChunk> = raw
                .iter()
                .map(|&(amount, apy)| chunk(amount, apy))
                .collect();
            let avg = weighted_average_apy(&chunks);
            let min = chunks.iter().map(|c| c.apy_bps).min().unwrap();
            let max = chunks.iter().map(|c| c.apy_bps).max().unwrap();
            prop_assert!(min <= avg && avg <= max);
        }

        #[test]
        fn prop_blend_between_inputs(a in 0u32..=5_000, b in 0u32..=5_000) {
            let blended = RateBlend::default().blend(a, b);
            prop_assert!(blended >= a.min(b));
            prop_assert!(blended <= a.max(b));
        }
    }
}
