//! RateBand - Allowed band for lender-settable fixed APY
//!
//! The band is derived from a blended external reference rate plus/minus a
//! fixed tolerance, clamped to an absolute floor and ceiling. There is one
//! constructor; enforcement and display both consume the same band, so the
//! clamping policy cannot drift between call paths.

use serde::{Deserialize, Serialize};

use super::Bps;
use crate::error::RateError;

/// Validation bound for a lender offer's fixed APY
///
/// Invariant: `min_bps <= reference_bps <= max_bps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateBand {
    /// Blended external reference rate
    pub reference_bps: Bps,

    /// Tolerance applied on each side of the reference
    pub delta_bps: Bps,

    /// Lower bound, `max(floor, reference - delta)`
    pub min_bps: Bps,

    /// Upper bound, `min(ceiling, reference + delta)`
    pub max_bps: Bps,
}

impl RateBand {
    /// Build the band around a reference rate
    ///
    /// The reference itself is first clamped into `[floor, ceiling]` so the
    /// band invariant holds even for degenerate feed values.
    pub fn around(reference_bps: Bps, delta_bps: Bps, floor_bps: Bps, ceiling_bps: Bps) -> Self {
        let reference_bps = reference_bps.clamp(floor_bps, ceiling_bps);
        Self {
            reference_bps,
            delta_bps,
            min_bps: reference_bps.saturating_sub(delta_bps).max(floor_bps),
            max_bps: reference_bps.saturating_add(delta_bps).min(ceiling_bps),
        }
    }

    /// Whether an APY falls inside the band (bounds inclusive)
    #[inline]
    pub fn contains(&self, apy_bps: Bps) -> bool {
        self.min_bps <= apy_bps && apy_bps <= self.max_bps
    }

    /// Validate a proposed lender APY against the band
    ///
    /// A violation is an error, never a silent clamp.
    pub fn ensure_within(&self, apy_bps: Bps) -> Result<(), RateError> {
        if self.contains(apy_bps) {
            Ok(())
        } else {
            Err(RateError::OutOfRange {
                apy_bps,
                min_bps: self.min_bps,
                max_bps: self.max_bps,
            })
        }
    }
}

impl std::fmt::Display for RateBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RateBand([{}, {}] around {})",
            crate::format::format_bps(self.min_bps),
            crate::format::format_bps(self.max_bps),
            crate::format::format_bps(self.reference_bps)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DEFAULT_BAND_DELTA_BPS, MAX_APY_BPS, MIN_APY_BPS};

    #[test]
    fn test_band_symmetry_without_clamping() {
        let band = RateBand::around(455, DEFAULT_BAND_DELTA_BPS, MIN_APY_BPS, MAX_APY_BPS);
        assert_eq!(band.min_bps, 435);
        assert_eq!(band.max_bps, 475);
        assert_eq!(band.reference_bps - band.min_bps, band.delta_bps);
        assert_eq!(band.max_bps - band.reference_bps, band.delta_bps);
    }

    #[test]
    fn test_band_clamped_to_floor() {
        let band = RateBand::around(10, 20, MIN_APY_BPS, MAX_APY_BPS);
        assert_eq!(band.min_bps, MIN_APY_BPS);
        assert_eq!(band.max_bps, 30);
    }

    #[test]
    fn test_band_clamped_to_ceiling() {
        let band = RateBand::around(4_995, 20, MIN_APY_BPS, MAX_APY_BPS);
        assert_eq!(band.min_bps, 4_975);
        assert_eq!(band.max_bps, MAX_APY_BPS);
    }

    #[test]
    fn test_degenerate_reference_keeps_invariant() {
        let band = RateBand::around(0, 20, MIN_APY_BPS, MAX_APY_BPS);
        assert!(band.min_bps <= band.reference_bps);
        assert!(band.reference_bps <= band.max_bps);
        assert_eq!(band.reference_bps, MIN_APY_BPS);
    }

    #[test]
    fn test_contains_bounds_inclusive() {
        let band = RateBand::around(455, 20, MIN_APY_BPS, MAX_APY_BPS);
        assert!(band.contains(435));
        assert!(band.contains(475));
        assert!(!band.contains(434));
        assert!(!band.contains(476));
    }

    #[test]
    fn test_ensure_within_reports_band() {
        let band = RateBand::around(455, 20, MIN_APY_BPS, MAX_APY_BPS);
        let err = band.ensure_within(500).unwrap_err();
        assert_eq!(
            err,
            RateError::OutOfRange {
                apy_bps: 500,
                min_bps: 435,
                max_bps: 475,
            }
        );
    }
}
