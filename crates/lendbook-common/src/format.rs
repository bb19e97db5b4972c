//! Display-only formatting helpers
//!
//! Human-facing rendering of basis points and smallest-unit amounts.
//! Nothing here may feed back into matching or validation decisions; the
//! authoritative computation path is integer-only.

use rust_decimal::Decimal;

use crate::types::{Amount, Bps};
use crate::UNIT_DECIMALS;

/// Render basis points as a percentage value (455 -> 4.55)
pub fn bps_to_percent(bps: Bps) -> Decimal {
    Decimal::new(bps as i64, 2)
}

/// Render basis points as a percentage string (455 -> "4.55%")
pub fn format_bps(bps: Bps) -> String {
    format!("{}%", bps_to_percent(bps))
}

/// Render a smallest-unit amount as a whole-token value (1_500_000 -> 1.5)
pub fn units_to_decimal(amount: Amount) -> Decimal {
    Decimal::from_i128_with_scale(amount as i128, UNIT_DECIMALS).normalize()
}

/// Render a smallest-unit amount as a token string (1_500_000 -> "1.5")
pub fn format_units(amount: Amount) -> String {
    units_to_decimal(amount).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bps_to_percent() {
        assert_eq!(bps_to_percent(455), dec!(4.55));
        assert_eq!(bps_to_percent(20), dec!(0.20));
        assert_eq!(bps_to_percent(10_000), dec!(100.00));
    }

    #[test]
    fn test_format_bps() {
        assert_eq!(format_bps(360), "3.60%");
    }

    #[test]
    fn test_units_to_decimal() {
        assert_eq!(units_to_decimal(1_500_000), dec!(1.5));
        assert_eq!(units_to_decimal(1_000_000_000), dec!(1000));
    }

    #[test]
    fn test_format_units() {
        assert_eq!(format_units(30_000_000), "30");
        assert_eq!(format_units(123_456), "0.123456");
    }
}
