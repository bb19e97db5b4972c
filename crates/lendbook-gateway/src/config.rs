//! Gateway configuration

use anyhow::Result;
use serde::{Deserialize, Serialize};

use lendbook_common::{
    Amount, Bps, DEFAULT_BAND_DELTA_BPS, DEFAULT_PRIMARY_WEIGHT, DEFAULT_SECONDARY_WEIGHT,
    MAX_APY_BPS, MIN_APY_BPS, WHALE_THRESHOLD,
};

/// Lendbook gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Service host
    pub host: String,
    /// Service port
    pub port: u16,
    /// Rate feed and band configuration
    pub rates: RateSettings,
    /// Matching configuration
    pub matching: MatchSettings,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            rates: RateSettings::default(),
            matching: MatchSettings::default(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        let mut cfg = Self::default();

        // Check for the platform PORT env variable first (takes priority)
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse::<u16>() {
                cfg.port = p;
            }
        }

        // Then check for LENDBOOK_ prefixed variables
        if let Ok(host) = std::env::var("LENDBOOK_HOST") {
            cfg.host = host;
        }
        if let Ok(port) = std::env::var("LENDBOOK_PORT") {
            if let Ok(p) = port.parse::<u16>() {
                cfg.port = p;
            }
        }

        // Rate settings
        if let Ok(val) = std::env::var("LENDBOOK_PRIMARY_SOURCE") {
            cfg.rates.primary_source = val;
        }
        if let Ok(val) = std::env::var("LENDBOOK_PRIMARY_RATE_BPS") {
            if let Ok(v) = val.parse() {
                cfg.rates.primary_bps = v;
            }
        }
        if let Ok(val) = std::env::var("LENDBOOK_SECONDARY_SOURCE") {
            cfg.rates.secondary_source = val;
        }
        if let Ok(val) = std::env::var("LENDBOOK_SECONDARY_RATE_BPS") {
            if let Ok(v) = val.parse() {
                cfg.rates.secondary_bps = v;
            }
        }
        if let Ok(val) = std::env::var("LENDBOOK_BAND_DELTA_BPS") {
            if let Ok(v) = val.parse() {
                cfg.rates.delta_bps = v;
            }
        }
        if let Ok(val) = std::env::var("LENDBOOK_RATE_FLOOR_BPS") {
            if let Ok(v) = val.parse() {
                cfg.rates.floor_bps = v;
            }
        }
        if let Ok(val) = std::env::var("LENDBOOK_RATE_CEILING_BPS") {
            if let Ok(v) = val.parse() {
                cfg.rates.ceiling_bps = v;
            }
        }
        if let Ok(val) = std::env::var("LENDBOOK_PRIMARY_WEIGHT_PERMILLE") {
            if let Ok(v) = val.parse() {
                cfg.rates.primary_weight_permille = v;
            }
        }
        if let Ok(val) = std::env::var("LENDBOOK_SECONDARY_WEIGHT_PERMILLE") {
            if let Ok(v) = val.parse() {
                cfg.rates.secondary_weight_permille = v;
            }
        }

        // Matching settings
        if let Ok(val) = std::env::var("LENDBOOK_WHALE_THRESHOLD") {
            if let Ok(v) = val.parse() {
                cfg.matching.whale_threshold = v;
            }
        }
        if let Ok(val) = std::env::var("LENDBOOK_ALLOW_PARTIAL_FILLS") {
            if let Ok(v) = val.parse() {
                cfg.matching.allow_partial_fills = v;
            }
        }

        Ok(cfg)
    }
}

/// Rate feed and validation band settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSettings {
    /// Label for the primary venue (savings-rate style source)
    pub primary_source: String,
    /// Seed rate for the primary feed in basis points
    pub primary_bps: Bps,
    /// Label for the secondary venue (lending-market style source)
    pub secondary_source: String,
    /// Seed rate for the secondary feed in basis points
    pub secondary_bps: Bps,
    /// Band half-width around the blended reference
    pub delta_bps: Bps,
    /// Absolute floor for accepted rates
    pub floor_bps: Bps,
    /// Absolute ceiling for accepted rates
    pub ceiling_bps: Bps,
    /// Primary feed weight in permille (must pair to 1000 with secondary)
    pub primary_weight_permille: u32,
    /// Secondary feed weight in permille
    pub secondary_weight_permille: u32,
}

impl Default for RateSettings {
    fn default() -> Self {
        Self {
            primary_source: "aave".to_string(),
            primary_bps: 500,
            secondary_source: "compound".to_string(),
            secondary_bps: 350,
            delta_bps: DEFAULT_BAND_DELTA_BPS,
            floor_bps: MIN_APY_BPS,
            ceiling_bps: MAX_APY_BPS,
            primary_weight_permille: DEFAULT_PRIMARY_WEIGHT,
            secondary_weight_permille: DEFAULT_SECONDARY_WEIGHT,
        }
    }
}

/// Matching settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSettings {
    /// Requests at or above this amount route as whales (micro-units)
    pub whale_threshold: Amount,
    /// Whether underfunded loans commit partially instead of rejecting
    pub allow_partial_fills: bool,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            whale_threshold: WHALE_THRESHOLD,
            allow_partial_fills: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_protocol_constants() {
        let cfg = GatewayConfig::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.rates.delta_bps, DEFAULT_BAND_DELTA_BPS);
        assert_eq!(cfg.rates.floor_bps, MIN_APY_BPS);
        assert_eq!(cfg.rates.ceiling_bps, MAX_APY_BPS);
        assert_eq!(
            cfg.rates.primary_weight_permille + cfg.rates.secondary_weight_permille,
            1_000
        );
        assert_eq!(cfg.matching.whale_threshold, WHALE_THRESHOLD);
        assert!(!cfg.matching.allow_partial_fills);
    }
}
