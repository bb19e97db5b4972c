//! Lendbook Gateway Service Binary
//!
//! Fixed-rate lending orderbook: matching engine and APY aggregation

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lendbook_common::VERSION;
use lendbook_engine::{
    BandPolicy, FillPolicy, InMemoryOfferBook, MatchPolicy, PoolService, RateBlend, SharedRateFeed,
};
use lendbook_gateway::{api, GatewayConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting Lendbook Gateway v{}", VERSION);

    // Load configuration
    let config = GatewayConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    // Build policies from settings
    let blend = RateBlend::new(
        config.rates.primary_weight_permille,
        config.rates.secondary_weight_permille,
    )?;
    let band_policy = BandPolicy {
        delta_bps: config.rates.delta_bps,
        floor_bps: config.rates.floor_bps,
        ceiling_bps: config.rates.ceiling_bps,
        blend,
    };
    let match_policy = MatchPolicy {
        whale_threshold: config.matching.whale_threshold,
    };
    let fill_policy = if config.matching.allow_partial_fills {
        FillPolicy::AllowPartial
    } else {
        FillPolicy::RejectPartial
    };

    // Seed the feeds from configuration; operators update them in-process
    let primary = SharedRateFeed::new(config.rates.primary_source.clone(), config.rates.primary_bps);
    let secondary = SharedRateFeed::new(
        config.rates.secondary_source.clone(),
        config.rates.secondary_bps,
    );

    let service = Arc::new(
        PoolService::new(
            Arc::new(InMemoryOfferBook::new()),
            Arc::new(primary),
            Arc::new(secondary),
        )
        .with_match_policy(match_policy)
        .with_band_policy(band_policy)
        .with_fill_policy(fill_policy),
    );

    info!("Lendbook service initialized");
    info!(
        "Matching config: whale_threshold={}, allow_partial_fills={}",
        config.matching.whale_threshold, config.matching.allow_partial_fills
    );
    info!(
        "Band config: delta={}bp, blend={}/{}, feeds={}@{}bp / {}@{}bp",
        config.rates.delta_bps,
        config.rates.primary_weight_permille,
        config.rates.secondary_weight_permille,
        config.rates.primary_source,
        config.rates.primary_bps,
        config.rates.secondary_source,
        config.rates.secondary_bps
    );

    // Parse address
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let app = api::router(service);

    // Start the server with graceful shutdown
    let shutdown = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install CTRL+C signal handler");
        info!("Received shutdown signal");
    };

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Lendbook REST API listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("Shutting down Lendbook gateway");
    Ok(())
}
