use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::metrics::ExplorerMetrics;
use crate::prices::{self, PriceBoard};
use crate::recent_blocks::{self, RecentBlocks};
use crate::server::{self, ExplorerState, VersionData};
use sightline_bitcore::BitcoreClient;

/// Seconds between expired-entry sweeps of the response cache.
const CACHE_SWEEP_SECS: u64 = 60;

/// Timeout for price provider requests
const PRICE_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Run the explorer server
pub fn run(config_path: &Path) -> Result<()> {
    let config =
        Config::load(config_path).context("No config found. Run 'sightline init' first.")?;

    println!("Sightline explorer starting. Press Ctrl+C to stop.");

    // Create tokio runtime for the server and refresh tasks
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async { serve_async(config).await })
}

async fn serve_async(config: Config) -> Result<()> {
    info!("Using node at {}", config.node.url);

    let node = BitcoreClient::new(
        config.node.url.clone(),
        config.node.username.clone(),
        config.node.password.clone(),
    )?;

    let state = Arc::new(ExplorerState {
        node,
        cache: ResponseCache::new(config.cache.max_entries),
        cache_ttl: Duration::from_secs(config.cache.ttl_secs),
        start_height: config.node.start_height,
        prices: PriceBoard::new(),
        recent_blocks: RecentBlocks::new(),
        metrics: ExplorerMetrics::new(),
        version: VersionData {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("SIGHTLINE_COMMIT").unwrap_or("unknown").to_string(),
            branch: option_env!("SIGHTLINE_BRANCH").unwrap_or("unknown").to_string(),
        },
        started_at: Instant::now(),
    });

    let refresh = Duration::from_secs(config.server.refresh_interval_secs.max(1));
    spawn_price_refresher(state.clone(), refresh);
    spawn_block_refresher(state.clone(), refresh);
    spawn_cache_sweeper(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    server::start_server(addr, state).await
}

/// Poll the price providers on an interval and swap the snapshot in.
/// All fetching happens before the board's lock is touched.
fn spawn_price_refresher(state: Arc<ExplorerState>, period: Duration) {
    tokio::spawn(async move {
        let client = match reqwest::Client::builder().timeout(PRICE_FETCH_TIMEOUT).build() {
            Ok(client) => client,
            Err(e) => {
                warn!("price refresher disabled: {e}");
                return;
            }
        };
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let snapshot = prices::fetch_all(&client).await;
            state.prices.store(snapshot);
        }
    });
}

/// Rebuild the recent-block summaries on an interval. A failed refresh
/// keeps the previous snapshot.
fn spawn_block_refresher(state: Arc<ExplorerState>, period: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match recent_blocks::fetch_recent(&state.node).await {
                Ok(summaries) => {
                    if let Some(newest) = summaries.first() {
                        state.metrics.set_chain_height(newest.height);
                    }
                    state.recent_blocks.store(summaries);
                }
                Err(e) => warn!("recent block refresh failed: {e}"),
            }
        }
    });
}

fn spawn_cache_sweeper(state: Arc<ExplorerState>) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(CACHE_SWEEP_SECS));
        loop {
            ticker.tick().await;
            let removed = state.cache.sweep();
            if removed > 0 {
                debug!("cache sweep removed {} entries", removed);
            }
        }
    });
}
