//! Rolling summary of the last day's blocks.
//!
//! The blocks route never queries the node directly; a background task
//! rebuilds the summary list on an interval and swaps it in whole. The
//! fetch walks `getblockhashes` over the trailing 24 hours and takes a
//! verbose `getblock` per hash, so it stays off the request path.

use serde::Serialize;
use sightline_bitcore::{BitcoreClient, Error};
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

/// Most summaries kept per refresh; requests can ask for fewer.
pub const MAX_TRACKED: usize = 50;

const SECONDS_PER_DAY: u64 = 86_400;

/// One row of the blocks listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockSummary {
    pub height: u64,
    pub size: i32,
    pub hash: String,
    pub time: i64,
    pub txlength: usize,
    #[serde(rename = "poolInfo")]
    pub pool_info: PoolInfo,
}

/// Mining pool attribution. Never populated today; serializes as an
/// empty object to keep the row shape stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PoolInfo {
    #[serde(rename = "poolName", skip_serializing_if = "Option::is_none")]
    pub pool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Shared newest-first list of recent block summaries.
#[derive(Default)]
pub struct RecentBlocks {
    summaries: RwLock<Vec<BlockSummary>>,
}

impl RecentBlocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Up to `limit` newest summaries.
    pub fn snapshot(&self, limit: usize) -> Vec<BlockSummary> {
        match self.summaries.read() {
            Ok(summaries) => summaries.iter().take(limit).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn store(&self, summaries: Vec<BlockSummary>) {
        if let Ok(mut current) = self.summaries.write() {
            *current = summaries;
        }
    }
}

/// Rebuild the summary list from the node: hashes of the last day's
/// blocks, newest first, capped at `MAX_TRACKED`.
pub async fn fetch_recent(node: &BitcoreClient) -> Result<Vec<BlockSummary>, Error> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0);
    let low = now.saturating_sub(SECONDS_PER_DAY);

    let mut hashes = node.get_block_hashes(now, low).await?;
    // The node answers oldest first.
    hashes.reverse();
    hashes.truncate(MAX_TRACKED);

    let mut summaries = Vec::with_capacity(hashes.len());
    for hash in &hashes {
        let block = node.get_block(hash).await?;
        summaries.push(BlockSummary {
            height: block.height,
            size: block.weight,
            hash: block.hash,
            time: block.time,
            txlength: block.tx.len(),
            pool_info: PoolInfo::default(),
        });
    }
    Ok(summaries)
}
