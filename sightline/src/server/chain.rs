//! Block, chain-state and service-info handlers.

use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use serde::Serialize;

use super::error::ApiError;
use super::{json_response, parse_hash, query_param, ExplorerState};
use crate::recent_blocks::BlockSummary;

pub async fn block(state: &ExplorerState, hash: &str) -> Result<Response<Full<Bytes>>, ApiError> {
    parse_hash(hash).map_err(|e| ApiError::bad_request("invalid block hash", e))?;
    let block = state
        .node
        .get_block(hash)
        .await
        .map_err(|e| ApiError::bad_request("failed to fetch block", e))?;
    Ok(json_response(&block))
}

#[derive(Debug, Serialize)]
struct BlockHashBody {
    #[serde(rename = "blockHash")]
    block_hash: String,
}

pub async fn block_index(
    state: &ExplorerState,
    height: &str,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let height: u64 = height
        .parse()
        .map_err(|e| ApiError::bad_request("invalid block height", e))?;
    let block_hash = state
        .node
        .get_block_hash(height)
        .await
        .map_err(|e| ApiError::bad_request("failed to fetch block hash", e))?;
    Ok(json_response(&BlockHashBody { block_hash }))
}

#[derive(Debug, Serialize)]
struct BlocksBody {
    blocks: Vec<BlockSummary>,
    length: usize,
}

/// `GET /blocks?limit=N`: newest block summaries from the in-memory
/// snapshot; never touches the node.
pub fn blocks(state: &ExplorerState, query: &str) -> Result<Response<Full<Bytes>>, ApiError> {
    let limit = match query_param(query, "limit") {
        None => 10,
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|e| ApiError::bad_request(format!("failed to parse ?limit={raw}"), e))?,
    };
    let blocks = state.recent_blocks.snapshot(limit);
    Ok(json_response(&BlocksBody { blocks, length: limit }))
}

#[derive(Debug, Serialize)]
struct DifficultyBody {
    difficulty: f64,
}

#[derive(Debug, Serialize)]
struct BestBlockHashBody {
    bestblockhash: String,
}

/// `GET /status?q=`: node info by default, or one chain scalar for the
/// recognized `q` values.
pub async fn status(state: &ExplorerState, query: &str) -> Result<Response<Full<Bytes>>, ApiError> {
    match query_param(query, "q") {
        Some("getDifficulty") => {
            let difficulty = state
                .node
                .get_difficulty()
                .await
                .map_err(|e| ApiError::bad_request("failed to fetch difficulty", e))?;
            Ok(json_response(&DifficultyBody { difficulty }))
        }
        Some("getBestBlockHash") => {
            let bestblockhash = state
                .node
                .get_best_block_hash()
                .await
                .map_err(|e| ApiError::bad_request("failed to fetch best block hash", e))?;
            Ok(json_response(&BestBlockHashBody { bestblockhash }))
        }
        _ => {
            let info = state
                .node
                .get_info()
                .await
                .map_err(|e| ApiError::bad_request("failed to fetch node info", e))?;
            state.metrics.set_chain_height(info.blocks);
            Ok(json_response(&info))
        }
    }
}

#[derive(Debug, Serialize)]
struct SyncBody {
    status: &'static str,
    #[serde(rename = "blockChainHeight")]
    block_chain_height: u64,
    #[serde(rename = "syncPercentage")]
    sync_percentage: u64,
    height: u64,
    error: Option<String>,
    #[serde(rename = "type")]
    kind: &'static str,
}

/// `GET /sync`: how far the node's validation lags its headers.
pub async fn sync(state: &ExplorerState) -> Result<Response<Full<Bytes>>, ApiError> {
    let info = state
        .node
        .get_blockchain_info()
        .await
        .map_err(|e| ApiError::bad_request("failed to fetch blockchain info", e))?;
    state.metrics.set_chain_height(info.blocks);

    let status = if info.headers == info.blocks { "finished" } else { "syncing" };
    let sync_percentage = if info.headers == 0 { 0 } else { (info.blocks / info.headers) * 100 };

    Ok(json_response(&SyncBody {
        status,
        block_chain_height: info.blocks,
        sync_percentage,
        height: info.headers,
        error: None,
        kind: "sightline",
    }))
}

pub fn version(state: &ExplorerState) -> Response<Full<Bytes>> {
    json_response(&state.version)
}

#[derive(Debug, Serialize)]
struct CurrencyBody {
    status: u16,
    binance: f64,
    #[serde(rename = "blockchainInfo")]
    blockchain_info: f64,
    coinbase: f64,
}

/// `GET /currency`: latest provider quotes from the price board.
pub fn currency(state: &ExplorerState) -> Response<Full<Bytes>> {
    let snapshot = state.prices.snapshot();
    json_response(&CurrencyBody {
        status: 200,
        binance: snapshot.binance,
        blockchain_info: snapshot.blockchain_info,
        coinbase: snapshot.coinbase,
    })
}
