//! Transaction lookup, listing and submission handlers.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::{Request, Response};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::{json_response, parse_hash, query_param, ExplorerState};
use crate::pagination;
use sightline_bitcore::types::Transaction;

pub async fn transaction(
    state: &ExplorerState,
    txid: &str,
) -> Result<Response<Full<Bytes>>, ApiError> {
    parse_hash(txid).map_err(|e| ApiError::bad_request("invalid transaction id", e))?;
    let tx = state
        .node
        .get_raw_transaction(txid)
        .await
        .map_err(|e| ApiError::bad_request("failed to fetch transaction", e))?;
    Ok(json_response(&tx))
}

#[derive(Debug, Serialize)]
struct RawTxBody {
    rawtx: String,
}

pub async fn raw_transaction(
    state: &ExplorerState,
    txid: &str,
) -> Result<Response<Full<Bytes>>, ApiError> {
    parse_hash(txid).map_err(|e| ApiError::bad_request("invalid transaction id", e))?;
    let tx = state
        .node
        .get_raw_transaction(txid)
        .await
        .map_err(|e| ApiError::bad_request("failed to fetch transaction", e))?;
    Ok(json_response(&RawTxBody { rawtx: tx.hex }))
}

/// `GET /transactions?address=ADDR|block=HASH&page=N`: the transactions
/// touching an address or carried by a block, ten per page.
pub async fn list(state: &ExplorerState, query: &str) -> Result<Response<Full<Bytes>>, ApiError> {
    let page = match query_param(query, "page") {
        None => 0,
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|e| ApiError::bad_request(format!("failed to parse ?page={raw}"), e))?,
    };

    match (query_param(query, "address"), query_param(query, "block")) {
        (Some(addr), None) => for_address(state, addr, page).await,
        (None, Some(hash)) => for_block(state, hash, page).await,
        _ => Err(ApiError::invalid_request(
            "need exactly one of ?address=ADDR or ?block=BLOCKHASH",
        )),
    }
}

async fn for_address(
    state: &ExplorerState,
    addr: &str,
    page: usize,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let info = state
        .node
        .get_info()
        .await
        .map_err(|e| ApiError::bad_request("failed to fetch node info", e))?;
    state.metrics.set_chain_height(info.blocks);

    let txids = state
        .node
        .get_address_txids(vec![addr.to_string()], state.start_height, info.blocks)
        .await
        .map_err(|e| ApiError::bad_request("failed to fetch transactions for address", e))?;

    let page_ids = pagination::page_or_empty(&txids, page);
    let txs = fetch_transactions(state, page_ids).await?;
    Ok(json_response(&txs))
}

async fn for_block(
    state: &ExplorerState,
    hash: &str,
    page: usize,
) -> Result<Response<Full<Bytes>>, ApiError> {
    parse_hash(hash).map_err(|e| ApiError::bad_request("invalid block hash", e))?;
    let block = state
        .node
        .get_block(hash)
        .await
        .map_err(|e| ApiError::bad_request("failed to fetch block", e))?;

    let page_ids = pagination::page_or_error(&block.tx, page)
        .map_err(|e| ApiError::bad_request("out of bounds", e))?;
    let txs = fetch_transactions(state, page_ids).await?;
    Ok(json_response(&txs))
}

async fn fetch_transactions(
    state: &ExplorerState,
    txids: &[String],
) -> Result<Vec<Transaction>, ApiError> {
    let mut txs = Vec::with_capacity(txids.len());
    for txid in txids {
        let tx = state.node.get_raw_transaction(txid).await.map_err(|e| {
            ApiError::bad_request(format!("failed to fetch transaction {txid}"), e)
        })?;
        txs.push(tx);
    }
    Ok(txs)
}

#[derive(Debug, Deserialize)]
struct SendRequest {
    tx: String,
}

#[derive(Debug, Serialize)]
struct SendResponse {
    txid: String,
}

/// `POST /tx/send`: relay a hex-serialized transaction through the node.
pub async fn send(
    state: &ExplorerState,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let body = read_body(req).await?;
    let send: SendRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request("failed to parse post body", e))?;

    // Catch garbage before it reaches the node.
    hex::decode(&send.tx)
        .map_err(|e| ApiError::bad_request("invalid transaction hex", e))?;

    let txid = state
        .node
        .send_raw_transaction(&send.tx)
        .await
        .map_err(|e| ApiError::bad_request("failed to relay transaction", e))?;
    Ok(json_response(&SendResponse { txid }))
}

#[derive(Debug, Deserialize)]
struct VerifyRequest {
    address: String,
    signature: String,
    message: String,
}

#[derive(Debug, Serialize)]
struct VerifyResponse {
    verified: bool,
}

/// `POST /messages/verify`: check a signed message against an address.
pub async fn verify(
    state: &ExplorerState,
    req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let body = read_body(req).await?;
    let verify: VerifyRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request("failed to parse post body", e))?;

    let verified = state
        .node
        .verify_message(&verify.address, &verify.signature, &verify.message)
        .await
        .map_err(|e| ApiError::bad_request("failed to verify message", e))?;
    Ok(json_response(&VerifyResponse { verified }))
}

async fn read_body(req: Request<Incoming>) -> Result<Bytes, ApiError> {
    req.into_body()
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| ApiError::bad_request("failed to read post body", e))
}
