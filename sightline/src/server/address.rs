//! Per-address query handlers.
//!
//! Balance-style routes serve a bare satoshi integer; the utxo route
//! serves the reconciled spendable set. All of them hit the node's
//! address index and degrade to a 400 naming the failed stage.

use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;

use super::error::ApiError;
use super::{json_response, ExplorerState};
use crate::reconcile::{self, ConfirmedOutput, PendingDelta};

pub async fn utxo(state: &ExplorerState, addr: &str) -> Result<Response<Full<Bytes>>, ApiError> {
    let info = state
        .node
        .get_info()
        .await
        .map_err(|e| ApiError::bad_request("failed to fetch node info", e))?;
    state.metrics.set_chain_height(info.blocks);

    let utxos = state
        .node
        .get_address_utxos(vec![addr.to_string()])
        .await
        .map_err(|e| ApiError::bad_request("failed to fetch unspent outputs for address", e))?;
    let mempool = state
        .node
        .get_address_mempool(vec![addr.to_string()])
        .await
        .map_err(|e| ApiError::bad_request("failed to fetch mempool entries for address", e))?;

    let confirmed: Vec<ConfirmedOutput> = utxos.into_iter().map(Into::into).collect();
    let pending: Vec<PendingDelta> = mempool.into_iter().map(Into::into).collect();

    // The node already excludes confirmed outputs with confirmed
    // spends, so only pending spends need reconciling here.
    let outputs = reconcile::unspent_outputs(&confirmed, &[], &pending, info.blocks);
    Ok(json_response(&outputs))
}

pub async fn balance(state: &ExplorerState, addr: &str) -> Result<Response<Full<Bytes>>, ApiError> {
    let balance = state
        .node
        .get_address_balance(vec![addr.to_string()])
        .await
        .map_err(|e| ApiError::bad_request("failed to fetch balance for address", e))?;
    Ok(json_response(&balance.balance))
}

pub async fn total_received(
    state: &ExplorerState,
    addr: &str,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let balance = state
        .node
        .get_address_balance(vec![addr.to_string()])
        .await
        .map_err(|e| ApiError::bad_request("failed to fetch balance for address", e))?;
    Ok(json_response(&balance.received))
}

pub async fn total_sent(
    state: &ExplorerState,
    addr: &str,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let balance = state
        .node
        .get_address_balance(vec![addr.to_string()])
        .await
        .map_err(|e| ApiError::bad_request("failed to fetch balance for address", e))?;
    // received - sent == balance, so sent falls out of the node's own
    // totals without a second call.
    Ok(json_response(&(balance.received - balance.balance)))
}

pub async fn unconfirmed_balance(
    state: &ExplorerState,
    addr: &str,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let mempool = state
        .node
        .get_address_mempool(vec![addr.to_string()])
        .await
        .map_err(|e| ApiError::bad_request("failed to fetch mempool entries for address", e))?;
    let pending: Vec<PendingDelta> = mempool.into_iter().map(Into::into).collect();
    Ok(json_response(&reconcile::unconfirmed_balance(&pending)))
}
