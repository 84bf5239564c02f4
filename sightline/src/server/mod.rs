//! Explorer HTTP API.
//!
//! One hand-routed hyper server. Requests are dispatched on method and
//! path segments; responses on the read routes flow through the shared
//! response cache keyed by path and query, so repeated queries inside
//! the cache window never reach the node.

pub mod address;
pub mod chain;
pub mod error;
pub mod transactions;

use anyhow::Result;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tracing::{debug, info};

use crate::cache::ResponseCache;
use crate::metrics::ExplorerMetrics;
use crate::prices::PriceBoard;
use crate::recent_blocks::RecentBlocks;
use error::ApiError;
use sightline_bitcore::BitcoreClient;

/// Build identity served on the version route.
#[derive(Debug, Clone, Serialize)]
pub struct VersionData {
    pub version: String,
    pub commit: String,
    pub branch: String,
}

/// Everything a request handler can reach.
pub struct ExplorerState {
    pub node: BitcoreClient,
    pub cache: ResponseCache,
    pub cache_ttl: Duration,
    pub start_height: u64,
    pub prices: PriceBoard,
    pub recent_blocks: RecentBlocks,
    pub metrics: ExplorerMetrics,
    pub version: VersionData,
    pub started_at: Instant,
}

/// Accept loop: one spawned task per connection.
pub async fn start_server(addr: SocketAddr, state: Arc<ExplorerState>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Explorer API listening on {}", addr);

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let state = state.clone();

        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let state = state.clone();
                async move { handle_request(req, state).await }
            });

            if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
                debug!("connection error: {}", e);
            }
        });
    }
}

async fn handle_request(
    req: Request<Incoming>,
    state: Arc<ExplorerState>,
) -> Result<Response<Full<Bytes>>, std::convert::Infallible> {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let path = uri.path();
    let query = uri.query().unwrap_or("");

    // Observability endpoints stay outside the cache and request
    // counters.
    if method == Method::GET && path == "/health" {
        return Ok(health_response(&state));
    }
    if method == Method::GET && path == "/metrics" {
        state.metrics.set_cache_entries(state.cache.len());
        return Ok(metrics_response(&state));
    }

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let route = route_name(&method, &segments);
    state.metrics.record_request(route);

    let cacheable = is_cacheable(&method, &segments);
    let key = match uri.query() {
        Some(q) => format!("{path}?{q}"),
        None => path.to_string(),
    };

    if cacheable {
        if let Some(body) = state.cache.get(&key) {
            state.metrics.record_cache_hit();
            return Ok(cached_response(body));
        }
        state.metrics.record_cache_miss();
    }

    let response = match dispatch(req, &state, &segments, query).await {
        Ok(response) => response,
        Err(e) => {
            state.metrics.record_error(route);
            e.into_response()
        }
    };

    if !cacheable {
        return Ok(response);
    }

    // Cache whatever the handler produced, error bodies included; a
    // failing upstream should not be hammered any harder than a healthy
    // one.
    let (parts, body) = response.into_parts();
    let bytes = body
        .collect()
        .await
        .map(|collected| collected.to_bytes())
        .unwrap_or_default();
    state.cache.set(key, bytes.clone(), state.cache_ttl);
    Ok(Response::from_parts(parts, Full::new(bytes)))
}

async fn dispatch(
    req: Request<Incoming>,
    state: &ExplorerState,
    segments: &[&str],
    query: &str,
) -> Result<Response<Full<Bytes>>, ApiError> {
    let method = req.method().clone();
    match (&method, segments) {
        (&Method::GET, ["addr", addr, "utxo"]) => address::utxo(state, addr).await,
        (&Method::GET, ["addr", addr, "balance"]) => address::balance(state, addr).await,
        (&Method::GET, ["addr", addr, "totalReceived"]) => {
            address::total_received(state, addr).await
        }
        (&Method::GET, ["addr", addr, "totalSent"]) => address::total_sent(state, addr).await,
        (&Method::GET, ["addr", addr, "unconfirmedBalance"]) => {
            address::unconfirmed_balance(state, addr).await
        }
        (&Method::POST, ["tx", "send"]) => transactions::send(state, req).await,
        (&Method::GET, ["tx", txid]) => transactions::transaction(state, txid).await,
        (&Method::GET, ["rawtx", txid]) => transactions::raw_transaction(state, txid).await,
        (&Method::GET, ["transactions"]) => transactions::list(state, query).await,
        (&Method::POST, ["messages", "verify"]) => transactions::verify(state, req).await,
        (&Method::GET, ["block", hash]) => chain::block(state, hash).await,
        (&Method::GET, ["block-index", height]) => chain::block_index(state, height).await,
        (&Method::GET, ["blocks"]) => chain::blocks(state, query),
        (&Method::GET, ["status"]) => chain::status(state, query).await,
        (&Method::GET, ["sync"]) => chain::sync(state).await,
        (&Method::GET, ["version"]) => Ok(chain::version(state)),
        (&Method::GET, ["currency"]) => Ok(chain::currency(state)),
        _ => Err(ApiError::not_found()),
    }
}

/// Route label for metrics; bounded set, no raw paths.
fn route_name(method: &Method, segments: &[&str]) -> &'static str {
    match (method, segments) {
        (&Method::GET, ["addr", _, "utxo"]) => "addr_utxo",
        (&Method::GET, ["addr", _, "balance"]) => "addr_balance",
        (&Method::GET, ["addr", _, "totalReceived"]) => "addr_total_received",
        (&Method::GET, ["addr", _, "totalSent"]) => "addr_total_sent",
        (&Method::GET, ["addr", _, "unconfirmedBalance"]) => "addr_unconfirmed_balance",
        (&Method::POST, ["tx", "send"]) => "tx_send",
        (&Method::GET, ["tx", _]) => "tx",
        (&Method::GET, ["rawtx", _]) => "rawtx",
        (&Method::GET, ["transactions"]) => "transactions",
        (&Method::POST, ["messages", "verify"]) => "messages_verify",
        (&Method::GET, ["block", _]) => "block",
        (&Method::GET, ["block-index", _]) => "block_index",
        (&Method::GET, ["blocks"]) => "blocks",
        (&Method::GET, ["status"]) => "status",
        (&Method::GET, ["sync"]) => "sync",
        (&Method::GET, ["version"]) => "version",
        (&Method::GET, ["currency"]) => "currency",
        _ => "unknown",
    }
}

/// Only idempotent node-backed reads go through the cache. Snapshot
/// routes are already served from memory and the chain-state routes
/// must stay live.
fn is_cacheable(method: &Method, segments: &[&str]) -> bool {
    if method != Method::GET {
        return false;
    }
    matches!(
        segments,
        ["addr", ..]
            | ["tx", _]
            | ["rawtx", _]
            | ["transactions"]
            | ["block", _]
            | ["block-index", _]
    )
}

/// First value for `name` in a raw query string.
pub(crate) fn query_param<'a>(query: &'a str, name: &str) -> Option<&'a str> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then_some(value)
    })
}

/// Reject identifiers that are not 32 hex-encoded bytes before they
/// reach the node.
pub(crate) fn parse_hash(value: &str) -> Result<(), hex::FromHexError> {
    let bytes = hex::decode(value)?;
    if bytes.len() != 32 {
        return Err(hex::FromHexError::InvalidStringLength);
    }
    Ok(())
}

pub(crate) fn json_response<T: Serialize>(value: &T) -> Response<Full<Bytes>> {
    let body = serde_json::to_string(value).unwrap_or_default();
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Full::new(Bytes::from(body)))
        .unwrap()
}

fn cached_response(body: Bytes) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "application/json")
        .body(Full::new(body))
        .unwrap()
}

// ---------------------------------------------------------------------------
// Observability endpoints
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: HealthStatus,
    uptime_seconds: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum HealthStatus {
    Healthy,
}

fn health_response(state: &ExplorerState) -> Response<Full<Bytes>> {
    json_response(&HealthResponse {
        status: HealthStatus::Healthy,
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

fn metrics_response(state: &ExplorerState) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/plain; version=0.0.4; charset=utf-8")
        .body(Full::new(Bytes::from(state.metrics.encode())))
        .unwrap()
}
