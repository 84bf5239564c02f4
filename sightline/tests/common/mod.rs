//! Shared test fixtures: a canned JSON-RPC node.

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};
use tokio::net::TcpListener;

/// In-process stand-in for the address-indexed node. Tests register a
/// result per RPC method; every request for that method gets it back in
/// a JSON-RPC envelope. Unregistered methods answer with a method-not-
/// found error, which exercises the error paths.
#[derive(Clone, Default)]
pub struct MockNode {
    results: Arc<RwLock<HashMap<String, Value>>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the canned result for a method.
    pub fn set(&self, method: &str, result: Value) {
        self.results.write().unwrap().insert(method.to_string(), result);
    }

    /// How many times a method has been called.
    pub fn calls(&self, method: &str) -> usize {
        self.calls.read().unwrap().iter().filter(|m| m.as_str() == method).count()
    }

    /// Bind on an ephemeral port and serve until dropped.
    pub async fn start(&self) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let node = self.clone();

        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(accepted) => accepted,
                    Err(_) => break,
                };
                let io = TokioIo::new(stream);
                let node = node.clone();
                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        let node = node.clone();
                        async move { node.answer(req).await }
                    });
                    let _ = http1::Builder::new().serve_connection(io, service).await;
                });
            }
        });

        addr
    }

    async fn answer(
        &self,
        req: Request<Incoming>,
    ) -> Result<Response<Full<Bytes>>, std::convert::Infallible> {
        let body = req
            .into_body()
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .unwrap_or_default();
        let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        let method = request["method"].as_str().unwrap_or_default().to_string();
        let id = request["id"].clone();

        self.calls.write().unwrap().push(method.clone());

        let reply = match self.results.read().unwrap().get(&method) {
            Some(result) => json!({ "result": result, "error": null, "id": id }),
            None => json!({
                "result": null,
                "error": { "code": -32601, "message": "Method not found" },
                "id": id
            }),
        };
        Ok(Response::new(Full::new(Bytes::from(reply.to_string()))))
    }
}
