//! JSON-RPC 1.0 client for a bitcore node with the address index enabled.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::params::{
    AddressRange, AddressSet, BlockQuery, MessageProof, OutputQuery, TimeWindow, TxidVerbosity,
    NO_PARAMS,
};
use crate::types::{
    AddressBalance, AddressDelta, AddressUtxo, Block, BlockchainInfo, MempoolEntry, NodeInfo,
    SpentInfo, Transaction,
};

/// Timeout for node RPC requests
const RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// JSON-RPC request ID counter
static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// JSON-RPC request structure
#[derive(Debug, Serialize)]
struct JsonRpcRequest<P> {
    jsonrpc: &'static str,
    method: &'static str,
    params: P,
    id: u64,
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
    #[allow(dead_code)]
    id: Option<serde_json::Value>,
}

/// JSON-RPC error object
#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

/// Errors surfaced while talking to the node.
#[derive(Debug, Error)]
pub enum Error {
    /// Request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success status with a body that was not a JSON-RPC envelope.
    #[error("unexpected http status: {0}")]
    Http(reqwest::StatusCode),
    /// The node reported an error for the call.
    #[error("node error {code}: {message}")]
    Node { code: i32, message: String },
    /// Response body was not a JSON-RPC envelope.
    #[error("malformed node response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Envelope carried neither a result nor an error.
    #[error("node response missing result")]
    MissingResult,
}

/// Client for the node's JSON-RPC endpoint.
///
/// Cheap to share behind an `Arc`; `reqwest::Client` pools connections
/// internally.
pub struct BitcoreClient {
    client: reqwest::Client,
    url: String,
    username: String,
    password: String,
}

impl BitcoreClient {
    pub fn new(url: String, username: String, password: String) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(RPC_TIMEOUT).build()?;
        Ok(Self { client, url, username, password })
    }

    async fn call<T, P>(&self, method: &'static str, params: P) -> Result<T, Error>
    where
        T: DeserializeOwned,
        P: Serialize,
    {
        let id = REQUEST_ID.fetch_add(1, Ordering::SeqCst);
        let request = JsonRpcRequest { jsonrpc: "1.0", method, params, id };

        debug!("node rpc: {} (id: {})", method, id);

        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .json(&request)
            .send()
            .await?;

        // The node reports call failures as non-success statuses with a
        // JSON-RPC envelope in the body, so decode before giving up on
        // the status code.
        let status = response.status();
        let body = response.bytes().await?;
        let envelope: JsonRpcResponse<T> = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => return Err(Error::Http(status)),
            Err(e) => return Err(Error::Decode(e)),
        };

        if let Some(error) = envelope.error {
            return Err(Error::Node { code: error.code, message: error.message });
        }

        envelope.result.ok_or(Error::MissingResult)
    }

    /// Transaction ids touching the addresses, between `start` and `end`
    /// heights inclusive, oldest first.
    pub async fn get_address_txids(
        &self,
        addresses: Vec<String>,
        start: u64,
        end: u64,
    ) -> Result<Vec<String>, Error> {
        self.call("getaddresstxids", (AddressRange { addresses, start, end },)).await
    }

    /// Every ledger movement for the addresses in the height range.
    pub async fn get_address_deltas(
        &self,
        addresses: Vec<String>,
        start: u64,
        end: u64,
    ) -> Result<Vec<AddressDelta>, Error> {
        self.call("getaddressdeltas", (AddressRange { addresses, start, end },)).await
    }

    /// Lifetime balance and received totals, in satoshis.
    pub async fn get_address_balance(
        &self,
        addresses: Vec<String>,
    ) -> Result<AddressBalance, Error> {
        self.call("getaddressbalance", (AddressSet { addresses },)).await
    }

    /// Confirmed unspent outputs paying the addresses.
    pub async fn get_address_utxos(
        &self,
        addresses: Vec<String>,
    ) -> Result<Vec<AddressUtxo>, Error> {
        self.call("getaddressutxos", (AddressSet { addresses },)).await
    }

    /// Pending mempool effects on the addresses.
    pub async fn get_address_mempool(
        &self,
        addresses: Vec<String>,
    ) -> Result<Vec<MempoolEntry>, Error> {
        self.call("getaddressmempool", (AddressSet { addresses },)).await
    }

    /// Verbose transaction lookup by id.
    pub async fn get_raw_transaction(&self, txid: &str) -> Result<Transaction, Error> {
        self.call("getrawtransaction", TxidVerbosity(txid.to_string(), 1)).await
    }

    /// Hashes of blocks timestamped inside `[low, high]`, oldest first.
    pub async fn get_block_hashes(&self, high: u64, low: u64) -> Result<Vec<String>, Error> {
        self.call("getblockhashes", TimeWindow(high, low)).await
    }

    /// Where (if anywhere) an output was consumed.
    pub async fn get_spent_info(&self, txid: &str, index: u32) -> Result<SpentInfo, Error> {
        self.call("getspentinfo", (OutputQuery { tx: txid.to_string(), index },)).await
    }

    /// Verbose block lookup by hash.
    pub async fn get_block(&self, hash: &str) -> Result<Block, Error> {
        self.call("getblock", BlockQuery(hash.to_string(), true)).await
    }

    /// Block hash at the given height.
    pub async fn get_block_hash(&self, height: u64) -> Result<String, Error> {
        self.call("getblockhash", (height,)).await
    }

    pub async fn get_blockchain_info(&self) -> Result<BlockchainInfo, Error> {
        self.call("getblockchaininfo", NO_PARAMS).await
    }

    pub async fn get_info(&self) -> Result<NodeInfo, Error> {
        self.call("getinfo", NO_PARAMS).await
    }

    pub async fn get_difficulty(&self) -> Result<f64, Error> {
        self.call("getdifficulty", NO_PARAMS).await
    }

    pub async fn get_best_block_hash(&self) -> Result<String, Error> {
        self.call("getbestblockhash", NO_PARAMS).await
    }

    /// Submit a serialized transaction; returns its txid.
    pub async fn send_raw_transaction(&self, hex: &str) -> Result<String, Error> {
        self.call("sendrawtransaction", (hex.to_string(),)).await
    }

    /// Check a signed message against an address.
    pub async fn verify_message(
        &self,
        address: &str,
        signature: &str,
        message: &str,
    ) -> Result<bool, Error> {
        self.call(
            "verifymessage",
            MessageProof(address.to_string(), signature.to_string(), message.to_string()),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_shape() {
        let request = JsonRpcRequest {
            jsonrpc: "1.0",
            method: "getblockhash",
            params: (400000u64,),
            id: 7,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "jsonrpc": "1.0", "method": "getblockhash", "params": [400000], "id": 7 })
        );
    }

    #[test]
    fn test_response_error_envelope() {
        let raw = r#"{ "result": null, "error": { "code": -5, "message": "No information available" }, "id": 7 }"#;
        let envelope: JsonRpcResponse<String> = serde_json::from_str(raw).unwrap();
        assert!(envelope.result.is_none());
        let error = envelope.error.unwrap();
        assert_eq!(error.code, -5);
        assert_eq!(error.message, "No information available");
    }

    #[test]
    fn test_response_result_envelope() {
        let raw = r#"{ "result": 1.23, "error": null, "id": 8 }"#;
        let envelope: JsonRpcResponse<f64> = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.result, Some(1.23));
        assert!(envelope.error.is_none());
    }

    #[test]
    fn test_request_ids_are_unique() {
        let a = REQUEST_ID.fetch_add(1, Ordering::SeqCst);
        let b = REQUEST_ID.fetch_add(1, Ordering::SeqCst);
        assert!(b > a);
    }
}
