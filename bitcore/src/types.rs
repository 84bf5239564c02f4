//! Wire types for the node's address-index and chain RPCs.
//!
//! Field names mirror the node's JSON exactly; structs that the explorer
//! serves back out verbatim derive `Serialize` as well.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Address index results
// ---------------------------------------------------------------------------

/// One ledger movement from `getaddressdeltas`. Negative `satoshis` means
/// the address was spent from in that transaction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddressDelta {
    pub satoshis: i64,
    pub txid: String,
    pub index: u32,
    pub blockindex: u32,
    pub height: u64,
    pub address: String,
}

/// Result of `getaddressbalance`: lifetime totals in satoshis.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AddressBalance {
    pub balance: i64,
    pub received: i64,
}

/// One confirmed unspent output from `getaddressutxos`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddressUtxo {
    pub address: String,
    pub txid: String,
    #[serde(rename = "outputIndex")]
    pub output_index: u32,
    pub script: String,
    pub satoshis: i64,
    pub height: u64,
}

/// One pending effect from `getaddressmempool`.
///
/// Receipts carry only the output coordinates; spends additionally name
/// the consumed output in `prevtxid`/`prevout` and carry negative
/// `satoshis`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MempoolEntry {
    pub address: String,
    pub txid: String,
    pub index: u32,
    pub satoshis: i64,
    pub timestamp: u64,
    #[serde(default)]
    pub prevtxid: Option<String>,
    #[serde(default)]
    pub prevout: Option<u32>,
}

/// Result of `getspentinfo`: where a given output was consumed.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpentInfo {
    pub txid: String,
    pub index: u32,
    pub height: u64,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Verbose `getrawtransaction` result.
///
/// Fields that only exist once a transaction is mined (`blockhash`,
/// `height`, `confirmations`, times) default to zero values for mempool
/// transactions, and are always serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub hex: String,
    pub txid: String,
    pub size: u32,
    pub version: u32,
    pub locktime: u32,
    pub vin: Vec<TxInput>,
    pub vout: Vec<TxOutput>,
    #[serde(default)]
    pub blockhash: String,
    #[serde(default)]
    pub height: i64,
    #[serde(default)]
    pub confirmations: i64,
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub blocktime: i64,
}

/// Transaction input. Coinbase inputs deserialize to zero values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxInput {
    #[serde(default)]
    pub txid: String,
    #[serde(default)]
    pub vout: u32,
    #[serde(default, rename = "scriptSig")]
    pub script_sig: ScriptSig,
    #[serde(default)]
    pub value: f64,
    #[serde(default, rename = "valueSat")]
    pub value_sat: i64,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub sequence: i64,
}

/// Transaction output, with the address index's spend annotations when
/// the output has already been consumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: f64,
    #[serde(default, rename = "valueSat")]
    pub value_sat: i64,
    pub n: u32,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
    #[serde(rename = "spentTxId", skip_serializing_if = "Option::is_none")]
    pub spent_tx_id: Option<String>,
    #[serde(rename = "spentIndex", skip_serializing_if = "Option::is_none")]
    pub spent_index: Option<u32>,
    #[serde(rename = "spentHeight", skip_serializing_if = "Option::is_none")]
    pub spent_height: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptSig {
    #[serde(default)]
    pub asm: String,
    #[serde(default)]
    pub hex: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptPubKey {
    #[serde(default)]
    pub asm: String,
    #[serde(default)]
    pub hex: String,
    #[serde(default, rename = "reqSigs")]
    pub req_sigs: u32,
    #[serde(default, rename = "type")]
    pub script_type: String,
    #[serde(default)]
    pub addresses: Vec<String>,
}

// ---------------------------------------------------------------------------
// Blocks and chain state
// ---------------------------------------------------------------------------

/// Verbose `getblock` result with transaction ids only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub hash: String,
    pub confirmations: i64,
    pub strippedsize: i32,
    pub size: i32,
    pub weight: i32,
    pub height: u64,
    pub version: i32,
    #[serde(default, rename = "versionHex")]
    pub version_hex: String,
    pub merkleroot: String,
    #[serde(default)]
    pub tx: Vec<String>,
    pub time: i64,
    pub nonce: u32,
    pub bits: String,
    pub difficulty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previousblockhash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nextblockhash: Option<String>,
}

/// Subset of `getblockchaininfo` the explorer consumes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BlockchainInfo {
    pub chain: String,
    pub blocks: u64,
    pub headers: u64,
    pub bestblockhash: String,
    pub difficulty: f64,
}

/// `getinfo` summary, served back out raw on the status route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub version: u32,
    pub protocolversion: u32,
    pub blocks: u64,
    pub timeoffset: i64,
    pub connections: u32,
    #[serde(default)]
    pub proxy: String,
    pub difficulty: f64,
    pub testnet: bool,
    pub relayfee: f64,
    #[serde(default)]
    pub errors: String,
}
