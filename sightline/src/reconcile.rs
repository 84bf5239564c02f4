//! Ledger reconciliation for per-address queries.
//!
//! The node's address index answers in two halves: confirmed history and
//! pending mempool effects. The functions here merge the halves into the
//! shapes the API serves, without touching the network; handlers fetch,
//! this module decides.

use serde::Serialize;
use sightline_bitcore::types::{AddressUtxo, MempoolEntry};
use std::collections::HashSet;

/// Coordinates of one transaction output.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxOutputRef {
    pub txid: String,
    pub index: u32,
}

/// A confirmed output paying the queried address.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedOutput {
    pub address: String,
    pub txid: String,
    pub index: u32,
    pub script: String,
    pub satoshis: i64,
    pub height: u64,
}

impl From<AddressUtxo> for ConfirmedOutput {
    fn from(utxo: AddressUtxo) -> Self {
        Self {
            address: utxo.address,
            txid: utxo.txid,
            index: utxo.output_index,
            script: utxo.script,
            satoshis: utxo.satoshis,
            height: utxo.height,
        }
    }
}

/// A pending mempool effect on the queried address.
///
/// `spends` names the output this delta consumes; receipts leave it
/// unset and carry positive `satoshis`.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDelta {
    pub address: String,
    pub txid: String,
    pub index: u32,
    pub satoshis: i64,
    pub timestamp: u64,
    pub spends: Option<TxOutputRef>,
}

impl From<MempoolEntry> for PendingDelta {
    fn from(entry: MempoolEntry) -> Self {
        let spends = match (entry.prevtxid, entry.prevout) {
            (Some(txid), Some(index)) => Some(TxOutputRef { txid, index }),
            _ => None,
        };
        Self {
            address: entry.address,
            txid: entry.txid,
            index: entry.index,
            satoshis: entry.satoshis,
            timestamp: entry.timestamp,
            spends,
        }
    }
}

/// One spendable output as served on the utxo route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnspentOutput {
    pub address: String,
    pub txid: String,
    #[serde(rename = "outputIndex")]
    pub output_index: u32,
    pub script: String,
    pub satoshis: i64,
    pub height: u64,
    pub confirmations: u64,
}

/// Satoshis in one coin.
pub const SATS_PER_COIN: f64 = 100_000_000.0;

/// Convert a coin-denominated amount to satoshis, rounding to nearest.
/// Truncation would lose a unit on amounts like 0.00018 that have no
/// exact binary representation.
pub fn coins_to_sats(coins: f64) -> i64 {
    (coins * SATS_PER_COIN).round() as i64
}

/// Merge confirmed and pending views of an address into its spendable
/// outputs.
///
/// A confirmed output survives unless some confirmed input or pending
/// spend names its exact (txid, index) pair. Pending receipts join the
/// result with zero confirmations. Output is sorted by confirmation
/// count ascending, so pending outputs lead; the sort is stable, which
/// keeps the node's order within equal counts.
pub fn unspent_outputs(
    confirmed: &[ConfirmedOutput],
    confirmed_inputs: &[TxOutputRef],
    pending: &[PendingDelta],
    tip_height: u64,
) -> Vec<UnspentOutput> {
    let mut consumed: HashSet<(&str, u32)> = confirmed_inputs
        .iter()
        .map(|input| (input.txid.as_str(), input.index))
        .collect();
    for delta in pending {
        if let Some(spent) = &delta.spends {
            consumed.insert((spent.txid.as_str(), spent.index));
        }
    }

    let mut outputs = Vec::with_capacity(confirmed.len() + pending.len());

    for output in confirmed {
        if consumed.contains(&(output.txid.as_str(), output.index)) {
            continue;
        }
        outputs.push(UnspentOutput {
            address: output.address.clone(),
            txid: output.txid.clone(),
            output_index: output.index,
            script: output.script.clone(),
            satoshis: output.satoshis,
            height: output.height,
            confirmations: tip_height.saturating_sub(output.height) + 1,
        });
    }

    for delta in pending {
        if delta.spends.is_some() || delta.satoshis <= 0 {
            continue;
        }
        if consumed.contains(&(delta.txid.as_str(), delta.index)) {
            continue;
        }
        outputs.push(UnspentOutput {
            address: delta.address.clone(),
            txid: delta.txid.clone(),
            output_index: delta.index,
            script: String::new(),
            satoshis: delta.satoshis,
            height: 0,
            confirmations: 0,
        });
    }

    outputs.sort_by_key(|output| output.confirmations);
    outputs
}

/// Lifetime (received, sent) totals over a confirmed history.
///
/// Every output ever paid to the address counts as received; the subset
/// later named by a confirmed input also counts as sent. The identity
/// `received - sent == balance` holds exactly in satoshis.
pub fn balance_totals(
    confirmed: &[ConfirmedOutput],
    confirmed_inputs: &[TxOutputRef],
) -> (i64, i64) {
    let consumed: HashSet<(&str, u32)> = confirmed_inputs
        .iter()
        .map(|input| (input.txid.as_str(), input.index))
        .collect();
    let mut received = 0i64;
    let mut sent = 0i64;
    for output in confirmed {
        received += output.satoshis;
        if consumed.contains(&(output.txid.as_str(), output.index)) {
            sent += output.satoshis;
        }
    }
    (received, sent)
}

/// Net pending effect on an address: the plain signed sum of its
/// mempool deltas.
pub fn unconfirmed_balance(pending: &[PendingDelta]) -> i64 {
    pending.iter().map(|delta| delta.satoshis).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txid(byte: u8) -> String {
        format!("{:02x}", byte).repeat(32)
    }

    fn confirmed(tx: u8, index: u32, satoshis: i64, height: u64) -> ConfirmedOutput {
        ConfirmedOutput {
            address: "1XPTgDRhN8RFnzniWCddobD9iKZatrvH4".to_string(),
            txid: txid(tx),
            index,
            script: "76a914119b098e2e980a229e139a9ed01a469e518e6f2688ac".to_string(),
            satoshis,
            height,
        }
    }

    fn receipt(tx: u8, index: u32, satoshis: i64) -> PendingDelta {
        PendingDelta {
            address: "1XPTgDRhN8RFnzniWCddobD9iKZatrvH4".to_string(),
            txid: txid(tx),
            index,
            satoshis,
            timestamp: 1_463_602_662,
            spends: None,
        }
    }

    fn spend(tx: u8, satoshis: i64, spent_tx: u8, spent_index: u32) -> PendingDelta {
        PendingDelta {
            spends: Some(TxOutputRef { txid: txid(spent_tx), index: spent_index }),
            ..receipt(tx, 0, satoshis)
        }
    }

    #[test]
    fn test_confirmed_only_history_survives_intact() {
        let history = vec![confirmed(1, 0, 1_127_408, 399_901)];
        let outputs = unspent_outputs(&history, &[], &[], 400_000);

        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].satoshis, 1_127_408);
        assert_eq!(outputs[0].confirmations, 100);
        assert_eq!(outputs[0].output_index, 0);
    }

    #[test]
    fn test_pending_receipt_joins_with_zero_confirmations() {
        let history = vec![confirmed(1, 0, 1000, 399_901)];
        let pending = vec![receipt(2, 1, 50_000)];
        let outputs = unspent_outputs(&history, &[], &pending, 400_000);

        assert_eq!(outputs.len(), 2);
        // Ascending confirmations puts the pending output first.
        assert_eq!(outputs[0].confirmations, 0);
        assert_eq!(outputs[0].txid, txid(2));
        assert_eq!(outputs[0].script, "");
        assert_eq!(outputs[0].height, 0);
        assert_eq!(outputs[1].confirmations, 100);
    }

    #[test]
    fn test_pending_spend_excludes_exact_output() {
        let history = vec![confirmed(1, 0, 1000, 399_000), confirmed(1, 1, 2000, 399_000)];
        let pending = vec![spend(9, -1000, 1, 0)];
        let outputs = unspent_outputs(&history, &[], &pending, 400_000);

        // Only index 0 of tx 1 is consumed; index 1 survives.
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].output_index, 1);
        assert_eq!(outputs[0].satoshis, 2000);
    }

    #[test]
    fn test_spend_of_same_txid_different_index_is_not_excluded() {
        let history = vec![confirmed(1, 0, 1000, 399_000)];
        let pending = vec![spend(9, -500, 1, 7)];
        let outputs = unspent_outputs(&history, &[], &pending, 400_000);
        assert_eq!(outputs.len(), 1);
    }

    #[test]
    fn test_confirmed_inputs_exclude_outputs() {
        let history = vec![confirmed(1, 0, 1000, 399_000), confirmed(2, 0, 3000, 399_500)];
        let inputs = vec![TxOutputRef { txid: txid(1), index: 0 }];
        let outputs = unspent_outputs(&history, &inputs, &[], 400_000);

        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].txid, txid(2));
    }

    #[test]
    fn test_negative_delta_never_becomes_a_candidate() {
        // A spend delta that somehow arrives without prev coordinates
        // must still not surface as spendable value.
        let pending = vec![PendingDelta { spends: None, ..receipt(3, 0, -800) }];
        let outputs = unspent_outputs(&[], &[], &pending, 400_000);
        assert!(outputs.is_empty());
    }

    #[test]
    fn test_merge_is_idempotent() {
        let history = vec![confirmed(1, 0, 1000, 399_000), confirmed(2, 1, 2000, 399_500)];
        let pending = vec![receipt(3, 0, 700), spend(4, -1000, 1, 0)];

        let once = unspent_outputs(&history, &[], &pending, 400_000);
        let twice = unspent_outputs(&history, &[], &pending, 400_000);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_is_stable_within_equal_confirmations() {
        let history = vec![confirmed(1, 0, 10, 399_000), confirmed(2, 0, 20, 399_000)];
        let outputs = unspent_outputs(&history, &[], &[], 400_000);
        assert_eq!(outputs[0].txid, txid(1));
        assert_eq!(outputs[1].txid, txid(2));
    }

    #[test]
    fn test_tip_below_output_height_saturates() {
        // The tip can lag the index by a block mid-reorg; confirmation
        // math must not underflow.
        let history = vec![confirmed(1, 0, 10, 400_001)];
        let outputs = unspent_outputs(&history, &[], &[], 400_000);
        assert_eq!(outputs[0].confirmations, 1);
    }

    #[test]
    fn test_balance_totals_identity() {
        let history = vec![
            confirmed(1, 0, 5000, 399_000),
            confirmed(2, 0, 5000, 399_100),
            confirmed(3, 2, 1234, 399_200),
        ];
        let inputs = vec![
            TxOutputRef { txid: txid(1), index: 0 },
            TxOutputRef { txid: txid(2), index: 0 },
        ];
        let (received, sent) = balance_totals(&history, &inputs);
        assert_eq!(received, 11_234);
        assert_eq!(sent, 10_000);
        assert_eq!(received - sent, 1234);
    }

    #[test]
    fn test_fully_spent_history_zeroes_out() {
        let history = vec![confirmed(1, 0, 10_000, 399_000)];
        let inputs = vec![TxOutputRef { txid: txid(1), index: 0 }];
        let (received, sent) = balance_totals(&history, &inputs);
        assert_eq!(received, 10_000);
        assert_eq!(sent, 10_000);
        assert!(unspent_outputs(&history, &inputs, &[], 400_000).is_empty());
    }

    #[test]
    fn test_unconfirmed_balance_sums_signed_deltas() {
        let pending = vec![receipt(1, 0, 10_000), spend(2, -500, 1, 0)];
        assert_eq!(unconfirmed_balance(&pending), 9_500);
        assert_eq!(unconfirmed_balance(&[]), 0);
    }

    #[test]
    fn test_coins_to_sats_rounds_to_nearest() {
        assert_eq!(coins_to_sats(0.00018), 18_000);
        assert_eq!(coins_to_sats(0.01127408), 1_127_408);
        assert_eq!(coins_to_sats(50.0), 5_000_000_000);
        assert_eq!(coins_to_sats(0.0), 0);
    }
}
