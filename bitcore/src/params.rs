//! Typed request parameters.
//!
//! The node takes positional JSON arrays; each shape here serializes to
//! exactly the array its methods expect, so a malformed parameter list
//! cannot be constructed. Object-valued parameters are wrapped in a
//! one-element tuple at the call site to produce the enclosing array.

use serde::Serialize;

/// Parameter list for methods that take no arguments.
///
/// Serializes to `[]`; the unit type would serialize to `null`, which
/// the node rejects.
pub const NO_PARAMS: [u8; 0] = [];

/// Address set plus an inclusive height range, for `getaddresstxids`
/// and `getaddressdeltas`.
#[derive(Debug, Clone, Serialize)]
pub struct AddressRange {
    pub addresses: Vec<String>,
    pub start: u64,
    pub end: u64,
}

/// Bare address set, for `getaddressbalance`, `getaddressutxos` and
/// `getaddressmempool`.
#[derive(Debug, Clone, Serialize)]
pub struct AddressSet {
    pub addresses: Vec<String>,
}

/// Output coordinates for `getspentinfo`.
#[derive(Debug, Clone, Serialize)]
pub struct OutputQuery {
    pub tx: String,
    pub index: u32,
}

/// `[txid, verbosity]` pair for `getrawtransaction`.
#[derive(Debug, Clone, Serialize)]
pub struct TxidVerbosity(pub String, pub u8);

/// `[hash, verbose]` pair for `getblock`.
#[derive(Debug, Clone, Serialize)]
pub struct BlockQuery(pub String, pub bool);

/// `[high, low]` unix-time window for `getblockhashes`, newest bound
/// first.
#[derive(Debug, Clone, Serialize)]
pub struct TimeWindow(pub u64, pub u64);

/// `[address, signature, message]` triple for `verifymessage`.
#[derive(Debug, Clone, Serialize)]
pub struct MessageProof(pub String, pub String, pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_params_wrap_into_arrays() {
        let params = (AddressRange {
            addresses: vec!["12c6DSiU4Rq3P4ZxziKxzrL5LmMBrzjrJX".to_string()],
            start: 373601,
            end: 400000,
        },);
        assert_eq!(
            serde_json::to_value(params).unwrap(),
            json!([{
                "addresses": ["12c6DSiU4Rq3P4ZxziKxzrL5LmMBrzjrJX"],
                "start": 373601,
                "end": 400000
            }])
        );

        let params = (OutputQuery { tx: "ab".repeat(32), index: 4 },);
        assert_eq!(
            serde_json::to_value(params).unwrap(),
            json!([{ "tx": "ab".repeat(32), "index": 4 }])
        );
    }

    #[test]
    fn test_positional_params_serialize_in_order() {
        let params = TxidVerbosity("deadbeef".to_string(), 1);
        assert_eq!(serde_json::to_value(params).unwrap(), json!(["deadbeef", 1]));

        let params = TimeWindow(1526300000, 1526213600);
        assert_eq!(
            serde_json::to_value(params).unwrap(),
            json!([1526300000u64, 1526213600u64])
        );

        let params = BlockQuery("00".repeat(32), true);
        assert_eq!(
            serde_json::to_value(params).unwrap(),
            json!(["00".repeat(32), true])
        );
    }

    #[test]
    fn test_no_params_is_an_empty_array() {
        assert_eq!(serde_json::to_value(NO_PARAMS).unwrap(), json!([]));
    }
}
