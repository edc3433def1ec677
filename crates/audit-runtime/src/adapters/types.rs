//! JSON-RPC wire types and hex quantity helpers.

use serde::{Deserialize, Serialize};
use shared_types::{Address, BlockNumber, SourceError, U256};

/// `keccak256("Transfer(address,address,uint256)")`.
pub const TRANSFER_TOPIC: &str =
    "0xddf252ad1be2c89b69c2b068fc378daa952ba7f163c4a11628f55a4df523b3ef";

/// `balanceOf(address)` selector.
pub const BALANCE_OF_SELECTOR: &str = "70a08231";

/// JSON-RPC request structure
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<T> {
    pub jsonrpc: &'static str,
    pub method: String,
    pub params: T,
    pub id: u64,
}

impl<T> JsonRpcRequest<T> {
    pub fn new(method: impl Into<String>, params: T, id: u64) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params,
            id,
        }
    }
}

/// JSON-RPC response structure
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub id: Option<u64>,
    pub result: Option<T>,
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

impl std::fmt::Display for JsonRpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RPC Error {}: {}", self.code, self.message)
    }
}

/// Block as returned by `eth_getBlockByNumber(_, false)`; only the fields
/// the audit reads.
#[derive(Debug, Deserialize)]
pub struct RpcBlock {
    pub number: String,
    #[serde(default)]
    pub withdrawals: Vec<RpcWithdrawal>,
}

/// Entry of a block's `withdrawals` array.
#[derive(Debug, Deserialize)]
pub struct RpcWithdrawal {
    pub index: String,
    pub address: String,
    pub amount: String,
}

/// `eth_getLogs` filter.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub address: String,
    pub topics: Vec<String>,
    pub from_block: String,
    pub to_block: String,
}

/// Entry of an `eth_getLogs` result.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
    pub block_number: String,
    pub topics: Vec<String>,
    pub data: String,
}

/// `eth_call` transaction object.
#[derive(Debug, Serialize)]
pub struct CallRequest {
    pub to: String,
    pub data: String,
}

/// Block tag for a number or an open bound.
pub fn block_tag(block: Option<BlockNumber>, open: &str) -> String {
    block.map_or_else(|| open.to_string(), |n| format!("{n:#x}"))
}

fn strip_hex(raw: &str) -> &str {
    raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")).unwrap_or(raw)
}

/// Parse a hex quantity (`"0x1a"`) into a `u64`.
pub fn parse_quantity(what: &str, raw: &str) -> Result<u64, SourceError> {
    let digits = strip_hex(raw);
    if digits.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(digits, 16).map_err(|e| SourceError::malformed(what, format!("{raw}: {e}")))
}

/// Parse a hex quantity or 32-byte word into a `U256`.
pub fn parse_quantity_u256(what: &str, raw: &str) -> Result<U256, SourceError> {
    let digits = strip_hex(raw);
    if digits.is_empty() {
        return Ok(U256::zero());
    }
    U256::from_str_radix(digits, 16).map_err(|e| SourceError::malformed(what, format!("{raw}: {e:?}")))
}

/// Parse a 32-byte topic holding an address.
pub fn parse_topic_address(what: &str, raw: &str) -> Result<Address, SourceError> {
    let mut word = [0u8; 32];
    hex::decode_to_slice(strip_hex(raw), &mut word)
        .map_err(|e| SourceError::malformed(what, format!("{raw}: {e}")))?;
    Ok(Address::from_word(&word))
}

/// Calldata of `balanceOf(holder)`.
pub fn balance_of_calldata(holder: &Address) -> String {
    format!("0x{}{}", BALANCE_OF_SELECTOR, hex::encode(holder.to_word()))
}
