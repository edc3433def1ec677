//! # Core Domain Entities
//!
//! Chain records observed by the audit tooling.
//!
//! ## Clusters
//!
//! - **Identity**: [`Address`], [`BlockNumber`]
//! - **Consensus layer**: [`Withdrawal`], [`BlockWithdrawals`], [`WithdrawalDetail`]
//! - **Token**: [`TransferEvent`]

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_with::serde_as;
use std::fmt;
use std::str::FromStr;

use crate::amount::DecimalU256;
use crate::errors::ParseError;

// Re-export U256 from primitive-types for use across all subsystems
pub use primitive_types::U256;

/// Height of a block on the execution chain.
pub type BlockNumber = u64;

// =============================================================================
// IDENTITY
// =============================================================================

/// A 20-byte Ethereum-style address.
///
/// Renders and serializes as lowercase `0x`-prefixed hex. Parsing accepts
/// either case, with or without the `0x` prefix.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (mint/burn counterparty of ERC20 transfers).
    pub const ZERO: Address = Address([0u8; 20]);

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Left-pad into a 32-byte ABI word / log topic.
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }

    /// Take the low 20 bytes of a 32-byte ABI word / log topic.
    pub fn from_word(word: &[u8; 32]) -> Self {
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&word[12..]);
        Address(bytes)
    }
}

impl FromStr for Address {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.len() != 40 {
            return Err(ParseError::InvalidAddress(s.to_string()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| ParseError::InvalidAddress(s.to_string()))?;
        Ok(Address(bytes))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// CONSENSUS LAYER
// =============================================================================

/// One consensus-layer withdrawal as listed in an execution block.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Recipient of the withdrawal.
    pub address: Address,
    /// Amount in the withdrawal source's native unit.
    #[serde_as(as = "DecimalU256")]
    pub amount: U256,
    /// Global withdrawal index.
    #[serde_as(as = "DecimalU256")]
    pub index: U256,
}

/// The withdrawals attached to one block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BlockWithdrawals {
    /// Block height.
    pub number: BlockNumber,
    /// Withdrawals in the order the block lists them.
    pub withdrawals: Vec<Withdrawal>,
}

impl BlockWithdrawals {
    /// Create a block record.
    pub fn new(number: BlockNumber, withdrawals: Vec<Withdrawal>) -> Self {
        Self {
            number,
            withdrawals,
        }
    }

    /// True when the block carries no withdrawals.
    pub fn is_empty(&self) -> bool {
        self.withdrawals.is_empty()
    }
}

/// A recorded withdrawal inside an address ledger. Immutable once recorded.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawalDetail {
    /// Block that carried the withdrawal.
    pub block: BlockNumber,
    /// Global withdrawal index.
    #[serde_as(as = "DecimalU256")]
    pub index: U256,
    /// Amount in the withdrawal source's native unit.
    #[serde_as(as = "DecimalU256")]
    pub amount: U256,
}

impl WithdrawalDetail {
    /// Build the ledger record for a withdrawal seen in `block`.
    pub fn from_withdrawal(block: BlockNumber, withdrawal: &Withdrawal) -> Self {
        Self {
            block,
            index: withdrawal.index,
            amount: withdrawal.amount,
        }
    }
}

// =============================================================================
// TOKEN
// =============================================================================

/// An ERC20 `Transfer` event. Claims are transfers whose sender is the deposit
/// contract.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferEvent {
    /// Block the event was emitted in.
    pub block: BlockNumber,
    /// Sender.
    pub from: Address,
    /// Recipient.
    pub to: Address,
    /// Token amount.
    #[serde_as(as = "DecimalU256")]
    pub value: U256,
}

impl TransferEvent {
    /// Create a transfer event.
    pub fn new(block: BlockNumber, from: Address, to: Address, value: U256) -> Self {
        Self {
            block,
            from,
            to,
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(byte: u8) -> Address {
        Address([byte; 20])
    }

    #[test]
    fn test_address_parse_is_case_insensitive() {
        let upper: Address = "0xABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD".parse().unwrap();
        let lower: Address = "abcdefabcdefabcdefabcdefabcdefabcdefabcd".parse().unwrap();
        assert_eq!(upper, lower);
        assert_eq!(
            upper.to_string(),
            "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd"
        );
    }

    #[test]
    fn test_address_rejects_wrong_length() {
        assert!("0x1234".parse::<Address>().is_err());
        assert!("0xzzcdefabcdefabcdefabcdefabcdefabcdefabcd"
            .parse::<Address>()
            .is_err());
    }

    #[test]
    fn test_address_word_roundtrip() {
        let a = addr(0x5a);
        let word = a.to_word();
        assert_eq!(&word[..12], &[0u8; 12]);
        assert_eq!(Address::from_word(&word), a);
    }

    #[test]
    fn test_address_as_json_map_key() {
        let mut map = std::collections::BTreeMap::new();
        map.insert(addr(1), 5u32);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"0x0101010101010101010101010101010101010101":5}"#);
        let back: std::collections::BTreeMap<Address, u32> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }

    #[test]
    fn test_transfer_event_wire_format() {
        let event = TransferEvent::new(7, addr(1), addr(2), U256::from(500u64));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["block"], 7);
        assert_eq!(json["value"], "500");
        assert_eq!(json["to"], "0x0202020202020202020202020202020202020202");
    }

    #[test]
    fn test_detail_from_withdrawal() {
        let w = Withdrawal {
            address: addr(3),
            amount: U256::from(32u64),
            index: U256::from(9u64),
        };
        let detail = WithdrawalDetail::from_withdrawal(120, &w);
        assert_eq!(detail.block, 120);
        assert_eq!(detail.amount, U256::from(32u64));
        assert_eq!(detail.index, U256::from(9u64));
    }
}
