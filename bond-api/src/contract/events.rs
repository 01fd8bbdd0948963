//! Bond contract events
//!
//! All event fields are non-indexed, so `topics` holds only the signature
//! hash and every field lives in `data`.

use anyhow::Result;
use chain_clients_evm::abi::{self, WORD};
use chain_clients_evm::{EvmLog, U256};

pub const BOND_ISSUED_SIG: &str = "BondIssued(uint256,string,string,uint256)";
pub const BOND_PURCHASED_SIG: &str = "BondPurchased(uint256,address,uint256)";
pub const BOND_SOLD_SIG: &str = "BondSold(uint256,address,address,uint256)";

/// Returns the log data if `topics[0]` matches `signature`.
fn matching_data(log: &EvmLog, signature: &str) -> Result<Vec<u8>> {
    let expected = abi::event_topic(signature);
    match log.topics.first() {
        Some(topic) if topic.eq_ignore_ascii_case(&expected) => abi::decode_hex(&log.data),
        Some(topic) => anyhow::bail!("Topic {} does not match {}", topic, signature),
        None => anyhow::bail!("Log has no topics"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondIssuedEvent {
    pub bond_id: U256,
    pub name: String,
    pub issuer: String,
    pub face_value: U256,
}

impl BondIssuedEvent {
    pub fn decode(log: &EvmLog) -> Result<Self> {
        let data = matching_data(log, BOND_ISSUED_SIG)?;
        Ok(Self {
            bond_id: abi::decode_uint(&data, 0)?,
            name: abi::decode_string(&data, 0, WORD)?,
            issuer: abi::decode_string(&data, 0, 2 * WORD)?,
            face_value: abi::decode_uint(&data, 3 * WORD)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondPurchasedEvent {
    pub bond_id: U256,
    pub buyer: String,
    pub amount: U256,
}

impl BondPurchasedEvent {
    pub fn decode(log: &EvmLog) -> Result<Self> {
        let data = matching_data(log, BOND_PURCHASED_SIG)?;
        Ok(Self {
            bond_id: abi::decode_uint(&data, 0)?,
            buyer: abi::decode_address(&data, WORD)?,
            amount: abi::decode_uint(&data, 2 * WORD)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondSoldEvent {
    pub bond_id: U256,
    pub seller: String,
    pub buyer: String,
    pub amount: U256,
}

impl BondSoldEvent {
    pub fn decode(log: &EvmLog) -> Result<Self> {
        let data = matching_data(log, BOND_SOLD_SIG)?;
        Ok(Self {
            bond_id: abi::decode_uint(&data, 0)?,
            seller: abi::decode_address(&data, WORD)?,
            buyer: abi::decode_address(&data, 2 * WORD)?,
            amount: abi::decode_uint(&data, 3 * WORD)?,
        })
    }
}

/// First `BondIssued` event that decodes among `logs`, if any.
pub fn find_bond_issued(logs: &[EvmLog]) -> Option<BondIssuedEvent> {
    logs.iter().find_map(|log| BondIssuedEvent::decode(log).ok())
}
