//! Bond contract binding
//!
//! Typed wrapper around the bond smart contract: calldata for the four
//! mutating functions ([`BondCall`]) and decoded results for the four view
//! functions ([`BondContract`]).

pub mod events;

use anyhow::{Context, Result};
use chain_clients_evm::abi::{self, AbiValue, WORD};
use chain_clients_evm::{EvmClient, U256};
use std::sync::Arc;

pub use events::{find_bond_issued, BondIssuedEvent, BondPurchasedEvent, BondSoldEvent};

// ============================================================================
// CONTRACT INTERFACE
// ============================================================================

pub const ISSUE_BOND_SIG: &str = "issueBond(string,string,uint256,uint256,uint256,uint256)";
pub const PURCHASE_BOND_SIG: &str = "purchaseBond(uint256,uint256)";
pub const SELL_BOND_SIG: &str = "sellBond(uint256,uint256,address)";
pub const REDEEM_BOND_SIG: &str = "redeemBond(uint256,uint256)";
pub const GET_BOND_INFO_SIG: &str = "getBondInfo(uint256)";
pub const GET_BOND_HOLDERS_SIG: &str = "getBondHolders(uint256)";
pub const GET_BOND_HOLDER_AMOUNT_SIG: &str = "getBondHolderAmount(uint256,address)";
pub const BOND_COUNT_SIG: &str = "bondCount()";

/// A state-changing bond contract call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BondCall {
    Issue {
        name: String,
        issuer: String,
        face_value: U256,
        maturity_date: U256,
        interest_rate: U256,
        supply: U256,
    },
    Purchase {
        bond_id: U256,
        amount: U256,
    },
    Sell {
        bond_id: U256,
        amount: U256,
        buyer: [u8; 20],
    },
    Redeem {
        bond_id: U256,
        amount: U256,
    },
}

impl BondCall {
    /// Canonical Solidity signature of the called function.
    pub fn signature(&self) -> &'static str {
        match self {
            BondCall::Issue { .. } => ISSUE_BOND_SIG,
            BondCall::Purchase { .. } => PURCHASE_BOND_SIG,
            BondCall::Sell { .. } => SELL_BOND_SIG,
            BondCall::Redeem { .. } => REDEEM_BOND_SIG,
        }
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            BondCall::Issue { .. } => "issueBond",
            BondCall::Purchase { .. } => "purchaseBond",
            BondCall::Sell { .. } => "sellBond",
            BondCall::Redeem { .. } => "redeemBond",
        }
    }

    /// Arguments in the order the contract declares them.
    pub fn args(&self) -> Vec<AbiValue> {
        match self {
            BondCall::Issue {
                name,
                issuer,
                face_value,
                maturity_date,
                interest_rate,
                supply,
            } => vec![
                AbiValue::String(name.clone()),
                AbiValue::String(issuer.clone()),
                AbiValue::Uint(*face_value),
                AbiValue::Uint(*maturity_date),
                AbiValue::Uint(*interest_rate),
                AbiValue::Uint(*supply),
            ],
            BondCall::Purchase { bond_id, amount } | BondCall::Redeem { bond_id, amount } => {
                vec![AbiValue::Uint(*bond_id), AbiValue::Uint(*amount)]
            }
            BondCall::Sell {
                bond_id,
                amount,
                buyer,
            } => vec![
                AbiValue::Uint(*bond_id),
                AbiValue::Uint(*amount),
                AbiValue::Address(*buyer),
            ],
        }
    }

    /// Selector followed by the ABI-encoded arguments.
    pub fn calldata(&self) -> Vec<u8> {
        abi::encode_call(self.signature(), &self.args())
    }
}

// ============================================================================
// VIEW RESULTS
// ============================================================================

/// Bond record as returned by `getBondInfo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondInfo {
    pub name: String,
    pub issuer: String,
    pub face_value: U256,
    pub maturity_date: U256,
    pub interest_rate: U256,
    pub total_supply: U256,
    pub is_active: bool,
}

impl BondInfo {
    /// Decodes the return data of `getBondInfo`.
    ///
    /// The function returns a single dynamic tuple
    /// `(string,string,uint256,uint256,uint256,uint256,bool)`, so the first
    /// word is the offset of the tuple body.
    pub fn decode(data: &[u8]) -> Result<Self> {
        let base = abi::decode_uint(data, 0)?;
        if base > U256::from(data.len()) {
            anyhow::bail!("Bond info tuple offset {} points past end of data", base);
        }
        let base = base.as_usize();

        Ok(Self {
            name: abi::decode_string(data, base, 0).context("Failed to decode bond name")?,
            issuer: abi::decode_string(data, base, WORD).context("Failed to decode bond issuer")?,
            face_value: abi::decode_uint(data, base + 2 * WORD)?,
            maturity_date: abi::decode_uint(data, base + 3 * WORD)?,
            interest_rate: abi::decode_uint(data, base + 4 * WORD)?,
            total_supply: abi::decode_uint(data, base + 5 * WORD)?,
            is_active: abi::decode_bool(data, base + 6 * WORD)?,
        })
    }
}

// ============================================================================
// CONTRACT HANDLE
// ============================================================================

/// Bond contract bound to a fixed address on one client.
#[derive(Debug, Clone)]
pub struct BondContract {
    client: Arc<EvmClient>,
    address: String,
}

impl BondContract {
    pub fn new(client: Arc<EvmClient>, address: &str) -> Self {
        Self {
            client,
            address: address.to_string(),
        }
    }

    async fn call_view(&self, signature: &str, args: &[AbiValue]) -> Result<Vec<u8>> {
        let calldata = abi::encode_call(signature, args);
        self.client.call(&self.address, &calldata).await
    }

    /// Calls `getBondInfo(bondId)`.
    pub async fn get_bond_info(&self, bond_id: U256) -> Result<BondInfo> {
        let data = self
            .call_view(GET_BOND_INFO_SIG, &[AbiValue::Uint(bond_id)])
            .await?;
        BondInfo::decode(&data)
    }

    /// Calls `getBondHolders(bondId)` and returns checksummed addresses.
    pub async fn get_bond_holders(&self, bond_id: U256) -> Result<Vec<String>> {
        let data = self
            .call_view(GET_BOND_HOLDERS_SIG, &[AbiValue::Uint(bond_id)])
            .await?;
        abi::decode_address_array(&data, 0, 0)
    }

    /// Calls `getBondHolderAmount(bondId, holder)`.
    pub async fn get_bond_holder_amount(&self, bond_id: U256, holder: [u8; 20]) -> Result<U256> {
        let data = self
            .call_view(
                GET_BOND_HOLDER_AMOUNT_SIG,
                &[AbiValue::Uint(bond_id), AbiValue::Address(holder)],
            )
            .await?;
        abi::decode_uint(&data, 0)
    }

    /// Calls `bondCount()`.
    pub async fn bond_count(&self) -> Result<U256> {
        let data = self.call_view(BOND_COUNT_SIG, &[]).await?;
        abi::decode_uint(&data, 0)
    }
}
