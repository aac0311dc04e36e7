use crate::events::Event;
use crate::value::ClarityText;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Opaque handle the host assigns to a simulated ledger.
pub type SessionId = u32;

/// Accounts keyed by name (`deployer`, `wallet_1`, ...).
pub type Accounts = IndexMap<String, Account>;

/// Contracts keyed by contract id (`<deployer>.<name>`).
pub type Contracts = IndexMap<String, Contract>;

/// asset name -> owner -> balance
pub type AssetBalances = BTreeMap<String, BTreeMap<String, u128>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub address: String,
    pub balance: u128,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub contract_id: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub contract_interface: serde_json::Value,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// Outcome of one mined transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub result: ClarityText,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub height: u64,
    pub receipts: Vec<Receipt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyBlock {
    pub session_id: SessionId,
    pub block_height: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadOnlyFn {
    pub session_id: SessionId,
    pub result: ClarityText,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsMaps {
    pub session_id: SessionId,
    pub assets: AssetBalances,
}

impl AssetsMaps {
    pub fn balance(&self, asset: &str, owner: &str) -> Option<u128> {
        self.assets.get(asset)?.get(owner).copied()
    }
}

/// Address of the node a script session is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeEndpoint {
    pub url: Option<String>,
}

pub(crate) fn index_accounts(accounts: Vec<Account>) -> Accounts {
    accounts
        .into_iter()
        .map(|account| (account.name.clone(), account))
        .collect()
}

pub(crate) fn index_contracts(contracts: Vec<Contract>) -> Contracts {
    contracts
        .into_iter()
        .map(|contract| (contract.contract_id.clone(), contract))
        .collect()
}
