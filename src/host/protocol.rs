//! Request and response bodies exchanged with the host, one pair per
//! [`HostOp`](super::HostOp). Requests use camelCase keys, responses
//! snake_case, matching what the host speaks.

use crate::chain::{Account, AssetBalances, Contract, Receipt, SessionId};
use crate::events::Event;
use crate::transaction::Tx;
use crate::value::ClarityText;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSessionRequest {
    pub name: String,
    pub load_deployment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadDeploymentRequest {
    pub session_id: SessionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_path: Option<String>,
}

/// Answer to both `new_session` and `load_deployment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub contracts: Vec<Contract>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stacks_node_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MineBlockRequest {
    pub session_id: SessionId,
    pub transactions: Vec<Tx>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineBlockResponse {
    #[serde(default)]
    pub session_id: SessionId,
    pub block_height: u64,
    pub receipts: Vec<Receipt>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MineEmptyBlocksRequest {
    pub session_id: SessionId,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallReadOnlyFnRequest {
    pub session_id: SessionId,
    pub contract: String,
    pub method: String,
    pub args: Vec<String>,
    pub sender: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallReadOnlyFnResponse {
    pub session_id: SessionId,
    pub result: ClarityText,
    #[serde(default)]
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetsMapsResponse {
    pub session_id: SessionId,
    pub assets: AssetBalances,
}
