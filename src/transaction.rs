//! Transactions submitted to the host inside a mined block.
//!
//! A [`Tx`] is immutable once built. No arity or type checking happens here;
//! bad arguments only show up as failed receipts after mining.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire discriminant carried in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxKind {
    TransferStx = 1,
    ContractCall = 2,
    DeployContract = 3,
}

impl Serialize for TxKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for TxKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            1 => Ok(TxKind::TransferStx),
            2 => Ok(TxKind::ContractCall),
            3 => Ok(TxKind::DeployContract),
            other => Err(serde::de::Error::custom(format!(
                "unknown transaction type {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStx {
    pub recipient: String,
    pub amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
    pub contract: String,
    pub method: String,
    /// Arguments as canonical value text, see [`crate::value::encode`].
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployContract {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxPayload {
    #[serde(rename = "transferStx")]
    TransferStx(TransferStx),
    #[serde(rename = "contractCall")]
    ContractCall(ContractCall),
    #[serde(rename = "deployContract")]
    DeployContract(DeployContract),
}

impl TxPayload {
    pub fn kind(&self) -> TxKind {
        match self {
            TxPayload::TransferStx(_) => TxKind::TransferStx,
            TxPayload::ContractCall(_) => TxKind::ContractCall,
            TxPayload::DeployContract(_) => TxKind::DeployContract,
        }
    }
}

/// A transaction as the host expects it:
/// `{"type": 2, "sender": "...", "contractCall": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tx {
    #[serde(rename = "type")]
    kind: TxKind,
    sender: String,
    #[serde(flatten)]
    payload: TxPayload,
}

impl Tx {
    pub fn transfer_stx(amount: u64, recipient: &str, sender: &str) -> Self {
        Self::new(
            sender,
            TxPayload::TransferStx(TransferStx {
                recipient: recipient.to_string(),
                amount,
            }),
        )
    }

    pub fn contract_call<I, S>(contract: &str, method: &str, args: I, sender: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            sender,
            TxPayload::ContractCall(ContractCall {
                contract: contract.to_string(),
                method: method.to_string(),
                args: args.into_iter().map(Into::into).collect(),
            }),
        )
    }

    pub fn deploy_contract(name: &str, code: &str, sender: &str) -> Self {
        Self::new(
            sender,
            TxPayload::DeployContract(DeployContract {
                name: name.to_string(),
                code: code.to_string(),
            }),
        )
    }

    fn new(sender: &str, payload: TxPayload) -> Self {
        Tx {
            kind: payload.kind(),
            sender: sender.to_string(),
            payload,
        }
    }

    pub fn kind(&self) -> TxKind {
        self.kind
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn payload(&self) -> &TxPayload {
        &self.payload
    }
}
