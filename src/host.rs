//! The bridge to the external host that owns the simulated ledger.
//!
//! Every operation is a single synchronous request/response exchange of JSON
//! documents. [`HostBridge`] is the seam: [`StdioHost`] talks to a host
//! process over its standard streams, [`InMemoryHost`] answers in-process and
//! backs the test suite.

pub mod memory;
pub mod protocol;
pub mod stdio;

pub use memory::{CallOutcome, HostCall, InMemoryHost};
pub use stdio::StdioHost;

use crate::error::{HarnessError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::trace;

/// Named host operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HostOp {
    NewSession,
    LoadDeployment,
    MineBlock,
    MineEmptyBlocks,
    CallReadOnlyFn,
    GetAssetsMaps,
    TerminateSession,
}

impl HostOp {
    pub const ALL: [HostOp; 7] = [
        HostOp::NewSession,
        HostOp::LoadDeployment,
        HostOp::MineBlock,
        HostOp::MineEmptyBlocks,
        HostOp::CallReadOnlyFn,
        HostOp::GetAssetsMaps,
        HostOp::TerminateSession,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HostOp::NewSession => "api/v1/new_session",
            HostOp::LoadDeployment => "api/v1/load_deployment",
            HostOp::MineBlock => "api/v1/mine_block",
            HostOp::MineEmptyBlocks => "api/v1/mine_empty_blocks",
            HostOp::CallReadOnlyFn => "api/v1/call_read_only_fn",
            HostOp::GetAssetsMaps => "api/v1/get_assets_maps",
            HostOp::TerminateSession => "api/v1/terminate_session",
        }
    }
}

impl fmt::Display for HostOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HostOp {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        HostOp::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| HarnessError::Host(format!("unknown operation {}", s)))
    }
}

/// A synchronous request/response channel to the host.
///
/// Implementations block until the host has answered. An answer the host
/// flags as a failure must come back as [`HarnessError::Host`].
pub trait HostBridge {
    fn call(&mut self, op: HostOp, request: Value) -> Result<Value>;
}

impl<T: HostBridge + ?Sized> HostBridge for &mut T {
    fn call(&mut self, op: HostOp, request: Value) -> Result<Value> {
        (**self).call(op, request)
    }
}

impl<T: HostBridge + ?Sized> HostBridge for Box<T> {
    fn call(&mut self, op: HostOp, request: Value) -> Result<Value> {
        (**self).call(op, request)
    }
}

/// Serialize `request`, issue `op` and decode the typed answer.
pub(crate) fn invoke<Req, Resp>(host: &mut dyn HostBridge, op: HostOp, request: &Req) -> Result<Resp>
where
    Req: Serialize,
    Resp: DeserializeOwned,
{
    let request = serde_json::to_value(request)?;
    trace!(%op, %request, "host request");
    let response = host.call(op, request)?;
    trace!(%op, %response, "host response");
    serde_json::from_value(response).map_err(|e| HarnessError::Host(format!("malformed {} response: {}", op, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_op_names_round_trip() {
        for op in HostOp::ALL {
            assert_eq!(op.as_str().parse::<HostOp>().unwrap(), op);
            assert!(op.as_str().starts_with("api/v1/"));
        }
        assert!("api/v1/launch".parse::<HostOp>().is_err());
    }

    #[test]
    fn test_invoke_reports_malformed_response() {
        struct Echo;
        impl HostBridge for Echo {
            fn call(&mut self, _op: HostOp, _request: Value) -> Result<Value> {
                Ok(serde_json::json!({ "unexpected": true }))
            }
        }

        let request = protocol::SessionRequest { session_id: 1 };
        let err = invoke::<_, protocol::AssetsMapsResponse>(&mut Echo, HostOp::GetAssetsMaps, &request)
            .unwrap_err();
        assert!(matches!(err, HarnessError::Host(ref msg) if msg.contains("get_assets_maps")));
    }
}
