//! An in-process host that simulates just enough of a devnet ledger to drive
//! sessions end to end: STX balances, contract deployment, block heights and
//! caller-supplied answers for contract calls.

use super::protocol::{
    AssetsMapsResponse, CallReadOnlyFnRequest, CallReadOnlyFnResponse, LoadDeploymentRequest,
    MineBlockRequest, MineBlockResponse, MineEmptyBlocksRequest, NewSessionRequest, SessionRequest,
    SessionResponse,
};
use super::{HostBridge, HostOp};
use crate::chain::{Account, Contract, EmptyBlock, Receipt, SessionId};
use crate::error::{HarnessError, Result};
use crate::events::Event;
use crate::transaction::TxPayload;
use crate::value::encode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

pub const DEFAULT_BALANCE: u128 = 100_000_000_000_000;

const DEVNET_ACCOUNTS: [(&str, &str); 9] = [
    ("deployer", "ST1PQHQKV0RJXZFY1DGX8MNSNYVE3VGZJSRTPGZGM"),
    ("wallet_1", "ST1SJ3DTE5DN7X54YDH5D64R3BCB6A2AG2ZQ8YPD5"),
    ("wallet_2", "ST2CY5V39NHDPWSXMW9QDT3HC3GD6Q6XX4CFRK9AG"),
    ("wallet_3", "ST2JHG361ZXG51QTKY2NQCVBPPRRE2KZB1HR05NNC"),
    ("wallet_4", "ST2NEB84ASENDXKYGJPQW86YXQCEFEX2ZQPG87ND"),
    ("wallet_5", "ST2REHHS5J3CERCRBEPMGH7921Q6PYKAADT7JP2VB"),
    ("wallet_6", "ST3AM1A56AK2C1XAFJ4115ZSV26EB49BVQ10MGCS0"),
    ("wallet_7", "ST3PF13W7Z0RRM42A8VZRVFQ75SV1K26RXEP8YGKJ"),
    ("wallet_8", "ST3NBRSFKX28FQ2ZJ1MAKX58HKHSDGNV5N7R21XCP"),
];

/// A contract call as seen by a call handler.
#[derive(Debug, Clone, Copy)]
pub struct HostCall<'a> {
    pub session_id: SessionId,
    pub block_height: u64,
    pub contract: &'a str,
    pub method: &'a str,
    pub args: &'a [String],
    pub sender: &'a str,
    pub read_only: bool,
}

/// What a call handler answers: the result text and the events it emitted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CallOutcome {
    pub result: String,
    pub events: Vec<Event>,
}

impl CallOutcome {
    pub fn ok(value: impl AsRef<str>) -> Self {
        Self::raw(encode::ok(value.as_ref()))
    }

    pub fn err(value: impl AsRef<str>) -> Self {
        Self::raw(encode::err(value.as_ref()))
    }

    pub fn raw(result: impl Into<String>) -> Self {
        CallOutcome {
            result: result.into(),
            events: Vec::new(),
        }
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.events.push(event);
        self
    }
}

type CallHandler = Box<dyn FnMut(&HostCall<'_>) -> CallOutcome>;

struct SimSession {
    name: String,
    block_height: u64,
    balances: BTreeMap<String, u128>,
    contracts: Vec<Contract>,
}

impl SimSession {
    fn absorb(&mut self, contracts: &[Contract]) {
        for contract in contracts {
            if !self.contracts.iter().any(|c| c.contract_id == contract.contract_id) {
                self.contracts.push(contract.clone());
            }
        }
    }
}

pub struct InMemoryHost {
    accounts: Vec<Account>,
    deployment: Vec<Contract>,
    sessions: HashMap<SessionId, SimSession>,
    next_session: SessionId,
    handler: Option<CallHandler>,
    node_url: Option<String>,
    journal: Vec<HostOp>,
}

impl Default for InMemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryHost {
    /// A host with the nine devnet accounts and an empty deployment plan.
    pub fn new() -> Self {
        let accounts = DEVNET_ACCOUNTS
            .iter()
            .map(|(name, address)| Account {
                name: name.to_string(),
                address: address.to_string(),
                balance: DEFAULT_BALANCE,
            })
            .collect();
        InMemoryHost {
            accounts,
            deployment: Vec::new(),
            sessions: HashMap::new(),
            next_session: 1,
            handler: None,
            node_url: None,
            journal: Vec::new(),
        }
    }

    /// Add a contract to the deployment plan, deployed by `deployer`.
    pub fn with_contract(mut self, name: &str, source: &str) -> Self {
        let deployer = self.address_of("deployer").unwrap_or(DEVNET_ACCOUNTS[0].1).to_string();
        self.deployment.push(Contract {
            contract_id: format!("{}.{}", deployer, name),
            source: source.to_string(),
            contract_interface: Value::Null,
            dependencies: Vec::new(),
        });
        self
    }

    /// Answer every contract call, mined or read-only, with `handler`.
    /// Without a handler calls succeed with `(ok true)`.
    pub fn with_call_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&HostCall<'_>) -> CallOutcome + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    pub fn with_node_url(mut self, url: &str) -> Self {
        self.node_url = Some(url.to_string());
        self
    }

    pub fn address_of(&self, name: &str) -> Option<&str> {
        self.accounts
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.address.as_str())
    }

    /// Operations received so far, in order.
    pub fn journal(&self) -> &[HostOp] {
        &self.journal
    }

    pub fn open_sessions(&self) -> usize {
        self.sessions.len()
    }

    pub fn session_name(&self, session_id: SessionId) -> Option<&str> {
        self.sessions.get(&session_id).map(|s| s.name.as_str())
    }

    fn session(&mut self, session_id: SessionId) -> Result<&mut SimSession> {
        self.sessions
            .get_mut(&session_id)
            .ok_or_else(|| HarnessError::Host(format!("unknown session {}", session_id)))
    }

    fn new_session(&mut self, request: NewSessionRequest) -> Result<SessionResponse> {
        let session_id = self.next_session;
        self.next_session += 1;

        let mut session = SimSession {
            name: request.name,
            block_height: 1,
            balances: self
                .accounts
                .iter()
                .map(|a| (a.address.clone(), a.balance))
                .collect(),
            contracts: Vec::new(),
        };
        if request.load_deployment {
            session.absorb(&self.deployment);
        }
        debug!(session_id, name = %session.name, "session opened");

        let contracts = session.contracts.clone();
        self.sessions.insert(session_id, session);
        Ok(SessionResponse {
            session_id,
            accounts: self.accounts.clone(),
            contracts,
            stacks_node_url: self.node_url.clone(),
        })
    }

    fn load_deployment(&mut self, request: LoadDeploymentRequest) -> Result<SessionResponse> {
        let deployment = self.deployment.clone();
        let session = self.session(request.session_id)?;
        session.absorb(&deployment);
        let contracts = session.contracts.clone();
        Ok(SessionResponse {
            session_id: request.session_id,
            accounts: self.accounts.clone(),
            contracts,
            stacks_node_url: self.node_url.clone(),
        })
    }

    fn mine_block(&mut self, request: MineBlockRequest) -> Result<MineBlockResponse> {
        let session_id = request.session_id;
        let block_height = self
            .session(session_id)?
            .block_height
            .checked_add(1)
            .ok_or_else(|| HarnessError::Host("block height overflows".to_string()))?;

        let mut receipts = Vec::with_capacity(request.transactions.len());
        for tx in &request.transactions {
            let receipt = match tx.payload() {
                TxPayload::TransferStx(transfer) => {
                    let session = self.session(session_id)?;
                    transfer_stx(session, tx.sender(), &transfer.recipient, u128::from(transfer.amount))
                }
                TxPayload::ContractCall(call) => {
                    let outcome = self.dispatch(&HostCall {
                        session_id,
                        block_height,
                        contract: &call.contract,
                        method: &call.method,
                        args: &call.args,
                        sender: tx.sender(),
                        read_only: false,
                    });
                    Receipt {
                        result: outcome.result.into(),
                        events: outcome.events,
                    }
                }
                TxPayload::DeployContract(deploy) => {
                    let session = self.session(session_id)?;
                    let contract_id = format!("{}.{}", tx.sender(), deploy.name);
                    if session.contracts.iter().any(|c| c.contract_id == contract_id) {
                        Receipt {
                            result: encode::err(encode::ascii("contract already exists")).into(),
                            events: Vec::new(),
                        }
                    } else {
                        session.contracts.push(Contract {
                            contract_id,
                            source: deploy.code.clone(),
                            contract_interface: Value::Null,
                            dependencies: Vec::new(),
                        });
                        Receipt {
                            result: encode::ok(encode::bool(true)).into(),
                            events: Vec::new(),
                        }
                    }
                }
            };
            receipts.push(receipt);
        }

        self.session(session_id)?.block_height = block_height;
        Ok(MineBlockResponse {
            session_id,
            block_height,
            receipts,
        })
    }

    fn mine_empty_blocks(&mut self, request: MineEmptyBlocksRequest) -> Result<EmptyBlock> {
        let session = self.session(request.session_id)?;
        session.block_height = session.block_height.checked_add(request.count).ok_or_else(|| {
            HarnessError::Host(format!(
                "mining {} blocks from height {} overflows",
                request.count, session.block_height
            ))
        })?;
        Ok(EmptyBlock {
            session_id: request.session_id,
            block_height: session.block_height,
        })
    }

    fn call_read_only_fn(&mut self, request: CallReadOnlyFnRequest) -> Result<CallReadOnlyFnResponse> {
        let block_height = self.session(request.session_id)?.block_height;
        let outcome = self.dispatch(&HostCall {
            session_id: request.session_id,
            block_height,
            contract: &request.contract,
            method: &request.method,
            args: &request.args,
            sender: &request.sender,
            read_only: true,
        });
        Ok(CallReadOnlyFnResponse {
            session_id: request.session_id,
            result: outcome.result.into(),
            events: outcome.events,
        })
    }

    fn get_assets_maps(&mut self, request: SessionRequest) -> Result<AssetsMapsResponse> {
        let session = self.session(request.session_id)?;
        let mut assets = BTreeMap::new();
        assets.insert("STX".to_string(), session.balances.clone());
        Ok(AssetsMapsResponse {
            session_id: request.session_id,
            assets,
        })
    }

    fn terminate_session(&mut self, request: SessionRequest) -> Result<Value> {
        self.sessions
            .remove(&request.session_id)
            .ok_or_else(|| HarnessError::Host(format!("unknown session {}", request.session_id)))?;
        debug!(session_id = request.session_id, "session terminated");
        Ok(json!({ "session_id": request.session_id }))
    }

    fn dispatch(&mut self, call: &HostCall<'_>) -> CallOutcome {
        match self.handler.as_mut() {
            Some(handler) => handler(call),
            None => CallOutcome::ok(encode::bool(true)),
        }
    }
}

/// Clarity `stx-transfer?` semantics: u1 insufficient balance, u2 sender is
/// recipient, u3 non-positive amount.
fn transfer_stx(session: &mut SimSession, sender: &str, recipient: &str, amount: u128) -> Receipt {
    let failed = |code: u128| Receipt {
        result: encode::err(encode::uint(code)).into(),
        events: Vec::new(),
    };
    if amount == 0 {
        return failed(3);
    }
    if sender == recipient {
        return failed(2);
    }
    let available = session.balances.get(sender).copied().unwrap_or(0);
    if available < amount {
        return failed(1);
    }
    session.balances.insert(sender.to_string(), available - amount);
    *session.balances.entry(recipient.to_string()).or_insert(0) += amount;
    Receipt {
        result: encode::ok(encode::bool(true)).into(),
        events: vec![Event::stx_transfer(amount, sender, recipient)],
    }
}

fn respond<Req, Resp>(request: Value, handle: impl FnOnce(Req) -> Result<Resp>) -> Result<Value>
where
    Req: DeserializeOwned,
    Resp: Serialize,
{
    let request = serde_json::from_value(request)
        .map_err(|e| HarnessError::Host(format!("malformed request: {}", e)))?;
    Ok(serde_json::to_value(handle(request)?)?)
}

impl HostBridge for InMemoryHost {
    fn call(&mut self, op: HostOp, request: Value) -> Result<Value> {
        self.journal.push(op);
        match op {
            HostOp::NewSession => respond(request, |r| self.new_session(r)),
            HostOp::LoadDeployment => respond(request, |r| self.load_deployment(r)),
            HostOp::MineBlock => respond(request, |r| self.mine_block(r)),
            HostOp::MineEmptyBlocks => respond(request, |r| self.mine_empty_blocks(r)),
            HostOp::CallReadOnlyFn => respond(request, |r| self.call_read_only_fn(r)),
            HostOp::GetAssetsMaps => respond(request, |r| self.get_assets_maps(r)),
            HostOp::TerminateSession => respond(request, |r| self.terminate_session(r)),
        }
    }
}
