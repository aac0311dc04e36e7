use super::types::{AssetsMaps, Block, EmptyBlock, ReadOnlyFn, SessionId};
use crate::error::{HarnessError, Result};
use crate::host::protocol::{
    AssetsMapsResponse, CallReadOnlyFnRequest, CallReadOnlyFnResponse, MineBlockRequest,
    MineBlockResponse, MineEmptyBlocksRequest, SessionRequest,
};
use crate::host::{invoke, HostBridge, HostOp};
use crate::transaction::Tx;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Handle on one host session.
///
/// `block_height` starts at 1 and afterwards always holds the last height
/// the host reported. All mining goes through `&mut self`, so blocks of one
/// session are never mined concurrently.
pub struct Chain<'h> {
    host: &'h mut dyn HostBridge,
    session_id: SessionId,
    block_height: u64,
}

impl<'h> Chain<'h> {
    pub fn new(host: &'h mut dyn HostBridge, session_id: SessionId) -> Self {
        Chain {
            host,
            session_id,
            block_height: 1,
        }
    }

    /// Pick up a session whose tip the host already moved to `block_height`.
    pub fn resume(host: &'h mut dyn HostBridge, session_id: SessionId, block_height: u64) -> Self {
        Chain {
            host,
            session_id,
            block_height,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn block_height(&self) -> u64 {
        self.block_height
    }

    /// Mine one block holding `transactions`. Receipts come back in
    /// submission order.
    pub fn mine_block(&mut self, transactions: Vec<Tx>) -> Result<Block> {
        let submitted = transactions.len();
        let request = MineBlockRequest {
            session_id: self.session_id,
            transactions,
        };
        let response: MineBlockResponse = invoke(&mut *self.host, HostOp::MineBlock, &request)?;
        if response.receipts.len() != submitted {
            return Err(HarnessError::Host(format!(
                "host returned {} receipts for {} transactions",
                response.receipts.len(),
                submitted
            )));
        }
        self.observe(response.block_height);
        debug!(session_id = self.session_id, height = self.block_height, txs = submitted, "block mined");
        Ok(Block {
            height: response.block_height,
            receipts: response.receipts,
        })
    }

    pub fn mine_empty_block(&mut self, count: u64) -> Result<EmptyBlock> {
        let request = MineEmptyBlocksRequest {
            session_id: self.session_id,
            count,
        };
        let block: EmptyBlock = invoke(&mut *self.host, HostOp::MineEmptyBlocks, &request)?;
        self.observe(block.block_height);
        debug!(session_id = self.session_id, height = self.block_height, count, "empty blocks mined");
        Ok(block)
    }

    /// Advance the tip to `target`. Moving backwards is refused before the
    /// host is contacted.
    pub fn mine_empty_block_until(&mut self, target: u64) -> Result<EmptyBlock> {
        if target < self.block_height {
            return Err(HarnessError::ChainTipRegression {
                current: self.block_height,
                target,
            });
        }
        self.mine_empty_block(target - self.block_height)
    }

    pub fn call_read_only_fn<I, S>(&mut self, contract: &str, method: &str, args: I, sender: &str) -> Result<ReadOnlyFn>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = CallReadOnlyFnRequest {
            session_id: self.session_id,
            contract: contract.to_string(),
            method: method.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            sender: sender.to_string(),
        };
        let response: CallReadOnlyFnResponse = invoke(&mut *self.host, HostOp::CallReadOnlyFn, &request)?;
        Ok(ReadOnlyFn {
            session_id: response.session_id,
            result: response.result,
            events: response.events,
        })
    }

    pub fn get_assets_maps(&mut self) -> Result<AssetsMaps> {
        let request = SessionRequest {
            session_id: self.session_id,
        };
        let response: AssetsMapsResponse = invoke(&mut *self.host, HostOp::GetAssetsMaps, &request)?;
        Ok(AssetsMaps {
            session_id: response.session_id,
            assets: response.assets,
        })
    }

    /// Release the session on the host.
    pub fn terminate(self) -> Result<()> {
        let request = SessionRequest {
            session_id: self.session_id,
        };
        let _: Value = invoke(self.host, HostOp::TerminateSession, &request)?;
        info!(session_id = self.session_id, height = self.block_height, "session terminated");
        Ok(())
    }

    fn observe(&mut self, height: u64) {
        if height < self.block_height {
            warn!(
                session_id = self.session_id,
                previous = self.block_height,
                reported = height,
                "host reported a lower block height"
            );
        }
        self.block_height = height;
    }
}
