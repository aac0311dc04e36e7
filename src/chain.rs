//! Chain sessions: an open session on the host plus the block height the
//! harness has last observed for it.

mod session;
mod types;

pub use session::Chain;
pub use types::{
    Account, Accounts, AssetBalances, AssetsMaps, Block, Contract, Contracts, EmptyBlock,
    NodeEndpoint, ReadOnlyFn, Receipt, SessionId,
};
pub(crate) use types::{index_accounts, index_contracts};
