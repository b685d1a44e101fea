//! Common types shared across modules.

use ethers::prelude::*;

/// The three chain-derived numbers the display layer shows. Recomputed
/// from chain state on demand, never cached beyond a single refresh.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayTotals {
    /// Token balance of the connected address, in base units.
    pub token_balance: U256,
    /// Total tokens minted so far, in base units.
    pub total_minted: U256,
    /// NFTs owned by the connected address whose allotment is unclaimed.
    pub unclaimed: u64,
}

/// Outcome of a confirmed write operation.
#[derive(Debug, Clone)]
pub struct TxOutcome {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
}
