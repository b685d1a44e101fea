//! Claim eligibility: how many of an address's NFTs still carry an
//! unwithdrawn token allotment.
//!
//! The walk is O(holding count) round-trips: the ERC-721 enumeration gives
//! one token id per call and the claim registry one bool per id. There is
//! no batching at this layer, so callers only invoke a scan after the
//! wallet is connected and on explicit refresh points.

use crate::config::Config;
use crate::contracts::{self, CryptoDevToken, CryptoDevsNft};
use crate::error::DappError;
use crate::session::SessionManager;
use crate::wallet::WalletConnector;
use anyhow::{Context, Result};
use ethers::providers::Middleware;
use ethers::types::{Address, U256};
use std::sync::Arc;
use tracing::{debug, error};

/// Owner-indexed NFT enumeration, the read half of ERC-721 Enumerable.
#[allow(async_fn_in_trait)]
pub trait NftHoldings {
    async fn holding_count(&self, owner: Address) -> Result<U256>;
    async fn token_by_index(&self, owner: Address, index: U256) -> Result<U256>;
}

/// On-chain mapping from token id to whether its allotment was withdrawn.
#[allow(async_fn_in_trait)]
pub trait ClaimRegistry {
    async fn is_claimed(&self, token_id: U256) -> Result<bool>;
}

impl<M: Middleware + 'static> NftHoldings for CryptoDevsNft<M> {
    async fn holding_count(&self, owner: Address) -> Result<U256> {
        self.balance_of(owner)
            .call()
            .await
            .with_context(|| format!("NFT balanceOf({:?}) failed", owner))
    }

    async fn token_by_index(&self, owner: Address, index: U256) -> Result<U256> {
        self.token_of_owner_by_index(owner, index)
            .call()
            .await
            .with_context(|| format!("tokenOfOwnerByIndex({:?}, {}) failed", owner, index))
    }
}

impl<M: Middleware + 'static> ClaimRegistry for CryptoDevToken<M> {
    async fn is_claimed(&self, token_id: U256) -> Result<bool> {
        self.token_ids_claimed(token_id)
            .call()
            .await
            .with_context(|| format!("tokenIdsClaimed({}) failed", token_id))
    }
}

/// Count the owner's NFTs whose allotment has not been claimed yet.
///
/// Walks indices `0..holding_count` in ascending order. An address with no
/// holdings short-circuits without issuing a single enumeration call. Any
/// read failure aborts the whole scan; partial counts are never reported.
pub async fn scan_unclaimed<N, R>(nft: &N, registry: &R, owner: Address) -> Result<u64>
where
    N: NftHoldings,
    R: ClaimRegistry,
{
    let holding_count = nft.holding_count(owner).await?;
    if holding_count.is_zero() {
        return Ok(0);
    }

    let mut unclaimed: u64 = 0;
    let mut index = U256::zero();
    while index < holding_count {
        let token_id = nft.token_by_index(owner, index).await?;
        if !registry.is_claimed(token_id).await? {
            unclaimed += 1;
        }
        index += U256::one();
    }
    debug!(
        "Scanned {} holdings for {:?}: {} unclaimed",
        holding_count, owner, unclaimed
    );
    Ok(unclaimed)
}

pub struct EligibilityScanner<C: WalletConnector> {
    session: Arc<SessionManager<C>>,
    config: Config,
}

impl<C: WalletConnector> EligibilityScanner<C> {
    pub fn new(session: Arc<SessionManager<C>>, config: Config) -> Self {
        Self { session, config }
    }

    /// Scan the given address against the live contracts.
    pub async fn scan(&self, address: Address) -> Result<u64, DappError> {
        let provider = self.session.provider().await?;
        let nft = contracts::nft_contract(self.config.nft_address, provider.clone());
        let token = contracts::token_contract(self.config.token_address, provider);
        let unclaimed = scan_unclaimed(&nft, &token, address).await?;
        Ok(unclaimed)
    }

    /// Degrading scan: on any failure, report "nothing to claim" and log
    /// rather than guess.
    pub async fn scan_or_zero(&self, address: Address) -> u64 {
        match self.scan(address).await {
            Ok(unclaimed) => unclaimed,
            Err(e) => {
                error!("Eligibility scan failed, reporting zero: {}", e);
                0
            }
        }
    }
}
