//! Token balance and supply reads.
//!
//! Read-path policy: the `_or_zero` variants never surface an error to the
//! display layer. A transient RPC or decode failure logs and degrades the
//! affected value to zero so the page keeps rendering.

use crate::config::Config;
use crate::contracts;
use crate::error::DappError;
use crate::session::SessionManager;
use crate::wallet::WalletConnector;
use ethers::types::{Address, U256};
use std::sync::Arc;
use tracing::error;

pub struct BalanceReader<C: WalletConnector> {
    session: Arc<SessionManager<C>>,
    config: Config,
}

impl<C: WalletConnector> BalanceReader<C> {
    pub fn new(session: Arc<SessionManager<C>>, config: Config) -> Self {
        Self { session, config }
    }

    /// Token balance of `address` in base units, unmodified.
    pub async fn balance_of(&self, address: Address) -> Result<U256, DappError> {
        let provider = self.session.provider().await?;
        let token = contracts::token_contract(self.config.token_address, provider);
        let balance = token
            .balance_of(address)
            .call()
            .await
            .map_err(|e| anyhow::anyhow!("balanceOf({:?}) failed: {}", address, e))?;
        Ok(balance)
    }

    /// Total minted supply in base units, unmodified.
    pub async fn total_supply(&self) -> Result<U256, DappError> {
        let provider = self.session.provider().await?;
        let token = contracts::token_contract(self.config.token_address, provider);
        let supply = token
            .total_supply()
            .call()
            .await
            .map_err(|e| anyhow::anyhow!("totalSupply() failed: {}", e))?;
        Ok(supply)
    }

    /// Degrading read: zero on any failure.
    pub async fn balance_of_or_zero(&self, address: Address) -> U256 {
        match self.balance_of(address).await {
            Ok(balance) => balance,
            Err(e) => {
                error!("Balance read failed, showing zero: {}", e);
                U256::zero()
            }
        }
    }

    /// Degrading read: zero on any failure.
    pub async fn total_supply_or_zero(&self) -> U256 {
        match self.total_supply().await {
            Ok(supply) => supply,
            Err(e) => {
                error!("Total supply read failed, showing zero: {}", e);
                U256::zero()
            }
        }
    }
}
