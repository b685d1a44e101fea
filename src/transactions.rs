//! Mint / claim / withdraw submission and confirmation tracking.
//!
//! Every write follows the same sequence: obtain a network-validated
//! signer, submit to the fixed entry point, then poll for the receipt with
//! a bounded timeout. There are no automatic retries; a failed operation
//! is re-invoked by the user. The shared loading flag is set on submission
//! and released on every exit path.

use crate::config::{Config, TOKEN_PRICE_ETH};
use crate::contracts;
use crate::error::DappError;
use crate::operation_log;
use crate::session::SessionManager;
use crate::types::TxOutcome;
use crate::utils;
use crate::wallet::WalletConnector;
use anyhow::{anyhow, Result};
use ethers::contract::ContractCall;
use ethers::providers::Middleware;
use ethers::types::{TxHash, U256, U64};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Payment due for minting `amount` whole tokens, in wei.
///
/// The unit price is converted to integer base units first and the product
/// taken in U256, so the result is exact for every amount.
pub fn mint_payment_value(amount: u64) -> Result<U256> {
    let unit_price = utils::eth_to_wei(TOKEN_PRICE_ETH)?;
    Ok(unit_price * U256::from(amount))
}

/// Releases the loading flag on every exit path, early returns included.
struct LoadingGuard(Arc<AtomicBool>);

impl LoadingGuard {
    fn engage(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag.clone())
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct TransactionRunner<C: WalletConnector> {
    session: Arc<SessionManager<C>>,
    config: Config,
    loading: Arc<AtomicBool>,
}

impl<C: WalletConnector> TransactionRunner<C> {
    pub fn new(session: Arc<SessionManager<C>>, config: Config) -> Self {
        Self {
            session,
            config,
            loading: Arc::new(AtomicBool::new(false)),
        }
    }

    /// True between transaction submission and its resolution.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Mint `amount` whole tokens against the required payment.
    pub async fn mint(&self, amount: u64) -> Result<TxOutcome, DappError> {
        if amount == 0 {
            return Err(anyhow!("mint amount must be a positive integer").into());
        }
        let signer = self.session.signer().await?;
        let token = contracts::token_contract(self.config.token_address, signer);
        let value = mint_payment_value(amount)?;
        let call = token.mint(U256::from(amount)).value(value);
        let outcome = self.submit_and_confirm("mint", call).await?;
        self.log_operation("mint", &outcome, &format!("amount={}", amount));
        Ok(outcome)
    }

    /// Claim the token allotment for every unclaimed NFT the signer holds.
    pub async fn claim(&self) -> Result<TxOutcome, DappError> {
        let signer = self.session.signer().await?;
        let token = contracts::token_contract(self.config.token_address, signer);
        let call = token.claim();
        let outcome = self.submit_and_confirm("claim", call).await?;
        self.log_operation("claim", &outcome, "");
        Ok(outcome)
    }

    /// Drain the sale proceeds to the contract owner. The UI only offers
    /// this to the owner, but the contract is the final authority and
    /// reverts anyone else.
    pub async fn withdraw(&self) -> Result<TxOutcome, DappError> {
        let signer = self.session.signer().await?;
        let token = contracts::token_contract(self.config.token_address, signer);
        let call = token.withdraw();
        let outcome = self.submit_and_confirm("withdraw", call).await?;
        self.log_operation("withdraw", &outcome, "");
        Ok(outcome)
    }

    /// One owner-comparison read to decide whether to offer withdraw.
    pub async fn is_owner(&self) -> Result<bool, DappError> {
        let me = self.session.signer_address().await?;
        let provider = self.session.provider().await?;
        let token = contracts::token_contract(self.config.token_address, provider);
        let owner = token
            .owner()
            .call()
            .await
            .map_err(|e| anyhow!("owner() read failed: {}", e))?;
        Ok(owner == me)
    }

    async fn submit_and_confirm<M: Middleware + 'static>(
        &self,
        operation: &str,
        call: ContractCall<M, ()>,
    ) -> Result<TxOutcome, DappError> {
        let pending = call
            .send()
            .await
            .map_err(DappError::classify_wallet_error)?;
        let tx_hash = *pending;
        info!("{} transaction submitted: {:?}", operation, tx_hash);

        let _loading = LoadingGuard::engage(&self.loading);
        self.wait_for_confirmation(tx_hash).await
    }

    /// Poll for the receipt every 500ms until it lands or the bound runs
    /// out. A revert (status 0) is reported as `TxReverted`.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<TxOutcome, DappError> {
        let provider = self.session.provider().await?;
        let timeout_secs = self.config.confirmation_timeout_secs;
        let max_attempts = timeout_secs * 2;

        let mut attempts = 0u64;
        loop {
            if let Ok(Some(receipt)) = provider.get_transaction_receipt(tx_hash).await {
                if receipt.status == Some(U64::zero()) {
                    warn!("Transaction {:?} reverted", tx_hash);
                    return Err(DappError::TxReverted { tx_hash });
                }
                return Ok(TxOutcome {
                    tx_hash,
                    block_number: receipt.block_number.map(|n| n.as_u64()),
                    gas_used: receipt.gas_used.map(|g| g.as_u64()).unwrap_or(0),
                });
            }

            attempts += 1;
            if attempts >= max_attempts {
                return Err(DappError::ConfirmationTimeout { tx_hash, timeout_secs });
            }
            sleep(Duration::from_millis(500)).await;
        }
    }

    fn log_operation(&self, operation: &str, outcome: &TxOutcome, details: &str) {
        let body = format!(
            "tx={:?} block={:?} gas_used={}\n{}",
            outcome.tx_hash, outcome.block_number, outcome.gas_used, details
        );
        if let Err(e) = operation_log::append_log(operation, self.config.chain_id, body) {
            warn!("Failed to append operation log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::NetworkGuard;
    use crate::wallet::ConnectedWallet;
    use ethers::providers::{Http, Provider};
    use ethers::signers::LocalWallet;

    const TEST_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    struct DeadRpcConnector;

    impl WalletConnector for DeadRpcConnector {
        async fn connect(&self) -> anyhow::Result<ConnectedWallet> {
            let provider = Arc::new(Provider::<Http>::try_from("http://127.0.0.1:1").unwrap());
            let wallet: LocalWallet = TEST_KEY.parse().unwrap();
            Ok(ConnectedWallet::new(provider, wallet))
        }
    }

    fn runner() -> TransactionRunner<DeadRpcConnector> {
        let session = Arc::new(SessionManager::new(DeadRpcConnector, NetworkGuard::default()));
        TransactionRunner::new(session, Config::default())
    }

    // ==================== payment value tests ====================

    #[test]
    fn test_mint_payment_one_token() {
        let value = mint_payment_value(1).unwrap();
        assert_eq!(value, U256::from(10u64.pow(15))); // 0.001 ETH
    }

    #[test]
    fn test_mint_payment_five_tokens() {
        let value = mint_payment_value(5).unwrap();
        assert_eq!(value, U256::from(5u64) * U256::from(10u64.pow(15))); // 0.005 ETH
    }

    #[test]
    fn test_mint_payment_exact_for_odd_amounts() {
        // Amounts like 9 and 29 drift by a wei under float products.
        let wei_per_token = U256::from(10u64.pow(15));
        assert_eq!(mint_payment_value(9).unwrap(), U256::from(9u64) * wei_per_token);
        assert_eq!(mint_payment_value(29).unwrap(), U256::from(29u64) * wei_per_token);
        assert_eq!(mint_payment_value(57).unwrap(), U256::from(57u64) * wei_per_token);
    }

    #[test]
    fn test_mint_payment_thousand_tokens_is_one_eth() {
        let value = mint_payment_value(1000).unwrap();
        assert_eq!(value, U256::from(10u64.pow(18)));
    }

    #[test]
    fn test_mint_payment_zero_is_zero() {
        assert_eq!(mint_payment_value(0).unwrap(), U256::zero());
    }

    // ==================== guard tests ====================

    #[tokio::test]
    async fn test_mint_rejects_zero_amount_before_connecting() {
        let runner = runner();
        let err = runner.mint(0).await.unwrap_err();
        assert!(err.to_string().contains("positive"));
        assert!(!runner.is_loading());
    }

    // ==================== loading discipline tests ====================

    #[tokio::test]
    async fn test_loading_false_after_failed_mint() {
        let runner = runner();
        assert!(!runner.is_loading());
        let result = runner.mint(3).await;
        assert!(result.is_err()); // dead RPC: fails before or at submission
        assert!(!runner.is_loading());
    }

    #[tokio::test]
    async fn test_loading_false_after_failed_claim_and_withdraw() {
        let runner = runner();
        assert!(runner.claim().await.is_err());
        assert!(!runner.is_loading());
        assert!(runner.withdraw().await.is_err());
        assert!(!runner.is_loading());
    }

    // ==================== owner check tests ====================

    #[tokio::test]
    async fn test_is_owner_propagates_read_failure() {
        let runner = runner();
        assert!(runner.is_owner().await.is_err());
    }
}
