//! Wallet session lifecycle.
//!
//! One logical session per process: the connector handle is built lazily on
//! first use and cached for the rest of the process lifetime. Construction
//! is guarded by a presence check behind a `tokio::sync::Mutex`, which is
//! enough here because only one user-gesture handler runs at a time.
//!
//! Every provider or signer handed out re-validates the connected chain
//! against the required network first; a signer is never derived from an
//! unvalidated session.

use crate::error::DappError;
use crate::network::NetworkGuard;
use crate::wallet::{ConnectedWallet, WalletClient, WalletConnector};
use anyhow::Context;
use ethers::providers::{Http, Middleware, Provider};
use ethers::types::Address;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

pub struct SessionManager<C: WalletConnector> {
    connector: C,
    guard: NetworkGuard,
    handle: Mutex<Option<ConnectedWallet>>,
    connected: AtomicBool,
}

impl<C: WalletConnector> SessionManager<C> {
    pub fn new(connector: C, guard: NetworkGuard) -> Self {
        Self {
            connector,
            guard,
            handle: Mutex::new(None),
            connected: AtomicBool::new(false),
        }
    }

    /// Whether `connect` has succeeded at least once this session.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Obtain the raw connected handle, constructing it on first use.
    /// A failed construction leaves the slot empty so the user can retry.
    async fn handle(&self) -> Result<ConnectedWallet, DappError> {
        let mut slot = self.handle.lock().await;
        if let Some(ref handle) = *slot {
            return Ok(handle.clone());
        }
        let handle = self
            .connector
            .connect()
            .await
            .map_err(DappError::classify_wallet_error)?;
        info!("Wallet session established for {:?}", handle.address());
        *slot = Some(handle.clone());
        Ok(handle)
    }

    /// Fetch the chain id from the live connection and run it past the
    /// network guard. The chain is re-checked on every provider/signer
    /// request, not just at connect time.
    async fn validated_handle(&self) -> Result<(ConnectedWallet, u64), DappError> {
        let handle = self.handle().await?;
        let chain_id = handle
            .provider
            .get_chainid()
            .await
            .context("Failed to read chain id from provider")?
            .as_u64();
        self.guard.validate(chain_id)?;
        Ok((handle, chain_id))
    }

    /// Read-only connection to the chain, network-validated.
    pub async fn provider(&self) -> Result<Arc<Provider<Http>>, DappError> {
        let (handle, _) = self.validated_handle().await?;
        Ok(handle.provider)
    }

    /// Write-capable connection, network-validated. Only derived after the
    /// guard has accepted the chain id.
    pub async fn signer(&self) -> Result<WalletClient, DappError> {
        let (handle, chain_id) = self.validated_handle().await?;
        Ok(handle.signer_client(chain_id))
    }

    /// Address of the connected signer.
    pub async fn signer_address(&self) -> Result<Address, DappError> {
        let (handle, _) = self.validated_handle().await?;
        Ok(handle.address())
    }

    /// Convenience: establish and validate the session, then mark it
    /// connected. Failures are logged and swallowed; the session simply
    /// stays disconnected and the user can re-invoke.
    pub async fn connect(&self) -> bool {
        match self.provider().await {
            Ok(_) => {
                self.connected.store(true, Ordering::Relaxed);
                true
            }
            Err(e) => {
                error!("Wallet connection failed: {}", e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use ethers::signers::LocalWallet;
    use std::sync::atomic::AtomicUsize;

    const TEST_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    /// Connector that counts constructions and points at a dead RPC.
    struct CountingConnector {
        connects: AtomicUsize,
        reject: bool,
    }

    impl CountingConnector {
        fn new(reject: bool) -> Self {
            Self {
                connects: AtomicUsize::new(0),
                reject,
            }
        }

        fn connect_count(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }
    }

    impl WalletConnector for CountingConnector {
        async fn connect(&self) -> anyhow::Result<ConnectedWallet> {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                return Err(anyhow!("user rejected the connection"));
            }
            let provider = Arc::new(Provider::<Http>::try_from("http://127.0.0.1:1").unwrap());
            let wallet: LocalWallet = TEST_KEY.parse().unwrap();
            Ok(ConnectedWallet::new(provider, wallet))
        }
    }

    fn session(reject: bool) -> SessionManager<CountingConnector> {
        SessionManager::new(CountingConnector::new(reject), NetworkGuard::default())
    }

    // ==================== lazy construction tests ====================

    #[tokio::test]
    async fn test_connector_constructed_at_most_once() {
        let session = session(false);
        // Both calls fail at the chain id fetch (dead RPC), but the handle
        // itself is built exactly once and reused.
        let _ = session.provider().await;
        let _ = session.provider().await;
        let _ = session.signer().await;
        assert_eq!(session.connector.connect_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_construction_is_retried() {
        let session = session(true);
        let _ = session.provider().await;
        let _ = session.provider().await;
        // Rejection leaves the slot empty, so each attempt reconnects.
        assert_eq!(session.connector.connect_count(), 2);
    }

    // ==================== connect() tests ====================

    #[tokio::test]
    async fn test_connect_failure_stays_disconnected() {
        let session = session(true);
        assert!(!session.connect().await);
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn test_unreachable_rpc_stays_disconnected() {
        let session = session(false);
        assert!(!session.connect().await);
        assert!(!session.is_connected());
    }

    // ==================== error classification tests ====================

    #[tokio::test]
    async fn test_rejection_maps_to_wallet_rejected() {
        let session = session(true);
        let err = session.provider().await.unwrap_err();
        assert!(matches!(err, DappError::WalletRejected));
    }

    #[tokio::test]
    async fn test_dead_rpc_is_not_a_rejection() {
        let session = session(false);
        let err = session.signer().await.unwrap_err();
        assert!(matches!(err, DappError::Other(_)));
    }
}
