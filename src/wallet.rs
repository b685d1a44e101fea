//! Wallet connector: how the app obtains a signing-capable connection.
//!
//! The connector is deliberately opaque to the rest of the crate. The
//! session asks it for a connected handle exactly once per process and
//! everything downstream works against [`ConnectedWallet`], so tests can
//! substitute a connector that rejects or counts connections.

use crate::config::Config;
use anyhow::{anyhow, Context, Result};
use ethers::middleware::SignerMiddleware;
use ethers::providers::{Http, Provider};
use ethers::signers::{LocalWallet, Signer};
use ethers::types::Address;
use hex::FromHex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use url::Url;

/// Write-capable client: provider plus local signer, bound to a chain id.
pub type WalletClient = Arc<SignerMiddleware<Provider<Http>, LocalWallet>>;

/// The raw handle produced by a successful wallet connection.
///
/// Cheap to clone: the provider is shared and the key is small.
#[derive(Clone)]
pub struct ConnectedWallet {
    pub provider: Arc<Provider<Http>>,
    wallet: LocalWallet,
}

impl ConnectedWallet {
    pub fn new(provider: Arc<Provider<Http>>, wallet: LocalWallet) -> Self {
        Self { provider, wallet }
    }

    pub fn address(&self) -> Address {
        self.wallet.address()
    }

    /// Bind the signer to a chain id and wrap it for sending transactions.
    /// Callers validate the chain id first; this does not check it.
    pub fn signer_client(&self, chain_id: u64) -> WalletClient {
        let signer = self.wallet.clone().with_chain_id(chain_id);
        Arc::new(SignerMiddleware::new((*self.provider).clone(), signer))
    }
}

/// Asynchronous wallet connection; may prompt the user out-of-band and
/// may reject. Implementations must be safe to call more than once even
/// though the session only constructs the handle a single time.
#[allow(async_fn_in_trait)]
pub trait WalletConnector {
    async fn connect(&self) -> Result<ConnectedWallet>;
}

/// On-disk key file, compatible with a plain `{"pk_hex": "..."}` export.
#[derive(Serialize, Deserialize, Clone)]
struct KeystoreFile {
    pub pk_hex: String,
}

fn keystore_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("tokengate").join("keystore.json")
}

/// Production connector: RPC endpoint from config, signing key from the
/// `PRIVATE_KEY` environment variable or the app keystore file.
pub struct KeystoreConnector {
    config: Config,
}

impl KeystoreConnector {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn load_key(&self) -> Result<LocalWallet> {
        if let Ok(pk_hex) = std::env::var("PRIVATE_KEY") {
            return parse_private_key(&pk_hex).context("PRIVATE_KEY env var is not a valid key");
        }

        let path = keystore_path();
        let data = fs::read(&path).with_context(|| {
            format!(
                "No wallet key: set PRIVATE_KEY or place a keystore at {}",
                path.display()
            )
        })?;
        let keystore: KeystoreFile =
            serde_json::from_slice(&data).context("keystore file is not valid JSON")?;
        parse_private_key(&keystore.pk_hex).context("keystore key is not a valid private key")
    }
}

impl WalletConnector for KeystoreConnector {
    async fn connect(&self) -> Result<ConnectedWallet> {
        let url = Url::parse(&self.config.rpc_url)
            .with_context(|| format!("Invalid RPC url '{}'", self.config.rpc_url))?;
        let provider = Arc::new(Provider::<Http>::try_from(url.as_str())?);
        let wallet = self.load_key()?;
        info!("Wallet connected as {:?}", wallet.address());
        Ok(ConnectedWallet::new(provider, wallet))
    }
}

fn parse_private_key(pk_hex: &str) -> Result<LocalWallet> {
    let stripped = pk_hex.trim().trim_start_matches("0x");
    let bytes = Vec::from_hex(stripped).map_err(|e| anyhow!("key is not hex: {}", e))?;
    LocalWallet::from_bytes(&bytes).map_err(|e| anyhow!("key rejected: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_KEY: &str = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";

    // ==================== key parsing tests ====================

    #[test]
    fn test_parse_private_key_with_prefix() {
        let wallet = parse_private_key(TEST_KEY).unwrap();
        assert_ne!(wallet.address(), Address::zero());
    }

    #[test]
    fn test_parse_private_key_without_prefix() {
        let a = parse_private_key(TEST_KEY).unwrap();
        let b = parse_private_key(TEST_KEY.trim_start_matches("0x")).unwrap();
        assert_eq!(a.address(), b.address());
    }

    #[test]
    fn test_parse_private_key_rejects_garbage() {
        assert!(parse_private_key("zz not hex").is_err());
        assert!(parse_private_key("").is_err());
        assert!(parse_private_key("0xdeadbeef").is_err()); // too short
    }

    // ==================== ConnectedWallet tests ====================

    #[test]
    fn test_signer_client_binds_chain_id() {
        let provider = Arc::new(Provider::<Http>::try_from("http://127.0.0.1:1").unwrap());
        let wallet = parse_private_key(TEST_KEY).unwrap();
        let connected = ConnectedWallet::new(provider, wallet);
        let client = connected.signer_client(11155111);
        assert_eq!(client.signer().chain_id(), 11155111);
        assert_eq!(client.signer().address(), connected.address());
    }
}
