use anyhow::{anyhow, Result};
use ethers::types::Address;
use std::env;
use std::str::FromStr;

/// The one network the token sale runs on. Any other chain id is rejected
/// before a single contract call is made.
pub const REQUIRED_CHAIN_ID: u64 = 11155111;

/// Human-readable label for the required network, used in error notices.
pub const REQUIRED_NETWORK_LABEL: &str = "Sepolia";

/// Default public RPC endpoint for the required network.
pub const DEFAULT_RPC_URL: &str = "https://ethereum-sepolia-rpc.publicnode.com";

/// Deployed CryptoDevs NFT collection (ERC-721 Enumerable).
pub const NFT_CONTRACT_ADDRESS: &str = "0x3cf30b6d9df5b69a4f4e2b1e5008b2f2a1a5c6de";

/// Deployed CryptoDev token (ERC-20 with claim registry).
pub const TOKEN_CONTRACT_ADDRESS: &str = "0x9b2f1c8e44d0a3b7c5e6f1d2a8b4c7e0f3a6d5b1";

/// Price of one whole token when minting, in ETH.
pub const TOKEN_PRICE_ETH: f64 = 0.001;

/// Whole tokens released per unclaimed NFT when claiming.
pub const CLAIM_TOKENS_PER_NFT: u64 = 10;

/// Hard cap of the token supply, in whole tokens (display only; the
/// contract enforces the real cap).
pub const MAX_SUPPLY_TOKENS: u64 = 10_000;

/// Block explorer base URL for the required network.
pub const BLOCK_EXPLORER_URL: &str = "https://sepolia.etherscan.io";

/// Get the full URL to view a transaction on the block explorer
pub fn get_tx_explorer_url(tx_hash: &str) -> String {
    format!("{}/tx/{}", BLOCK_EXPLORER_URL, tx_hash)
}

/// Get the full URL to view an address on the block explorer
pub fn get_address_explorer_url(address: &str) -> String {
    format!("{}/address/{}", BLOCK_EXPLORER_URL, address)
}

/// Runtime configuration for one session.
///
/// The chain id and contract addresses are fixed for the lifetime of the
/// process; only the RPC endpoint and confirmation timeout can be tuned.
#[derive(Clone)]
pub struct Config {
    pub rpc_url: String,
    pub chain_id: u64,
    pub nft_address: Address,
    pub token_address: Address,
    /// How long to wait for a submitted transaction to land before
    /// reporting a timeout instead of hanging in the loading state.
    pub confirmation_timeout_secs: u64,
}

impl Config {
    pub fn new(rpc_url: String) -> Result<Self> {
        Ok(Self {
            rpc_url,
            chain_id: REQUIRED_CHAIN_ID,
            nft_address: parse_contract_address(NFT_CONTRACT_ADDRESS, "NFT")?,
            token_address: parse_contract_address(TOKEN_CONTRACT_ADDRESS, "token")?,
            confirmation_timeout_secs: 90,
        })
    }

    /// Build a config from the environment, falling back to the built-in
    /// defaults. Recognized variables: `RPC_URL`, `NFT_CONTRACT_ADDRESS`,
    /// `TOKEN_CONTRACT_ADDRESS`.
    pub fn from_env() -> Result<Self> {
        let rpc_url = env::var("RPC_URL").unwrap_or_else(|_| DEFAULT_RPC_URL.to_string());
        let mut config = Self::new(rpc_url)?;
        if let Ok(addr) = env::var("NFT_CONTRACT_ADDRESS") {
            config.nft_address = parse_contract_address(&addr, "NFT")?;
        }
        if let Ok(addr) = env::var("TOKEN_CONTRACT_ADDRESS") {
            config.token_address = parse_contract_address(&addr, "token")?;
        }
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        // The built-in addresses are known-good hex, so this cannot fail.
        Self::new(DEFAULT_RPC_URL.to_string())
            .unwrap_or_else(|e| panic!("built-in contract addresses invalid: {}", e))
    }
}

fn parse_contract_address(raw: &str, which: &str) -> Result<Address> {
    Address::from_str(raw.trim())
        .map_err(|e| anyhow!("Invalid {} contract address '{}': {}", which, raw, e))
}
