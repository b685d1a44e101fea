//! Fixed-ABI bindings for the two on-chain entry points.
//!
//! Only the functions this app actually calls are declared; everything
//! else the contracts expose is out of scope here.

use ethers::prelude::abigen;
use ethers::providers::Middleware;
use ethers::types::Address;
use std::sync::Arc;

abigen!(
    CryptoDevsNft,
    r#"[
        function balanceOf(address owner) view returns (uint256)
        function tokenOfOwnerByIndex(address owner, uint256 index) view returns (uint256)
    ]"#;

    CryptoDevToken,
    r#"[
        function balanceOf(address owner) view returns (uint256)
        function totalSupply() view returns (uint256)
        function tokenIdsClaimed(uint256 tokenId) view returns (bool)
        function owner() view returns (address)
        function mint(uint256 amount) payable
        function claim()
        function withdraw()
    ]"#;
);

pub fn nft_contract<M: Middleware>(address: Address, client: Arc<M>) -> CryptoDevsNft<M> {
    CryptoDevsNft::new(address, client)
}

pub fn token_contract<M: Middleware>(address: Address, client: Arc<M>) -> CryptoDevToken<M> {
    CryptoDevToken::new(address, client)
}
