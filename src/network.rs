//! Required-network validation.
//!
//! Every provider/signer handed out by the session passes through here
//! first; nothing talks to the contracts on a mismatched chain.

use crate::config::{REQUIRED_CHAIN_ID, REQUIRED_NETWORK_LABEL};
use crate::error::DappError;

/// Validates that the connected chain is the one the sale runs on.
#[derive(Debug, Clone, Copy)]
pub struct NetworkGuard {
    required_chain_id: u64,
}

impl NetworkGuard {
    pub const fn new(required_chain_id: u64) -> Self {
        Self { required_chain_id }
    }

    pub fn required_chain_id(&self) -> u64 {
        self.required_chain_id
    }

    /// Accepts exactly the required chain id; anything else is a
    /// `WrongNetwork` failure the caller must surface as a blocking notice.
    pub fn validate(&self, actual_chain_id: u64) -> Result<(), DappError> {
        if actual_chain_id == self.required_chain_id {
            Ok(())
        } else {
            Err(DappError::WrongNetwork {
                actual: actual_chain_id,
                required: self.required_chain_id,
                label: REQUIRED_NETWORK_LABEL,
            })
        }
    }
}

impl Default for NetworkGuard {
    fn default() -> Self {
        Self::new(REQUIRED_CHAIN_ID)
    }
}
