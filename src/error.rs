//! Typed failures for the wallet and transaction paths.
//!
//! Read paths deliberately do not use this taxonomy: they degrade to a zero
//! value at the call site and log, so a flaky RPC never takes down the UI.

use ethers::types::TxHash;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DappError {
    /// The wallet is connected to the wrong chain. Blocking: the user has
    /// to switch networks in the wallet and reconnect, there is no retry.
    #[error("connected to chain {actual}, switch your wallet to chain {required} ({label})")]
    WrongNetwork {
        actual: u64,
        required: u64,
        label: &'static str,
    },

    /// The user declined the connection or refused to sign.
    #[error("request was rejected in the wallet")]
    WalletRejected,

    /// The transaction landed but the contract reverted it.
    #[error("transaction {tx_hash:?} reverted on chain")]
    TxReverted { tx_hash: TxHash },

    /// The submitted transaction did not confirm within the bound. The
    /// transaction may still land later; nothing is resubmitted.
    #[error("no confirmation after {timeout_secs}s (transaction may still confirm later)")]
    ConfirmationTimeout { tx_hash: TxHash, timeout_secs: u64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DappError {
    /// Whether re-offering the same action to the user makes sense.
    /// Wrong-network is the one blocking case: it needs an out-of-band fix.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DappError::WrongNetwork { .. })
    }

    /// Classify an error string coming back from the signer/provider.
    /// Mirrors the phrasing wallets actually emit for user denial.
    pub fn classify_wallet_error(error: impl std::fmt::Display) -> Self {
        let text = error.to_string();
        if text.contains("rejected") || text.contains("denied") || text.contains("Denied") {
            DappError::WalletRejected
        } else {
            DappError::Other(anyhow::anyhow!(text))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== display tests ====================

    #[test]
    fn test_wrong_network_names_both_chains() {
        let err = DappError::WrongNetwork {
            actual: 1,
            required: 11155111,
            label: "Sepolia",
        };
        let text = err.to_string();
        assert!(text.contains("chain 1"));
        assert!(text.contains("11155111"));
        assert!(text.contains("Sepolia"));
    }

    #[test]
    fn test_timeout_mentions_bound() {
        let err = DappError::ConfirmationTimeout {
            tx_hash: TxHash::zero(),
            timeout_secs: 90,
        };
        assert!(err.to_string().contains("90s"));
    }

    // ==================== recoverability tests ====================

    #[test]
    fn test_wrong_network_is_blocking() {
        let err = DappError::WrongNetwork {
            actual: 1,
            required: 11155111,
            label: "Sepolia",
        };
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_rejection_and_revert_are_recoverable() {
        assert!(DappError::WalletRejected.is_recoverable());
        assert!(DappError::TxReverted { tx_hash: TxHash::zero() }.is_recoverable());
    }

    // ==================== classification tests ====================

    #[test]
    fn test_classify_user_rejection() {
        let err = DappError::classify_wallet_error("user rejected transaction");
        assert!(matches!(err, DappError::WalletRejected));
        let err = DappError::classify_wallet_error("Denied by user");
        assert!(matches!(err, DappError::WalletRejected));
    }

    #[test]
    fn test_classify_other_errors_pass_through() {
        let err = DappError::classify_wallet_error("connection reset by peer");
        assert!(matches!(err, DappError::Other(_)));
    }
}
