//! Session/display state machine.
//!
//! Pure state: no chain access, no async. The GUI feeds completions in and
//! asks which affordance to render; the affordance is a function of the
//! current phase and totals, nothing else. Keeping this separate from the
//! egui layer is what makes the transition table testable.

use crate::config::CLAIM_TOKENS_PER_NFT;
use crate::types::DisplayTotals;

/// Lifecycle phase of the wallet session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Disconnected,
    Connecting,
    Connected,
    /// A write transaction is in flight; controls are disabled.
    Loading,
}

/// The single action the display layer should present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    /// Offer the connect button only.
    Connect,
    /// Disabled control while a transaction is in flight.
    Loading,
    /// Offer claiming; `claimable_tokens` is the displayed whole-token
    /// figure (unclaimed NFTs times the per-NFT multiplier).
    Claim {
        unclaimed: u64,
        claimable_tokens: u64,
    },
    /// Offer the amount input and mint button; disabled until the input
    /// parses to a positive integer.
    Mint { enabled: bool },
}

pub struct UiStateController {
    phase: Phase,
    totals: DisplayTotals,
    mint_amount: Option<u64>,
    refresh_pending: bool,
}

impl UiStateController {
    /// Fresh page state: disconnected, all display values zero.
    pub fn new() -> Self {
        Self {
            phase: Phase::Disconnected,
            totals: DisplayTotals::default(),
            mint_amount: None,
            refresh_pending: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn totals(&self) -> &DisplayTotals {
        &self.totals
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    /// User asked to connect. Ignored unless currently disconnected, so a
    /// repeated gesture cannot start a second connection attempt.
    pub fn connect_requested(&mut self) -> bool {
        if self.phase == Phase::Disconnected {
            self.phase = Phase::Connecting;
            true
        } else {
            false
        }
    }

    /// Connection attempt resolved. On success the controller arms a
    /// one-shot refresh so the derived views are fetched exactly once per
    /// connect, not on every render.
    pub fn connect_resolved(&mut self, success: bool) {
        if self.phase != Phase::Connecting {
            return;
        }
        if success {
            self.phase = Phase::Connected;
            self.refresh_pending = true;
        } else {
            self.phase = Phase::Disconnected;
        }
    }

    /// One-shot latch: true the first time it is polled after entering
    /// the connected state, false until the next transaction completes.
    pub fn take_refresh_request(&mut self) -> bool {
        std::mem::take(&mut self.refresh_pending)
    }

    /// Write freshly scanned chain values into the display state.
    pub fn apply_totals(&mut self, totals: DisplayTotals) {
        self.totals = totals;
    }

    /// Parsed value of the mint amount input, `None` while invalid.
    pub fn set_mint_amount(&mut self, amount: Option<u64>) {
        self.mint_amount = amount;
    }

    pub fn mint_amount(&self) -> Option<u64> {
        self.mint_amount
    }

    /// A write transaction was submitted. Only legal while connected;
    /// returning false tells the caller the gesture arrived out of turn
    /// (e.g. a second click while already loading) and must be dropped.
    pub fn begin_transaction(&mut self) -> bool {
        if self.phase == Phase::Connected {
            self.phase = Phase::Loading;
            true
        } else {
            false
        }
    }

    /// The in-flight transaction resolved, successfully or not. Either
    /// way the session returns to connected and a refresh is armed; the
    /// loading state never outlives the transaction.
    pub fn complete_transaction(&mut self) {
        if self.phase == Phase::Loading {
            self.phase = Phase::Connected;
            self.refresh_pending = true;
        }
    }

    /// The one action to present, derived from current state.
    pub fn affordance(&self) -> Affordance {
        match self.phase {
            Phase::Disconnected | Phase::Connecting => Affordance::Connect,
            Phase::Loading => Affordance::Loading,
            Phase::Connected => {
                if self.totals.unclaimed > 0 {
                    Affordance::Claim {
                        unclaimed: self.totals.unclaimed,
                        claimable_tokens: self.totals.unclaimed * CLAIM_TOKENS_PER_NFT,
                    }
                } else {
                    Affordance::Mint {
                        enabled: self.mint_amount.map(|a| a > 0).unwrap_or(false),
                    }
                }
            }
        }
    }
}

impl Default for UiStateController {
    fn default() -> Self {
        Self::new()
    }
}
