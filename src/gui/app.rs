//! Main GUI application module
//!
//! Wires user gestures to the session/transaction core and renders the
//! affordance the state machine derives. All chain work runs off-thread in
//! [`AsyncJob`]s; the update loop only polls and draws, so a stuck RPC can
//! never freeze the window.

use crate::{
    balance::BalanceReader,
    config::{
        self, Config, CLAIM_TOKENS_PER_NFT, MAX_SUPPLY_TOKENS, REQUIRED_NETWORK_LABEL,
    },
    eligibility::EligibilityScanner,
    network::NetworkGuard,
    operation_log,
    session::SessionManager,
    transactions::TransactionRunner,
    types::{DisplayTotals, TxOutcome},
    ui_state::{Affordance, Phase, UiStateController},
    user_settings::UserSettings,
    utils,
    wallet::KeystoreConnector,
};
use anyhow::{anyhow, Result};
use eframe::{egui, egui::RichText, App, Frame, NativeOptions};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use super::async_job::AsyncJob;
use super::notifications::{self, NotificationEntry};

type Session = SessionManager<KeystoreConnector>;
type Reader = BalanceReader<KeystoreConnector>;
type Scanner = EligibilityScanner<KeystoreConnector>;
type Runner = TransactionRunner<KeystoreConnector>;

pub struct GuiApp {
    config: Config,
    settings: UserSettings,
    session: Arc<Session>,
    reader: Arc<Reader>,
    scanner: Arc<Scanner>,
    runner: Arc<Runner>,

    controller: UiStateController,
    mint_amount_input: String,
    /// Capability flag: read once after connect, gates the withdraw button.
    is_owner: Option<bool>,

    connect_job: Option<AsyncJob<bool>>,
    refresh_job: Option<AsyncJob<DisplayTotals>>,
    owner_job: Option<AsyncJob<bool>>,
    tx_job: Option<AsyncJob<TxOutcome>>,
    /// Which write operation the in-flight tx_job belongs to.
    tx_operation: Option<&'static str>,

    last_tx_url: Option<String>,
    notifications: VecDeque<NotificationEntry>,
    /// Cached operation-log text; loaded when the log section is opened.
    log_view: Option<String>,
}

impl GuiApp {
    pub fn new(config: Config, settings: UserSettings) -> Self {
        let connector = KeystoreConnector::new(config.clone());
        let session = Arc::new(SessionManager::new(connector, NetworkGuard::default()));
        let reader = Arc::new(BalanceReader::new(session.clone(), config.clone()));
        let scanner = Arc::new(EligibilityScanner::new(session.clone(), config.clone()));
        let runner = Arc::new(TransactionRunner::new(session.clone(), config.clone()));

        Self {
            config,
            settings,
            session,
            reader,
            scanner,
            runner,
            controller: UiStateController::new(),
            // Fresh every launch; nothing is prefilled or pre-armed.
            mint_amount_input: String::new(),
            is_owner: None,
            connect_job: None,
            refresh_job: None,
            owner_job: None,
            tx_job: None,
            tx_operation: None,
            last_tx_url: None,
            notifications: VecDeque::new(),
            log_view: None,
        }
    }

    fn notify(&mut self, message: impl Into<String>) {
        notifications::push(&mut self.notifications, message);
    }

    // ==================== job wiring ====================

    fn start_connect(&mut self) {
        if !self.controller.connect_requested() {
            return;
        }
        let session = self.session.clone();
        self.connect_job = Some(AsyncJob::spawn(move || async move {
            Ok(session.connect().await)
        }));
    }

    fn start_refresh(&mut self) {
        let session = self.session.clone();
        let reader = self.reader.clone();
        let scanner = self.scanner.clone();
        self.refresh_job = Some(AsyncJob::spawn(move || async move {
            let address = session.signer_address().await.map_err(anyhow::Error::from)?;
            // Degrading reads: each value independently falls back to zero.
            let token_balance = reader.balance_of_or_zero(address).await;
            let total_minted = reader.total_supply_or_zero().await;
            let unclaimed = scanner.scan_or_zero(address).await;
            Ok(DisplayTotals {
                token_balance,
                total_minted,
                unclaimed,
            })
        }));
    }

    fn start_owner_check(&mut self) {
        let runner = self.runner.clone();
        self.owner_job = Some(AsyncJob::spawn(move || async move {
            runner.is_owner().await.map_err(anyhow::Error::from)
        }));
    }

    fn start_transaction<FB, Fut>(&mut self, operation: &'static str, builder: FB)
    where
        FB: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = Result<TxOutcome>> + 'static,
    {
        if !self.controller.begin_transaction() {
            // Out-of-turn gesture (already loading); drop it.
            return;
        }
        self.tx_operation = Some(operation);
        self.tx_job = Some(AsyncJob::spawn(builder));
    }

    fn start_mint(&mut self, amount: u64) {
        self.settings.last_mint_amount = Some(amount);
        if let Err(e) = self.settings.save() {
            tracing::warn!("Failed to save settings: {}", e);
        }
        let runner = self.runner.clone();
        self.start_transaction("Mint", move || async move {
            runner.mint(amount).await.map_err(anyhow::Error::from)
        });
    }

    fn start_claim(&mut self) {
        let runner = self.runner.clone();
        self.start_transaction("Claim", move || async move {
            runner.claim().await.map_err(anyhow::Error::from)
        });
    }

    fn start_withdraw(&mut self) {
        let runner = self.runner.clone();
        self.start_transaction("Withdraw", move || async move {
            runner.withdraw().await.map_err(anyhow::Error::from)
        });
    }

    // ==================== job polling ====================

    fn poll_jobs(&mut self) {
        if let Some(job) = &mut self.connect_job {
            if let Some(result) = job.poll() {
                self.connect_job = None;
                let connected = result.unwrap_or(false);
                self.controller.connect_resolved(connected);
                if connected {
                    self.notify("Wallet connected.");
                    self.start_owner_check();
                } else {
                    self.notify(format!(
                        "Wallet connection failed. Make sure a key is configured and \
                         the wallet is on {}. Details are in the log.",
                        REQUIRED_NETWORK_LABEL
                    ));
                }
            }
        }

        if let Some(job) = &mut self.refresh_job {
            if let Some(result) = job.poll() {
                self.refresh_job = None;
                match result {
                    Ok(totals) => self.controller.apply_totals(totals),
                    Err(e) => {
                        let message = notifications::describe_failure("Refresh", &e);
                        self.notify(message);
                    }
                }
            }
        }

        if let Some(job) = &mut self.owner_job {
            if let Some(result) = job.poll() {
                self.owner_job = None;
                // Not being able to read the owner just means no withdraw
                // button; the contract stays the final authority anyway.
                self.is_owner = Some(result.unwrap_or(false));
            }
        }

        if let Some(job) = &mut self.tx_job {
            if let Some(result) = job.poll() {
                self.tx_job = None;
                let operation = self.tx_operation.take().unwrap_or("Transaction");
                match result {
                    Ok(outcome) => {
                        let url = config::get_tx_explorer_url(&format!("{:?}", outcome.tx_hash));
                        self.last_tx_url = Some(url);
                        self.notify(format!("{} succeeded ({:?}).", operation, outcome.tx_hash));
                    }
                    Err(e) => {
                        let message = notifications::describe_failure(operation, &e);
                        self.notify(message);
                    }
                }
                // Loading is released on every completion path.
                self.controller.complete_transaction();
                // The log gained an entry; re-read it next time it is shown.
                self.log_view = None;
            }
        }

        // Derived views are re-fetched exactly when the controller arms a
        // refresh: once on connect, once after each transaction.
        if self.controller.phase() == Phase::Connected
            && self.refresh_job.is_none()
            && self.controller.take_refresh_request()
        {
            self.start_refresh();
        }
    }

    // ==================== rendering ====================

    fn render_totals(&self, ui: &mut egui::Ui) {
        let totals = self.controller.totals();
        ui.label(format!(
            "You have minted {} CryptoDev tokens",
            utils::format_tokens(totals.token_balance)
        ));
        ui.label(format!(
            "Overall {}/{} have been minted",
            utils::format_tokens(totals.total_minted),
            MAX_SUPPLY_TOKENS
        ));
    }

    fn render_affordance(&mut self, ui: &mut egui::Ui) {
        match self.controller.affordance() {
            Affordance::Connect => {
                let connecting = self.controller.phase() == Phase::Connecting;
                if connecting {
                    ui.add_enabled(false, egui::Button::new("Connecting..."));
                    ui.spinner();
                } else if ui.button("Connect your wallet").clicked() {
                    self.start_connect();
                }
            }
            Affordance::Loading => {
                ui.add_enabled(false, egui::Button::new("Loading..."));
                ui.spinner();
            }
            Affordance::Claim {
                unclaimed,
                claimable_tokens,
            } => {
                ui.label(format!(
                    "{} CryptoDev tokens to be claimed ({} NFTs x {})",
                    claimable_tokens, unclaimed, CLAIM_TOKENS_PER_NFT
                ));
                if ui.button("Claim Tokens").clicked() {
                    self.start_claim();
                }
            }
            Affordance::Mint { enabled } => {
                ui.horizontal(|ui| {
                    ui.label("Amount of tokens:");
                    ui.text_edit_singleline(&mut self.mint_amount_input);
                });
                if ui
                    .add_enabled(enabled, egui::Button::new("Mint tokens"))
                    .clicked()
                {
                    if let Some(amount) = self.controller.mint_amount() {
                        self.start_mint(amount);
                    }
                }
            }
        }

        // Owner-only surface, same page gated by the capability flag.
        if self.controller.phase() == Phase::Connected && self.is_owner == Some(true) {
            ui.separator();
            if ui.button("Withdraw sale proceeds").clicked() {
                self.start_withdraw();
            }
        }
    }

    fn render_notifications(&mut self, ui: &mut egui::Ui) {
        if let Some(url) = self.last_tx_url.clone() {
            if ui.button("View last transaction on explorer").clicked() {
                if let Err(e) = open::that(&url) {
                    tracing::warn!("Failed to open explorer url: {}", e);
                }
            }
        }
        egui::ScrollArea::vertical().max_height(140.0).show(ui, |ui| {
            for entry in self.notifications.iter().rev() {
                ui.label(format!("[{}] {}", entry.time_ago(), entry.message));
            }
        });
    }

    fn render_operation_log(&mut self, ui: &mut egui::Ui) {
        ui.collapsing("Operation log", |ui| {
            ui.label(RichText::new(operation_log::log_file_path()).weak());
            if ui.button("Reload").clicked() {
                self.log_view = None;
            }
            let content = self.log_view.get_or_insert_with(|| {
                operation_log::read_log().unwrap_or_else(|e| {
                    tracing::warn!("Failed to read operation log: {}", e);
                    String::new()
                })
            });
            if content.is_empty() {
                ui.label("No operations logged yet.");
            } else {
                egui::ScrollArea::vertical()
                    .id_source("operation_log")
                    .max_height(160.0)
                    .show(ui, |ui| {
                        ui.monospace(content.as_str());
                    });
            }
        });
    }
}

impl App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.poll_jobs();

        // Keep the parsed input in sync before deriving the affordance.
        self.controller
            .set_mint_amount(utils::parse_mint_amount(&self.mint_amount_input));

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Welcome to Crypto Devs ICO!");
            ui.label("You can claim or mint CryptoDev tokens here");
            ui.label(
                RichText::new(format!(
                    "Network: {} (chain {})",
                    REQUIRED_NETWORK_LABEL, self.config.chain_id
                ))
                .weak(),
            );
            ui.separator();

            if self.session.is_connected() {
                self.render_totals(ui);
                ui.add_space(8.0);
            }
            self.render_affordance(ui);

            if self.settings.show_notifications && !self.notifications.is_empty() {
                ui.separator();
                self.render_notifications(ui);
            }

            ui.separator();
            self.render_operation_log(ui);
        });

        // Jobs finish off-thread; poll again soon even without input.
        ctx.request_repaint_after(Duration::from_millis(250));
    }
}

pub fn launch(mut config: Config) -> Result<()> {
    let settings = UserSettings::load();
    if let Some(ref rpc) = settings.rpc_url_override {
        config.rpc_url = rpc.clone();
    }
    config.confirmation_timeout_secs = settings.confirmation_timeout_secs;

    let app_creator = move |_cc: &eframe::CreationContext<'_>| {
        Box::new(GuiApp::new(config.clone(), settings.clone())) as Box<dyn App>
    };

    let viewport = egui::ViewportBuilder::default().with_inner_size([520.0, 640.0]);
    let native_options = NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "TokenGate - CryptoDev token sale",
        native_options,
        Box::new(app_creator),
    )
    .map_err(|e| anyhow!("Failed to start GUI: {}", e))
}
