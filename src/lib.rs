pub mod balance;
pub mod config;
pub mod contracts;
pub mod eligibility;
pub mod error;
pub mod gui;
pub mod network;
pub mod operation_log;
pub mod session;
pub mod transactions;
pub mod types;
pub mod ui_state;
pub mod user_settings;
pub mod utils;
pub mod wallet;
