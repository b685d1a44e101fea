//! GUI module for the TokenGate application
//!
//! Thin display layer over the session/transaction core, built with
//! eframe/egui.
//!
//! ## Module Structure
//!
//! - `app` - Main GuiApp struct, job wiring, and affordance rendering
//! - `async_job` - Background task spawning and polling for the GUI thread
//! - `notifications` - Notification feed entries and error phrasing
//!
//! The GUI renders whatever affordance [`crate::ui_state::UiStateController`]
//! derives; it never decides transitions itself.

mod app;
pub mod async_job;
pub mod notifications;

pub use app::{launch, GuiApp};
pub use async_job::AsyncJob;
pub use notifications::NotificationEntry;
