//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Env overrides → CLI overrides → Validate
//!
//! Signals (signals.rs):
//!     SIGINT → Trigger shutdown
//!
//! Shutdown (shutdown.rs):
//!     Trigger → Confirmation wait returns Cancelled → Connection dropped → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Cancellation is observed only by the confirmation wait

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
