//! OS signal handling.
//!
//! # Responsibilities
//! - Listen for Ctrl-C / SIGINT
//! - Translate it into a shutdown trigger so pending waits are abandoned
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - A signal never interrupts an in-flight submission, only the wait

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::lifecycle::Shutdown;

/// Trigger `shutdown` on the first Ctrl-C.
pub fn spawn_interrupt_listener(shutdown: Arc<Shutdown>) -> JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, abandoning confirmation wait");
                shutdown.trigger();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for interrupt signal");
            }
        }
    })
}
