//! OS signal handling.
//!
//! The first Ctrl-C asks the scheduler to stop after the current batch; a
//! second one exits immediately.

use crate::lifecycle::shutdown::Shutdown;

/// Exit code used when a second interrupt forces termination.
const FORCED_EXIT_CODE: i32 = 130;

/// Wait for interrupts and translate them into shutdown requests.
pub async fn listen(shutdown: Shutdown) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        return;
    }
    tracing::info!("Interrupt received, stopping after the current batch (Ctrl-C again to force)");
    shutdown.trigger();

    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!("Second interrupt received, exiting now");
        std::process::exit(FORCED_EXIT_CODE);
    }
}
