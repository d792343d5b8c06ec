//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Auto mode:
//!     scheduler.rs: sleep until next daily firing → run one batch → repeat
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop flag set → scheduler leaves its loop after the current batch
//!
//! Signals (signals.rs):
//!     SIGINT → trigger graceful shutdown; second SIGINT → exit
//! ```

pub mod scheduler;
pub mod shutdown;
pub mod signals;

pub use scheduler::DailySchedule;
pub use shutdown::{Shutdown, StopSignal};
