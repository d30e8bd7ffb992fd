// Observability: tracing setup, metrics, and the human-readable run log

pub mod logging;
pub mod metrics;
pub mod run_log;

pub use logging::init_logging;
pub use run_log::{FileRunLog, MemoryRunLog};
