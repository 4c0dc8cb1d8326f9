pub mod metrics;
pub mod scheduler;

pub use metrics::RefreshMetrics;
pub use scheduler::RefreshScheduler;
