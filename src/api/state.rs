use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::orchestrator::Orchestrator;
use crate::services::RefreshMetrics;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    /// Refresh pipeline and read surface
    pub orchestrator: Arc<Orchestrator>,

    /// Application start time
    pub start_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(orchestrator: Arc<Orchestrator>) -> Self {
        Self {
            orchestrator,
            start_time: Utc::now(),
        }
    }

    pub fn metrics(&self) -> &Arc<RefreshMetrics> {
        self.orchestrator.metrics()
    }

    /// Get system uptime in seconds
    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.start_time).num_seconds()
    }
}
