use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Refresh lifecycle. There is no failed state: every exit returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefreshPhase {
    Idle,
    Running,
}

impl RefreshPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshPhase::Idle => "idle",
            RefreshPhase::Running => "running",
        }
    }
}

impl fmt::Display for RefreshPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse cache health, derived from reading the latest batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    Connected,
    Empty,
    Error,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Connected => "connected",
            CacheStatus::Empty => "empty",
            CacheStatus::Error => "error",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only view of the orchestrator's refresh state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshStatus {
    pub processing: bool,
    pub phase: RefreshPhase,
    pub last_update: Option<DateTime<Utc>>,
    pub cache_status: CacheStatus,
    pub timestamp: DateTime<Utc>,
}
