pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod ml;
pub mod orchestrator;
pub mod scoring;
pub mod services;
pub mod signals;

pub use cache::{DurableCache, InMemoryCache, RedisCache};
pub use config::AppConfig;
pub use domain::{
    CacheStatus, FinancialMetrics, HistoryEntry, MacroSnapshot, ProcessedBatch, RefreshPhase,
    RefreshStatus, RiskTier, ScoreResult, SentimentSignal, SignalSet,
};
pub use error::{CredintError, Result};
pub use ml::{DenseRegressor, LinearModel, ModelArtifact, ScoringModel, StandardScaler};
pub use orchestrator::{Orchestrator, RefreshSettings};
pub use scoring::Scorer;
pub use services::{RefreshMetrics, RefreshScheduler};
pub use signals::{SignalCollector, SignalSource, SimulatedSignalSource};
