//! Shared types for the output compactor: configuration, session, metrics sink.

pub mod config;
pub mod error;
pub mod metrics;
pub mod session;
pub mod types;

pub use config::EngineConfig;
pub use error::{ConfigError, Result};
pub use metrics::{InMemoryMetrics, MetricsRecord, MetricsSink, MetricsSummary};
pub use session::Session;
pub use types::{FilterLevel, InputKind, TechniqueKind};
