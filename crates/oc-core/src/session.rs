//! The configuration value threaded through every dispatcher call.

use crate::config::EngineConfig;
use crate::types::{FilterLevel, TechniqueKind};
use std::sync::Arc;

/// Cheap-to-clone handle on an immutable configuration.
#[derive(Debug, Clone, Default)]
pub struct Session {
    config: Arc<EngineConfig>,
}

impl Session {
    pub fn new(config: EngineConfig) -> Self {
        Self { config: Arc::new(config) }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn allows(&self, kind: TechniqueKind) -> bool {
        self.config.is_enabled(kind)
    }

    /// A new session with the engine switched on or off.
    pub fn with_enabled(&self, enabled: bool) -> Self {
        Self::new(self.config.with_enabled(enabled))
    }

    /// A new session with one technique toggled.
    pub fn with_technique(&self, kind: TechniqueKind, enabled: bool) -> Self {
        Self::new(self.config.with_technique(kind, enabled))
    }

    pub fn with_source_level(&self, level: FilterLevel) -> Self {
        Self::new(self.config.with_source_level(level))
    }
}

impl From<EngineConfig> for Session {
    fn from(config: EngineConfig) -> Self {
        Self::new(config)
    }
}
