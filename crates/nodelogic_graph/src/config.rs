// SPDX-License-Identifier: MIT OR Apache-2.0
//! Engine configuration.
//!
//! Stored as RON so hosts can keep it next to their other settings files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default depth limit for a single propagation through a feedback loop
pub const DEFAULT_MAX_PROPAGATION_DEPTH: usize = 1024;

/// Tunables for [`LogicEngine`](crate::evaluation::LogicEngine)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Deepest chain of components one input change may walk in a graph
    /// with a feedback loop before the engine reports it. Acyclic graphs
    /// are never cut off. `0` disables the guard.
    pub max_propagation_depth: usize,
    /// Emit a debug event for every recomputed component
    pub log_transitions: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_propagation_depth: DEFAULT_MAX_PROPAGATION_DEPTH,
            log_transitions: true,
        }
    }
}

impl EngineConfig {
    /// Parse from RON text
    pub fn from_ron(text: &str) -> Result<Self, ConfigError> {
        Ok(ron::from_str(text)?)
    }

    /// Serialize to pretty RON text
    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Load from a RON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron(&text)
    }

    /// Whether the depth guard is active
    pub fn depth_limit(&self) -> Option<usize> {
        (self.max_propagation_depth > 0).then_some(self.max_propagation_depth)
    }
}

/// Error when reading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read {path:?}: {source}")]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// RON text could not be parsed
    #[error("Invalid engine config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Config could not be written
    #[error("Failed to serialize engine config: {0}")]
    Serialize(#[from] ron::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.max_propagation_depth, DEFAULT_MAX_PROPAGATION_DEPTH);
        assert_eq!(config.depth_limit(), Some(DEFAULT_MAX_PROPAGATION_DEPTH));
        assert!(config.log_transitions);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let config = EngineConfig::from_ron("(max_propagation_depth: 0)").unwrap();
        assert_eq!(config.depth_limit(), None);
        assert!(config.log_transitions);
    }

    #[test]
    fn test_serialization() {
        let config = EngineConfig {
            max_propagation_depth: 64,
            log_transitions: false,
        };
        let ron_str = config.to_ron().unwrap();
        assert_eq!(EngineConfig::from_ron(&ron_str).unwrap(), config);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine.ron");
        std::fs::write(&path, "(log_transitions: false)").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert!(!config.log_transitions);

        let missing = EngineConfig::load(&dir.path().join("absent.ron")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
        assert!(matches!(EngineConfig::from_ron("(max_propagation_depth: \"x\")"), Err(ConfigError::Parse(_))));
    }
}
