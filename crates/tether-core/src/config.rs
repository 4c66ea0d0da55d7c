//! Bridge configuration
//!
//! Loaded from TOML or built in code. Every field has a default, so an empty
//! document is a valid configuration.
//!
//! ```toml
//! [heap]
//! seed = "host"            # "host" | "random" | { fixed = 42 }
//! initial_capacity = 1024
//!
//! [registry]
//! cache = true
//! ```

use crate::heap::SeedSource;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Configuration is not valid TOML for this schema
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Handle heap settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeapConfig {
    /// Source of the first handle value
    pub seed: SeedSource,

    /// Entries to preallocate in each map
    pub initial_capacity: usize,
}

impl Default for HeapConfig {
    fn default() -> Self {
        Self {
            seed: SeedSource::Host,
            initial_capacity: 0,
        }
    }
}

impl HeapConfig {
    /// Use a specific seed source
    pub fn with_seed(mut self, seed: SeedSource) -> Self {
        self.seed = seed;
        self
    }

    /// Preallocate map capacity
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

/// Converter registry settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Wrap the scanning registry in the caching decorator
    pub cache: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { cache: true }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
    /// Handle heap settings
    pub heap: HeapConfig,

    /// Converter registry settings
    pub registry: RegistryConfig,
}

impl BridgeConfig {
    /// Parse from a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Use a specific heap seed source
    pub fn with_seed(mut self, seed: SeedSource) -> Self {
        self.heap.seed = seed;
        self
    }

    /// Disable the lookup cache
    pub fn without_cache(mut self) -> Self {
        self.registry.cache = false;
        self
    }
}
