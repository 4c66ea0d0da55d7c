//! Tether Core Runtime
//!
//! This crate lets a foreign, non-collected caller hold references to managed
//! objects and exchange values with them:
//! - Handle heap (identity-keyed handles, cooperative reclamation)
//! - Scanning and caching converter registries
//! - Built-in value and handle converters
//! - Marshaller and bridge wiring for an invoking layer

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod bridge;
pub mod config;
pub mod context;
pub mod converters;
pub mod heap;
pub mod marshal;
pub mod registry;

#[doc(hidden)]
pub use inventory;

pub use bridge::Bridge;
pub use config::{BridgeConfig, ConfigError, HeapConfig, RegistryConfig};
pub use context::MarshalContext;
pub use heap::{Handle, HandleHeap, HeapError, HeapResult, HeapStats, SeedSource};
pub use marshal::Marshaller;
pub use registry::{
    CachingTypeConverterRegistry, ConverterRegistration, ConverterRegistry, RegistryError,
    ScanningTypeConverterRegistry,
};

/// Bridge errors
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// Converter discovery failed
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Bridge result
pub type BridgeResult<T> = Result<T, BridgeError>;
