//! Wiring for an invoking layer
//!
//! The heap and the registries do not know about each other. [`Bridge`] builds
//! one heap, hands it to converter constructors through the
//! [`MarshalContext`], discovers the converters and puts the caching decorator
//! in front when configured.

use crate::config::BridgeConfig;
use crate::context::MarshalContext;
use crate::heap::HandleHeap;
use crate::marshal::Marshaller;
use crate::registry::{CachingTypeConverterRegistry, ConverterRegistry, ScanningTypeConverterRegistry};
use crate::BridgeResult;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Heap, registry and marshaller for one process
#[derive(Debug)]
pub struct Bridge {
    context: MarshalContext,
    marshaller: Marshaller,
}

impl Bridge {
    /// Build the heap and discover converters
    pub fn new(config: &BridgeConfig) -> BridgeResult<Self> {
        let heap = Arc::new(HandleHeap::new(&config.heap));
        let context = MarshalContext::new(heap);
        let scanning = ScanningTypeConverterRegistry::discover(&context)?;

        let registry: Arc<dyn ConverterRegistry> = if config.registry.cache {
            Arc::new(CachingTypeConverterRegistry::new(scanning))
        } else {
            Arc::new(scanning)
        };

        info!(
            first_handle = format_args!("{:#x}", context.heap().first_handle()),
            cache = config.registry.cache,
            "bridge ready"
        );
        Ok(Self {
            context,
            marshaller: Marshaller::new(registry),
        })
    }

    /// Load configuration from a TOML file and build the bridge
    pub fn load(path: impl AsRef<Path>) -> BridgeResult<Self> {
        let config = BridgeConfig::load(path)?;
        Self::new(&config)
    }

    /// Get the handle heap
    pub fn heap(&self) -> &Arc<HandleHeap> {
        self.context.heap()
    }

    /// Get the marshaling context
    pub fn context(&self) -> &MarshalContext {
        &self.context
    }

    /// Get the converter registry
    pub fn registry(&self) -> &Arc<dyn ConverterRegistry> {
        self.marshaller.registry()
    }

    /// Get the marshaller
    pub fn marshaller(&self) -> &Marshaller {
        &self.marshaller
    }
}
