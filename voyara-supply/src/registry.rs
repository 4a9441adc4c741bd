use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use voyara_core::SupplierAdapter;

use crate::adapters::{MockAdapter, SkyhopAdapter, TripgateAdapter, MOCK, SKYHOP, TRIPGATE};
use crate::config::SupplyConfig;

type AdapterFactory = Box<dyn Fn() -> Arc<dyn SupplierAdapter> + Send + Sync>;

struct RegistryInner {
    factories: HashMap<String, AdapterFactory>,
    instances: HashMap<String, Arc<dyn SupplierAdapter>>,
}

/// Explicit adapter registry, constructed once at startup and injected
/// into the supply manager. Adapters are built lazily from their factory
/// and cached, so each supplier is constructed at most once per registry.
pub struct AdapterRegistry {
    inner: Mutex<RegistryInner>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                factories: HashMap::new(),
                instances: HashMap::new(),
            }),
        }
    }

    /// Registry pre-populated with the shipped adapters. New NDC
    /// integrations register here without touching orchestration code.
    pub fn with_defaults(config: &SupplyConfig) -> Self {
        let registry = Self::new();
        registry.register(MOCK, || Arc::new(MockAdapter::new()));
        let skyhop = config.skyhop.clone();
        registry.register(SKYHOP, move || Arc::new(SkyhopAdapter::new(skyhop.clone())));
        let tripgate = config.tripgate.clone();
        registry.register(TRIPGATE, move || {
            Arc::new(TripgateAdapter::new(tripgate.clone()))
        });
        registry
    }

    /// Register or replace the factory for a supplier name. Any cached
    /// instance for that name is dropped and rebuilt on next use.
    pub fn register<F>(&self, name: &str, factory: F)
    where
        F: Fn() -> Arc<dyn SupplierAdapter> + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().expect("adapter registry poisoned");
        inner.factories.insert(name.to_string(), Box::new(factory));
        inner.instances.remove(name);
    }

    /// Resolve an adapter, constructing it on first use.
    pub fn get(&self, name: &str) -> Option<Arc<dyn SupplierAdapter>> {
        let mut inner = self.inner.lock().expect("adapter registry poisoned");
        if let Some(instance) = inner.instances.get(name) {
            return Some(instance.clone());
        }
        let instance = inner.factories.get(name)?();
        inner.instances.insert(name.to_string(), instance.clone());
        Some(instance)
    }

    pub fn names(&self) -> Vec<String> {
        let inner = self.inner.lock().expect("adapter registry poisoned");
        let mut names: Vec<String> = inner.factories.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_adapter_constructed_once() {
        let constructions = Arc::new(AtomicUsize::new(0));
        let registry = AdapterRegistry::new();

        let counter = constructions.clone();
        registry.register("mock", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(MockAdapter::new())
        });

        let first = registry.get("mock").unwrap();
        let second = registry.get("mock").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(constructions.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_reregistration_replaces_instance() {
        let registry = AdapterRegistry::new();
        registry.register("mock", || Arc::new(MockAdapter::new()));
        let first = registry.get("mock").unwrap();

        registry.register("mock", || Arc::new(MockAdapter::new()));
        let second = registry.get("mock").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_unknown_name() {
        let registry = AdapterRegistry::new();
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_defaults_register_all_suppliers() {
        let registry = AdapterRegistry::with_defaults(&SupplyConfig::default());
        assert_eq!(
            registry.names(),
            vec![MOCK.to_string(), SKYHOP.to_string(), TRIPGATE.to_string()]
        );
    }
}
