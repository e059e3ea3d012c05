use async_trait::async_trait;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Optional capability: serve a directory as a runnable project
#[async_trait]
pub trait ProjectRunner: Send + Sync {
    /// Start the project rooted at `dir` and return the URL it is served on
    async fn run(&self, dir: &Path) -> io::Result<String>;
}

/// Registry of optional, host-injected capabilities keyed by type
///
/// Lookups happen when a menu is built, so a capability registered or
/// removed at runtime shows up the next time a menu opens.
#[derive(Default)]
pub struct ServiceRegistry {
    services: RwLock<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self
            .services
            .read()
            .map(|services| services.len())
            .unwrap_or_else(|poisoned| poisoned.into_inner().len());
        f.debug_struct("ServiceRegistry")
            .field("services", &count)
            .finish()
    }
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service` under the type `T`, replacing any previous one
    ///
    /// Trait objects are registered by their `Arc<dyn Trait>` type:
    /// `registry.register::<dyn ProjectRunner>(Arc::new(runner))`.
    pub fn register<T: ?Sized + Send + Sync + 'static>(&self, service: Arc<T>) {
        let mut services = self
            .services
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        services.insert(TypeId::of::<Arc<T>>(), Box::new(service));
    }

    pub fn get<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let services = self
            .services
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        services
            .get(&TypeId::of::<Arc<T>>())
            .and_then(|service| service.downcast_ref::<Arc<T>>())
            .cloned()
    }

    pub fn contains<T: ?Sized + Send + Sync + 'static>(&self) -> bool {
        self.get::<T>().is_some()
    }

    /// Remove the service registered under `T`
    pub fn unregister<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        let mut services = self
            .services
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        services
            .remove(&TypeId::of::<Arc<T>>())
            .and_then(|service| service.downcast::<Arc<T>>().ok())
            .map(|service| *service)
    }
}
