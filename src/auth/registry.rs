//! Pluggable authentication registry
//!
//! The host surface the installer registers into: driver identifier mapped to
//! a factory the framework invokes lazily on the first authentication
//! attempt, never eagerly at bootstrap.

use std::collections::HashMap;
use std::sync::Arc;

use crate::auth::provider::{PasswordHasher, PropelUserProvider};

/// Factory producing a user provider from the host's hashing service.
pub type ProviderFactory = Box<dyn Fn(Arc<dyn PasswordHasher>) -> PropelUserProvider + Send + Sync>;

/// Driver-keyed registry of lazily invoked provider factories.
#[derive(Default)]
pub struct AuthRegistry {
    factories: HashMap<String, ProviderFactory>,
}

impl AuthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider factory under a driver identifier.
    pub fn extend(&mut self, driver: impl Into<String>, factory: ProviderFactory) {
        let driver = driver.into();
        tracing::debug!(driver = %driver, "auth driver factory registered");
        self.factories.insert(driver, factory);
    }

    pub fn has_driver(&self, driver: &str) -> bool {
        self.factories.contains_key(driver)
    }

    /// Invoke the factory for a driver with the host's hashing service.
    pub fn resolve(
        &self,
        driver: &str,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Option<PropelUserProvider> {
        self.factories.get(driver).map(|factory| factory(hasher))
    }
}

impl std::fmt::Debug for AuthRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRegistry")
            .field("drivers", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}
