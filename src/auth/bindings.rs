//! Auth binding registry
//!
//! Configuration names bindings by identifier; this registry maps those
//! identifiers to statically known constructors. Capability is enforced by
//! the constructor signatures at registration time, so a configured
//! identifier either resolves to a conforming implementation or is simply
//! not registered.

use std::collections::HashMap;

use crate::auth::query::{AuthModel, UserQuery};

/// Constructor for a configured user query.
pub type QueryConstructor = fn() -> Box<dyn UserQuery>;

/// Constructor for a configured auth model.
pub type ModelConstructor = fn() -> Box<dyn AuthModel>;

/// Identifier-to-constructor registry for auth queries and models.
#[derive(Debug, Default)]
pub struct AuthBindings {
    queries: HashMap<String, QueryConstructor>,
    models: HashMap<String, ModelConstructor>,
}

impl AuthBindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user query constructor under a configuration identifier.
    pub fn register_query(&mut self, id: impl Into<String>, constructor: QueryConstructor) {
        let id = id.into();
        tracing::debug!(id = %id, "auth query binding registered");
        self.queries.insert(id, constructor);
    }

    /// Register an auth model constructor under a configuration identifier.
    pub fn register_model(&mut self, id: impl Into<String>, constructor: ModelConstructor) {
        let id = id.into();
        tracing::debug!(id = %id, "auth model binding registered");
        self.models.insert(id, constructor);
    }

    pub fn query(&self, id: &str) -> Option<QueryConstructor> {
        self.queries.get(id).copied()
    }

    pub fn model(&self, id: &str) -> Option<ModelConstructor> {
        self.models.get(id).copied()
    }
}
