//! Auth adapter installer
//!
//! Conditionally wires a Propel-backed user provider into the host's
//! pluggable authentication registry. Only runs when the configured auth
//! driver is `propel`, and deliberately not during model scaffolding: the
//! scaffolding command runs before any model exists, so resolving a user
//! binding would fail.

use crate::auth::bindings::AuthBindings;
use crate::auth::provider::PropelUserProvider;
use crate::auth::query::UserQuery;
use crate::auth::registry::AuthRegistry;
use crate::bootstrap::RunMode;
use crate::commands::PropelCommand;
use crate::config::ConfigStore;
use crate::error::{BridgeError, BridgeResult};

/// Driver identifier this bridge registers.
pub const AUTH_DRIVER: &str = "propel";

/// Install the `propel` auth driver factory if configuration asks for it.
///
/// Returns whether a factory was registered. The factory itself is invoked
/// lazily by the host on the first authentication attempt.
pub fn install_auth_provider(
    store: &ConfigStore,
    bindings: &AuthBindings,
    auth: &mut AuthRegistry,
    mode: &RunMode,
) -> BridgeResult<bool> {
    if store.get_str("auth.driver") != Some(AUTH_DRIVER) {
        return Ok(false);
    }

    if let RunMode::Console {
        command: Some(command),
    } = mode
    {
        if command == PropelCommand::ModelBuild.name() {
            tracing::debug!("model scaffolding in progress, skipping auth driver registration");
            return Ok(false);
        }
    }

    let query = resolve_user_query(store, bindings)?;
    auth.extend(
        AUTH_DRIVER,
        Box::new(move |hasher| PropelUserProvider::new(query.clone(), hasher)),
    );
    tracing::info!(driver = AUTH_DRIVER, "auth driver registered");
    Ok(true)
}

/// Resolve the user query the provider will authenticate against.
///
/// `auth.user_query` wins when set and must name a registered query binding;
/// otherwise `auth.model` must name a registered model exposing a
/// primary-key criteria factory. The derived query has its filter state
/// cleared before use.
fn resolve_user_query(
    store: &ConfigStore,
    bindings: &AuthBindings,
) -> BridgeResult<Box<dyn UserQuery>> {
    if let Some(id) = store.get_str("auth.user_query") {
        let constructor = bindings.query(id).ok_or_else(|| {
            BridgeError::auth_binding(format!(
                "configuration directive \"auth.user_query\" must name a registered \
                 user query binding satisfying the UserQuery contract; \"{id}\" is not registered"
            ))
        })?;
        return Ok(constructor());
    }

    let id = store.get_str("auth.model").ok_or_else(|| {
        BridgeError::auth_binding(
            "neither \"auth.user_query\" nor \"auth.model\" is configured for the propel auth driver",
        )
    })?;
    let constructor = bindings.model(id).ok_or_else(|| {
        BridgeError::auth_binding(format!(
            "configuration directive \"auth.model\" must name a registered model binding; \
             \"{id}\" is not registered"
        ))
    })?;
    let model = constructor();
    let mut query = model.build_pk_criteria().ok_or_else(|| {
        BridgeError::auth_binding(format!(
            "configuration directive \"auth.model\" must name a model exposing a \
             primary-key criteria factory; \"{id}\" (table \"{table}\") has none",
            table = model.table()
        ))
    })?;
    query.clear();
    Ok(query)
}
