//! Runtime initializer
//!
//! Builds the service registry from the merged `propel` configuration and
//! publishes it through the caller's [`RegistryHandle`]. The presence of a
//! non-empty `runtime.connections` sequence is the one validated invariant:
//! it is checked before anything else so a failure leaves no observable
//! registry mutation. Callers must not have ORM queries in flight across this
//! call; the previously active registry is retired as part of it.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::ConfigStore;
use crate::error::{BridgeError, BridgeResult};
use crate::runtime::registry::{
    AdapterKind, LogSink, RegistryHandle, ServiceRegistry, SingleConnectionManager,
    DEFAULT_LOGGER,
};

/// Minimum runtime version the bridge can drive.
pub const MINIMUM_RUNTIME_VERSION: &str = "2.0.0-dev";

/// File name of the pre-generated registry snapshot inside `phpConfDir`.
pub const COMPILED_RUNTIME_FILE: &str = "runtime.json";

/// Location of the compiled runtime artifact, if the configuration names a
/// conf directory. Existence is not checked here.
pub fn compiled_runtime_path(store: &ConfigStore) -> Option<PathBuf> {
    store
        .get_str("propel.propel.paths.phpConfDir")
        .map(|dir| Path::new(dir).join(COMPILED_RUNTIME_FILE))
}

/// Publish a pre-generated registry snapshot, bypassing initialization.
pub fn load_compiled_runtime(path: &Path, handle: &mut RegistryHandle) -> BridgeResult<()> {
    let raw = fs::read_to_string(path)?;
    let registry: ServiceRegistry = serde_json::from_str(&raw)?;
    tracing::info!(
        path = %path.display(),
        connections = registry.connections().len(),
        "loaded compiled propel runtime"
    );
    handle.publish(registry);
    Ok(())
}

/// Initialize the service registry from configuration and publish it.
pub fn initialize_runtime(
    store: &ConfigStore,
    handle: &mut RegistryHandle,
    sink: &LogSink,
) -> BridgeResult<()> {
    let connection_names = configured_connection_names(store)?;

    // Close-then-check before any registration; the previously published
    // registry is retired along with its connections.
    let mut registry = ServiceRegistry::new();
    handle.close_active();
    registry.close_connections();
    registry.check_version(MINIMUM_RUNTIME_VERSION)?;

    let paths = store
        .get("propel.propel.paths")
        .cloned()
        .unwrap_or(Value::Object(Map::new()));

    for name in &connection_names {
        let config = store
            .get(&format!("propel.propel.database.connections.{name}"))
            .and_then(Value::as_object)
            .ok_or_else(|| BridgeError::MissingConnectionConfig { name: name.clone() })?;

        let adapter = config
            .get("adapter")
            .and_then(Value::as_str)
            .unwrap_or("")
            .parse::<AdapterKind>()
            .map_err(|adapter| BridgeError::UnknownAdapter {
                connection: name.clone(),
                adapter,
            })?;
        registry.set_adapter(name, adapter);

        let mut merged = config.clone();
        merged.insert("paths".to_string(), paths.clone());
        registry.set_connection_manager(name, SingleConnectionManager::new(name.as_str(), merged));
    }

    match store.get_str("propel.propel.runtime.defaultConnection") {
        Some(default) => registry.set_default_datasource(default),
        None => tracing::warn!("no default connection configured"),
    }

    let mut has_default_logger = false;
    if let Some(log) = store
        .get("propel.propel.runtime.log")
        .and_then(Value::as_object)
    {
        has_default_logger = log.contains_key(DEFAULT_LOGGER);
        for (logger_name, conf) in log {
            registry.set_logger_configuration(logger_name, conf.clone());
        }
    }

    if !has_default_logger {
        registry.set_logger(DEFAULT_LOGGER, sink.clone());
    }

    tracing::info!(
        connections = connection_names.len(),
        default = registry.default_datasource().unwrap_or("<none>"),
        "propel runtime initialized"
    );
    handle.publish(registry);
    Ok(())
}

/// The configured connection name sequence, order preserved.
///
/// Absence or emptiness is the fatal configuration error of the bridge.
fn configured_connection_names(store: &ConfigStore) -> BridgeResult<Vec<String>> {
    let names: Vec<String> = store
        .get("propel.propel.runtime.connections")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if names.is_empty() {
        return Err(BridgeError::MissingRuntimeConfig);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_with_connections(names: &[&str]) -> ConfigStore {
        let mut store = ConfigStore::new();
        store.set("propel.propel.runtime.connections", json!(names));
        store.set("propel.propel.runtime.defaultConnection", json!("default"));
        for name in names {
            store.set(
                &format!("propel.propel.database.connections.{name}"),
                json!({ "adapter": "sqlite", "dsn": format!("sqlite:{name}.db") }),
            );
        }
        store
    }

    #[test]
    fn missing_connections_is_fatal_and_leaves_registry_untouched() {
        let mut handle = RegistryHandle::new();
        let mut prior = ServiceRegistry::new();
        prior.set_default_datasource("prior");
        handle.publish(prior);

        let store = ConfigStore::new();
        let err = initialize_runtime(&store, &mut handle, &LogSink::default()).unwrap_err();

        assert!(matches!(err, BridgeError::MissingRuntimeConfig));
        assert_eq!(
            handle.active().unwrap().default_datasource(),
            Some("prior")
        );
    }

    #[test]
    fn empty_connections_list_is_equally_fatal() {
        let mut store = ConfigStore::new();
        store.set("propel.propel.runtime.connections", json!([]));
        let mut handle = RegistryHandle::new();

        let err = initialize_runtime(&store, &mut handle, &LogSink::default()).unwrap_err();
        assert!(matches!(err, BridgeError::MissingRuntimeConfig));
        assert!(handle.active().is_none());
    }

    #[test]
    fn reinitialization_retires_the_prior_registry() {
        let mut handle = RegistryHandle::new();
        let mut prior = ServiceRegistry::new();
        prior.set_adapter("stale", AdapterKind::Mysql);
        prior.set_connection_manager("stale", SingleConnectionManager::new("stale", Map::new()));
        handle.publish(prior);

        let store = store_with_connections(&["fresh"]);
        initialize_runtime(&store, &mut handle, &LogSink::default()).unwrap();

        // Only the freshly configured connections survive the close.
        let registry = handle.active().unwrap();
        assert_eq!(registry.connection_names(), vec!["fresh"]);
        assert!(registry.connection("stale").is_none());
    }

    #[test]
    fn connections_register_in_configured_order() {
        let store = store_with_connections(&["first", "second", "third"]);
        let mut handle = RegistryHandle::new();

        initialize_runtime(&store, &mut handle, &LogSink::default()).unwrap();

        let registry = handle.active().unwrap();
        assert_eq!(
            registry.connection_names(),
            vec!["first", "second", "third"]
        );
        assert_eq!(registry.default_datasource(), Some("default"));
    }

    #[test]
    fn duplicate_names_keep_one_descriptor_last_write_wins() {
        let mut store = store_with_connections(&["a"]);
        store.set(
            "propel.propel.runtime.connections",
            json!(["a", "b", "a"]),
        );
        store.set(
            "propel.propel.database.connections.b",
            json!({ "adapter": "mysql", "dsn": "mysql:host=localhost" }),
        );

        let mut handle = RegistryHandle::new();
        initialize_runtime(&store, &mut handle, &LogSink::default()).unwrap();

        let registry = handle.active().unwrap();
        assert_eq!(registry.connection_names(), vec!["a", "b"]);
    }

    #[test]
    fn connection_without_database_section_fails() {
        let mut store = store_with_connections(&["known"]);
        store.set(
            "propel.propel.runtime.connections",
            json!(["known", "ghost"]),
        );

        let mut handle = RegistryHandle::new();
        let err = initialize_runtime(&store, &mut handle, &LogSink::default()).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::MissingConnectionConfig { ref name } if name == "ghost"
        ));
    }

    #[test]
    fn unknown_adapter_fails_at_registration() {
        let mut store = store_with_connections(&["odd"]);
        store.set(
            "propel.propel.database.connections.odd",
            json!({ "adapter": "mongodb" }),
        );

        let mut handle = RegistryHandle::new();
        let err = initialize_runtime(&store, &mut handle, &LogSink::default()).unwrap_err();
        assert!(matches!(err, BridgeError::UnknownAdapter { .. }));
    }

    #[test]
    fn manager_configuration_carries_path_parameters() {
        let mut store = store_with_connections(&["default"]);
        store.set("propel.propel.paths.phpConfDir", json!("app/propel"));

        let mut handle = RegistryHandle::new();
        initialize_runtime(&store, &mut handle, &LogSink::default()).unwrap();

        let registry = handle.active().unwrap();
        let manager = registry.connection("default").unwrap().manager().unwrap();
        assert_eq!(
            manager.configuration()["paths"]["phpConfDir"],
            json!("app/propel")
        );
        assert_eq!(manager.configuration()["dsn"], json!("sqlite:default.db"));
    }

    #[test]
    fn default_logger_synthesized_only_when_absent() {
        let mut store = store_with_connections(&["default"]);
        store.set(
            "propel.propel.runtime.log",
            json!({ "audit": { "type": "file", "path": "audit.log" } }),
        );

        let mut handle = RegistryHandle::new();
        let sink = LogSink::new("host-sink");
        initialize_runtime(&store, &mut handle, &sink).unwrap();

        let registry = handle.active().unwrap();
        assert!(registry.has_logger("audit"));
        assert!(matches!(
            registry.logger(DEFAULT_LOGGER),
            Some(crate::runtime::registry::LoggerDescriptor::Sink(s)) if s.target() == "host-sink"
        ));
    }

    #[test]
    fn configured_default_logger_suppresses_synthesis() {
        let mut store = store_with_connections(&["default"]);
        store.set(
            "propel.propel.runtime.log",
            json!({ "defaultLogger": { "type": "stream" } }),
        );

        let mut handle = RegistryHandle::new();
        initialize_runtime(&store, &mut handle, &LogSink::default()).unwrap();

        let registry = handle.active().unwrap();
        assert_eq!(registry.logger_names(), vec![DEFAULT_LOGGER]);
        assert!(matches!(
            registry.logger(DEFAULT_LOGGER),
            Some(crate::runtime::registry::LoggerDescriptor::Configured(_))
        ));
    }

    #[test]
    fn compiled_artifact_round_trips_through_the_handle() {
        let store = store_with_connections(&["default"]);
        let mut handle = RegistryHandle::new();
        initialize_runtime(&store, &mut handle, &LogSink::default()).unwrap();
        let snapshot = serde_json::to_string(handle.active().unwrap().as_ref()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let artifact = dir.path().join(COMPILED_RUNTIME_FILE);
        fs::write(&artifact, snapshot).unwrap();

        let mut fresh = RegistryHandle::new();
        load_compiled_runtime(&artifact, &mut fresh).unwrap();
        assert_eq!(
            fresh.active().unwrap().connection_names(),
            vec!["default"]
        );
    }
}
