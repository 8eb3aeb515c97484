//! ORM service registry
//!
//! The process-wide holder of connection managers, logger configurations, and
//! the default datasource pointer. The bridge builds one of these per
//! bootstrap and publishes it through a [`RegistryHandle`] owned by the
//! application context; every later ORM operation in the process reads from
//! the published registry.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BridgeError, BridgeResult};

/// Version string the registry reports for compatibility checks.
pub const RUNTIME_VERSION: &str = "2.0.0-dev";

/// Database adapters the runtime ships.
///
/// Connections name their adapter in configuration; the name is resolved
/// against this set when the connection is registered, so a typo fails at
/// bootstrap instead of on first query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterKind {
    Mysql,
    Pgsql,
    Sqlite,
    Mssql,
    Oracle,
}

impl AdapterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterKind::Mysql => "mysql",
            AdapterKind::Pgsql => "pgsql",
            AdapterKind::Sqlite => "sqlite",
            AdapterKind::Mssql => "mssql",
            AdapterKind::Oracle => "oracle",
        }
    }
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AdapterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mysql" => Ok(AdapterKind::Mysql),
            "pgsql" | "postgres" | "postgresql" => Ok(AdapterKind::Pgsql),
            "sqlite" => Ok(AdapterKind::Sqlite),
            "mssql" | "sqlsrv" => Ok(AdapterKind::Mssql),
            "oracle" => Ok(AdapterKind::Oracle),
            other => Err(other.to_string()),
        }
    }
}

/// Manager owning a single named database connection's lifecycle.
///
/// Holds the merged configuration (connection parameters plus the configured
/// path parameters); opening and pooling the actual connection is the ORM
/// runtime's job, not the bridge's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleConnectionManager {
    name: String,
    configuration: Map<String, Value>,
}

impl SingleConnectionManager {
    pub fn new(name: impl Into<String>, configuration: Map<String, Value>) -> Self {
        Self {
            name: name.into(),
            configuration,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn configuration(&self) -> &Map<String, Value> {
        &self.configuration
    }
}

/// Per-connection state held by the registry: adapter binding plus manager.
///
/// Adapter and manager are installed by separate registry operations; either
/// may momentarily be absent while the initializer runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionEntry {
    name: String,
    adapter: Option<AdapterKind>,
    manager: Option<SingleConnectionManager>,
}

impl ConnectionEntry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            adapter: None,
            manager: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn adapter(&self) -> Option<AdapterKind> {
        self.adapter
    }

    pub fn manager(&self) -> Option<&SingleConnectionManager> {
        self.manager.as_ref()
    }
}

/// Logger state held by the registry, keyed by logger name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LoggerDescriptor {
    /// Settings taken verbatim from the `runtime.log` section.
    Configured(Value),
    /// Binding to the host's process-wide log sink, synthesized when the
    /// configuration names no `defaultLogger`.
    Sink(LogSink),
}

/// Handle on the host's process-wide log sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSink {
    target: String,
}

impl LogSink {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new("app")
    }
}

/// Name reserved for the logger every ORM component falls back to.
pub const DEFAULT_LOGGER: &str = "defaultLogger";

/// Service registry populated by the runtime initializer.
///
/// Connections keep their registration order; registering a name twice
/// overwrites the prior entry in place (last write wins). The whole registry
/// serializes as the compiled runtime artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRegistry {
    version: String,
    connections: Vec<ConnectionEntry>,
    loggers: Vec<(String, LoggerDescriptor)>,
    default_datasource: Option<String>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self {
            version: RUNTIME_VERSION.to_string(),
            connections: Vec::new(),
            loggers: Vec::new(),
            default_datasource: None,
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Assert the registry version is at least `required`.
    ///
    /// Pre-release suffixes are ignored; only the numeric components compare.
    pub fn check_version(&self, required: &str) -> BridgeResult<()> {
        if parse_version(&self.version) < parse_version(required) {
            return Err(BridgeError::IncompatibleVersion {
                found: self.version.clone(),
                required: required.to_string(),
            });
        }
        Ok(())
    }

    /// Release every connection the registry holds.
    pub fn close_connections(&mut self) {
        if !self.connections.is_empty() {
            tracing::debug!(count = self.connections.len(), "closing registry connections");
        }
        self.connections.clear();
    }

    /// Bind an adapter to a connection name.
    pub fn set_adapter(&mut self, name: &str, adapter: AdapterKind) {
        self.entry_mut(name).adapter = Some(adapter);
        tracing::debug!(connection = name, adapter = %adapter, "adapter registered");
    }

    /// Install a connection manager under a name. A manager already present
    /// for the name is replaced, keeping its position.
    pub fn set_connection_manager(&mut self, name: &str, manager: SingleConnectionManager) {
        let entry = self.entry_mut(name);
        if entry.manager.is_some() {
            tracing::warn!(connection = name, "connection manager overwritten");
        }
        entry.manager = Some(manager);
    }

    /// Point the default datasource at a connection name.
    ///
    /// The name is deliberately not validated against registered connections;
    /// a dangling pointer surfaces on first query, matching runtime behavior.
    pub fn set_default_datasource(&mut self, name: &str) {
        if !self.connections.iter().any(|c| c.name == name) {
            tracing::debug!(datasource = name, "default datasource has no registered connection");
        }
        self.default_datasource = Some(name.to_string());
    }

    /// Install a logger configuration under a name.
    pub fn set_logger_configuration(&mut self, name: &str, conf: Value) {
        self.upsert_logger(name, LoggerDescriptor::Configured(conf));
    }

    /// Bind a logger name directly to a log sink.
    pub fn set_logger(&mut self, name: &str, sink: LogSink) {
        self.upsert_logger(name, LoggerDescriptor::Sink(sink));
    }

    pub fn connection(&self, name: &str) -> Option<&ConnectionEntry> {
        self.connections.iter().find(|c| c.name == name)
    }

    pub fn connections(&self) -> &[ConnectionEntry] {
        &self.connections
    }

    pub fn connection_names(&self) -> Vec<&str> {
        self.connections.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn default_datasource(&self) -> Option<&str> {
        self.default_datasource.as_deref()
    }

    pub fn logger(&self, name: &str) -> Option<&LoggerDescriptor> {
        self.loggers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, descriptor)| descriptor)
    }

    pub fn has_logger(&self, name: &str) -> bool {
        self.logger(name).is_some()
    }

    pub fn logger_names(&self) -> Vec<&str> {
        self.loggers.iter().map(|(n, _)| n.as_str()).collect()
    }

    fn entry_mut(&mut self, name: &str) -> &mut ConnectionEntry {
        if let Some(index) = self.connections.iter().position(|c| c.name == name) {
            &mut self.connections[index]
        } else {
            self.connections.push(ConnectionEntry::new(name));
            let last = self.connections.len() - 1;
            &mut self.connections[last]
        }
    }

    fn upsert_logger(&mut self, name: &str, descriptor: LoggerDescriptor) {
        if let Some(slot) = self.loggers.iter_mut().find(|(n, _)| n == name) {
            slot.1 = descriptor;
        } else {
            self.loggers.push((name.to_string(), descriptor));
        }
    }
}

impl Default for ServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Caller-owned slot holding the active service registry.
///
/// Replaces ambient global lookup: the application context owns the handle
/// and passes it to whatever needs the active registry. The bridge assumes
/// exclusive access during its initialization window.
#[derive(Debug, Default)]
pub struct RegistryHandle {
    active: Option<Arc<ServiceRegistry>>,
}

impl RegistryHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently published registry, if any.
    pub fn active(&self) -> Option<&Arc<ServiceRegistry>> {
        self.active.as_ref()
    }

    /// Release the connections of the currently active registry and retire it.
    pub fn close_active(&mut self) {
        if self.active.take().is_some() {
            tracing::debug!("retired previously active service registry");
        }
    }

    /// Publish a registry as the active one, replacing any prior reference.
    pub fn publish(&mut self, registry: ServiceRegistry) -> Arc<ServiceRegistry> {
        let registry = Arc::new(registry);
        self.active = Some(Arc::clone(&registry));
        registry
    }
}

fn parse_version(version: &str) -> (u64, u64, u64) {
    let numeric = version.split(['-', '+']).next().unwrap_or(version);
    let mut parts = numeric.split('.').map(|p| p.parse::<u64>().unwrap_or(0));
    (
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    )
}
