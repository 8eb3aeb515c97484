//! # propel-bridge: Propel ORM integration for container-based applications
//!
//! This crate wires an external Propel-style ORM runtime into a host
//! application's startup lifecycle: it merges the `propel` configuration
//! namespace from a user file or bundled defaults, initializes the ORM
//! service registry (connection managers, loggers, default datasource) from
//! that configuration, conditionally installs a Propel-backed authentication
//! provider, and registers the Propel console commands with the host's
//! command dispatcher.
//!
//! Everything runs synchronously, once, during startup. The interesting
//! engineering (query building, pooling, SQL generation, migrations) belongs
//! to the ORM runtime and the host framework; this crate is the decision
//! logic that selects and wires them.

pub mod auth;
pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod error;
pub mod runtime;

// Error handling
pub use error::{BridgeError, BridgeResult};

// Bootstrapping
pub use bootstrap::{AppContext, BootstrapState, Bootstrapper, RunMode};

// Configuration
pub use config::{merge_propel_config, publish_default_config, ConfigPaths, ConfigStore};

// Runtime registry
pub use runtime::{
    AdapterKind, LogSink, LoggerDescriptor, RegistryHandle, ServiceRegistry,
    SingleConnectionManager,
};

// Authentication
pub use auth::{
    install_auth_provider, AuthBindings, AuthModel, AuthRegistry, Criteria, CriteriaQuery,
    PasswordHasher, PropelUserProvider, UserQuery, AUTH_DRIVER,
};

// Console commands
pub use commands::{register_commands, CommandRegistry, PropelCommand};

/// Bridge version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
