//! Integration bootstrapper
//!
//! Drives the whole bridge in two ordered phases against an explicit
//! application context: a registration phase that merges configuration, and
//! a boot phase that initializes the ORM runtime (or loads a compiled
//! snapshot), conditionally installs the auth driver, and registers console
//! commands. The bootstrapper runs once per process during startup; re-entry
//! is only possible through an explicit re-bootstrap.

use std::sync::Arc;

use crate::auth::{install_auth_provider, AuthBindings, AuthRegistry};
use crate::commands::{register_commands, CommandRegistry};
use crate::config::{merge_propel_config, ConfigPaths, ConfigStore};
use crate::error::{BridgeError, BridgeResult};
use crate::runtime::{
    compiled_runtime_path, initialize_runtime, load_compiled_runtime, LogSink, RegistryHandle,
    ServiceRegistry,
};

/// How the host process was started. Supplied explicitly by the caller; the
/// bridge never inspects process arguments itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunMode {
    /// Serving requests.
    Http,
    /// Interactive console, with the invoked command name when one was given.
    Console { command: Option<String> },
}

impl RunMode {
    /// Console mode running a named command.
    pub fn console(command: impl Into<String>) -> Self {
        RunMode::Console {
            command: Some(command.into()),
        }
    }

    pub fn is_console(&self) -> bool {
        matches!(self, RunMode::Console { .. })
    }
}

/// Bootstrap progress, advanced in order and observable for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    Uninitialized,
    ConfigMerged,
    /// A compiled runtime snapshot was loaded, bypassing initialization.
    RuntimeLoaded,
    RuntimeInitialized,
    AuthChecked,
    CommandsRegistered,
    Ready,
}

impl BootstrapState {
    pub fn name(&self) -> &'static str {
        match self {
            BootstrapState::Uninitialized => "uninitialized",
            BootstrapState::ConfigMerged => "config-merged",
            BootstrapState::RuntimeLoaded => "runtime-loaded",
            BootstrapState::RuntimeInitialized => "runtime-initialized",
            BootstrapState::AuthChecked => "auth-checked",
            BootstrapState::CommandsRegistered => "commands-registered",
            BootstrapState::Ready => "ready",
        }
    }
}

/// Explicit application context the bootstrapper works against.
///
/// Owns the configuration store, the active-registry slot, and the host
/// registries the bridge populates. Passing it explicitly keeps every
/// collaborator free of ambient global lookups.
#[derive(Debug, Default)]
pub struct AppContext {
    pub config: ConfigStore,
    pub registry: RegistryHandle,
    pub auth: AuthRegistry,
    pub commands: CommandRegistry,
    pub bindings: AuthBindings,
    pub log_sink: LogSink,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active service registry, once published.
    pub fn active_registry(&self) -> Option<&Arc<ServiceRegistry>> {
        self.registry.active()
    }
}

/// Two-phase service provider wiring the Propel runtime into the host.
#[derive(Debug)]
pub struct Bootstrapper {
    paths: ConfigPaths,
    mode: RunMode,
    state: BootstrapState,
}

impl Bootstrapper {
    pub fn new(paths: ConfigPaths, mode: RunMode) -> Self {
        Self {
            paths,
            mode,
            state: BootstrapState::Uninitialized,
        }
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    pub fn mode(&self) -> &RunMode {
        &self.mode
    }

    /// Registration phase: ensure the `propel` config namespace is populated.
    pub fn register(&mut self, ctx: &mut AppContext) -> BridgeResult<()> {
        self.expect_state(BootstrapState::Uninitialized)?;
        merge_propel_config(&mut ctx.config, &self.paths)?;
        self.state = BootstrapState::ConfigMerged;
        Ok(())
    }

    /// Boot phase: runtime, auth driver, console commands.
    pub fn boot(&mut self, ctx: &mut AppContext) -> BridgeResult<()> {
        self.expect_state(BootstrapState::ConfigMerged)?;

        match compiled_runtime_path(&ctx.config) {
            Some(artifact) if artifact.is_file() => {
                load_compiled_runtime(&artifact, &mut ctx.registry)?;
                self.state = BootstrapState::RuntimeLoaded;
            }
            _ => {
                initialize_runtime(&ctx.config, &mut ctx.registry, &ctx.log_sink)?;
                self.state = BootstrapState::RuntimeInitialized;
            }
        }

        install_auth_provider(&ctx.config, &ctx.bindings, &mut ctx.auth, &self.mode)?;
        self.state = BootstrapState::AuthChecked;

        if self.mode.is_console() {
            register_commands(&mut ctx.commands);
        }
        self.state = BootstrapState::CommandsRegistered;

        self.state = BootstrapState::Ready;
        tracing::info!(mode = ?self.mode, "propel bridge ready");
        Ok(())
    }

    /// Run both phases in order.
    pub fn bootstrap(&mut self, ctx: &mut AppContext) -> BridgeResult<()> {
        self.register(ctx)?;
        self.boot(ctx)
    }

    /// Explicit re-entry: reset to uninitialized and bootstrap again.
    pub fn rebootstrap(&mut self, ctx: &mut AppContext) -> BridgeResult<()> {
        tracing::info!("re-bootstrapping propel bridge");
        self.state = BootstrapState::Uninitialized;
        self.bootstrap(ctx)
    }

    fn expect_state(&self, expected: BootstrapState) -> BridgeResult<()> {
        if self.state != expected {
            return Err(BridgeError::InvalidState {
                expected: expected.name(),
                actual: self.state.name(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boot_before_register_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut bootstrapper =
            Bootstrapper::new(ConfigPaths::new(dir.path()), RunMode::Http);
        let mut ctx = AppContext::new();

        let err = bootstrapper.boot(&mut ctx).unwrap_err();
        assert!(matches!(
            err,
            BridgeError::InvalidState { expected: "config-merged", actual: "uninitialized" }
        ));
    }

    #[test]
    fn ready_is_reached_once_and_double_bootstrap_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut bootstrapper =
            Bootstrapper::new(ConfigPaths::new(dir.path()), RunMode::Http);
        let mut ctx = AppContext::new();

        bootstrapper.bootstrap(&mut ctx).unwrap();
        assert_eq!(bootstrapper.state(), BootstrapState::Ready);

        let err = bootstrapper.bootstrap(&mut ctx).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidState { .. }));

        // Explicit re-entry is allowed.
        bootstrapper.rebootstrap(&mut ctx).unwrap();
        assert_eq!(bootstrapper.state(), BootstrapState::Ready);
    }
}
