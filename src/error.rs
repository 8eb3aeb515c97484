//! Bootstrap-time error types

use thiserror::Error;

/// Errors raised while wiring the Propel runtime into the host application.
///
/// Everything here is a startup failure: there are no retries and no partial
/// recovery. Benign absences (missing user config file, missing `log` section)
/// are handled inline and never reach this type.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The merged configuration has no usable `runtime.connections` sequence.
    #[error("unable to determine Propel runtime configuration: initialize the \"propel.runtime\" parameter with a non-empty \"connections\" list")]
    MissingRuntimeConfig,

    /// A connection named in `runtime.connections` has no entry under
    /// `database.connections`.
    #[error("connection \"{name}\" is listed in \"propel.runtime.connections\" but has no \"propel.database.connections.{name}\" section")]
    MissingConnectionConfig { name: String },

    /// A connection names an adapter the runtime does not ship.
    #[error("connection \"{connection}\" names unknown adapter \"{adapter}\"; expected one of: mysql, pgsql, sqlite, mssql, oracle")]
    UnknownAdapter { connection: String, adapter: String },

    /// The service registry version is older than this bridge requires.
    #[error("Propel runtime version {found} is incompatible; at least {required} is required")]
    IncompatibleVersion { found: String, required: String },

    /// The configured auth binding does not satisfy the required contract.
    #[error("auth binding misconfigured: {message}")]
    AuthBinding { message: String },

    /// Password hashing service failure while verifying credentials.
    #[error("cryptographic error: {message}")]
    Cryptographic { message: String },

    /// A bootstrap phase was invoked out of order.
    #[error("bootstrapper is in state \"{actual}\", expected \"{expected}\"")]
    InvalidState {
        expected: &'static str,
        actual: &'static str,
    },

    /// IO failure reading a config file or compiled runtime artifact.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed YAML in the user configuration file.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed JSON in the compiled runtime artifact.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BridgeError {
    /// Create an auth binding error.
    pub fn auth_binding(message: impl Into<String>) -> Self {
        Self::AuthBinding {
            message: message.into(),
        }
    }

    /// Create a cryptographic error.
    pub fn crypto_error(message: impl Into<String>) -> Self {
        Self::Cryptographic {
            message: message.into(),
        }
    }

    /// Whether this error is one of the fatal configuration errors that
    /// abort startup before any registry mutation.
    pub fn is_fatal_config(&self) -> bool {
        matches!(
            self,
            BridgeError::MissingRuntimeConfig
                | BridgeError::MissingConnectionConfig { .. }
                | BridgeError::UnknownAdapter { .. }
                | BridgeError::IncompatibleVersion { .. }
        )
    }
}

/// Bridge result type alias
pub type BridgeResult<T> = Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_runtime_config_names_the_parameter() {
        let err = BridgeError::MissingRuntimeConfig;
        assert!(err.to_string().contains("propel.runtime"));
        assert!(err.is_fatal_config());
    }

    #[test]
    fn auth_binding_errors_are_not_fatal_config() {
        let err = BridgeError::auth_binding("must implement UserQuery");
        assert!(!err.is_fatal_config());
        assert!(err.to_string().contains("must implement UserQuery"));
    }
}
