//! Propel-backed authentication: query contract, bindings, and the installer

pub mod bindings;
pub mod installer;
pub mod provider;
pub mod query;
pub mod registry;

pub use bindings::{AuthBindings, ModelConstructor, QueryConstructor};
pub use installer::{install_auth_provider, AUTH_DRIVER};
pub use provider::{PasswordHasher, PropelUserProvider};
pub use query::{AuthModel, Criteria, CriteriaQuery, UserQuery};
pub use registry::{AuthRegistry, ProviderFactory};
