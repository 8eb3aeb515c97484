//! Propel-backed user provider

use std::sync::Arc;

use crate::auth::query::{Criteria, UserQuery};
use crate::error::BridgeResult;

/// Password hasher seam supplied by the host application.
///
/// The bridge never hashes anything itself; it only threads the host's
/// hashing service into the user provider.
pub trait PasswordHasher: Send + Sync {
    /// Hash a password.
    fn hash_password(&self, password: &str) -> BridgeResult<String>;

    /// Verify a password against its hash.
    fn verify_password(&self, password: &str, hash: &str) -> BridgeResult<bool>;

    /// Get the hasher name.
    fn hasher_name(&self) -> &str;
}

/// Authentication provider bound to a resolved user query and the host's
/// password hashing service. Built lazily by the factory the bridge registers
/// under the `propel` driver.
pub struct PropelUserProvider {
    query: Box<dyn UserQuery>,
    hasher: Arc<dyn PasswordHasher>,
}

impl PropelUserProvider {
    pub fn new(query: Box<dyn UserQuery>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { query, hasher }
    }

    /// Criteria selecting the user matching a credential column.
    ///
    /// The stored query is never mutated; each lookup works on a clone.
    pub fn retrieve_by_credential(&self, column: &str, value: &str) -> Criteria {
        let mut query = self.query.clone();
        query.filter(column, value);
        query.build()
    }

    /// Verify a plaintext password against a stored hash using the host's
    /// hashing service.
    pub fn validate_credentials(&self, password: &str, hash: &str) -> BridgeResult<bool> {
        self.hasher.verify_password(password, hash)
    }

    pub fn hasher_name(&self) -> &str {
        self.hasher.hasher_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::query::CriteriaQuery;
    use crate::error::BridgeError;

    struct ReversingHasher;

    impl PasswordHasher for ReversingHasher {
        fn hash_password(&self, password: &str) -> BridgeResult<String> {
            Ok(password.chars().rev().collect())
        }

        fn verify_password(&self, password: &str, hash: &str) -> BridgeResult<bool> {
            Ok(self.hash_password(password)? == hash)
        }

        fn hasher_name(&self) -> &str {
            "reversing"
        }
    }

    #[test]
    fn credential_lookup_does_not_accumulate_state() {
        let provider = PropelUserProvider::new(
            Box::new(CriteriaQuery::for_table("users")),
            Arc::new(ReversingHasher),
        );

        let first = provider.retrieve_by_credential("email", "a@example.com");
        let second = provider.retrieve_by_credential("email", "b@example.com");

        assert_eq!(first.conditions.len(), 1);
        assert_eq!(second.conditions.len(), 1);
        assert_eq!(second.conditions[0].1, "b@example.com");
    }

    #[test]
    fn hasher_failures_surface_as_cryptographic_errors() {
        struct BrokenHasher;

        impl PasswordHasher for BrokenHasher {
            fn hash_password(&self, _password: &str) -> BridgeResult<String> {
                Err(BridgeError::crypto_error("hash backend unavailable"))
            }

            fn verify_password(&self, _password: &str, _hash: &str) -> BridgeResult<bool> {
                Err(BridgeError::crypto_error("hash backend unavailable"))
            }

            fn hasher_name(&self) -> &str {
                "broken"
            }
        }

        let provider = PropelUserProvider::new(
            Box::new(CriteriaQuery::for_table("users")),
            Arc::new(BrokenHasher),
        );

        let err = provider.validate_credentials("secret", "hash").unwrap_err();
        assert!(matches!(err, BridgeError::Cryptographic { .. }));
        assert!(err.to_string().contains("hash backend unavailable"));
    }

    #[test]
    fn validate_credentials_delegates_to_the_hasher() {
        let provider = PropelUserProvider::new(
            Box::new(CriteriaQuery::for_table("users")),
            Arc::new(ReversingHasher),
        );

        assert!(provider.validate_credentials("secret", "terces").unwrap());
        assert!(!provider.validate_credentials("secret", "wrong").unwrap());
    }
}
