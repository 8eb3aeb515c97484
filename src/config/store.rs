//! Dotted-key configuration store
//!
//! Models the host framework's configuration repository: a process-wide,
//! lazily populated mapping from dotted keys to values. The bridge owns one
//! instance for the lifetime of the bootstrap and the host reads from it
//! afterwards.

use serde_json::{Map, Value};

/// Mutable configuration store addressed by dotted keys.
///
/// Values are `serde_json::Value` trees; `get("a.b.c")` walks nested objects.
/// Setting a key creates intermediate objects as needed and replaces any
/// non-object value in the path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    root: Map<String, Value>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a value by dotted key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        let mut parts = key.split('.');
        let first = parts.next()?;
        let mut current = self.root.get(first)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    /// Look up a string value by dotted key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Whether a key exists, at any depth.
    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Set a value by dotted key, creating intermediate objects as needed.
    pub fn set(&mut self, key: &str, value: Value) {
        let mut parts = key.split('.').peekable();
        let mut current = &mut self.root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                current.insert(part.to_string(), value);
                return;
            }
            let entry = current
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = entry
                .as_object_mut()
                .unwrap_or_else(|| unreachable!("entry was just made an object"));
        }
    }

    /// Merge default values under a namespace with fill-missing-keys-only
    /// semantics: a top-level key of the defaults document is installed only
    /// when the namespace does not already carry it. Keys already present are
    /// never overwritten, matching the host's config merge behavior.
    pub fn merge_missing(&mut self, namespace: &str, defaults: &Value) {
        let target = self
            .root
            .entry(namespace.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !target.is_object() {
            *target = Value::Object(Map::new());
        }
        let target = target
            .as_object_mut()
            .unwrap_or_else(|| unreachable!("target was just made an object"));

        if let Some(defaults) = defaults.as_object() {
            for (key, value) in defaults {
                if !target.contains_key(key) {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn set_and_get_nested_keys() {
        let mut store = ConfigStore::new();
        store.set("propel.propel.runtime.defaultConnection", json!("default"));

        assert_eq!(
            store.get_str("propel.propel.runtime.defaultConnection"),
            Some("default")
        );
        assert!(store.has("propel.propel.runtime"));
        assert!(!store.has("propel.propel.generator"));
    }

    #[test]
    fn set_replaces_scalar_in_path() {
        let mut store = ConfigStore::new();
        store.set("a.b", json!(1));
        store.set("a.b.c", json!(2));
        assert_eq!(store.get("a.b.c"), Some(&json!(2)));
    }

    #[test]
    fn merge_missing_never_overwrites() {
        let mut store = ConfigStore::new();
        store.set("propel.runtime", json!({ "connections": ["primary"] }));

        store.merge_missing(
            "propel",
            &json!({
                "runtime": { "connections": ["default"] },
                "general": { "project": "app" },
            }),
        );

        // Existing key wins wholesale; missing key is filled in.
        assert_eq!(
            store.get("propel.runtime.connections"),
            Some(&json!(["primary"]))
        );
        assert_eq!(store.get_str("propel.general.project"), Some("app"));
    }

    #[test]
    fn merge_missing_is_idempotent() {
        let defaults = json!({ "general": { "project": "app" } });
        let mut store = ConfigStore::new();
        store.merge_missing("propel", &defaults);
        let first = store.clone();
        store.merge_missing("propel", &defaults);
        assert_eq!(store, first);
    }
}
