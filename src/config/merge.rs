//! Config merger
//!
//! Ensures the `propel` configuration namespace exists before the runtime is
//! initialized. A user-installed `propel.yaml` takes the namespace wholesale;
//! bundled defaults then fill in whatever the application left unset. A
//! missing user file is a normal branch, never an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::config::ConfigStore;
use crate::error::BridgeResult;

/// Bundled default configuration, merged fill-missing under the `propel`
/// namespace on every bootstrap.
pub const DEFAULT_CONFIG: &str = include_str!("propel_defaults.yaml");

/// File name of the user-level override inside the host config directory.
pub const USER_CONFIG_FILE: &str = "propel.yaml";

/// Locations the merger reads from, supplied by the host application.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    config_dir: PathBuf,
}

impl ConfigPaths {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Path of the user-level configuration file, whether or not it exists.
    pub fn user_config_file(&self) -> PathBuf {
        self.config_dir.join(USER_CONFIG_FILE)
    }
}

/// Populate the `propel` namespace in the host config store.
///
/// If `propel.general` is not set yet and a user config file exists, the file
/// is installed as the namespace wholesale, short-circuiting the default
/// merge for every key it carries. Bundled defaults are then merged with
/// fill-missing semantics. Once `propel.general` exists the whole operation
/// is idempotent.
pub fn merge_propel_config(store: &mut ConfigStore, paths: &ConfigPaths) -> BridgeResult<()> {
    if !store.has("propel.propel.general") {
        let file = paths.user_config_file();
        if file.is_file() {
            let raw = fs::read_to_string(&file)?;
            let user_config: Value = serde_yaml::from_str(&raw)?;
            store.set("propel", user_config);
            tracing::info!(path = %file.display(), "loaded user propel configuration");
        } else {
            tracing::debug!(path = %file.display(), "no user propel configuration, using bundled defaults");
        }
    }

    let defaults: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;
    store.merge_missing("propel", &defaults);
    Ok(())
}

/// Install the bundled default configuration at the user path.
///
/// Counterpart of the host's config publishing step: writes `propel.yaml`
/// into the config directory unless one is already there, and returns the
/// target path.
pub fn publish_default_config(config_dir: &Path) -> BridgeResult<PathBuf> {
    let target = config_dir.join(USER_CONFIG_FILE);
    if !target.exists() {
        fs::create_dir_all(config_dir)?;
        fs::write(&target, DEFAULT_CONFIG)?;
        tracing::info!(path = %target.display(), "published default propel configuration");
    }
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_fill_the_namespace_when_no_user_file_exists() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::new();

        merge_propel_config(&mut store, &ConfigPaths::new(dir.path())).unwrap();

        assert!(store.has("propel.propel.general"));
        assert_eq!(
            store.get_str("propel.propel.runtime.defaultConnection"),
            Some("default")
        );
    }

    #[test]
    fn user_file_takes_the_namespace_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(USER_CONFIG_FILE),
            "propel:\n  general:\n    project: custom\n",
        )
        .unwrap();

        let mut store = ConfigStore::new();
        merge_propel_config(&mut store, &ConfigPaths::new(dir.path())).unwrap();

        // The user file replaced the `propel` key; defaults never touch it.
        assert_eq!(store.get_str("propel.propel.general.project"), Some("custom"));
        assert!(!store.has("propel.propel.runtime"));
    }

    #[test]
    fn merge_is_idempotent_once_general_exists() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ConfigStore::new();
        store.set("propel.propel.general", json!({ "project": "mine" }));

        merge_propel_config(&mut store, &ConfigPaths::new(dir.path())).unwrap();
        let first = store.clone();
        merge_propel_config(&mut store, &ConfigPaths::new(dir.path())).unwrap();

        assert_eq!(store, first);
        assert_eq!(store.get_str("propel.propel.general.project"), Some("mine"));
    }

    #[test]
    fn publish_writes_defaults_but_keeps_an_existing_file() {
        let dir = tempfile::tempdir().unwrap();

        let target = publish_default_config(dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), DEFAULT_CONFIG);

        fs::write(&target, "propel: {}\n").unwrap();
        publish_default_config(dir.path()).unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "propel: {}\n");
    }
}
