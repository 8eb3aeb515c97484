//! Configuration store and the propel namespace merger

pub mod merge;
pub mod store;

pub use merge::{merge_propel_config, publish_default_config, ConfigPaths, DEFAULT_CONFIG};
pub use store::ConfigStore;
