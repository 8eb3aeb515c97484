//! ORM runtime wiring: service registry and the runtime initializer

pub mod init;
pub mod registry;

pub use init::{
    compiled_runtime_path, initialize_runtime, load_compiled_runtime, COMPILED_RUNTIME_FILE,
    MINIMUM_RUNTIME_VERSION,
};
pub use registry::{
    AdapterKind, ConnectionEntry, LogSink, LoggerDescriptor, RegistryHandle, ServiceRegistry,
    SingleConnectionManager, DEFAULT_LOGGER, RUNTIME_VERSION,
};
