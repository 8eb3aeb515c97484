//! Console command registration
//!
//! The bridge contributes a fixed set of Propel tooling commands to the
//! host's command dispatcher. Registration is pure bookkeeping: the command
//! implementations live with the ORM tooling, not here.

/// Console commands the bridge registers, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropelCommand {
    ConfigConvert,
    DatabaseReverse,
    GraphvizGenerate,
    MigrationDiff,
    MigrationDown,
    MigrationMigrate,
    MigrationStatus,
    MigrationUp,
    ModelBuild,
    SqlBuild,
    SqlInsert,
    SchemaCreate,
}

impl PropelCommand {
    /// Every command the bridge registers, in order.
    pub const ALL: [PropelCommand; 12] = [
        PropelCommand::ConfigConvert,
        PropelCommand::DatabaseReverse,
        PropelCommand::GraphvizGenerate,
        PropelCommand::MigrationDiff,
        PropelCommand::MigrationDown,
        PropelCommand::MigrationMigrate,
        PropelCommand::MigrationStatus,
        PropelCommand::MigrationUp,
        PropelCommand::ModelBuild,
        PropelCommand::SqlBuild,
        PropelCommand::SqlInsert,
        PropelCommand::SchemaCreate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PropelCommand::ConfigConvert => "propel:config:convert",
            PropelCommand::DatabaseReverse => "propel:database:reverse",
            PropelCommand::GraphvizGenerate => "propel:graphviz:generate",
            PropelCommand::MigrationDiff => "propel:migration:diff",
            PropelCommand::MigrationDown => "propel:migration:down",
            PropelCommand::MigrationMigrate => "propel:migration:migrate",
            PropelCommand::MigrationStatus => "propel:migration:status",
            PropelCommand::MigrationUp => "propel:migration:up",
            PropelCommand::ModelBuild => "propel:model:build",
            PropelCommand::SqlBuild => "propel:sql:build",
            PropelCommand::SqlInsert => "propel:sql:insert",
            PropelCommand::SchemaCreate => "propel:schema:create",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PropelCommand::ConfigConvert => "Convert the propel configuration for the runtime",
            PropelCommand::DatabaseReverse => "Reverse-engineer a schema from a live database",
            PropelCommand::GraphvizGenerate => "Generate a Graphviz graph of the schema",
            PropelCommand::MigrationDiff => "Diff the schema against the migration state",
            PropelCommand::MigrationDown => "Revert the last executed migration",
            PropelCommand::MigrationMigrate => "Execute all pending migrations",
            PropelCommand::MigrationStatus => "Show the migration execution status",
            PropelCommand::MigrationUp => "Execute the next pending migration",
            PropelCommand::ModelBuild => "Build model classes from the schema",
            PropelCommand::SqlBuild => "Build SQL files from the schema",
            PropelCommand::SqlInsert => "Insert the built SQL into the database",
            PropelCommand::SchemaCreate => "Create a new schema file skeleton",
        }
    }
}

/// Registered command entry as the host dispatcher sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandDescriptor {
    pub name: String,
    pub description: String,
}

/// Host command dispatcher surface, registration order preserved.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    commands: Vec<CommandDescriptor>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a command, replacing any prior entry with the same name.
    pub fn register(&mut self, name: impl Into<String>, description: impl Into<String>) {
        let descriptor = CommandDescriptor {
            name: name.into(),
            description: description.into(),
        };
        if let Some(slot) = self
            .commands
            .iter_mut()
            .find(|c| c.name == descriptor.name)
        {
            *slot = descriptor;
        } else {
            self.commands.push(descriptor);
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.iter().any(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn commands(&self) -> &[CommandDescriptor] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Register the full Propel command set with the host dispatcher.
pub fn register_commands(registry: &mut CommandRegistry) {
    for command in PropelCommand::ALL {
        registry.register(command.name(), command.description());
    }
    tracing::debug!(count = PropelCommand::ALL.len(), "propel commands registered");
}
