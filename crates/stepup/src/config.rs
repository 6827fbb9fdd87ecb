//! Migrator configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the migration sequencer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigratorConfig {
    /// Storage key the last-migrated marker is persisted under
    pub marker_key: String,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self {
            marker_key: "stepup.last_migrated_version".to_string(),
        }
    }
}
