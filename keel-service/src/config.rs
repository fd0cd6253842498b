use serde::{Deserialize, Serialize};

/// Configuration for an [`EntityService`](crate::EntityService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Commit the unit of work at the end of every mutating operation.
    ///
    /// Turn off to group several service calls into one transaction that
    /// the caller commits.
    pub auto_commit: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { auto_commit: true }
    }
}
