//! Channel to department bindings.
//!
//! At most one binding per channel. Reads fall back to the default department
//! when a channel is unbound or its bound name has left the registry. Writes
//! hold the binding lock across the save so concurrent administrative calls
//! cannot interleave a stale snapshot.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::Department;
use crate::services::DepartmentRegistry;
use crate::storage::{BindingRecord, StateStore};

/// Result of a bind attempt, surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindOutcome {
    Bound,
    UnknownDepartment,
}

pub struct ChannelBindings {
    store: Arc<dyn StateStore>,
    bindings: Mutex<BindingRecord>,
}

impl ChannelBindings {
    /// Load the persisted binding record.
    pub async fn load(store: Arc<dyn StateStore>) -> Result<Self> {
        let bindings = store.load_bindings().await?;
        Ok(Self {
            store,
            bindings: Mutex::new(bindings),
        })
    }

    /// The department a channel's queries and polls resolve to.
    pub async fn department_for(
        &self,
        registry: &DepartmentRegistry,
        channel_id: &str,
    ) -> Department {
        let bindings = self.bindings.lock().await;
        bindings
            .get(channel_id)
            .and_then(|name| registry.resolve(name))
            .unwrap_or_else(|| registry.default_department().clone())
    }

    /// Bind a channel to a department and persist the record.
    ///
    /// Only names present in the registry are accepted.
    pub async fn bind(
        &self,
        registry: &DepartmentRegistry,
        channel_id: &str,
        department: &str,
    ) -> Result<BindOutcome> {
        if !registry.contains(department) {
            return Ok(BindOutcome::UnknownDepartment);
        }

        let mut bindings = self.bindings.lock().await;
        bindings.insert(channel_id.to_string(), department.to_string());
        self.store.save_bindings(&bindings).await?;
        Ok(BindOutcome::Bound)
    }

    /// Snapshot of all (channel, department name) pairs for a poll tick.
    pub async fn snapshot(&self) -> BindingRecord {
        self.bindings.lock().await.clone()
    }
}
