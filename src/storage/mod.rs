//! Persisted state backends.
//!
//! Three independent keyed records live under one storage directory:
//!
//! ```text
//! {root}/
//! ├── config.toml           # Watcher configuration
//! ├── departments.json      # Registry: department name -> listing URL
//! ├── notices.json          # Notice record, partitioned per department
//! └── channel_dept.json     # Channel id -> department name
//! ```
//!
//! All access goes through the [`StateStore`] trait so tests can substitute
//! an in-memory backend.

mod local;
mod memory;

pub use local::LocalStore;
pub use memory::MemoryStore;

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::Notice;

/// Registry record: department name -> listing URL.
pub type DepartmentRecord = BTreeMap<String, String>;

/// Notice record: department name -> ordered notices.
pub type NoticeRecord = BTreeMap<String, Vec<Notice>>;

/// Binding record: channel id -> department name.
pub type BindingRecord = BTreeMap<String, String>;

/// File name of the department registry.
pub const DEPARTMENTS_FILE: &str = "departments.json";

/// File name of the notice record.
pub const NOTICES_FILE: &str = "notices.json";

/// File name of the channel binding record.
pub const BINDINGS_FILE: &str = "channel_dept.json";

/// Load/save lifecycle for the persisted records.
///
/// The registry is read-only from the watcher's perspective; it is produced
/// by the external discovery process.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load_departments(&self) -> Result<DepartmentRecord>;

    async fn load_notices(&self) -> Result<NoticeRecord>;
    async fn save_notices(&self, record: &NoticeRecord) -> Result<()>;

    async fn load_bindings(&self) -> Result<BindingRecord>;
    async fn save_bindings(&self, record: &BindingRecord) -> Result<()>;
}
