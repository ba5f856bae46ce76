//! In-memory storage backend for tests and embedding.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::Result;
use crate::storage::{BindingRecord, DepartmentRecord, NoticeRecord, StateStore};

/// Keeps all three records in memory; nothing touches disk.
#[derive(Default)]
pub struct MemoryStore {
    departments: Mutex<DepartmentRecord>,
    notices: Mutex<NoticeRecord>,
    bindings: Mutex<BindingRecord>,
    notice_saves: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the registry record.
    pub fn with_departments(departments: DepartmentRecord) -> Self {
        Self {
            departments: Mutex::new(departments),
            ..Self::default()
        }
    }

    /// Seed the binding record.
    pub fn set_bindings(&self, bindings: BindingRecord) {
        *self.bindings.lock().unwrap() = bindings;
    }

    /// How many times the notice record has been saved.
    pub fn notice_save_count(&self) -> usize {
        self.notice_saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load_departments(&self) -> Result<DepartmentRecord> {
        Ok(self.departments.lock().unwrap().clone())
    }

    async fn load_notices(&self) -> Result<NoticeRecord> {
        Ok(self.notices.lock().unwrap().clone())
    }

    async fn save_notices(&self, record: &NoticeRecord) -> Result<()> {
        *self.notices.lock().unwrap() = record.clone();
        self.notice_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_bindings(&self) -> Result<BindingRecord> {
        Ok(self.bindings.lock().unwrap().clone())
    }

    async fn save_bindings(&self, record: &BindingRecord) -> Result<()> {
        *self.bindings.lock().unwrap() = record.clone();
        Ok(())
    }
}
