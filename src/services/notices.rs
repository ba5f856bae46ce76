//! Persisted notice record.
//!
//! Partitioned per department: each department's poll diffs against its own
//! snapshot, so one department's write can never mask another's dedup state.
//! The partition lock is held across the save; the poller and administrative
//! surface write one at a time.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::Result;
use crate::models::Notice;
use crate::storage::{NoticeRecord, StateStore};

pub struct NoticeStore {
    store: Arc<dyn StateStore>,
    partitions: Mutex<NoticeRecord>,
}

impl NoticeStore {
    /// Load the persisted notice record.
    pub async fn load(store: Arc<dyn StateStore>) -> Result<Self> {
        let partitions = store.load_notices().await?;
        Ok(Self {
            store,
            partitions: Mutex::new(partitions),
        })
    }

    /// Snapshot of one department's partition.
    pub async fn partition(&self, department: &str) -> Vec<Notice> {
        self.partitions
            .lock()
            .await
            .get(department)
            .cloned()
            .unwrap_or_default()
    }

    /// Replace a department's partition with a fresh fetch and persist.
    pub async fn replace(&self, department: &str, notices: Vec<Notice>) -> Result<()> {
        let mut partitions = self.partitions.lock().await;
        partitions.insert(department.to_string(), notices);
        self.store.save_notices(&partitions).await
    }

    /// All stored notices across partitions, in department order.
    pub async fn all(&self) -> Vec<Notice> {
        self.partitions
            .lock()
            .await
            .values()
            .flatten()
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.partitions.lock().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn notice(url: &str) -> Notice {
        Notice {
            title: format!("notice {url}"),
            url: url.to_string(),
            date: "2025.06.08".to_string(),
            content: String::new(),
        }
    }

    #[tokio::test]
    async fn test_partitions_are_independent() {
        let store = Arc::new(MemoryStore::new());
        let notices = NoticeStore::load(store).await.unwrap();

        notices
            .replace("화학과", vec![notice("https://chem.example/1")])
            .await
            .unwrap();
        notices
            .replace("물리학과", vec![notice("https://phys.example/1")])
            .await
            .unwrap();

        let chem = notices.partition("화학과").await;
        assert_eq!(chem.len(), 1);
        assert_eq!(chem[0].url, "https://chem.example/1");

        // Writing one partition leaves the other untouched.
        notices
            .replace("물리학과", vec![notice("https://phys.example/2")])
            .await
            .unwrap();
        assert_eq!(notices.partition("화학과").await.len(), 1);
        assert_eq!(notices.all().await.len(), 2);
    }

    #[tokio::test]
    async fn test_replace_persists() {
        let store = Arc::new(MemoryStore::new());
        let notices = NoticeStore::load(Arc::clone(&store) as Arc<dyn StateStore>)
            .await
            .unwrap();

        notices
            .replace("화학과", vec![notice("https://chem.example/1")])
            .await
            .unwrap();

        let saved = store.load_notices().await.unwrap();
        assert_eq!(saved.get("화학과").map(Vec::len), Some(1));
    }
}
