// src/sync/poller.rs

//! The periodic polling cycle.
//!
//! On each tick, every bound channel's department is re-fetched and diffed
//! against that department's persisted partition; new notices are persisted
//! first and then delivered in fetch order. Within one binding delivery
//! order matches fetch order; across bindings there is no ordering
//! guarantee.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{self, MissedTickBehavior};

use crate::delivery::NoticeSink;
use crate::error::Result;
use crate::models::Notice;
use crate::services::{ChannelBindings, DepartmentRegistry, FetchNotices, NoticeStore};
use crate::sync::diff;

/// Summary of one poll tick.
#[derive(Debug, Default)]
pub struct TickSummary {
    pub bindings: usize,
    pub new_notices: usize,
    pub delivered: usize,
    pub skipped: usize,
}

pub struct Poller {
    registry: Arc<DepartmentRegistry>,
    bindings: Arc<ChannelBindings>,
    notices: Arc<NoticeStore>,
    fetcher: Arc<dyn FetchNotices>,
    sink: Arc<dyn NoticeSink>,
    interval: Duration,
}

impl Poller {
    pub fn new(
        registry: Arc<DepartmentRegistry>,
        bindings: Arc<ChannelBindings>,
        notices: Arc<NoticeStore>,
        fetcher: Arc<dyn FetchNotices>,
        sink: Arc<dyn NoticeSink>,
        interval: Duration,
    ) -> Self {
        Self {
            registry,
            bindings,
            notices,
            fetcher,
            sink,
            interval,
        }
    }

    /// Run the poll loop forever.
    ///
    /// Ticks run one at a time; when a tick overruns the interval, the
    /// missed tick is skipped rather than queued behind it.
    pub async fn run(&self) {
        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;
            match self.poll_once().await {
                Ok(summary) => log::info!(
                    "poll tick: {} bindings, {} new, {} delivered, {} skipped",
                    summary.bindings,
                    summary.new_notices,
                    summary.delivered,
                    summary.skipped
                ),
                Err(e) => log::error!("poll tick failed: {e}"),
            }
        }
    }

    /// One synchronization cycle across all channel bindings.
    ///
    /// A binding whose department cannot be resolved or fetched is skipped
    /// for this tick; persistence failures surface as the tick's error.
    pub async fn poll_once(&self) -> Result<TickSummary> {
        let bindings = self.bindings.snapshot().await;
        let mut summary = TickSummary {
            bindings: bindings.len(),
            ..TickSummary::default()
        };

        for (channel_id, dept_name) in &bindings {
            let Some(department) = self.registry.resolve(dept_name) else {
                log::warn!("channel {channel_id}: department '{dept_name}' not registered, skipping");
                summary.skipped += 1;
                continue;
            };

            let current = match self.fetcher.fetch(&department.url).await {
                Ok(notices) => notices,
                Err(e) => {
                    log::warn!(
                        "channel {channel_id}: fetch failed for {}: {e}",
                        department.url
                    );
                    summary.skipped += 1;
                    continue;
                }
            };

            let (fresh, delivered) = self
                .sync_department(channel_id, &department.name, current)
                .await?;
            summary.new_notices += fresh;
            summary.delivered += delivered;
        }

        Ok(summary)
    }

    /// Diff a fresh fetch against the department's partition, persist, and
    /// deliver what is new.
    async fn sync_department(
        &self,
        channel_id: &str,
        department: &str,
        current: Vec<Notice>,
    ) -> Result<(usize, usize)> {
        let fresh: Vec<Notice> = {
            let previous = self.notices.partition(department).await;
            diff::new_notices(&previous, &current)
                .into_iter()
                .cloned()
                .collect()
        };
        if fresh.is_empty() {
            log::debug!("channel {channel_id}: no new notices for {department}");
            return Ok((0, 0));
        }

        // Persist before delivering; a failed send never rolls back the record.
        self.notices.replace(department, current).await?;

        let mut delivered = 0;
        for notice in &fresh {
            match self.sink.deliver(channel_id, notice).await {
                Ok(()) => delivered += 1,
                Err(e) => log::warn!("channel {channel_id}: delivery failed: {e}"),
            }
        }
        log::info!(
            "channel {channel_id}: {} new notices for {department}, {delivered} delivered",
            fresh.len()
        );
        Ok((fresh.len(), delivered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{BTreeMap, VecDeque};
    use std::sync::Mutex;

    use crate::error::AppError;
    use crate::models::Department;
    use crate::storage::{BindingRecord, MemoryStore, StateStore};

    struct FixedFetcher {
        notices: Vec<Notice>,
    }

    #[async_trait]
    impl FetchNotices for FixedFetcher {
        async fn fetch(&self, _listing_url: &str) -> Result<Vec<Notice>> {
            Ok(self.notices.clone())
        }
    }

    struct ScriptedFetcher {
        responses: Mutex<VecDeque<Vec<Notice>>>,
    }

    #[async_trait]
    impl FetchNotices for ScriptedFetcher {
        async fn fetch(&self, _listing_url: &str) -> Result<Vec<Notice>> {
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("fetch called more times than scripted"))
        }
    }

    struct FailingFetcher;

    #[async_trait]
    impl FetchNotices for FailingFetcher {
        async fn fetch(&self, listing_url: &str) -> Result<Vec<Notice>> {
            Err(AppError::validation(format!("unreachable: {listing_url}")))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingSink {
        fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NoticeSink for RecordingSink {
        async fn deliver(&self, channel_id: &str, notice: &Notice) -> Result<()> {
            self.sent
                .lock()
                .unwrap()
                .push((channel_id.to_string(), notice.url.clone()));
            Ok(())
        }
    }

    struct FailingSink;

    #[async_trait]
    impl NoticeSink for FailingSink {
        async fn deliver(&self, channel_id: &str, _notice: &Notice) -> Result<()> {
            Err(AppError::delivery(channel_id, "send rejected"))
        }
    }

    fn notice(no: u32) -> Notice {
        Notice {
            title: format!("공지 {no}"),
            url: format!("https://chem.example/board.do?articleNo={no}"),
            date: "2025.06.08".to_string(),
            content: format!("본문 {no}"),
        }
    }

    struct Harness {
        store: Arc<MemoryStore>,
        poller: Poller,
        sink: Arc<RecordingSink>,
    }

    async fn harness_with_fetcher(fetcher: Arc<dyn FetchNotices>) -> Harness {
        let mut departments = BTreeMap::new();
        departments.insert(
            "화학과".to_string(),
            "https://chem.example/notice".to_string(),
        );
        let store = Arc::new(MemoryStore::with_departments(departments.clone()));
        let mut bound = BindingRecord::new();
        bound.insert("123".to_string(), "화학과".to_string());
        store.set_bindings(bound);

        let registry = Arc::new(DepartmentRegistry::new(
            departments,
            Department::new("화학과", "https://chem.example/notice"),
        ));
        let bindings = Arc::new(
            ChannelBindings::load(Arc::clone(&store) as Arc<dyn StateStore>)
                .await
                .unwrap(),
        );
        let notices = Arc::new(
            NoticeStore::load(Arc::clone(&store) as Arc<dyn StateStore>)
                .await
                .unwrap(),
        );
        let sink = Arc::new(RecordingSink::default());

        let poller = Poller::new(
            registry,
            bindings,
            notices,
            fetcher,
            Arc::clone(&sink) as Arc<dyn NoticeSink>,
            Duration::from_secs(300),
        );
        Harness {
            store,
            poller,
            sink,
        }
    }

    #[tokio::test]
    async fn test_first_poll_delivers_all_in_fetch_order() {
        let remote = vec![notice(1), notice(2), notice(3)];
        let h = harness_with_fetcher(Arc::new(FixedFetcher {
            notices: remote.clone(),
        }))
        .await;

        let summary = h.poller.poll_once().await.unwrap();
        assert_eq!(summary.bindings, 1);
        assert_eq!(summary.new_notices, 3);
        assert_eq!(summary.delivered, 3);

        let sent = h.sink.sent();
        assert_eq!(
            sent,
            remote
                .iter()
                .map(|n| ("123".to_string(), n.url.clone()))
                .collect::<Vec<_>>()
        );

        let saved = h.store.load_notices().await.unwrap();
        assert_eq!(saved.get("화학과").map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn test_second_identical_poll_is_idempotent() {
        let h = harness_with_fetcher(Arc::new(FixedFetcher {
            notices: vec![notice(1), notice(2), notice(3)],
        }))
        .await;

        h.poller.poll_once().await.unwrap();
        let saves_after_first = h.store.notice_save_count();

        let summary = h.poller.poll_once().await.unwrap();
        assert_eq!(summary.new_notices, 0);
        assert_eq!(summary.delivered, 0);
        assert_eq!(h.sink.sent().len(), 3);
        // No store write on an unchanged remote.
        assert_eq!(h.store.notice_save_count(), saves_after_first);
    }

    #[tokio::test]
    async fn test_retitled_notice_is_not_redelivered() {
        let mut second_fetch = vec![notice(1), notice(2)];
        second_fetch[0].title = "수정된 제목".to_string();
        second_fetch[0].date = "2025.06.09".to_string();

        let h = harness_with_fetcher(Arc::new(ScriptedFetcher {
            responses: Mutex::new(VecDeque::from([
                vec![notice(1), notice(2)],
                second_fetch,
            ])),
        }))
        .await;

        h.poller.poll_once().await.unwrap();
        let summary = h.poller.poll_once().await.unwrap();
        assert_eq!(summary.new_notices, 0);
        assert_eq!(h.sink.sent().len(), 2);
    }

    #[tokio::test]
    async fn test_only_unseen_notices_delivered_on_growth() {
        let h = harness_with_fetcher(Arc::new(ScriptedFetcher {
            responses: Mutex::new(VecDeque::from([
                vec![notice(1), notice(2)],
                vec![notice(3), notice(1), notice(2)],
            ])),
        }))
        .await;

        h.poller.poll_once().await.unwrap();
        let summary = h.poller.poll_once().await.unwrap();
        assert_eq!(summary.new_notices, 1);

        let sent = h.sink.sent();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[2].1, notice(3).url);
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_binding() {
        let h = harness_with_fetcher(Arc::new(FailingFetcher)).await;

        let summary = h.poller.poll_once().await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.delivered, 0);
        assert_eq!(h.store.notice_save_count(), 0);
    }

    #[tokio::test]
    async fn test_unregistered_department_skips_binding() {
        let h = harness_with_fetcher(Arc::new(FixedFetcher {
            notices: vec![notice(1)],
        }))
        .await;
        let mut bound = BindingRecord::new();
        bound.insert("456".to_string(), "천문학과".to_string());
        h.store.set_bindings(bound);
        // Reload bindings so the stale name is what the poller sees.
        let bindings = ChannelBindings::load(Arc::clone(&h.store) as Arc<dyn StateStore>)
            .await
            .unwrap();
        let poller = Poller {
            bindings: Arc::new(bindings),
            ..h.poller
        };

        let summary = poller.poll_once().await.unwrap();
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.new_notices, 0);
    }

    #[tokio::test]
    async fn test_delivery_failure_keeps_store_write() {
        let mut departments = BTreeMap::new();
        departments.insert(
            "화학과".to_string(),
            "https://chem.example/notice".to_string(),
        );
        let store = Arc::new(MemoryStore::with_departments(departments.clone()));
        let mut bound = BindingRecord::new();
        bound.insert("123".to_string(), "화학과".to_string());
        store.set_bindings(bound);

        let registry = Arc::new(DepartmentRegistry::new(
            departments,
            Department::new("화학과", "https://chem.example/notice"),
        ));
        let bindings = Arc::new(
            ChannelBindings::load(Arc::clone(&store) as Arc<dyn StateStore>)
                .await
                .unwrap(),
        );
        let notices = Arc::new(
            NoticeStore::load(Arc::clone(&store) as Arc<dyn StateStore>)
                .await
                .unwrap(),
        );
        let poller = Poller::new(
            registry,
            bindings,
            notices,
            Arc::new(FixedFetcher {
                notices: vec![notice(1)],
            }),
            Arc::new(FailingSink),
            Duration::from_secs(300),
        );

        let summary = poller.poll_once().await.unwrap();
        assert_eq!(summary.new_notices, 1);
        assert_eq!(summary.delivered, 0);
        // The notice is marked seen even though the send failed.
        let saved = store.load_notices().await.unwrap();
        assert_eq!(saved.get("화학과").map(Vec::len), Some(1));
    }
}
