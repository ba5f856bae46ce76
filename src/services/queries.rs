//! Query entry points.
//!
//! Thin composition of the registry, stores, fetcher, and view sessions.
//! Each operation maps 1:1 onto a chat command; the command surface only
//! translates its arguments into these calls.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::ViewConfig;
use crate::error::Result;
use crate::models::Notice;
use crate::services::{
    BindOutcome, ChannelBindings, DepartmentRegistry, FetchNotices, NoticeStore, ViewSession,
};

/// User-facing texts for empty results.
pub const NO_NOTICES: &str = "no notices found";
pub const NO_KEYWORD_MATCHES: &str = "no notices matched that keyword";
pub const NO_DATE_MATCHES: &str = "no notices on that date";

/// Outcome of a query, surfaced to the caller.
///
/// Empty results and bad input are ordinary outcomes; only network and
/// persistence failures travel the error path.
pub enum QueryOutcome {
    /// A browsable result set.
    View {
        heading: String,
        session: ViewSession,
    },
    /// Valid query, zero matches.
    Nothing(&'static str),
    /// The caller's input could not be used.
    BadInput(String),
}

pub struct QueryService {
    registry: Arc<DepartmentRegistry>,
    bindings: Arc<ChannelBindings>,
    notices: Arc<NoticeStore>,
    fetcher: Arc<dyn FetchNotices>,
    view: ViewConfig,
}

impl QueryService {
    pub fn new(
        registry: Arc<DepartmentRegistry>,
        bindings: Arc<ChannelBindings>,
        notices: Arc<NoticeStore>,
        fetcher: Arc<dyn FetchNotices>,
        view: ViewConfig,
    ) -> Self {
        Self {
            registry,
            bindings,
            notices,
            fetcher,
            view,
        }
    }

    /// Current notices for the channel's department, freshly fetched.
    pub async fn list(&self, channel_id: &str) -> Result<QueryOutcome> {
        let department = self
            .bindings
            .department_for(&self.registry, channel_id)
            .await;
        let notices = self.fetcher.fetch(&department.url).await?;
        if notices.is_empty() {
            return Ok(QueryOutcome::Nothing(NO_NOTICES));
        }
        Ok(QueryOutcome::View {
            heading: format!("[{}] notices", department.name),
            session: ViewSession::open(notices, &self.view),
        })
    }

    /// Case-insensitive keyword search over the stored notices.
    pub async fn search(&self, keyword: &str) -> Result<QueryOutcome> {
        let matches: Vec<Notice> = self
            .notices
            .all()
            .await
            .into_iter()
            .filter(|n| n.matches_keyword(keyword))
            .collect();
        if matches.is_empty() {
            return Ok(QueryOutcome::Nothing(NO_KEYWORD_MATCHES));
        }
        Ok(QueryOutcome::View {
            heading: format!("results for '{keyword}'"),
            session: ViewSession::open(matches, &self.view),
        })
    }

    /// Stored notices published on an exact date, input as `YYYY-MM-DD`.
    pub async fn on_date(&self, input: &str) -> Result<QueryOutcome> {
        let Ok(target) = NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d") else {
            return Ok(QueryOutcome::BadInput(format!(
                "invalid date '{input}', expected YYYY-MM-DD"
            )));
        };
        let matches: Vec<Notice> = self
            .notices
            .all()
            .await
            .into_iter()
            .filter(|n| n.published_on() == Some(target))
            .collect();
        if matches.is_empty() {
            return Ok(QueryOutcome::Nothing(NO_DATE_MATCHES));
        }
        Ok(QueryOutcome::View {
            heading: format!("notices on {target}"),
            session: ViewSession::open(matches, &self.view),
        })
    }

    /// Bind the channel to a department.
    pub async fn bind(&self, channel_id: &str, department: &str) -> Result<BindOutcome> {
        self.bindings
            .bind(&self.registry, channel_id, department)
            .await
    }

    /// All registered department names, sorted.
    pub fn departments(&self) -> Vec<String> {
        self.registry
            .names()
            .into_iter()
            .map(String::from)
            .collect()
    }
}
