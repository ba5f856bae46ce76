// src/services/mod.rs

//! Core services for the notice watcher.

mod bindings;
mod fetcher;
mod notices;
mod queries;
mod registry;
mod view;

// Re-export all public types
pub use bindings::{BindOutcome, ChannelBindings};
pub use fetcher::{FetchNotices, NoticeFetcher};
pub use notices::NoticeStore;
pub use queries::{QueryOutcome, QueryService};
pub use registry::DepartmentRegistry;
pub use view::{DetailView, PageView, ViewError, ViewSession};
