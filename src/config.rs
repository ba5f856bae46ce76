// src/config.rs

//! Application configuration structures.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Department;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Listing/detail page selectors
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Polling cycle settings
    #[serde(default)]
    pub poll: PollConfig,

    /// Paginated view settings
    #[serde(default)]
    pub view: ViewConfig,

    /// Delivery settings
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Fallback department for unbound channels
    #[serde(default = "defaults::default_department")]
    pub default_department: Department,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.crawler.max_pages == 0 {
            return Err(AppError::validation("crawler.max_pages must be > 0"));
        }
        if self.poll.interval_secs == 0 {
            return Err(AppError::validation("poll.interval_secs must be > 0"));
        }
        if self.view.page_size == 0 {
            return Err(AppError::validation("view.page_size must be > 0"));
        }
        if self.view.timeout_secs == 0 {
            return Err(AppError::validation("view.timeout_secs must be > 0"));
        }
        if self.view.detail_chars < self.view.preview_chars {
            return Err(AppError::validation(
                "view.detail_chars must be >= view.preview_chars",
            ));
        }
        if self.default_department.url.trim().is_empty() {
            return Err(AppError::validation("default_department.url is empty"));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            selectors: SelectorConfig::default(),
            poll: PollConfig::default(),
            view: ViewConfig::default(),
            delivery: DeliveryConfig::default(),
            default_department: defaults::default_department(),
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Delay between listing page requests in milliseconds
    #[serde(default = "defaults::request_delay")]
    pub request_delay_ms: u64,

    /// Maximum concurrent detail page requests
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Listing pages to crawl per department
    #[serde(default = "defaults::max_pages")]
    pub max_pages: u32,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            request_delay_ms: defaults::request_delay(),
            max_concurrent: defaults::max_concurrent(),
            max_pages: defaults::max_pages(),
        }
    }
}

/// CSS selectors for the board CMS.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Selector for notice rows on a listing page
    #[serde(default = "defaults::row_selector")]
    pub row: String,

    /// Selector for the title link within a row
    #[serde(default = "defaults::title_selector")]
    pub title: String,

    /// Selector for the date cell within a row
    #[serde(default = "defaults::date_selector")]
    pub date: String,

    /// Selector for the main content block on a detail page
    #[serde(default = "defaults::content_selector")]
    pub content: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            row: defaults::row_selector(),
            title: defaults::title_selector(),
            date: defaults::date_selector(),
            content: defaults::content_selector(),
        }
    }
}

/// Polling cycle settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Wall-clock interval between poll ticks in seconds
    #[serde(default = "defaults::poll_interval")]
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::poll_interval(),
        }
    }
}

/// Paginated view settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewConfig {
    /// Notices shown per page
    #[serde(default = "defaults::page_size")]
    pub page_size: usize,

    /// Session lifetime in seconds
    #[serde(default = "defaults::view_timeout")]
    pub timeout_secs: u64,

    /// Content characters shown in list previews
    #[serde(default = "defaults::preview_chars")]
    pub preview_chars: usize,

    /// Content characters shown in the single-item detail view
    #[serde(default = "defaults::detail_chars")]
    pub detail_chars: usize,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: defaults::page_size(),
            timeout_secs: defaults::view_timeout(),
            preview_chars: defaults::preview_chars(),
            detail_chars: defaults::detail_chars(),
        }
    }
}

/// Delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DeliveryConfig {
    /// Channel id to webhook URL; channels without an entry use the console sink
    #[serde(default)]
    pub webhooks: BTreeMap<String, String>,
}

mod defaults {
    use crate::models::Department;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; deptwatch/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn request_delay() -> u64 {
        100
    }
    pub fn max_concurrent() -> usize {
        5
    }
    pub fn max_pages() -> u32 {
        5
    }

    // Selector defaults for the standard board CMS
    pub fn row_selector() -> String {
        ".board_list tbody tr".into()
    }
    pub fn title_selector() -> String {
        "td.subject a".into()
    }
    pub fn date_selector() -> String {
        "td.date".into()
    }
    pub fn content_selector() -> String {
        ".view_con".into()
    }

    // Poll defaults
    pub fn poll_interval() -> u64 {
        300
    }

    // View defaults
    pub fn page_size() -> usize {
        5
    }
    pub fn view_timeout() -> u64 {
        60
    }
    pub fn preview_chars() -> usize {
        200
    }
    pub fn detail_chars() -> usize {
        1024
    }

    pub fn default_department() -> Department {
        Department::new(
            "화학과",
            "https://chem.cnu.ac.kr/chem/undergrad/notice.do",
        )
    }
}
