// src/services/fetcher.rs

//! Notice board crawler service.
//!
//! Crawls a department's paginated listing and each retained row's detail
//! page into [`Notice`] records, using the configured CSS selectors.

use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use scraper::{Html, Selector};

use crate::config::{CrawlerConfig, SelectorConfig};
use crate::error::{AppError, Result};
use crate::models::Notice;
use crate::utils::{notice_base, resolve_notice_url};

/// Seam for substituting the crawler in tests and embeddings.
#[async_trait]
pub trait FetchNotices: Send + Sync {
    /// Fetch the current notice set for a listing URL, in page order.
    async fn fetch(&self, listing_url: &str) -> Result<Vec<Notice>>;
}

/// A listing row before its detail page has been fetched.
struct ListingRow {
    title: String,
    url: String,
    date: String,
}

impl ListingRow {
    fn into_notice(self, content: String) -> Notice {
        Notice {
            title: self.title,
            url: self.url,
            date: self.date,
            content,
        }
    }
}

/// Compiled selectors for the board CMS.
struct BoardSelectors {
    row: Selector,
    title: Selector,
    date: Selector,
    content: Selector,
}

impl BoardSelectors {
    fn compile(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            row: parse_selector(&config.row)?,
            title: parse_selector(&config.title)?,
            date: parse_selector(&config.date)?,
            content: parse_selector(&config.content)?,
        })
    }

    /// Parse listing rows into `{title, url, date}`.
    ///
    /// Rows without a title link are skipped, not an error.
    fn parse_listing(&self, html: &str, base: &str) -> Vec<ListingRow> {
        let document = Html::parse_document(html);
        let mut rows = Vec::new();

        for row in document.select(&self.row) {
            let Some(link) = row.select(&self.title).next() else {
                continue;
            };
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            let title = normalize_whitespace(&link.text().collect::<String>());
            if title.is_empty() {
                continue;
            }
            let date = row
                .select(&self.date)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            rows.push(ListingRow {
                title,
                url: resolve_notice_url(base, href),
                date,
            });
        }
        rows
    }

    /// Extract the main content block of a detail page.
    ///
    /// A missing container yields an empty string, not a failure.
    fn parse_content(&self, html: &str) -> String {
        let document = Html::parse_document(html);
        document
            .select(&self.content)
            .next()
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default()
    }
}

/// Service for crawling notices from a department board.
pub struct NoticeFetcher {
    client: Client,
    selectors: BoardSelectors,
    max_pages: u32,
    max_concurrent: usize,
    request_delay: Duration,
}

impl NoticeFetcher {
    /// Create a new fetcher with the given configuration.
    pub fn new(crawler: &CrawlerConfig, selectors: &SelectorConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&crawler.user_agent)
            .timeout(Duration::from_secs(crawler.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            selectors: BoardSelectors::compile(selectors)?,
            max_pages: crawler.max_pages,
            max_concurrent: crawler.max_concurrent.max(1),
            request_delay: Duration::from_millis(crawler.request_delay_ms),
        })
    }

    /// Fetch one listing page and parse its rows.
    async fn fetch_listing_page(&self, listing_url: &str, page: u32) -> Result<Vec<ListingRow>> {
        let page_param = page.to_string();
        let html = self
            .client
            .get(listing_url)
            .query(&[("viewType", "list"), ("page", page_param.as_str())])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(self.selectors.parse_listing(&html, &notice_base(listing_url)))
    }

    /// Fetch the body for a single notice.
    async fn fetch_content(&self, url: &str) -> Result<String> {
        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(self.selectors.parse_content(&html))
    }
}

#[async_trait]
impl FetchNotices for NoticeFetcher {
    /// Crawl listing pages `1..=max_pages` in order, then fill in each row's
    /// body through a bounded fan-out. Notice order follows the listing.
    ///
    /// No caching across calls; every invocation re-fetches everything.
    async fn fetch(&self, listing_url: &str) -> Result<Vec<Notice>> {
        let mut rows = Vec::new();
        for page in 1..=self.max_pages {
            rows.extend(self.fetch_listing_page(listing_url, page).await?);
            if !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
        }

        let mut details = stream::iter(rows)
            .map(|row| async move {
                let content = self.fetch_content(&row.url).await?;
                Ok::<Notice, AppError>(row.into_notice(content))
            })
            .buffered(self.max_concurrent);

        let mut notices = Vec::new();
        while let Some(result) = details.next().await {
            notices.push(result?);
        }
        Ok(notices)
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
