//! Paginated view sessions.
//!
//! An ephemeral, timeout-bound paging state over a notice list. The chat
//! layer translates its interaction events into `next`/`prev`/`select`
//! calls; nothing platform-specific lives here.
//!
//! Sessions hold a fixed deadline from creation; interactions do not renew
//! it. Once the deadline passes, every navigation call is rejected.

use std::time::{Duration, Instant};

use crate::config::ViewConfig;
use crate::models::Notice;
use crate::utils::truncate_chars;

/// Why a navigation call was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewError {
    /// The session outlived its timeout.
    Expired,
    /// Select index outside the current page slice.
    NoSuchItem,
}

/// One rendered page of a session.
#[derive(Debug)]
pub struct PageView<'a> {
    pub page: usize,
    pub max_page: usize,
    items: &'a [Notice],
    preview_chars: usize,
}

impl<'a> PageView<'a> {
    /// The notices on this page, in listing order.
    pub fn items(&self) -> &'a [Notice] {
        self.items
    }

    /// Content preview for a list entry.
    pub fn preview(&self, notice: &'a Notice) -> &'a str {
        truncate_chars(&notice.content, self.preview_chars)
    }
}

/// Detail view of a single notice.
#[derive(Debug)]
pub struct DetailView<'a> {
    pub notice: &'a Notice,
    /// Body truncated to the detail display limit.
    pub content: &'a str,
}

pub struct ViewSession {
    items: Vec<Notice>,
    page: usize,
    page_size: usize,
    max_page: usize,
    preview_chars: usize,
    detail_chars: usize,
    deadline: Instant,
}

impl ViewSession {
    /// Open a session over a result list. `max_page` is fixed here and never
    /// recomputed; it is at least 1 even for an empty list.
    pub fn open(items: Vec<Notice>, config: &ViewConfig) -> Self {
        let page_size = config.page_size.max(1);
        let max_page = items.len().div_ceil(page_size).max(1);
        Self {
            items,
            page: 1,
            page_size,
            max_page,
            preview_chars: config.preview_chars,
            detail_chars: config.detail_chars,
            deadline: Instant::now() + Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn max_page(&self) -> usize {
        self.max_page
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Render the current page.
    pub fn current(&self) -> Result<PageView<'_>, ViewError> {
        self.current_at(Instant::now())
    }

    /// Move forward one page, clamped to `max_page`.
    pub fn next(&mut self) -> Result<PageView<'_>, ViewError> {
        self.next_at(Instant::now())
    }

    /// Move back one page, clamped to 1.
    pub fn prev(&mut self) -> Result<PageView<'_>, ViewError> {
        self.prev_at(Instant::now())
    }

    /// Expand one item of the current page, 1-based within the page slice.
    /// Does not change the page.
    pub fn select(&self, index: usize) -> Result<DetailView<'_>, ViewError> {
        self.select_at(index, Instant::now())
    }

    // Clock-injected variants; tests drive these directly.

    pub fn current_at(&self, now: Instant) -> Result<PageView<'_>, ViewError> {
        self.check_alive(now)?;
        Ok(self.render())
    }

    pub fn next_at(&mut self, now: Instant) -> Result<PageView<'_>, ViewError> {
        self.check_alive(now)?;
        if self.page < self.max_page {
            self.page += 1;
        }
        Ok(self.render())
    }

    pub fn prev_at(&mut self, now: Instant) -> Result<PageView<'_>, ViewError> {
        self.check_alive(now)?;
        if self.page > 1 {
            self.page -= 1;
        }
        Ok(self.render())
    }

    pub fn select_at(&self, index: usize, now: Instant) -> Result<DetailView<'_>, ViewError> {
        self.check_alive(now)?;
        let slice = self.page_slice();
        if index == 0 || index > slice.len() {
            return Err(ViewError::NoSuchItem);
        }
        let notice = &slice[index - 1];
        Ok(DetailView {
            notice,
            content: truncate_chars(&notice.content, self.detail_chars),
        })
    }

    fn check_alive(&self, now: Instant) -> Result<(), ViewError> {
        if now >= self.deadline {
            return Err(ViewError::Expired);
        }
        Ok(())
    }

    /// The visible slice is always recomputed from the current page.
    fn page_slice(&self) -> &[Notice] {
        let start = ((self.page - 1) * self.page_size).min(self.items.len());
        let end = (start + self.page_size).min(self.items.len());
        &self.items[start..end]
    }

    fn render(&self) -> PageView<'_> {
        PageView {
            page: self.page,
            max_page: self.max_page,
            items: self.page_slice(),
            preview_chars: self.preview_chars,
        }
    }
}
