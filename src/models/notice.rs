//! Notice data structure.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format the boards print, e.g. "2025.06.08".
pub const BOARD_DATE_FORMAT: &str = "%Y.%m.%d";

/// A notice fetched from a department board.
///
/// The detail-page URL is the sole identity key: two notices are the same
/// entity iff their URLs are equal, even when title or date text differs
/// between fetches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    /// Notice title
    pub title: String,

    /// Full URL to the notice detail page
    pub url: String,

    /// Date as printed on the board
    pub date: String,

    /// Detail page body text (empty when the board has no content block)
    #[serde(default)]
    pub content: String,
}

impl Notice {
    /// Parse the board date into a calendar date.
    pub fn published_on(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), BOARD_DATE_FORMAT).ok()
    }

    /// Case-insensitive substring match on title or content.
    pub fn matches_keyword(&self, keyword: &str) -> bool {
        let needle = keyword.to_lowercase();
        self.title.to_lowercase().contains(&needle)
            || self.content.to_lowercase().contains(&needle)
    }
}
