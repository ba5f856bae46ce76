//! New-notice detection.
//!
//! A notice is new when its URL is absent from the previously persisted
//! partition. The URL is the sole identity key; title and date text are not
//! compared, so a reworded notice is never re-delivered.

use std::collections::HashSet;

use crate::models::Notice;

/// Notices present in `current` but not in `previous`, in fetch order.
pub fn new_notices<'a>(previous: &[Notice], current: &'a [Notice]) -> Vec<&'a Notice> {
    let seen: HashSet<&str> = previous.iter().map(|n| n.url.as_str()).collect();
    current
        .iter()
        .filter(|n| !seen.contains(n.url.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_notice(url: &str, title: &str) -> Notice {
        Notice {
            title: title.to_string(),
            url: format!("https://chem.example/board.do?articleNo={url}"),
            date: "2025.06.08".to_string(),
            content: String::new(),
        }
    }

    #[test]
    fn test_no_changes() {
        let prev = vec![make_notice("1", "공지 1"), make_notice("2", "공지 2")];
        let curr = prev.clone();

        assert!(new_notices(&prev, &curr).is_empty());
    }

    #[test]
    fn test_additions_keep_fetch_order() {
        let prev = vec![make_notice("1", "공지 1")];
        let curr = vec![
            make_notice("3", "공지 3"),
            make_notice("2", "공지 2"),
            make_notice("1", "공지 1"),
        ];

        let fresh = new_notices(&prev, &curr);
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh[0].title, "공지 3");
        assert_eq!(fresh[1].title, "공지 2");
    }

    #[test]
    fn test_retitled_notice_is_not_new() {
        let prev = vec![make_notice("1", "옛 제목")];
        let mut curr = vec![make_notice("1", "새 제목")];
        curr[0].date = "2025.06.09".to_string();

        assert!(new_notices(&prev, &curr).is_empty());
    }

    #[test]
    fn test_empty_store_means_all_new() {
        let prev: Vec<Notice> = vec![];
        let curr = vec![make_notice("1", "첫 공지")];

        assert_eq!(new_notices(&prev, &curr).len(), 1);
    }
}
