//! Utility functions and helpers.

use url::Url;

/// Path segment separating a department site root from its board pages.
const BOARD_SUBPATH: &str = "/undergrad/";

/// Department base for resolving notice links: the listing URL truncated
/// before its board sub-path, falling back to the URL origin.
pub fn notice_base(listing_url: &str) -> String {
    if let Some(idx) = listing_url.find(BOARD_SUBPATH) {
        return listing_url[..idx].to_string();
    }
    match Url::parse(listing_url) {
        Ok(u) => u.origin().ascii_serialization(),
        Err(_) => listing_url.trim_end_matches('/').to_string(),
    }
}

/// Resolve a listing row's href against the department base.
pub fn resolve_notice_url(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if href.starts_with('/') {
        return format!("{base}{href}");
    }
    match Url::parse(&format!("{base}/")) {
        Ok(u) => u
            .join(href)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| format!("{base}/{href}")),
        Err(_) => format!("{base}/{href}"),
    }
}

/// Truncate to at most `max_chars` characters on a char boundary.
///
/// Board text is Korean; byte slicing would split UTF-8 sequences.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_base_truncates_subpath() {
        assert_eq!(
            notice_base("https://chem.cnu.ac.kr/chem/undergrad/notice.do"),
            "https://chem.cnu.ac.kr/chem"
        );
    }

    #[test]
    fn test_notice_base_falls_back_to_origin() {
        assert_eq!(
            notice_base("https://chem.cnu.ac.kr/notice.do"),
            "https://chem.cnu.ac.kr"
        );
    }

    #[test]
    fn test_resolve_notice_url() {
        let base = "https://chem.cnu.ac.kr/chem";
        assert_eq!(
            resolve_notice_url(base, "/chem/board.do?articleNo=42"),
            "https://chem.cnu.ac.kr/chem/board.do?articleNo=42"
        );
        assert_eq!(
            resolve_notice_url(base, "https://other.example/x"),
            "https://other.example/x"
        );
        assert_eq!(
            resolve_notice_url(base, "board.do?articleNo=42"),
            "https://chem.cnu.ac.kr/chem/board.do?articleNo=42"
        );
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("장학금 안내", 3), "장학금");
        assert_eq!(truncate_chars("short", 200), "short");
        assert_eq!(truncate_chars("", 5), "");
    }
}
