//! List shaping shared by the directory and the admin console: pagination,
//! alphabet bucketing and in-memory text search.
//!
//! All functions here are pure. Handlers fetch rows, shape them with these
//! helpers and serialize the result; no storage concerns leak in.

use serde::Serialize;

/// One page of a larger list plus the metadata the UI needs to render
/// pagination controls.
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub total: usize,
}

/// Number of pages needed to hold `len` items at `page_size` per page.
/// Zero items means zero pages; the caller clamps the page number separately.
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Clamps a requested page into the valid range. Page numbers are 1-based;
/// an empty list still has a valid page 1.
pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// Slices one page out of `items`. The page number is clamped first, so a
/// stale page (e.g. after rows were deleted) resolves to the last real page
/// instead of an empty one.
pub fn paginate<T: Clone>(items: &[T], page: usize, page_size: usize) -> Paged<T> {
    let total = items.len();
    let pages = total_pages(total, page_size);
    let page = clamp_page(page, pages);

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(total);
    let slice = if start < total { &items[start..end] } else { &[][..] };

    Paged {
        items: slice.to_vec(),
        page,
        page_size,
        total_pages: pages,
        total,
    }
}

/// Case-insensitive initial-letter match for alphabet bucketing.
pub fn starts_with_letter(name: &str, letter: char) -> bool {
    name.trim()
        .chars()
        .next()
        .map(|c| c.eq_ignore_ascii_case(&letter))
        .unwrap_or(false)
}

/// Case-insensitive substring search. An empty query matches everything.
pub fn matches_search(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Parses a single letter bucket parameter. Accepts one ASCII letter in
/// either case and canonicalizes to uppercase; anything else is rejected.
pub fn normalize_letter(raw: &str) -> Option<char> {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_cover_the_whole_list_without_overlap() {
        let items: Vec<u32> = (0..47).collect();
        let size = 10;
        let pages = total_pages(items.len(), size);
        assert_eq!(pages, 5);

        let mut seen = Vec::new();
        for p in 1..=pages {
            let page = paginate(&items, p, size);
            assert!(page.items.len() <= size);
            seen.extend(page.items);
        }
        assert_eq!(seen, items);
    }

    #[test]
    fn page_is_clamped_into_range() {
        let items: Vec<u32> = (0..25).collect();
        assert_eq!(paginate(&items, 0, 10).page, 1);
        assert_eq!(paginate(&items, 99, 10).page, 3);
        assert_eq!(paginate(&items, 99, 10).items, vec![20, 21, 22, 23, 24]);
    }

    #[test]
    fn empty_list_resolves_to_page_one() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 3, 10);
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn exact_multiple_has_no_trailing_empty_page() {
        assert_eq!(total_pages(40, 10), 4);
        assert_eq!(total_pages(41, 10), 5);
        assert_eq!(total_pages(0, 10), 0);
    }

    #[test]
    fn letter_match_ignores_case() {
        assert!(starts_with_letter("google", 'G'));
        assert!(starts_with_letter("Google", 'g'));
        assert!(!starts_with_letter("Meta", 'G'));
        assert!(!starts_with_letter("", 'G'));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        assert!(matches_search("Sarah Johnson", "john"));
        assert!(matches_search("Sarah Johnson", "SARAH"));
        assert!(!matches_search("Sarah Johnson", "xyz"));
        assert!(matches_search("anything", ""));
    }

    #[test]
    fn letter_param_rejects_non_letters() {
        assert_eq!(normalize_letter("g"), Some('G'));
        assert_eq!(normalize_letter(" Q "), Some('Q'));
        assert_eq!(normalize_letter("AB"), None);
        assert_eq!(normalize_letter("1"), None);
        assert_eq!(normalize_letter(""), None);
    }
}
