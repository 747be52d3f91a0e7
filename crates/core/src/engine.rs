//! Filter/sort engine and page arithmetic.
//!
//! Everything here is pure: the same `(items, search, sort)` always yields the
//! same sequence, and the input slice is never reordered in place.

use std::cmp::Ordering;

use crate::item::{Item, SortKey};

/// True when any of the item's searchable fields contains `needle`
///
/// `needle` must already be lower-cased. An empty needle matches everything,
/// including items that expose no searchable fields.
pub fn matches<I: Item>(item: &I, needle: &str) -> bool {
    needle.is_empty()
        || item
            .search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
}

/// Filter by `search` (case-insensitive substring) and order by `sort`
///
/// The sort is stable, so items that compare equal keep their fetch order.
pub fn apply<I: Item>(items: &[I], search: &str, sort: I::SortKey) -> Vec<I> {
    let needle = search.to_lowercase();

    let mut visible: Vec<I> = items
        .iter()
        .filter(|item| matches(*item, &needle))
        .cloned()
        .collect();

    visible.sort_by(|a, b| sort.compare(a, b));
    visible
}

/// Largest first; a missing value counts as `0`
pub fn numeric_desc(a: Option<f64>, b: Option<f64>) -> Ordering {
    b.unwrap_or(0.0).total_cmp(&a.unwrap_or(0.0))
}

/// Smallest first; a missing value counts as `0`
pub fn numeric_asc(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.unwrap_or(0.0).total_cmp(&b.unwrap_or(0.0))
}

/// Alphabetical, ignoring case, with a byte-order tiebreak
pub fn text_asc(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Number of pages needed for `total_items`; never less than one
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1)).max(1)
}

/// Clamp `page` into `[1, total_pages]`
pub fn clamp_page(page: usize, total_items: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(total_items, page_size))
}

/// Calculate slice bounds for a given page
///
/// Returns (start_index, end_index) for slicing the items array. The page is
/// clamped first, so the bounds are always valid (an empty range for an empty
/// list).
pub fn page_bounds(total_items: usize, page: usize, page_size: usize) -> (usize, usize) {
    let page_size = page_size.max(1);
    let page = clamp_page(page, total_items, page_size);

    let start = ((page - 1) * page_size).min(total_items);
    let end = (start + page_size).min(total_items);
    (start, end)
}
