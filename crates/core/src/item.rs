//! Traits shared by the normalized items of every domain.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt::{Debug, Display};
use std::str::FromStr;

use crate::view::Card;

/// A normalized record that one card displays
///
/// Implementations must always return a non-empty display name; normalizers
/// substitute a placeholder when the upstream record has none.
pub trait Item: Clone + Debug + Serialize + Send + Sync + 'static {
    type SortKey: SortKey<Self>;

    /// Unique within one fetched batch
    fn key(&self) -> String;

    fn display_name(&self) -> &str;

    /// Text fields the search box matches against
    fn search_fields(&self) -> Vec<&str>;

    fn image_url(&self) -> Option<&str>;

    fn detail_url(&self) -> Option<&str>;

    /// Build the card shown for this item
    fn card(&self) -> Card;
}

/// A fixed registry of comparators for one item type
pub trait SortKey<I>:
    Copy + Debug + Default + Eq + Display + FromStr<Err = UnknownSortKey> + Send + Sync + 'static
{
    /// Every registered key, default first
    const ALL: &'static [Self];

    fn compare(self, a: &I, b: &I) -> Ordering;
}

/// Returned when a sort key name is not in a domain's registry
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sort key '{given}', expected one of: {expected}")]
pub struct UnknownSortKey {
    pub given: String,
    pub expected: String,
}

impl UnknownSortKey {
    pub fn new<I, K: SortKey<I>>(given: &str) -> Self {
        Self {
            given: given.to_string(),
            expected: K::ALL
                .iter()
                .map(|key| key.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

/// Page request passed to an adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageOptions {
    pub page: u32,
    pub per_page: u32,
}

impl PageOptions {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.max(1),
        }
    }

    /// Clamp `per_page` to the inclusive range a remote API accepts
    pub fn clamped(self, max_per_page: u32) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, max_per_page.max(1)),
        }
    }

    /// Zero-based record offset of the first item on this page
    pub fn offset(&self) -> u32 {
        (self.page.max(1) - 1).saturating_mul(self.per_page)
    }
}

/// Where page changes are served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum Pagination {
    /// Each page is a separate request; the visible list is one remote page
    Server,
    /// One batch is fetched once and pages are slices of it
    Client { batch_size: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_options_never_zero() {
        let options = PageOptions::new(0, 0);
        assert_eq!(options.page, 1);
        assert_eq!(options.per_page, 1);
    }

    #[test]
    fn test_page_options_clamped_to_remote_max() {
        let options = PageOptions::new(3, 500).clamped(25);
        assert_eq!(options.page, 3);
        assert_eq!(options.per_page, 25);
    }

    #[test]
    fn test_page_options_offset() {
        assert_eq!(PageOptions::new(1, 20).offset(), 0);
        assert_eq!(PageOptions::new(3, 20).offset(), 40);
    }
}
