//! Page-number pagination links and meta counts
//! (<https://jsonapi.org/format/#fetching-pagination>).
//!
//! The wire format calls the 1-based page number `offset` (and the page size
//! `limit`). The naming is misleading but load-bearing: clients depend on it,
//! so it is preserved throughout.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::links::{top_level_links, TopLevelLinks};

/// Hard ceiling on the page size a client may request.
pub const PAGINATION_LIMIT: u64 = 100;

/// A page-based result set as reported by the data-access layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    /// 1-based index of the current page.
    pub current_page: u64,
    /// Page size.
    pub per_page: u64,
    /// Number of items on the current page.
    pub count: u64,
    /// Total items across the full dataset.
    pub total_items: u64,
    /// Index of the last page.
    pub last_page: u64,
}

impl PageState {
    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn on_first_page(&self) -> bool {
        self.current_page <= 1
    }

    pub fn next_page(&self) -> Option<u64> {
        self.has_more_pages().then(|| self.current_page + 1)
    }

    pub fn prev_page(&self) -> Option<u64> {
        (!self.on_first_page()).then(|| self.current_page - 1)
    }
}

/// The `page` query map of a request, e.g. `page[offset]=3&page[limit]=2`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PageQuery {
    pub offset: Option<u64>,
    pub limit: Option<u64>,
}

/// Effective pagination options after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationOptions {
    pub limit: u64,
    pub offset: u64,
}

/// Clamp client-supplied page arguments: limit defaults to and is capped at
/// [`PAGINATION_LIMIT`], offset (the page number) defaults to and is floored
/// at 1.
pub fn pagination_options(page: Option<&PageQuery>) -> PaginationOptions {
    let limit = page
        .and_then(|p| p.limit)
        .unwrap_or(PAGINATION_LIMIT)
        .min(PAGINATION_LIMIT);
    let offset = page.and_then(|p| p.offset).unwrap_or(1).max(1);
    PaginationOptions { limit, offset }
}

/// Top-level links of a paginated document. `next`/`prev` serialize as null
/// on the respective boundary pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaginationLinks {
    #[serde(flatten)]
    pub base: TopLevelLinks,
    pub first: Option<String>,
    pub last: Option<String>,
    pub next: Option<String>,
    pub prev: Option<String>,
}

/// Counts under the top-level `meta.pagination` member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationCounts {
    pub count: u64,
    pub limit: u64,
    /// The current page number, not a row offset.
    pub offset: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    pub pagination: PaginationCounts,
}

/// Build the pagination links object: the usual top-level links for
/// `full_base_url` plus `first`/`last`/`next`/`prev` URLs that rewrite the
/// `page[offset]` query key while preserving every other `page` sub-key.
pub fn pagination_links(
    page: &PageState,
    full_base_url: &str,
    base_url: &str,
    page_params: &BTreeMap<String, String>,
) -> PaginationLinks {
    let page_url = |index: u64| -> String {
        let mut params = page_params.clone();
        params.insert("offset".to_string(), index.to_string());
        let query = params
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    urlencoding::encode(&format!("page[{key}]")),
                    urlencoding::encode(value)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{base_url}?{query}")
    };

    PaginationLinks {
        base: top_level_links(full_base_url, None),
        first: Some(page_url(1)),
        last: Some(page_url(page.last_page)),
        next: page.next_page().map(page_url),
        prev: page.prev_page().map(page_url),
    }
}

/// Build the top-level `meta` pagination counts for a page.
pub fn pagination_meta(page: &PageState) -> PaginationMeta {
    PaginationMeta {
        pagination: PaginationCounts {
            count: page.count,
            limit: page.per_page,
            offset: page.current_page,
            total_items: page.total_items,
            total_pages: page.last_page,
        },
    }
}
