//! Pagination metadata and link generation.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{codec, FilterState};

pub const PREVIOUS_LABEL: &str = "« Previous";
pub const NEXT_LABEL: &str = "Next »";
pub const GAP_LABEL: &str = "...";

/// Pages shown on each side of the current one before collapsing into a gap.
const ON_EACH_SIDE: u32 = 3;

/// Counts describing where one page sits in the full result set.
///
/// `from`/`to` are 1-based record positions and are `None` for an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub total: u64,
    pub per_page: u32,
    pub current_page: u32,
    pub last_page: u32,
    pub from: Option<u64>,
    pub to: Option<u64>,
}

impl PageMeta {
    pub fn new(total: u64, current_page: u32, per_page: u32, rows_on_page: usize) -> Self {
        let per_page = per_page.max(1);
        let current_page = current_page.max(1);
        let last_page = u32::try_from(total.div_ceil(u64::from(per_page)).max(1)).unwrap_or(u32::MAX);
        let offset = u64::from(current_page - 1) * u64::from(per_page);
        let (from, to) = if rows_on_page == 0 {
            (None, None)
        } else {
            (Some(offset + 1), Some(offset + rows_on_page as u64))
        };
        Self {
            total,
            per_page,
            current_page,
            last_page,
            from,
            to,
        }
    }

    pub fn has_more_pages(&self) -> bool {
        self.current_page < self.last_page
    }
}

/// One pagination control: a target url (or `None` when disabled), its label,
/// and whether it is the current page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    pub url: Option<String>,
    pub label: String,
    pub active: bool,
}

/// Build the pagination controls for `meta`.
///
/// Every url carries the full encoded `state`; only `page` differs between
/// links, so changing page never drops search, filters or sort.
pub fn build_links(path: &str, state: &FilterState, meta: &PageMeta) -> Vec<PageLink> {
    let url_for = |page: u32| format!("{path}?{}", codec::encode(&state.with_page(page)));

    let mut links = Vec::new();
    links.push(PageLink {
        url: (meta.current_page > 1)
            .then(|| url_for((meta.current_page - 1).min(meta.last_page))),
        label: PREVIOUS_LABEL.to_string(),
        active: false,
    });

    for slot in page_window(meta.current_page, meta.last_page) {
        links.push(match slot {
            Some(page) => PageLink {
                url: Some(url_for(page)),
                label: page.to_string(),
                active: page == meta.current_page,
            },
            None => PageLink {
                url: None,
                label: GAP_LABEL.to_string(),
                active: false,
            },
        });
    }

    links.push(PageLink {
        url: meta.has_more_pages().then(|| url_for(meta.current_page + 1)),
        label: NEXT_LABEL.to_string(),
        active: false,
    });
    links
}

/// Page numbers to render; `None` marks a collapsed gap.
fn page_window(current: u32, last: u32) -> Vec<Option<u32>> {
    if last <= ON_EACH_SIDE * 2 + 8 {
        return (1..=last).map(Some).collect();
    }

    let mut pages: BTreeSet<u32> = [1, 2, last - 1, last].into_iter().collect();
    let lo = current.saturating_sub(ON_EACH_SIDE).max(1);
    let hi = current.saturating_add(ON_EACH_SIDE).min(last);
    pages.extend(lo..=hi);

    let mut window = Vec::with_capacity(pages.len() + 2);
    let mut prev = 0;
    for page in pages {
        if prev != 0 && page > prev + 1 {
            window.push(None);
        }
        window.push(Some(page));
        prev = page;
    }
    window
}

/// A page of rows plus everything needed to render the table around it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
    pub links: Vec<PageLink>,
    /// The decoded state this page answers, echoed for the UI controls.
    pub filters: FilterState,
}

impl<T> PageResult<T> {
    pub fn new(data: Vec<T>, total: u64, state: &FilterState, path: &str) -> Self {
        let meta = PageMeta::new(total, state.page, state.per_page, data.len());
        let links = build_links(path, state, &meta);
        Self {
            data,
            meta,
            links,
            filters: state.clone(),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PageResult<U> {
        PageResult {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
            links: self.links,
            filters: self.filters,
        }
    }
}
