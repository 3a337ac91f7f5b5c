//! Server-driven data table: the list-query component.
//!
//! - [`codec`] -- URL query string <-> [`FilterState`].
//! - [`table`] -- per-list configuration and resolution into a [`ResolvedQuery`].
//! - [`page`] -- pagination metadata and filter-preserving links.
//! - [`memory`] -- evaluates a resolved query over in-memory records.

pub mod codec;
pub mod memory;
pub mod page;
pub mod table;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use page::{PageLink, PageMeta, PageResult};
pub use table::{Column, ColumnKind, ResolvedQuery, TableSpec};

/// Query keys with fixed meaning. Filter columns must not reuse them.
pub const RESERVED_KEYS: &[&str] = &[
    "search",
    "filters",
    "sort_field",
    "sort_direction",
    "per_page",
    "page",
];

/// Sort direction for the single active sort column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// SQL keyword for this direction.
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("asc") {
            Ok(SortDirection::Asc)
        } else if s.eq_ignore_ascii_case("desc") {
            Ok(SortDirection::Desc)
        } else {
            Err(format!("invalid sort direction '{s}'"))
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single column filter: a substring value or an inclusive range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Range { start: String, end: String },
    Scalar(String),
}

impl FilterValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        FilterValue::Scalar(value.into())
    }

    pub fn range(start: impl Into<String>, end: impl Into<String>) -> Self {
        FilterValue::Range {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Blank filters contribute no predicate and are dropped from URLs.
    ///
    /// A range is blank when either bound is blank.
    pub fn is_blank(&self) -> bool {
        match self {
            FilterValue::Scalar(v) => v.trim().is_empty(),
            FilterValue::Range { start, end } => start.trim().is_empty() || end.trim().is_empty(),
        }
    }
}

/// Defaults applied when decoding a query string for one list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListDefaults {
    pub sort_field: String,
    pub sort_direction: SortDirection,
    pub per_page: u32,
    pub max_per_page: u32,
}

impl Default for ListDefaults {
    fn default() -> Self {
        Self {
            sort_field: "id".to_string(),
            sort_direction: SortDirection::Asc,
            per_page: 10,
            max_per_page: 100,
        }
    }
}

/// The complete search/filter/sort/page parameters describing one list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub search: String,
    pub filters: BTreeMap<String, FilterValue>,
    pub sort_field: String,
    pub sort_direction: SortDirection,
    pub per_page: u32,
    pub page: u32,
}

impl FilterState {
    /// A state holding only the given defaults.
    pub fn from_defaults(defaults: &ListDefaults) -> Self {
        Self {
            search: String::new(),
            filters: BTreeMap::new(),
            sort_field: defaults.sort_field.clone(),
            sort_direction: defaults.sort_direction,
            per_page: defaults.per_page,
            page: 1,
        }
    }

    /// Same view, different page.
    pub fn with_page(&self, page: u32) -> Self {
        Self {
            page: page.max(1),
            ..self.clone()
        }
    }

    /// Replace the search text and go back to the first page.
    pub fn with_search(&self, search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            page: 1,
            ..self.clone()
        }
    }

    /// Set (or clear, when blank) one column filter and go back to the first page.
    pub fn with_filter(&self, column: impl Into<String>, value: FilterValue) -> Self {
        let mut next = self.clone();
        let column = column.into();
        if value.is_blank() {
            next.filters.remove(&column);
        } else {
            next.filters.insert(column, value);
        }
        next.page = 1;
        next
    }

    /// Click on a sortable header: same column flips direction, a new column
    /// starts ascending. Always returns to the first page.
    pub fn with_sort_toggled(&self, column: &str) -> Self {
        let sort_direction = if self.sort_field == column {
            self.sort_direction.reversed()
        } else {
            SortDirection::Asc
        };
        Self {
            sort_field: column.to_string(),
            sort_direction,
            page: 1,
            ..self.clone()
        }
    }

    pub fn with_per_page(&self, per_page: u32) -> Self {
        Self {
            per_page: per_page.max(1),
            page: 1,
            ..self.clone()
        }
    }

    /// Drop search text and every column filter, keeping sort and page size.
    pub fn cleared(&self) -> Self {
        Self {
            search: String::new(),
            filters: BTreeMap::new(),
            page: 1,
            ..self.clone()
        }
    }

    /// Whether any search text or filter is active.
    pub fn has_active_filters(&self) -> bool {
        !self.search.trim().is_empty() || self.filters.values().any(|v| !v.is_blank())
    }
}
