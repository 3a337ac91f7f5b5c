//! Per-list configuration and resolution of a [`FilterState`] into the
//! predicates, sort and window a record source must apply.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use super::{FilterState, FilterValue, ListDefaults, SortDirection};
use crate::error::CoreError;
use crate::types::Timestamp;

/// Storage kind of a column, used to parse range bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Boolean,
    Timestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

/// Static description of one data table.
///
/// Column names listed in `searchable`, `sortable` and `filterable` must be
/// declared in `columns`; they are the only identifiers ever interpolated
/// into SQL.
#[derive(Debug, Clone, Copy)]
pub struct TableSpec {
    pub primary_key: &'static str,
    pub columns: &'static [Column],
    pub searchable: &'static [&'static str],
    pub sortable: &'static [&'static str],
    pub filterable: &'static [&'static str],
    pub default_per_page: u32,
    pub max_per_page: u32,
}

/// A parsed range bound.
#[derive(Debug, Clone, PartialEq)]
pub enum Bound {
    Text(String),
    Integer(i64),
    Boolean(bool),
    Timestamp(Timestamp),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    /// Case-insensitive substring match.
    Contains(String),
    /// Inclusive `start <= value <= end`.
    Between(Bound, Bound),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: Column,
    pub predicate: FilterPredicate,
}

/// OR-combined case-insensitive substring match over several columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPredicate {
    pub term: String,
    pub columns: Vec<Column>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub column: &'static str,
    pub direction: SortDirection,
}

/// Everything a record source needs to produce one page.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    pub search: Option<SearchPredicate>,
    pub filters: Vec<ColumnFilter>,
    pub sort: Sort,
    pub page: u32,
    pub per_page: u32,
}

impl ResolvedQuery {
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

impl TableSpec {
    /// Codec defaults for this table: primary key ascending, default page size.
    pub fn defaults(&self) -> ListDefaults {
        ListDefaults {
            sort_field: self.primary_key.to_string(),
            sort_direction: SortDirection::Asc,
            per_page: self.default_per_page,
            max_per_page: self.max_per_page,
        }
    }

    pub fn column(&self, name: &str) -> Option<Column> {
        self.columns.iter().copied().find(|c| c.name == name)
    }

    /// The sort actually applied: the requested one when its column is in
    /// the sortable allow-list, otherwise primary key ascending.
    pub fn effective_sort(&self, state: &FilterState) -> Sort {
        match self.sortable.iter().find(|c| **c == state.sort_field) {
            Some(&column) => Sort {
                column,
                direction: state.sort_direction,
            },
            None => Sort {
                column: self.primary_key,
                direction: SortDirection::Asc,
            },
        }
    }

    /// Resolve a decoded state against this table.
    ///
    /// Blank filters and filters on columns outside the filterable allow-list
    /// are dropped. A range bound that does not parse for its column kind is a
    /// validation error.
    pub fn resolve(&self, state: &FilterState) -> Result<ResolvedQuery, CoreError> {
        let term = state.search.trim();
        let search = if term.is_empty() {
            None
        } else {
            let columns: Vec<Column> = self
                .searchable
                .iter()
                .filter_map(|name| self.column(name))
                .collect();
            (!columns.is_empty()).then(|| SearchPredicate {
                term: term.to_string(),
                columns,
            })
        };

        let mut filters = Vec::new();
        for (name, value) in &state.filters {
            if value.is_blank() || !self.filterable.iter().any(|c| *c == name.as_str()) {
                continue;
            }
            let Some(column) = self.column(name) else {
                continue;
            };
            let predicate = match value {
                FilterValue::Scalar(v) => FilterPredicate::Contains(v.trim().to_string()),
                FilterValue::Range { start, end } => FilterPredicate::Between(
                    parse_bound(column, start, false)?,
                    parse_bound(column, end, true)?,
                ),
            };
            filters.push(ColumnFilter { column, predicate });
        }

        Ok(ResolvedQuery {
            search,
            filters,
            sort: self.effective_sort(state),
            page: state.page.max(1),
            per_page: state.per_page.clamp(1, self.max_per_page.max(1)),
        })
    }
}

/// Parse a range bound for `column`.
///
/// Timestamp bounds accept RFC 3339, `YYYY-MM-DDTHH:MM[:SS]` (UTC) or a bare
/// date; a bare date as the upper bound covers the whole day.
fn parse_bound(column: Column, raw: &str, upper: bool) -> Result<Bound, CoreError> {
    let raw = raw.trim();
    let invalid = || {
        CoreError::field(
            format!("filters.{}", column.name),
            format!("'{raw}' is not a valid bound for {}", column.name),
        )
    };
    match column.kind {
        ColumnKind::Text => Ok(Bound::Text(raw.to_string())),
        ColumnKind::Integer => raw.parse().map(Bound::Integer).map_err(|_| invalid()),
        ColumnKind::Boolean => parse_bool(raw).map(Bound::Boolean).ok_or_else(invalid),
        ColumnKind::Timestamp => parse_timestamp(raw, upper)
            .map(Bound::Timestamp)
            .ok_or_else(invalid),
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn parse_timestamp(raw: &str, upper: bool) -> Option<Timestamp> {
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    let time = if upper {
        NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)?
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)?
    };
    Some(Utc.from_utc_datetime(&date.and_time(time)))
}
