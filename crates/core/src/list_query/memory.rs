//! In-memory record source.
//!
//! Applies a [`ResolvedQuery`] to a slice of [`Record`]s with the same
//! semantics the SQL renderer in `warden-db` produces: case-insensitive
//! substring search and filters, inclusive ranges, nulls last when
//! ascending, primary key as tie-breaker.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use super::table::{Bound, FilterPredicate, ResolvedQuery, TableSpec};
use super::{FilterState, PageResult, SortDirection};
use crate::error::CoreError;
use crate::types::{RecordId, Timestamp};

/// A scalar field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Timestamp(Timestamp),
    Text(String),
}

impl FieldValue {
    /// Text form used for substring matching.
    fn search_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Boolean(b) => Some(b.to_string()),
            FieldValue::Integer(n) => Some(n.to_string()),
            FieldValue::Timestamp(ts) => Some(timestamptz_text(ts)),
            FieldValue::Text(s) => Some(s.clone()),
        }
    }

    fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Boolean(a), FieldValue::Boolean(b)) => a.cmp(b),
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a.cmp(b),
            (FieldValue::Timestamp(a), FieldValue::Timestamp(b)) => a.cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (a, b) => a.search_text().cmp(&b.search_text()),
        }
    }

    fn within(&self, start: &Bound, end: &Bound) -> bool {
        match (self, start, end) {
            (FieldValue::Text(v), Bound::Text(s), Bound::Text(e)) => s <= v && v <= e,
            (FieldValue::Integer(v), Bound::Integer(s), Bound::Integer(e)) => s <= v && v <= e,
            (FieldValue::Boolean(v), Bound::Boolean(s), Bound::Boolean(e)) => s <= v && v <= e,
            (FieldValue::Timestamp(v), Bound::Timestamp(s), Bound::Timestamp(e)) => {
                s <= v && v <= e
            }
            _ => false,
        }
    }
}

/// `timestamptz::text` as PostgreSQL renders it in a UTC session: trailing
/// zeros of the fraction dropped and the offset written as `+00`.
fn timestamptz_text(ts: &Timestamp) -> String {
    let mut out = ts.format("%Y-%m-%d %H:%M:%S").to_string();
    let micros = ts.timestamp_subsec_micros();
    if micros > 0 {
        out.push('.');
        out.push_str(format!("{micros:06}").trim_end_matches('0'));
    }
    out.push_str("+00");
    out
}

/// One row of list data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(default)]
    pub roles: BTreeSet<String>,
}

impl Record {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
            roles: BTreeSet::new(),
        }
    }

    pub fn with(mut self, name: &str, value: FieldValue) -> Self {
        self.fields.insert(name.to_string(), value);
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.roles.insert(role.to_string());
        self
    }

    /// Field lookup; the primary key column resolves to the record id.
    fn field(&self, name: &str, primary_key: &str) -> FieldValue {
        if let Some(value) = self.fields.get(name) {
            return value.clone();
        }
        if name == primary_key {
            return match &self.id {
                RecordId::Int(id) => FieldValue::Integer(*id),
                RecordId::Str(s) => FieldValue::Text(s.clone()),
            };
        }
        FieldValue::Null
    }
}

fn contains_ci(haystack: Option<String>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

/// Records held in memory, listed through a [`TableSpec`].
#[derive(Debug, Clone, Copy)]
pub struct MemorySource<'a> {
    pub table: &'a TableSpec,
    pub records: &'a [Record],
}

impl<'a> MemorySource<'a> {
    pub fn new(table: &'a TableSpec, records: &'a [Record]) -> Self {
        Self { table, records }
    }

    /// Records matching the search and filters, in sort order, unpaged.
    pub fn matching(&self, query: &ResolvedQuery) -> Vec<&'a Record> {
        let pk = self.table.primary_key;

        let mut rows: Vec<&Record> = self
            .records
            .iter()
            .filter(|r| match &query.search {
                Some(search) => search
                    .columns
                    .iter()
                    .any(|c| contains_ci(r.field(c.name, pk).search_text(), &search.term)),
                None => true,
            })
            .filter(|r| {
                query.filters.iter().all(|f| {
                    let value = r.field(f.column.name, pk);
                    match &f.predicate {
                        FilterPredicate::Contains(needle) => {
                            contains_ci(value.search_text(), needle)
                        }
                        FilterPredicate::Between(start, end) => value.within(start, end),
                    }
                })
            })
            .collect();

        let sort = query.sort;
        rows.sort_by(|a, b| {
            let (va, vb) = (a.field(sort.column, pk), b.field(sort.column, pk));
            let primary = match (&va, &vb) {
                (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
                // Nulls sort last ascending and first descending.
                (FieldValue::Null, _) => Ordering::Greater,
                (_, FieldValue::Null) => Ordering::Less,
                _ => va.compare(&vb),
            };
            let primary = match sort.direction {
                SortDirection::Asc => primary,
                SortDirection::Desc => primary.reverse(),
            };
            primary.then_with(|| a.field(pk, pk).compare(&b.field(pk, pk)))
        });
        rows
    }

    /// Produce the page `state` asks for. Links point at `path`.
    pub fn page(&self, state: &FilterState, path: &str) -> Result<PageResult<Record>, CoreError> {
        let query = self.table.resolve(state)?;
        let matching = self.matching(&query);
        let total = matching.len() as u64;
        let rows: Vec<Record> = matching
            .into_iter()
            .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(query.limit()).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(PageResult::new(rows, total, state, path))
    }
}
