//! Rendering of a [`ResolvedQuery`] into parameterised PostgreSQL.
//!
//! Column names come only from the static [`TableSpec`] allow-lists, so they
//! are interpolated directly; every user-supplied value is a bind parameter.
//!
//! [`TableSpec`]: warden_core::list_query::TableSpec

use sqlx::postgres::PgArguments;
use sqlx::query::{QueryAs, QueryScalar};
use sqlx::Postgres;
use warden_core::list_query::table::{Bound, FilterPredicate};
use warden_core::list_query::{ResolvedQuery, SortDirection};
use warden_core::types::Timestamp;

/// Typed bind value for a dynamically built list query.
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    BigInt(i64),
    Bool(bool),
    Text(String),
    Timestamp(Timestamp),
}

impl From<&Bound> for BindValue {
    fn from(bound: &Bound) -> Self {
        match bound {
            Bound::Text(v) => BindValue::Text(v.clone()),
            Bound::Integer(v) => BindValue::BigInt(*v),
            Bound::Boolean(v) => BindValue::Bool(*v),
            Bound::Timestamp(v) => BindValue::Timestamp(*v),
        }
    }
}

/// SQL fragments for one page of a list.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSql {
    /// Empty, or starts with `WHERE `.
    pub where_clause: String,
    /// Starts with `ORDER BY `.
    pub order_by: String,
    pub binds: Vec<BindValue>,
    /// Next free `$n` placeholder, used for `LIMIT` and `OFFSET`.
    pub next_bind: u32,
    pub limit: i64,
    pub offset: i64,
}

impl ListSql {
    /// `{where} {order} LIMIT $n OFFSET $n+1`, for appending after `FROM`.
    pub fn page_tail(&self) -> String {
        format!(
            "{} {} LIMIT ${} OFFSET ${}",
            self.where_clause,
            self.order_by,
            self.next_bind,
            self.next_bind + 1
        )
    }
}

/// Escape `%`, `_` and `\` so a term matches literally inside `ILIKE`.
pub fn escape_like(term: &str) -> String {
    let mut out = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like(term))
}

/// Render `query`. `primary_key` is the tie-breaker for stable ordering.
pub fn render(query: &ResolvedQuery, primary_key: &str) -> ListSql {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut binds: Vec<BindValue> = Vec::new();

    if let Some(search) = &query.search {
        let ors: Vec<String> = search
            .columns
            .iter()
            .map(|c| format!("{}::text ILIKE ${bind_idx}", c.name))
            .collect();
        conditions.push(format!("({})", ors.join(" OR ")));
        bind_idx += 1;
        binds.push(BindValue::Text(contains_pattern(&search.term)));
    }

    for filter in &query.filters {
        let column = filter.column.name;
        match &filter.predicate {
            FilterPredicate::Contains(term) => {
                conditions.push(format!("{column}::text ILIKE ${bind_idx}"));
                bind_idx += 1;
                binds.push(BindValue::Text(contains_pattern(term)));
            }
            FilterPredicate::Between(start, end) => {
                conditions.push(format!(
                    "{column} BETWEEN ${bind_idx} AND ${}",
                    bind_idx + 1
                ));
                bind_idx += 2;
                binds.push(start.into());
                binds.push(end.into());
            }
        }
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sort = query.sort;
    let order_by = if sort.column == primary_key {
        format!("ORDER BY {primary_key} {}", sort.direction.as_sql())
    } else {
        let nulls = match sort.direction {
            SortDirection::Asc => "NULLS LAST",
            SortDirection::Desc => "NULLS FIRST",
        };
        format!(
            "ORDER BY {} {} {nulls}, {primary_key} ASC",
            sort.column,
            sort.direction.as_sql()
        )
    };

    ListSql {
        where_clause,
        order_by,
        binds,
        next_bind: bind_idx,
        limit: i64::try_from(query.limit()).unwrap_or(i64::MAX),
        offset: i64::try_from(query.offset()).unwrap_or(i64::MAX),
    }
}

// ---------------------------------------------------------------------------
// Binding helpers
// ---------------------------------------------------------------------------

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
pub fn bind_values<'q, O>(
    mut q: QueryAs<'q, Postgres, O, PgArguments>,
    binds: &'q [BindValue],
) -> QueryAs<'q, Postgres, O, PgArguments> {
    for val in binds {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Bool(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar` returning a count.
pub fn bind_values_scalar<'q>(
    mut q: QueryScalar<'q, Postgres, i64, PgArguments>,
    binds: &'q [BindValue],
) -> QueryScalar<'q, Postgres, i64, PgArguments> {
    for val in binds {
        match val {
            BindValue::BigInt(v) => q = q.bind(*v),
            BindValue::Bool(v) => q = q.bind(*v),
            BindValue::Text(v) => q = q.bind(v.as_str()),
            BindValue::Timestamp(v) => q = q.bind(*v),
        }
    }
    q
}
