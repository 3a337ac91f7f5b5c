//! Query-string extraction for list endpoints.
//!
//! List endpoints read the raw query string rather than a serde struct
//! because the codec's bracketed `filters[col][start]` keys have no fixed
//! shape.

use axum::extract::{FromRequestParts, RawQuery};
use axum::http::request::Parts;
use warden_core::list_query::codec::decode;
use warden_core::list_query::{FilterState, TableSpec};

/// The raw list query string of a request, decoded on demand against a table.
#[derive(Debug, Clone, Default)]
pub struct ListQuery(pub Option<String>);

impl ListQuery {
    /// Decode into a [`FilterState`] using `table`'s defaults and limits.
    pub fn filter_state(&self, table: &TableSpec) -> FilterState {
        decode(self.0.as_deref().unwrap_or(""), &table.defaults())
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ListQuery {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RawQuery(raw) = RawQuery::from_request_parts(parts, state).await?;
        Ok(ListQuery(raw))
    }
}

#[cfg(test)]
mod tests {
    use warden_core::list_query::SortDirection;
    use warden_core::users::USERS_TABLE;

    use super::*;

    #[test]
    fn missing_query_yields_table_defaults() {
        let state = ListQuery(None).filter_state(&USERS_TABLE);
        assert_eq!(state.sort_field, "id");
        assert_eq!(state.sort_direction, SortDirection::Asc);
        assert_eq!(state.per_page, 10);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn per_page_is_clamped_to_table_max() {
        let state = ListQuery(Some("per_page=5000".into())).filter_state(&USERS_TABLE);
        assert_eq!(state.per_page, USERS_TABLE.max_per_page);
    }
}
