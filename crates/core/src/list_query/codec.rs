//! Query parameter codec for list screens.
//!
//! Wire shape (`application/x-www-form-urlencoded`):
//!
//! ```text
//! search=ali
//! filters[email]=example.com
//! filters[created_at][start]=2024-01-01&filters[created_at][end]=2024-01-31
//! sort_field=name&sort_direction=desc
//! per_page=25&page=2
//! ```
//!
//! Decoding never fails: malformed values fall back to the screen defaults
//! and unknown keys are ignored.

use std::collections::BTreeMap;

use url::form_urlencoded;

use super::{FilterState, FilterValue, ListDefaults};

/// Serialize every non-empty field of `state`.
pub fn encode(state: &FilterState) -> String {
    encode_inner(state, None)
}

/// Serialize `state`, additionally omitting fields equal to `defaults`.
///
/// Produces the shortest URL that decodes back to `state` under the same
/// defaults.
pub fn encode_compact(state: &FilterState, defaults: &ListDefaults) -> String {
    encode_inner(state, Some(defaults))
}

fn encode_inner(state: &FilterState, defaults: Option<&ListDefaults>) -> String {
    let mut ser = form_urlencoded::Serializer::new(String::new());

    if !state.search.is_empty() {
        ser.append_pair("search", &state.search);
    }

    for (column, value) in &state.filters {
        if value.is_blank() {
            continue;
        }
        match value {
            FilterValue::Scalar(v) => {
                ser.append_pair(&format!("filters[{column}]"), v);
            }
            FilterValue::Range { start, end } => {
                ser.append_pair(&format!("filters[{column}][start]"), start);
                ser.append_pair(&format!("filters[{column}][end]"), end);
            }
        }
    }

    let keep = |is_default: bool| defaults.is_none() || !is_default;

    if !state.sort_field.is_empty()
        && keep(defaults.is_some_and(|d| d.sort_field == state.sort_field))
    {
        ser.append_pair("sort_field", &state.sort_field);
    }
    if keep(defaults.is_some_and(|d| d.sort_direction == state.sort_direction)) {
        ser.append_pair("sort_direction", state.sort_direction.as_str());
    }
    if keep(defaults.is_some_and(|d| d.per_page == state.per_page)) {
        ser.append_pair("per_page", &state.per_page.to_string());
    }
    if keep(state.page == 1) {
        ser.append_pair("page", &state.page.to_string());
    }

    ser.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangePart {
    Start,
    End,
}

#[derive(Default)]
struct PartialRange {
    start: Option<String>,
    end: Option<String>,
}

/// Parse a query string (with or without a leading `?`) into a [`FilterState`].
pub fn decode(query: &str, defaults: &ListDefaults) -> FilterState {
    let query = query.strip_prefix('?').unwrap_or(query);
    let mut state = FilterState::from_defaults(defaults);
    let mut scalars: BTreeMap<String, String> = BTreeMap::new();
    let mut ranges: BTreeMap<String, PartialRange> = BTreeMap::new();

    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "search" => state.search = value.into_owned(),
            "sort_field" => {
                state.sort_field = if value.trim().is_empty() {
                    defaults.sort_field.clone()
                } else {
                    value.into_owned()
                };
            }
            "sort_direction" => {
                state.sort_direction = value.trim().parse().unwrap_or(defaults.sort_direction);
            }
            "per_page" => {
                state.per_page = parse_int(&value)
                    .map(|n| n.clamp(1, i64::from(defaults.max_per_page.max(1))) as u32)
                    .unwrap_or(defaults.per_page);
            }
            "page" => {
                state.page = parse_int(&value)
                    .map(|n| n.clamp(1, i64::from(u32::MAX)) as u32)
                    .unwrap_or(1);
            }
            other => match parse_filter_key(other) {
                Some((column, None)) => {
                    scalars.insert(column.to_string(), value.into_owned());
                }
                Some((column, Some(part))) => {
                    let entry = ranges.entry(column.to_string()).or_default();
                    match part {
                        RangePart::Start => entry.start = Some(value.into_owned()),
                        RangePart::End => entry.end = Some(value.into_owned()),
                    }
                }
                None => {}
            },
        }
    }

    for (column, range) in ranges {
        if let (Some(start), Some(end)) = (range.start, range.end) {
            scalars.remove(&column);
            let value = FilterValue::Range { start, end };
            if !value.is_blank() {
                state.filters.insert(column, value);
            }
        }
    }
    for (column, value) in scalars {
        let value = FilterValue::Scalar(value);
        if !value.is_blank() {
            state.filters.insert(column, value);
        }
    }

    state
}

fn parse_int(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok()
}

/// Split `filters[col]`, `filters[col][start]`, `filters[col][end]`.
fn parse_filter_key(key: &str) -> Option<(&str, Option<RangePart>)> {
    let rest = key.strip_prefix("filters[")?;
    let close = rest.find(']')?;
    let (column, tail) = (&rest[..close], &rest[close + 1..]);
    if column.is_empty() || column.contains('[') {
        return None;
    }
    match tail {
        "" => Some((column, None)),
        "[start]" => Some((column, Some(RangePart::Start))),
        "[end]" => Some((column, Some(RangePart::End))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::list_query::{SortDirection, RESERVED_KEYS};

    fn defaults() -> ListDefaults {
        ListDefaults::default()
    }

    #[test]
    fn empty_query_yields_defaults() {
        let state = decode("", &defaults());
        assert_eq!(state, FilterState::from_defaults(&defaults()));
        assert_eq!(state.sort_field, "id");
        assert_eq!(state.sort_direction, SortDirection::Asc);
        assert_eq!(state.per_page, 10);
        assert_eq!(state.page, 1);
    }

    #[test]
    fn decodes_every_field() {
        let state = decode(
            "?search=al+ice&filters[email]=example&filters[created_at][start]=2024-01-01\
             &filters[created_at][end]=2024-01-31&sort_field=name&sort_direction=DESC\
             &per_page=25&page=3",
            &defaults(),
        );
        assert_eq!(state.search, "al ice");
        assert_eq!(state.filters["email"], FilterValue::scalar("example"));
        assert_eq!(
            state.filters["created_at"],
            FilterValue::range("2024-01-01", "2024-01-31")
        );
        assert_eq!(state.sort_field, "name");
        assert_eq!(state.sort_direction, SortDirection::Desc);
        assert_eq!(state.per_page, 25);
        assert_eq!(state.page, 3);
    }

    #[test]
    fn percent_encoded_brackets_are_accepted() {
        let state = decode("filters%5Bname%5D=bob", &defaults());
        assert_eq!(state.filters["name"], FilterValue::scalar("bob"));
    }

    #[test]
    fn lone_range_bound_is_dropped() {
        let state = decode("filters[created_at][start]=2024-01-01", &defaults());
        assert!(state.filters.is_empty());
    }

    #[test]
    fn blank_filters_are_dropped() {
        let state = decode("filters[name]=&filters[email]=+", &defaults());
        assert!(state.filters.is_empty());
    }

    #[test]
    fn malformed_numbers_fall_back() {
        let state = decode("per_page=lots&page=-4&sort_direction=sideways", &defaults());
        assert_eq!(state.per_page, 10);
        assert_eq!(state.page, 1);
        assert_eq!(state.sort_direction, SortDirection::Asc);
    }

    #[test]
    fn per_page_is_clamped() {
        assert_eq!(decode("per_page=5000", &defaults()).per_page, 100);
        assert_eq!(decode("per_page=0", &defaults()).per_page, 1);
    }

    #[test]
    fn unknown_and_malformed_keys_are_ignored() {
        let state = decode("foo=bar&filters[]=x&filters[a][middle]=y&filters=z", &defaults());
        assert_eq!(state, FilterState::from_defaults(&defaults()));
    }

    #[test]
    fn encode_omits_empty_fields() {
        let state = FilterState::from_defaults(&defaults());
        assert_eq!(
            encode(&state),
            "sort_field=id&sort_direction=asc&per_page=10&page=1"
        );
    }

    #[test]
    fn encode_nests_range_filters() {
        let state = FilterState::from_defaults(&defaults())
            .with_filter("created_at", FilterValue::range("2024-01-01", "2024-01-31"));
        let encoded = encode_compact(&state, &defaults());
        assert_eq!(
            encoded,
            "filters%5Bcreated_at%5D%5Bstart%5D=2024-01-01&filters%5Bcreated_at%5D%5Bend%5D=2024-01-31"
        );
    }

    #[test]
    fn compact_encoding_of_defaults_is_empty() {
        let state = FilterState::from_defaults(&defaults());
        assert_eq!(encode_compact(&state, &defaults()), "");
    }

    fn column_name() -> impl Strategy<Value = String> {
        "[a-z][a-z_]{0,10}".prop_filter("reserved key", |s| !RESERVED_KEYS.contains(&s.as_str()))
    }

    fn text() -> impl Strategy<Value = String> {
        "\\PC{0,6}[a-zA-Z0-9]\\PC{0,6}"
    }

    fn filter_value() -> impl Strategy<Value = FilterValue> {
        prop_oneof![
            text().prop_map(FilterValue::Scalar),
            (text(), text()).prop_map(|(start, end)| FilterValue::Range { start, end }),
        ]
    }

    fn filter_state() -> impl Strategy<Value = FilterState> {
        (
            prop_oneof![Just(String::new()), text()],
            prop::collection::btree_map(column_name(), filter_value(), 0..4),
            column_name(),
            any::<bool>(),
            1u32..=100,
            1u32..=10_000,
        )
            .prop_map(|(search, filters, sort_field, desc, per_page, page)| FilterState {
                search,
                filters,
                sort_field,
                sort_direction: if desc {
                    SortDirection::Desc
                } else {
                    SortDirection::Asc
                },
                per_page,
                page,
            })
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(state in filter_state()) {
            prop_assert_eq!(decode(&encode(&state), &defaults()), state);
        }

        #[test]
        fn decode_inverts_compact_encode(state in filter_state()) {
            let d = defaults();
            prop_assert_eq!(decode(&encode_compact(&state, &d), &d), state);
        }
    }
}
