//! # Search Parameter Codec
//!
//! Two-way mapping between the URL query string and [`SearchParams`].
//!
//! ```text
//! status=open,claimed&responseTime=10~60&lastActivity=1700000000000:1700086400000
//!     &sort=lastActivity.desc&size=40&direction=next&cursor=1700086400000&live=false
//! ```
//!
//! Decoding never fails. A malformed filter is treated as absent; a
//! malformed pagination field falls back to its default. [`encode`] always
//! writes fields in the same order, so its output doubles as a cache key.

use super::{
    DateFilter, Direction, NumericFilter, SearchParams, SortSpec, ARRAY_DELIMITER,
    DEFAULT_PAGE_SIZE, RANGE_DELIMITER, SLIDER_DELIMITER, SORT_DELIMITER,
};
use crate::sort::SortField;
use crate::time;
use chrono::{DateTime, Utc};
use std::str::FromStr;
use url::form_urlencoded;

/// Parse a raw query string (with or without the leading `?`). `now` is the
/// default cursor.
pub fn decode(query: &str, now: DateTime<Utc>) -> SearchParams {
    decode_with_page_size(query, now, DEFAULT_PAGE_SIZE)
}

/// Like [`decode`], with a deployment-specific page size used whenever the
/// query has no valid `size`.
pub fn decode_with_page_size(query: &str, now: DateTime<Utc>, page_size: u32) -> SearchParams {
    let query = query.strip_prefix('?').unwrap_or(query);
    let pairs = form_urlencoded::parse(query.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()));
    from_pairs(pairs, now, page_size)
}

/// Build [`SearchParams`] from already-decoded key/value pairs. When a key
/// repeats, the last occurrence wins.
pub fn from_pairs<I>(pairs: I, now: DateTime<Utc>, page_size: u32) -> SearchParams
where
    I: IntoIterator<Item = (String, String)>,
{
    let page_size = page_size.max(1);
    let mut params = SearchParams::new(now);
    params.size = page_size;

    for (key, value) in pairs {
        match key.as_str() {
            "status" => params.status = parse_set(&value),
            "callStatus" => params.call_status = parse_set(&value),
            "outcome" => params.outcome = parse_set(&value),
            "companyId" => params.company_id = parse_text(value),
            "visitorId" => params.visitor_id = parse_text(value),
            "claimedBy" => params.claimed_by = parse_text(value),
            "responseTime" => params.response_time = parse_numeric(&value),
            "callDuration" => params.call_duration = parse_numeric(&value),
            "claimAt" => params.claim_at = parse_dates(&value),
            "lastActivity" => params.last_activity = parse_dates(&value),
            "sort" => params.sort = parse_sort(&value),
            "size" => {
                params.size = value
                    .parse::<u32>()
                    .ok()
                    .filter(|size| *size > 0)
                    .unwrap_or(page_size)
            }
            "direction" => params.direction = value.parse().unwrap_or_default(),
            "cursor" => {
                params.cursor = parse_millis(&value).unwrap_or_else(|| time::truncate_millis(now))
            }
            "live" => params.live = value == "true",
            "id" => params.id = parse_text(value),
            _ => {}
        }
    }

    params
}

/// Canonical query string (no leading `?`).
pub fn encode(params: &SearchParams) -> String {
    encode_with(params, true)
}

/// Canonical encoding without the volatile `id` and `live` fields, so that
/// toggling live mode or selecting a row does not invalidate cached pages.
pub fn cache_key(params: &SearchParams) -> String {
    encode_with(params, false)
}

fn encode_with(params: &SearchParams, volatile: bool) -> String {
    let mut out = form_urlencoded::Serializer::new(String::new());

    if let Some(status) = &params.status {
        out.append_pair("status", &join_set(status));
    }
    if let Some(call_status) = &params.call_status {
        out.append_pair("callStatus", &join_set(call_status));
    }
    if let Some(outcome) = &params.outcome {
        out.append_pair("outcome", &join_set(outcome));
    }
    if let Some(company_id) = &params.company_id {
        out.append_pair("companyId", company_id);
    }
    if let Some(visitor_id) = &params.visitor_id {
        out.append_pair("visitorId", visitor_id);
    }
    if let Some(claimed_by) = &params.claimed_by {
        out.append_pair("claimedBy", claimed_by);
    }
    if let Some(filter) = &params.response_time {
        out.append_pair("responseTime", &join_numeric(filter));
    }
    if let Some(filter) = &params.call_duration {
        out.append_pair("callDuration", &join_numeric(filter));
    }
    if let Some(filter) = &params.claim_at {
        out.append_pair("claimAt", &join_dates(filter));
    }
    if let Some(filter) = &params.last_activity {
        out.append_pair("lastActivity", &join_dates(filter));
    }
    if let Some(sort) = &params.sort {
        out.append_pair("sort", &format_sort(sort));
    }
    out.append_pair("size", &params.size.to_string());
    out.append_pair("direction", params.direction.as_str());
    out.append_pair("cursor", &params.cursor.timestamp_millis().to_string());
    if volatile {
        out.append_pair("live", if params.live { "true" } else { "false" });
        if let Some(id) = &params.id {
            out.append_pair("id", id);
        }
    }

    out.finish()
}

// =============================================================================
// Field parsers
// =============================================================================

fn parse_text(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Members that do not parse are dropped; an empty result is absent.
fn parse_set<T: FromStr>(value: &str) -> Option<Vec<T>> {
    let members: Vec<T> = value
        .split(ARRAY_DELIMITER)
        .filter_map(|member| member.parse().ok())
        .collect();
    if members.is_empty() {
        None
    } else {
        Some(members)
    }
}

fn parse_numeric(value: &str) -> Option<NumericFilter> {
    let tokens = value
        .split(SLIDER_DELIMITER)
        .map(|token| token.parse::<i64>().ok())
        .collect::<Option<Vec<_>>>()?;
    match tokens.as_slice() {
        [v] => Some(NumericFilter::Exact(*v)),
        [lo, hi] => Some(NumericFilter::Between(*lo, *hi)),
        _ => None,
    }
}

fn parse_dates(value: &str) -> Option<DateFilter> {
    let tokens = value
        .split(RANGE_DELIMITER)
        .map(parse_millis)
        .collect::<Option<Vec<_>>>()?;
    match tokens.as_slice() {
        [day] => Some(DateFilter::Day(*day)),
        [lo, hi] => Some(DateFilter::Between(*lo, *hi)),
        _ => None,
    }
}

fn parse_millis(value: &str) -> Option<DateTime<Utc>> {
    value.parse::<i64>().ok().and_then(time::from_millis)
}

/// `<field>.<asc|desc>`; a bare field id sorts ascending. Empty input and
/// unknown field ids yield no sort.
fn parse_sort(value: &str) -> Option<SortSpec> {
    let (id, direction) = match value.split_once(SORT_DELIMITER) {
        Some((id, direction)) => (id, direction),
        None => (value, ""),
    };
    let field = id.parse::<SortField>().ok()?;
    Some(SortSpec {
        field,
        desc: direction == "desc",
    })
}

// =============================================================================
// Field serializers
// =============================================================================

fn join_set<T: ToString>(members: &[T]) -> String {
    members
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(&ARRAY_DELIMITER.to_string())
}

fn join_numeric(filter: &NumericFilter) -> String {
    match filter {
        NumericFilter::Exact(v) => v.to_string(),
        NumericFilter::Between(lo, hi) => format!("{lo}{SLIDER_DELIMITER}{hi}"),
    }
}

fn join_dates(filter: &DateFilter) -> String {
    match filter {
        DateFilter::Day(day) => day.timestamp_millis().to_string(),
        DateFilter::Between(lo, hi) => format!(
            "{}{RANGE_DELIMITER}{}",
            lo.timestamp_millis(),
            hi.timestamp_millis()
        ),
    }
}

fn format_sort(sort: &SortSpec) -> String {
    let direction = if sort.desc { "desc" } else { "asc" };
    format!("{}{SORT_DELIMITER}{direction}", sort.field.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lead::{CallStatus, LeadStatus, Outcome};
    use crate::time::from_millis;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        from_millis(1_700_000_000_000).unwrap()
    }

    #[test]
    fn test_empty_query_gives_defaults() {
        let params = decode("", now());
        assert_eq!(params, SearchParams::new(now()));
    }

    #[test]
    fn test_status_set() {
        let params = decode("status=open,claimed", now());
        assert_eq!(params.status, Some(vec![LeadStatus::Open, LeadStatus::Claimed]));
    }

    #[test]
    fn test_invalid_set_members_are_dropped() {
        let params = decode("status=open,bogus&callStatus=nope", now());
        assert_eq!(params.status, Some(vec![LeadStatus::Open]));
        assert_eq!(params.call_status, None);
    }

    #[test]
    fn test_slider_tokens() {
        assert_eq!(decode("responseTime=30", now()).response_time, Some(NumericFilter::Exact(30)));
        assert_eq!(
            decode("callDuration=5~65", now()).call_duration,
            Some(NumericFilter::Between(5, 65))
        );
        assert_eq!(decode("responseTime=1~2~3", now()).response_time, None);
        assert_eq!(decode("responseTime=abc", now()).response_time, None);
        assert_eq!(decode("responseTime=", now()).response_time, None);
    }

    #[test]
    fn test_date_tokens() {
        let params = decode("lastActivity=1000:2000&claimAt=5000", now());
        assert_eq!(
            params.last_activity,
            Some(DateFilter::Between(from_millis(1000).unwrap(), from_millis(2000).unwrap()))
        );
        assert_eq!(params.claim_at, Some(DateFilter::Day(from_millis(5000).unwrap())));
        assert_eq!(decode("claimAt=yesterday", now()).claim_at, None);
    }

    #[test]
    fn test_pagination_fields_fall_back_to_defaults() {
        let params = decode("size=-3&direction=sideways&cursor=soon&live=maybe", now());
        assert_eq!(params.size, DEFAULT_PAGE_SIZE);
        assert_eq!(params.direction, Direction::Next);
        assert_eq!(params.cursor, now());
        assert!(!params.live);

        let params = decode("size=0", now());
        assert_eq!(params.size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_deployment_page_size() {
        assert_eq!(decode_with_page_size("", now(), 25).size, 25);
        assert_eq!(decode_with_page_size("size=junk", now(), 25).size, 25);
        assert_eq!(decode_with_page_size("size=5", now(), 25).size, 5);
        assert_eq!(decode_with_page_size("", now(), 0).size, 1);
    }

    #[test]
    fn test_pagination_fields() {
        let params = decode("size=10&direction=prev&cursor=1234&live=true", now());
        assert_eq!(params.size, 10);
        assert_eq!(params.direction, Direction::Prev);
        assert_eq!(params.cursor, from_millis(1234).unwrap());
        assert!(params.live);
    }

    #[test]
    fn test_sort_parsing() {
        let desc = decode("sort=responseTime.desc", now()).sort.unwrap();
        assert_eq!(desc.field, SortField::ResponseTime);
        assert!(desc.desc);

        let bare = decode("sort=lastActivity", now()).sort.unwrap();
        assert!(!bare.desc);

        assert_eq!(decode("sort=", now()).sort, None);
        assert_eq!(decode("sort=latency.desc", now()).sort, None);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let params = decode("?uuid=abc&start=10&level=error", now());
        assert_eq!(params, SearchParams::new(now()));
    }

    #[test]
    fn test_encoded_strings_are_percent_decoded() {
        let params = decode("claimedBy=user%201&companyId=a%26b", now());
        assert_eq!(params.claimed_by.as_deref(), Some("user 1"));
        assert_eq!(params.company_id.as_deref(), Some("a&b"));
    }

    #[test]
    fn test_canonical_encoding() {
        let mut params = SearchParams::new(from_millis(1_000).unwrap());
        params.status = Some(vec![LeadStatus::Open, LeadStatus::Locked]);
        params.response_time = Some(NumericFilter::Between(10, 60));
        params.sort = Some(SortSpec {
            field: SortField::LastActivity,
            desc: true,
        });
        assert_eq!(
            encode(&params),
            "status=open%2Clocked&responseTime=10%7E60&sort=lastActivity.desc\
             &size=40&direction=next&cursor=1000&live=false"
        );
    }

    #[test]
    fn test_cache_key_ignores_live_and_id() {
        let mut a = SearchParams::new(now());
        let mut b = a.clone();
        a.live = true;
        a.id = Some("lead-007".into());
        b.live = false;
        assert_eq!(cache_key(&a), cache_key(&b));
        assert_ne!(encode(&a), encode(&b));
    }

    fn arb_millis() -> impl Strategy<Value = DateTime<Utc>> {
        (-8_000_000_000_000i64..8_000_000_000_000i64).prop_map(|ms| from_millis(ms).unwrap())
    }

    fn arb_numeric() -> impl Strategy<Value = NumericFilter> {
        prop_oneof![
            any::<i64>().prop_map(NumericFilter::Exact),
            (any::<i64>(), any::<i64>()).prop_map(|(lo, hi)| NumericFilter::Between(lo, hi)),
        ]
    }

    fn arb_dates() -> impl Strategy<Value = DateFilter> {
        prop_oneof![
            arb_millis().prop_map(DateFilter::Day),
            (arb_millis(), arb_millis()).prop_map(|(lo, hi)| DateFilter::Between(lo, hi)),
        ]
    }

    fn arb_set<T: Clone + std::fmt::Debug + 'static>(all: &'static [T]) -> impl Strategy<Value = Vec<T>> {
        proptest::collection::vec(proptest::sample::select(all), 1..5)
    }

    prop_compose! {
        fn arb_params()(
            status in proptest::option::of(arb_set(LeadStatus::ALL)),
            call_status in proptest::option::of(arb_set(CallStatus::ALL)),
            outcome in proptest::option::of(arb_set(Outcome::ALL)),
            company_id in proptest::option::of(".{1,12}"),
            visitor_id in proptest::option::of("[a-z0-9-]{1,12}"),
            claimed_by in proptest::option::of(".{1,12}"),
            response_time in proptest::option::of(arb_numeric()),
            call_duration in proptest::option::of(arb_numeric()),
            claim_at in proptest::option::of(arb_dates()),
            last_activity in proptest::option::of(arb_dates()),
            sort in proptest::option::of((proptest::sample::select(SortField::ALL), any::<bool>())),
            size in 1u32..1000,
            prev in any::<bool>(),
            cursor in arb_millis(),
            live in any::<bool>(),
            id in proptest::option::of("[a-z0-9-]{1,16}"),
        ) -> SearchParams {
            SearchParams {
                status,
                call_status,
                outcome,
                company_id,
                visitor_id,
                claimed_by,
                response_time,
                call_duration,
                claim_at,
                last_activity,
                sort: sort.map(|(field, desc)| SortSpec { field, desc }),
                size,
                direction: if prev { Direction::Prev } else { Direction::Next },
                cursor,
                live,
                id,
            }
        }
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(params in arb_params()) {
            let decoded = decode(&encode(&params), now());
            prop_assert_eq!(decoded, params);
        }

        #[test]
        fn prop_decode_never_panics(query in ".{0,64}") {
            let _ = decode(&query, now());
        }
    }
}
