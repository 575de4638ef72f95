use axum::http::HeaderMap;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;

/// Header carrying the webhook event type, e.g. `push`.
pub const EVENT_TYPE_HEADER: &str = "x-github-event";
/// Header carrying the unique id github assigns to each delivery.
pub const DELIVERY_ID_HEADER: &str = "x-github-delivery";

pub const PUSH_EVENT: &str = "push";

/// Numeric timestamps at or above this magnitude are epoch milliseconds,
/// anything below is epoch seconds.
const EPOCH_MILLIS_CUTOFF: i64 = 100_000_000_000;

/// The subset of inbound headers kept in the forwarded record. Every other
/// header is dropped, and a github header the inbound request did not carry
/// is omitted from the JSON rather than serialized empty.
#[derive(Clone, Debug, Serialize, Eq, PartialEq)]
pub struct EventHeaders {
    #[serde(rename = "x-github-event", skip_serializing_if = "Option::is_none")]
    pub event: Option<String>,
    #[serde(rename = "x-github-delivery", skip_serializing_if = "Option::is_none")]
    pub delivery: Option<String>,
}

impl EventHeaders {
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let header_value =
            |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(String::from);

        Self {
            event: header_value(EVENT_TYPE_HEADER),
            delivery: header_value(DELIVERY_ID_HEADER),
        }
    }
}

/// The record posted to logstash. The downstream index expects the document
/// under a `json` key, not `body`.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LogRecord {
    pub headers: EventHeaders,
    pub json: Value,
}

/// Reshape an inbound webhook into the record logstash expects: headers
/// filtered down to the github ones, repository timestamps rewritten as
/// ISO8601 strings, and the payload moved under the `json` key.
pub fn build_log_record(headers: &HeaderMap, mut payload: Value) -> LogRecord {
    fix_repository_dates(&mut payload);

    LogRecord {
        headers: EventHeaders::from_header_map(headers),
        json: payload,
    }
}

/// Github sends `repository.created_at` and `repository.pushed_at` as unix
/// timestamps on push events, while everywhere else these fields are
/// ISO8601 strings. Rewrite the two fields in place; an absent repository,
/// absent field or unconvertible value is left untouched.
fn fix_repository_dates(payload: &mut Value) {
    let Some(repository) = payload.get_mut("repository").and_then(Value::as_object_mut) else {
        return;
    };

    for field in ["created_at", "pushed_at"] {
        if let Some(value) = repository.get_mut(field) {
            if let Some(iso) = to_iso8601(value) {
                *value = Value::String(iso);
            }
        }
    }
}

/// Convert a timestamp value to an ISO8601 string with millisecond
/// precision and a `Z` suffix. Integers follow the `EPOCH_MILLIS_CUTOFF`
/// rule; strings are parsed as RFC3339 first, so the conversion accepts its
/// own output, and as a numeric epoch otherwise. Returns `None` for values
/// that cannot be interpreted as a date.
pub fn to_iso8601(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => number.as_i64().and_then(epoch_to_iso8601),
        Value::String(text) => {
            if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
                return Some(format_iso8601(parsed.with_timezone(&Utc)));
            }
            text.parse::<i64>().ok().and_then(epoch_to_iso8601)
        }
        _ => None,
    }
}

fn epoch_to_iso8601(value: i64) -> Option<String> {
    // unsigned_abs: i64::MIN has no i64 absolute value.
    let parsed = if value.unsigned_abs() >= EPOCH_MILLIS_CUTOFF.unsigned_abs() {
        Utc.timestamp_millis_opt(value)
    } else {
        Utc.timestamp_opt(value, 0)
    };

    parsed.single().map(format_iso8601)
}

fn format_iso8601(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue};
    use serde_json::json;

    use super::{build_log_record, to_iso8601, EventHeaders};

    fn push_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-github-event", HeaderValue::from_static("push"));
        headers.insert("x-github-delivery", HeaderValue::from_static("abc"));
        headers.insert("user-agent", HeaderValue::from_static("GitHub-Hookshot/044aadd"));
        headers.insert("content-type", HeaderValue::from_static("application/json"));
        headers
    }

    #[test]
    fn converts_epoch_seconds() {
        let iso = to_iso8601(&json!(1609459200)).unwrap();
        assert_eq!(iso, "2021-01-01T00:00:00.000Z");
    }

    #[test]
    fn converts_epoch_milliseconds() {
        let iso = to_iso8601(&json!(1609459200123i64)).unwrap();
        assert_eq!(iso, "2021-01-01T00:00:00.123Z");
    }

    #[test]
    fn converts_numeric_strings() {
        let iso = to_iso8601(&json!("1609459200")).unwrap();
        assert_eq!(iso, "2021-01-01T00:00:00.000Z");
    }

    #[test]
    fn conversion_is_idempotent_over_its_own_output() {
        let once = to_iso8601(&json!(1609459200)).unwrap();
        let twice = to_iso8601(&json!(once)).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn tolerates_extreme_integer_timestamps() {
        assert_eq!(to_iso8601(&json!(i64::MIN)), None);
        assert_eq!(to_iso8601(&json!(i64::MAX)), None);
    }

    #[test]
    fn rejects_values_that_are_not_dates() {
        assert_eq!(to_iso8601(&json!("not a date")), None);
        assert_eq!(to_iso8601(&json!(true)), None);
        assert_eq!(to_iso8601(&json!(null)), None);
        assert_eq!(to_iso8601(&json!({"nested": 1})), None);
    }

    #[test]
    fn keeps_only_github_headers() {
        let headers = EventHeaders::from_header_map(&push_headers());

        assert_eq!(
            headers,
            EventHeaders {
                event: Some("push".to_string()),
                delivery: Some("abc".to_string()),
            }
        );
    }

    #[test]
    fn omits_absent_github_headers_entirely() {
        let serialized =
            serde_json::to_value(EventHeaders::from_header_map(&HeaderMap::new())).unwrap();
        assert_eq!(serialized, json!({}));
    }

    #[test]
    fn omits_a_missing_delivery_id_from_the_serialized_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-github-event", HeaderValue::from_static("push"));

        let serialized =
            serde_json::to_value(EventHeaders::from_header_map(&headers)).unwrap();
        assert_eq!(serialized, json!({"x-github-event": "push"}));
    }

    #[test]
    fn rewrites_repository_dates_and_renames_body_to_json() {
        let record = build_log_record(
            &push_headers(),
            json!({
                "repository": {
                    "created_at": 1609459200,
                    "pushed_at": 1609459200,
                    "name": "r"
                },
                "ref": "refs/heads/main"
            }),
        );

        let serialized = serde_json::to_value(&record).unwrap();
        assert_eq!(
            serialized,
            json!({
                "headers": {
                    "x-github-event": "push",
                    "x-github-delivery": "abc"
                },
                "json": {
                    "repository": {
                        "created_at": "2021-01-01T00:00:00.000Z",
                        "pushed_at": "2021-01-01T00:00:00.000Z",
                        "name": "r"
                    },
                    "ref": "refs/heads/main"
                }
            })
        );
    }

    #[test]
    fn leaves_a_payload_without_repository_untouched() {
        let payload = json!({"zen": "Keep it logically awesome."});
        let record = build_log_record(&push_headers(), payload.clone());

        assert_eq!(record.json, payload);
    }

    #[test]
    fn leaves_missing_or_unconvertible_date_fields_untouched() {
        let record = build_log_record(
            &push_headers(),
            json!({
                "repository": {
                    "created_at": {"odd": "shape"},
                    "name": "r"
                }
            }),
        );

        assert_eq!(
            record.json,
            json!({
                "repository": {
                    "created_at": {"odd": "shape"},
                    "name": "r"
                }
            })
        );
    }
}
