//! Query string handling for relay requests.

use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use super::error::ApiError;

/// Only this exact shape is accepted, e.g. `2023-01-01T00:00:00Z`.
pub const FROM_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Raw values from the query string. The first occurrence of a key wins.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RelayQuery {
    pub from_time: Option<String>,
    pub items_cap: Option<String>,
}

impl RelayQuery {
    pub fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        let Some(raw) = raw else {
            return query;
        };

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                "from_time" if query.from_time.is_none() => {
                    query.from_time = Some(value.into_owned())
                }
                "items_cap" if query.items_cap.is_none() => {
                    query.items_cap = Some(value.into_owned())
                }
                _ => {}
            }
        }
        query
    }
}

pub fn parse_from_time(value: &str) -> Result<DateTime<Utc>, ApiError> {
    // chrono accepts single-digit fields for %m/%d/%H; the fixed width does not
    let parsed = if value.len() == 20 {
        NaiveDateTime::parse_from_str(value, FROM_TIME_FORMAT).ok()
    } else {
        None
    };
    parsed.map(|t| t.and_utc()).ok_or_else(|| {
        ApiError::BadRequest(format!(
            "Bad from_time {:?}, expected YYYY-MM-DDTHH:MM:SSZ",
            value
        ))
    })
}

/// Lower bound used when the query has no `from_time`: `days_ago` days
/// before `now`, clamped to the earliest representable time.
pub fn default_from_time(now: DateTime<Utc>, days_ago: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days_ago))
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Accepts a positive integer not above `max`.
pub fn parse_items_cap(value: &str, max: usize) -> Result<usize, ApiError> {
    match value.parse::<usize>() {
        Ok(0) => Err(ApiError::BadRequest(
            "items_cap must be a positive integer".into(),
        )),
        Ok(cap) if cap > max => Err(ApiError::BadRequest(format!(
            "items_cap must not exceed {}",
            max
        ))),
        Ok(cap) => Ok(cap),
        Err(_) => Err(ApiError::BadRequest(format!(
            "Bad items_cap {:?}, expected a positive integer",
            value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_query_keeps_first_value() {
        let query = RelayQuery::parse(Some("items_cap=3&from_time=2023-01-01T00%3A00%3A00Z&items_cap=9"));
        assert_eq!(
            query,
            RelayQuery {
                from_time: Some("2023-01-01T00:00:00Z".into()),
                items_cap: Some("3".into()),
            }
        );
    }

    #[test]
    fn test_parse_query_absent() {
        assert_eq!(RelayQuery::parse(None), RelayQuery::default());
        assert_eq!(RelayQuery::parse(Some("other=1")), RelayQuery::default());
    }

    #[test]
    fn test_from_time_strict() {
        assert_eq!(
            parse_from_time("2023-01-01T00:00:00Z").unwrap(),
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap()
        );
        for bad in [
            "2023-01-01",
            "2023-1-01T00:00:00Z",
            "2023-01-01T00:00:00+00:00",
            "2023-01-01T00:00:00.000Z",
            "2023-13-01T00:00:00Z",
            "yesterday",
            "",
        ] {
            assert!(parse_from_time(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_default_from_time() {
        let now = Utc.with_ymd_and_hms(2023, 1, 31, 12, 0, 0).unwrap();
        assert_eq!(
            default_from_time(now, 30),
            Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(default_from_time(now, 0), now);
    }

    #[test]
    fn test_default_from_time_clamps_huge_spans() {
        assert_eq!(
            default_from_time(Utc::now(), u32::MAX),
            DateTime::<Utc>::MIN_UTC
        );
    }

    #[test]
    fn test_items_cap() {
        assert_eq!(parse_items_cap("5", 100).unwrap(), 5);
        assert_eq!(parse_items_cap("100", 100).unwrap(), 100);
        for bad in ["0", "-1", "abc", "", "1.5", "101"] {
            assert!(
                matches!(parse_items_cap(bad, 100), Err(ApiError::BadRequest(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }
}
