//! Blob query construction
//!
//! Turns the loosely typed filter values a user types on the command line into
//! the query the service understands. Parsing is permissive: a value that does
//! not look like a state or timestamp is dropped from the query instead of
//! failing the request.

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::types::BlobState;

/// Lower bound used when only an upper bound is given
pub const RANGE_FLOOR: &str = "1990-01-01";
/// Upper bound used when only a lower bound is given
pub const RANGE_CEILING: &str = "3000-01-01";

const DAY_START: &str = "T00:00:00+01:00";
const DAY_END: &str = "T23:59:59+01:00";

static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{4}-[01]?[0-9]-[0-3]?[0-9]$").expect("valid date pattern"));

static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]{4}-[01]?[0-9]-[0-3]?[0-9]T[0-2][0-9]:[0-6][0-9]:[0-6][0-9][+-][0-2][0-9]")
        .expect("valid date-time pattern")
});

/// Raw filter values, exactly as supplied by the caller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlobQueryInput {
    pub state: Option<String>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
    pub modified_after: Option<String>,
    pub modified_before: Option<String>,
    pub created_day: Option<String>,
    pub modified_day: Option<String>,
}

/// Validated query for listing blobs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_time: Option<[String; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modification_time: Option<[String; 2]>,
}

impl BlobQuery {
    pub fn is_empty(&self) -> bool {
        self.state.is_none() && self.creation_time.is_none() && self.modification_time.is_none()
    }

    /// Query-string pairs. Ranges repeat their key once per bound.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(state) = &self.state {
            pairs.push(("state", state.clone()));
        }
        for (name, range) in [
            ("creationTime", &self.creation_time),
            ("modificationTime", &self.modification_time),
        ] {
            if let Some([from, to]) = range {
                pairs.push((name, from.clone()));
                pairs.push((name, to.clone()));
            }
        }
        pairs
    }
}

impl From<&BlobQueryInput> for BlobQuery {
    fn from(input: &BlobQueryInput) -> Self {
        build_blob_query(input)
    }
}

pub fn build_blob_query(input: &BlobQueryInput) -> BlobQuery {
    BlobQuery {
        state: input.state.as_deref().filter(|s| is_blob_state(s)).map(str::to_string),
        creation_time: time_range(
            valid_timestamp(input.created_after.as_deref(), true),
            valid_timestamp(input.created_before.as_deref(), true),
            valid_timestamp(input.created_day.as_deref(), false),
        ),
        modification_time: time_range(
            valid_timestamp(input.modified_after.as_deref(), true),
            valid_timestamp(input.modified_before.as_deref(), true),
            valid_timestamp(input.modified_day.as_deref(), false),
        ),
    }
}

/// Case-insensitive membership check against the known blob states
pub fn is_blob_state(value: &str) -> bool {
    !value.is_empty() && value.to_uppercase().parse::<BlobState>().is_ok()
}

/// Returns the normalized timestamp, or `None` when the value is unusable.
///
/// Dates pass through unchanged. Date-times with an offset are accepted only
/// when `accept_hours` is set and come back as a UTC instant.
pub fn valid_timestamp(value: Option<&str>, accept_hours: bool) -> Option<String> {
    let value = value?;

    if accept_hours && DATE_TIME.is_match(value) {
        return parse_offset_date_time(value).map(|instant| {
            instant
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true)
        });
    }

    if DATE.is_match(value) {
        return Some(value.to_string());
    }

    None
}

fn parse_offset_date_time(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z"))
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%#z"))
        .ok()
        // chrono keeps second 60 as a leap second in the sub-second part
        .filter(|instant| instant.timestamp_subsec_nanos() < 1_000_000_000)
}

fn time_range(after: Option<String>, before: Option<String>, day: Option<String>) -> Option<[String; 2]> {
    if let Some(day) = day {
        return Some([format!("{day}{DAY_START}"), format!("{day}{DAY_END}")]);
    }

    match (after, before) {
        (None, None) => None,
        (None, Some(before)) => Some([RANGE_FLOOR.to_string(), before]),
        (Some(after), None) => Some([after, RANGE_CEILING.to_string()]),
        (Some(after), Some(before)) => Some([after, before]),
    }
}
