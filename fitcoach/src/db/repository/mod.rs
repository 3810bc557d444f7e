mod conversations;
mod fitness;
mod knowledge;

pub use conversations::ConversationRepository;
pub use fitness::FitnessRepository;
pub use knowledge::KnowledgeRepository;

use chrono::{DateTime, SecondsFormat, Utc};
use libsql::Value;

use crate::error::{CoachError, Result};

/// RFC 3339 with microseconds and a `Z` suffix. Fixed width, so stored
/// timestamps compare correctly as text.
pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CoachError::Internal(format!("Invalid stored timestamp '{raw}': {e}")))
}

/// Tracker tables are written by another subsystem, so numeric columns may
/// hold integers, reals or numeric text.
pub(crate) fn value_as_f64(value: Value) -> Option<f64> {
    match value {
        Value::Integer(i) => Some(i as f64),
        Value::Real(f) => Some(f),
        Value::Text(s) => s.trim().parse().ok(),
        Value::Null | Value::Blob(_) => None,
    }
}

pub(crate) fn value_as_i64(value: Value) -> Option<i64> {
    match value {
        Value::Integer(i) => Some(i),
        Value::Real(f) => Some(f.round() as i64),
        Value::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f.round() as i64))
        }
        Value::Null | Value::Blob(_) => None,
    }
}

pub(crate) fn value_as_string(value: Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Null | Value::Blob(_) => None,
    }
}
