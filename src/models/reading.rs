use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// One sample written by the collector into the readings table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub power_w: f64,
    pub voltage_v: f64,
    pub current_ma: f64,
}

/// Sort readings oldest first.
pub fn sort_ascending(readings: &mut [Reading]) {
    readings.sort_by_key(|r| r.timestamp);
}

/// Decode rows one at a time so a single bad row (a null power value, say)
/// is dropped instead of failing the whole batch.
pub fn from_rows(rows: Vec<Value>) -> Vec<Reading> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<Reading>(row) {
            Ok(reading) => Some(reading),
            Err(e) => {
                warn!(error = %e, "Skipping malformed reading row");
                None
            }
        })
        .collect()
}

/// Parse a PostgREST timestamp. Columns without a time zone come back naive
/// and are treated as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    // Postgres may render offsets as "+00" without minutes
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}
