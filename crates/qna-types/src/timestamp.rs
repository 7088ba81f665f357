//! Timestamp parsing shared by request bodies and stored rows.
//!
//! Offsets are honoured; a value without one is read as UTC.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, de};

/// Storage form. `AutoSi` keeps sub-microsecond digits so a stored value reads
/// back unchanged.
pub fn format(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let raw = raw.trim();
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| raw.parse::<NaiveDateTime>().map(|ndt| ndt.and_utc()))
        // SQLite's own datetime('now') form.
        .or_else(|_| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").map(|ndt| ndt.and_utc())
        })
}

/// For `#[serde(default, deserialize_with = "...")]` on `Option<DateTime<Utc>>`.
pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)?
        .map(|raw| parse(&raw).map_err(|e| de::Error::custom(format!("'{raw}': {e}"))))
        .transpose()
}
