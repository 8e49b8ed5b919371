// BurstScan - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no platform
// dependencies. These types are the shared vocabulary across all layers.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;

// =============================================================================
// Log Record (normalised output of a line normalizer)
// =============================================================================

/// A single access-log request, normalised across combined and LTSV input.
///
/// Immutable once built. A record only exists if its timestamp parsed, so
/// `timestamp` always corresponds to `raw_time`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    /// Client identifier (IP address or host name).
    pub host: String,

    /// Timestamp text exactly as it appeared in the log.
    #[serde(rename = "time")]
    pub raw_time: String,

    /// Parsed timestamp, keeping the log's UTC offset.
    pub timestamp: DateTime<FixedOffset>,

    /// Full request line, e.g. `GET /index.html HTTP/1.1`.
    pub request: String,

    /// Request method (first word of the request line).
    pub method: String,

    /// Request target including any `?query` suffix.
    pub path: String,

    pub status: String,
    pub size: String,
    pub referer: String,
    pub user_agent: String,

    /// LTSV labels without a first-class field, keyed by label.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl LogRecord {
    /// Seconds since the Unix epoch, offset-corrected.
    pub fn epoch_secs(&self) -> i64 {
        self.timestamp.timestamp()
    }

    /// The path with any `?query` suffix removed.
    pub fn path_without_query(&self) -> &str {
        match self.path.split_once('?') {
            Some((path, _)) => path,
            None => &self.path,
        }
    }

    /// The query string after the first `?`, if any.
    pub fn query(&self) -> Option<&str> {
        self.path.split_once('?').map(|(_, query)| query)
    }

    /// Look up a field by its template name.
    ///
    /// Known names map onto first-class fields:
    /// `host time date req method path query status size referer ua`.
    /// Anything else is looked up among the LTSV extras.
    pub fn field(&self, name: &str) -> Option<Cow<'_, str>> {
        let value = match name {
            "host" => &self.host,
            "time" => &self.raw_time,
            "date" => return Some(Cow::Owned(self.timestamp.to_rfc3339())),
            "req" => &self.request,
            "method" => &self.method,
            "path" => &self.path,
            "query" => return self.query().map(Cow::Borrowed),
            "status" => &self.status,
            "size" => &self.size,
            "referer" => &self.referer,
            "ua" => &self.user_agent,
            other => return self.extra.get(other).map(|v| Cow::Borrowed(v.as_str())),
        };
        Some(Cow::Borrowed(value.as_str()))
    }
}

// =============================================================================
// Burst (output of the sequence detector)
// =============================================================================

/// A closed run of requests from one host that met the sequence threshold.
///
/// `records` is never empty and is in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct Burst {
    pub host: String,
    pub records: Vec<LogRecord>,
}

impl Burst {
    /// Number of requests in the run.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    /// The first request of the run. Head and foot lines render against it.
    pub fn first(&self) -> Option<&LogRecord> {
        self.records.first()
    }

    /// The last request of the run.
    pub fn last(&self) -> Option<&LogRecord> {
        self.records.last()
    }
}

// =============================================================================
// Run Summary
// =============================================================================

/// Summary statistics for a completed detection run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    /// Lines read from the input stream(s), blank lines included.
    pub lines_read: u64,

    /// Lines normalised into records.
    pub records_parsed: u64,

    /// Non-blank lines that could not be normalised.
    pub lines_skipped: u64,

    /// Records dropped by the exclusion rules.
    pub records_excluded: u64,

    /// Bursts written to the output sink.
    pub bursts_reported: u64,

    /// Wall-clock run duration.
    pub duration: std::time::Duration,
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build a combined-style record at `secs` seconds past a fixed base time.
    pub fn record_at(host: &str, secs: i64) -> LogRecord {
        let base = DateTime::parse_from_rfc3339("2023-10-10T13:55:00+00:00")
            .expect("valid base timestamp");
        let timestamp = base + chrono::Duration::seconds(secs);
        LogRecord {
            host: host.to_string(),
            raw_time: timestamp.format("%d/%b/%Y:%H:%M:%S %z").to_string(),
            timestamp,
            request: "GET /a HTTP/1.1".to_string(),
            method: "GET".to_string(),
            path: "/a".to_string(),
            status: "200".to_string(),
            size: "512".to_string(),
            referer: "-".to_string(),
            user_agent: "bot".to_string(),
            extra: BTreeMap::new(),
        }
    }
}
