// BurstScan - core/normalizer.rs
//
// Line normalizers: turn one raw access-log line into a `LogRecord`.
// Two stateless strategies share one trait; the format is chosen once at
// startup and the same strategy handles every line of the run.

use crate::core::model::LogRecord;
use crate::core::tokenizer::tokenize;
use crate::util::constants;
use crate::util::error::ParseError;
use chrono::{DateTime, FixedOffset};
use std::collections::BTreeMap;

/// Capability shared by all line formats.
pub trait LineNormalizer {
    /// Normalise a line, reporting why a malformed line was rejected.
    ///
    /// Returns `Ok(None)` for a blank line, which is not an error.
    fn try_normalize(&self, line: &str) -> Result<Option<LogRecord>, ParseError>;

    /// Normalise a line, treating every failure as "no record".
    fn normalize(&self, line: &str) -> Option<LogRecord> {
        self.try_normalize(line).ok().flatten()
    }
}

/// Supported input line formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Apache/Nginx "combined" (and "common") log format.
    #[default]
    Combined,
    /// Labeled Tab-Separated Values.
    Ltsv,
}

static COMBINED: CombinedNormalizer = CombinedNormalizer;
static LTSV: LtsvNormalizer = LtsvNormalizer;

impl LogFormat {
    /// The normalizer strategy for this format.
    pub fn normalizer(self) -> &'static dyn LineNormalizer {
        match self {
            LogFormat::Combined => &COMBINED,
            LogFormat::Ltsv => &LTSV,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LogFormat::Combined => "combined",
            LogFormat::Ltsv => "ltsv",
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Combined log format
// =============================================================================

/// Normalizer for `host ident user [time] "request" status size "referer" "ua"`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombinedNormalizer;

impl LineNormalizer for CombinedNormalizer {
    fn try_normalize(&self, line: &str) -> Result<Option<LogRecord>, ParseError> {
        let row = line.trim();
        if row.is_empty() {
            return Ok(None);
        }

        let tokens = tokenize(row);
        if tokens.len() < constants::COMBINED_MIN_TOKENS {
            return Err(ParseError::TooFewFields {
                found: tokens.len(),
                required: constants::COMBINED_MIN_TOKENS,
            });
        }

        // ident (1) and user (2) are positional only.
        let column = |idx: usize| tokens.get(idx).copied().unwrap_or_default().to_string();
        let raw_time = tokens[3];
        let timestamp = parse_timestamp(raw_time, constants::COMBINED_TIME_FORMAT)?;
        let (method, path) = split_request(tokens[4]);

        Ok(Some(LogRecord {
            host: tokens[0].to_string(),
            raw_time: raw_time.to_string(),
            timestamp,
            request: tokens[4].to_string(),
            method,
            path,
            status: column(5),
            size: column(6),
            referer: column(7),
            user_agent: column(8),
            extra: BTreeMap::new(),
        }))
    }
}

// =============================================================================
// LTSV
// =============================================================================

/// Normalizer for tab-separated `label:value` lines.
///
/// `req` and `time` are required. `host`, `status`, `size`, `referer` and
/// `ua` fill the matching record fields (empty when absent); every other
/// label is carried in `LogRecord::extra`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LtsvNormalizer;

impl LineNormalizer for LtsvNormalizer {
    fn try_normalize(&self, line: &str) -> Result<Option<LogRecord>, ParseError> {
        let row = line.trim();
        if row.is_empty() {
            return Ok(None);
        }

        // Later duplicates overwrite earlier ones.
        let mut values: BTreeMap<String, String> = row
            .split('\t')
            .filter_map(|field| field.split_once(':'))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        let request = values
            .remove("req")
            .ok_or(ParseError::MissingField { field: "req" })?;
        let raw_time = values
            .remove("time")
            .ok_or(ParseError::MissingField { field: "time" })?;
        let timestamp = parse_timestamp(&raw_time, constants::LTSV_TIME_FORMAT)?;
        let (method, path) = split_request(&request);

        let mut take = |name: &str| values.remove(name).unwrap_or_default();
        let host = take("host");
        let status = take("status");
        let size = take("size");
        let referer = take("referer");
        let user_agent = take("ua");

        // These names are derived from `req`/`time` and shadow any label.
        for derived in ["method", "path", "date"] {
            values.remove(derived);
        }

        Ok(Some(LogRecord {
            host,
            raw_time,
            timestamp,
            request,
            method,
            path,
            status,
            size,
            referer,
            user_agent,
            extra: values,
        }))
    }
}

// =============================================================================
// Shared helpers
// =============================================================================

/// Split a request line into method and target.
///
/// The target is the second whitespace-separated word, so the protocol
/// suffix is not part of it. A request without a target (e.g. `-`) yields
/// an empty path.
fn split_request(request: &str) -> (String, String) {
    let mut words = request.split_whitespace();
    let method = words.next().unwrap_or_default().to_string();
    let path = words.next().unwrap_or_default().to_string();
    (method, path)
}

/// Parse an access-log timestamp, keeping its UTC offset.
fn parse_timestamp(
    raw: &str,
    format: &'static str,
) -> Result<DateTime<FixedOffset>, ParseError> {
    DateTime::parse_from_str(raw, format).map_err(|_| ParseError::InvalidTimestamp {
        raw: raw.to_string(),
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMBINED_LINE: &str = r#"1.2.3.4 - - [10/Oct/2023:13:55:36 +0900] "GET /login?user=a HTTP/1.1" 401 512 "https://example.com/" "curl/8.0""#;

    #[test]
    fn test_combined_full_line() {
        let record = CombinedNormalizer.normalize(COMBINED_LINE).unwrap();
        assert_eq!(record.host, "1.2.3.4");
        assert_eq!(record.raw_time, "10/Oct/2023:13:55:36 +0900");
        assert_eq!(record.request, "GET /login?user=a HTTP/1.1");
        assert_eq!(record.method, "GET");
        assert_eq!(record.path, "/login?user=a");
        assert_eq!(record.status, "401");
        assert_eq!(record.size, "512");
        assert_eq!(record.referer, "https://example.com/");
        assert_eq!(record.user_agent, "curl/8.0");
        assert!(record.extra.is_empty());
        assert_eq!(record.timestamp.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(
            record.epoch_secs(),
            DateTime::parse_from_rfc3339("2023-10-10T04:55:36Z")
                .unwrap()
                .timestamp()
        );
    }

    #[test]
    fn test_combined_surrounding_whitespace_trimmed() {
        let line = format!("  {COMBINED_LINE}\r\n");
        assert!(CombinedNormalizer.normalize(&line).is_some());
    }

    #[test]
    fn test_combined_common_log_format_accepted() {
        let line = r#"10.0.0.1 - frank [10/Oct/2000:13:55:36 -0700] "GET /apache_pb.gif HTTP/1.0" 200 2326"#;
        let record = CombinedNormalizer.normalize(line).unwrap();
        assert_eq!(record.path, "/apache_pb.gif");
        assert_eq!(record.status, "200");
        assert_eq!(record.referer, "");
        assert_eq!(record.user_agent, "");
    }

    #[test]
    fn test_combined_blank_line_is_absent_not_error() {
        assert_eq!(CombinedNormalizer.try_normalize("   \n"), Ok(None));
    }

    #[test]
    fn test_combined_too_few_fields() {
        assert_eq!(
            CombinedNormalizer.try_normalize("1.2.3.4 - -"),
            Err(ParseError::TooFewFields {
                found: 3,
                required: 5
            })
        );
        assert!(CombinedNormalizer.normalize("1.2.3.4").is_none());
    }

    #[test]
    fn test_combined_bad_timestamp_is_absent() {
        let line = r#"1.2.3.4 - - [yesterday] "GET / HTTP/1.1" 200 1 "-" "ua""#;
        assert!(matches!(
            CombinedNormalizer.try_normalize(line),
            Err(ParseError::InvalidTimestamp { .. })
        ));
        assert!(CombinedNormalizer.normalize(line).is_none());
    }

    #[test]
    fn test_combined_request_without_target() {
        let line = r#"1.2.3.4 - - [10/Oct/2023:13:55:36 +0000] "-" 400 0 "-" "-""#;
        let record = CombinedNormalizer.normalize(line).unwrap();
        assert_eq!(record.method, "-");
        assert_eq!(record.path, "");
    }

    #[test]
    fn test_ltsv_full_line() {
        let line = "host:1.2.3.4\ttime:[10/Oct/2023:13:55:36 +0000]\treq:POST /api?x=1 HTTP/1.1\tstatus:200\tsize:10\treferer:-\tua:bot\tvhost:example.com";
        let record = LtsvNormalizer.normalize(line).unwrap();
        assert_eq!(record.host, "1.2.3.4");
        assert_eq!(record.raw_time, "[10/Oct/2023:13:55:36 +0000]");
        assert_eq!(record.method, "POST");
        assert_eq!(record.path, "/api?x=1");
        assert_eq!(record.user_agent, "bot");
        assert_eq!(record.extra.get("vhost").map(String::as_str), Some("example.com"));
        assert!(!record.extra.contains_key("req"));
    }

    #[test]
    fn test_ltsv_value_may_contain_colons() {
        let line = "time:[10/Oct/2023:13:55:36 +0000]\treq:GET / HTTP/1.1\treferer:http://a:8080/";
        let record = LtsvNormalizer.normalize(line).unwrap();
        assert_eq!(record.referer, "http://a:8080/");
        assert_eq!(record.host, "");
    }

    #[test]
    fn test_ltsv_last_duplicate_wins() {
        let line = "host:a\ttime:[10/Oct/2023:13:55:36 +0000]\treq:GET / HTTP/1.1\thost:b";
        assert_eq!(LtsvNormalizer.normalize(line).unwrap().host, "b");
    }

    #[test]
    fn test_ltsv_missing_req() {
        let line = "host:a\ttime:[10/Oct/2023:13:55:36 +0000]";
        assert_eq!(
            LtsvNormalizer.try_normalize(line),
            Err(ParseError::MissingField { field: "req" })
        );
    }

    #[test]
    fn test_ltsv_missing_time() {
        let line = "host:a\treq:GET / HTTP/1.1";
        assert_eq!(
            LtsvNormalizer.try_normalize(line),
            Err(ParseError::MissingField { field: "time" })
        );
    }

    #[test]
    fn test_ltsv_time_requires_brackets() {
        let line = "host:a\ttime:10/Oct/2023:13:55:36 +0000\treq:GET / HTTP/1.1";
        assert!(LtsvNormalizer.normalize(line).is_none());
    }

    #[test]
    fn test_ltsv_blank_line() {
        assert_eq!(LtsvNormalizer.try_normalize("\t \n"), Ok(None));
    }

    #[test]
    fn test_format_selects_strategy() {
        let combined = LogFormat::Combined.normalizer();
        let ltsv = LogFormat::Ltsv.normalizer();
        assert!(combined.normalize(COMBINED_LINE).is_some());
        assert!(ltsv.normalize(COMBINED_LINE).is_none());
        assert_eq!(LogFormat::default(), LogFormat::Combined);
    }
}
