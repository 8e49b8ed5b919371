// BurstScan - core/filter.rs
//
// Exclusion rules applied to every record before it reaches the detector.
// Any matching rule drops the record (OR-combined).
// Core layer: pure logic, no I/O.

use crate::core::model::LogRecord;
use crate::util::error::FilterError;
use regex::{Regex, RegexBuilder};
use std::collections::HashSet;

/// Hosts and patterns whose requests are never considered for detection.
///
/// Immutable once the run starts; the pipeline only reads it.
#[derive(Debug, Clone, Default)]
pub struct ExclusionRules {
    /// Exact-match client hosts.
    excluded_hosts: HashSet<String>,

    /// Case-insensitive pattern tested against the user agent.
    user_agent_pattern: Option<Regex>,

    /// Pattern tested against the path with its query string removed.
    path_pattern: Option<Regex>,
}

impl ExclusionRules {
    /// Returns true if no rule is configured.
    pub fn is_empty(&self) -> bool {
        self.excluded_hosts.is_empty()
            && self.user_agent_pattern.is_none()
            && self.path_pattern.is_none()
    }

    /// Add hosts to the exact-match exclusion set.
    pub fn with_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_hosts.extend(hosts.into_iter().map(Into::into));
        self
    }

    /// Set the user-agent pattern. Matching ignores case.
    /// An empty pattern clears the rule.
    pub fn with_user_agent_pattern(mut self, pattern: &str) -> Result<Self, FilterError> {
        self.user_agent_pattern = compile(pattern, true)?;
        Ok(self)
    }

    /// Set the path pattern. Matching is case-sensitive.
    /// An empty pattern clears the rule.
    pub fn with_path_pattern(mut self, pattern: &str) -> Result<Self, FilterError> {
        self.path_pattern = compile(pattern, false)?;
        Ok(self)
    }

    /// Returns true if the record must be dropped before detection.
    pub fn should_drop(&self, record: &LogRecord) -> bool {
        if self.excluded_hosts.contains(&record.host) {
            return true;
        }

        if let Some(ref ua) = self.user_agent_pattern {
            if ua.is_match(&record.user_agent) {
                return true;
            }
        }

        if let Some(ref path) = self.path_pattern {
            if path.is_match(record.path_without_query()) {
                return true;
            }
        }

        false
    }
}

fn compile(pattern: &str, case_insensitive: bool) -> Result<Option<Regex>, FilterError> {
    if pattern.is_empty() {
        return Ok(None);
    }
    RegexBuilder::new(pattern)
        .case_insensitive(case_insensitive)
        .build()
        .map(Some)
        .map_err(|e| FilterError::InvalidRegex {
            pattern: pattern.to_string(),
            source: e,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::test_support::record_at;

    #[test]
    fn test_empty_rules_drop_nothing() {
        let rules = ExclusionRules::default();
        assert!(rules.is_empty());
        assert!(!rules.should_drop(&record_at("1.2.3.4", 0)));
    }

    #[test]
    fn test_excluded_host_exact_match() {
        let rules = ExclusionRules::default().with_hosts(["10.0.0.1", "127.0.0.1"]);
        assert!(rules.should_drop(&record_at("127.0.0.1", 0)));
        assert!(!rules.should_drop(&record_at("127.0.0.10", 0)));
    }

    #[test]
    fn test_user_agent_pattern_ignores_case() {
        let rules = ExclusionRules::default()
            .with_user_agent_pattern("googlebot")
            .unwrap();
        let mut record = record_at("1.2.3.4", 0);
        record.user_agent = "Mozilla/5.0 (compatible; Googlebot/2.1)".to_string();
        assert!(rules.should_drop(&record));
        record.user_agent = "curl/8.0".to_string();
        assert!(!rules.should_drop(&record));
    }

    #[test]
    fn test_path_pattern_ignores_query() {
        let rules = ExclusionRules::default()
            .with_path_pattern(r"\.(css|js)$")
            .unwrap();
        let mut record = record_at("1.2.3.4", 0);
        record.path = "/static/app.js?v=3".to_string();
        assert!(rules.should_drop(&record));
        record.path = "/index.php?file=app.js".to_string();
        assert!(!rules.should_drop(&record));
    }

    #[test]
    fn test_path_pattern_is_case_sensitive() {
        let rules = ExclusionRules::default().with_path_pattern("^/Static").unwrap();
        let mut record = record_at("1.2.3.4", 0);
        record.path = "/static/a.png".to_string();
        assert!(!rules.should_drop(&record));
    }

    #[test]
    fn test_empty_pattern_clears_rule() {
        let rules = ExclusionRules::default().with_path_pattern("").unwrap();
        assert!(rules.is_empty());
    }

    #[test]
    fn test_invalid_regex() {
        let result = ExclusionRules::default().with_user_agent_pattern("[invalid");
        assert!(matches!(result, Err(FilterError::InvalidRegex { .. })));
    }
}
