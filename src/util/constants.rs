// BurstScan - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "BurstScan";

/// Application identifier used for the platform config directory.
pub const APP_ID: &str = "burstscan";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Detection defaults
// =============================================================================

/// Maximum gap in seconds between two requests from the same host for them
/// to belong to the same run.
pub const DEFAULT_INTERVAL_THRESHOLD_SECS: i64 = 3;

/// Minimum run length before a run is reported.
pub const DEFAULT_SEQUENCE_THRESHOLD: usize = 8;

/// Smallest accepted sequence threshold. A threshold of zero would report
/// every host, including hosts with a single request.
pub const MIN_SEQUENCE_THRESHOLD: usize = 1;

/// Smallest accepted interval threshold.
pub const MIN_INTERVAL_THRESHOLD_SECS: i64 = 0;

// =============================================================================
// Log formats
// =============================================================================

/// chrono format for the combined log `[...]` timestamp (brackets already
/// stripped by the tokenizer).
pub const COMBINED_TIME_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// chrono format for the LTSV `time` label, which keeps its brackets.
pub const LTSV_TIME_FORMAT: &str = "[%d/%b/%Y:%H:%M:%S %z]";

/// Number of combined-format tokens required to build a record
/// (host, ident, user, time, request). Status, size, referer and
/// user agent are optional so common log format lines are accepted.
pub const COMBINED_MIN_TOKENS: usize = 5;

// =============================================================================
// Report templates
// =============================================================================

/// Default head line: one per burst.
pub const DEFAULT_HEAD_TEMPLATE: &str = "$host\t$count\t$ua\n";

/// Default body line: one per request in the burst.
pub const DEFAULT_BODY_TEMPLATE: &str = "$date\t$path\t$referer\n";

/// Default foot line: empty, emits nothing.
pub const DEFAULT_FOOT_TEMPLATE: &str = "";

/// Placeholder pattern inside templates.
pub const TEMPLATE_FIELD_PATTERN: &str = r"\$[a-z]+";

/// Placeholder name that renders the burst length instead of a field.
pub const TEMPLATE_COUNT_FIELD: &str = "count";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "burstscan.conf";

/// Maximum size of the configuration file in bytes.
pub const MAX_CONFIG_FILE_SIZE: u64 = 64 * 1024; // 64 KB

/// Maximum regex pattern length to prevent ReDoS.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4_096;

/// Value accepted on the command line for "read standard input".
pub const STDIN_PATH: &str = "-";

// =============================================================================
// Logging
// =============================================================================

/// Default log level. Reports go to stdout, diagnostics to stderr, so the
/// default stays quiet unless something needs attention.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Accepted values for the `log_level` config key.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Maximum length of a log line included in debug output.
/// Prevents accidental exposure of sensitive data in long lines.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;
