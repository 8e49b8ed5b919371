// BurstScan - platform/config.rs
//
// Config file discovery, `key=value` parsing, and startup validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.
//
// File format: one `key=value` per line. Lines starting with `#` and lines
// without `=` are ignored. Values keep their leading and trailing spaces and
// go through a small backslash-escape decoder, so `head=$host\t$count\n`
// yields a real tab and newline.

use crate::core::detector::DetectorConfig;
use crate::core::filter::ExclusionRules;
use crate::core::template::ReportTemplates;
use crate::util::constants;
use crate::util::error::{ConfigError, FilterError};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for BurstScan configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/burstscan/ or %APPDATA%\burstscan\config\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Location of the default config file.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// Raw key=value settings
// =============================================================================

/// Settings as read from the file, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    pub head: Option<String>,
    pub body: Option<String>,
    pub foot: Option<String>,
    /// Comma-separated host list.
    pub exc_hosts: Option<String>,
    pub exc_ua_match: Option<String>,
    pub exc_path_match: Option<String>,
    pub max_interval: Option<String>,
    pub min_seq: Option<String>,
    pub log_level: Option<String>,
    /// Keys that were present but are not recognised.
    pub unknown_keys: Vec<String>,
}

/// Parse `key=value` config text. Later assignments of a key win.
pub fn parse_config(content: &str) -> RawConfig {
    let mut raw = RawConfig::default();

    for line in content.lines() {
        if line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = Some(decode_escapes(value));

        match key.trim() {
            "head" => raw.head = value,
            "body" => raw.body = value,
            "foot" => raw.foot = value,
            "exc_hosts" => raw.exc_hosts = value,
            "exc_ua_match" => raw.exc_ua_match = value,
            "exc_path_match" => raw.exc_path_match = value,
            "max_interval" => raw.max_interval = value,
            "min_seq" => raw.min_seq = value,
            "log_level" => raw.log_level = value,
            other => raw.unknown_keys.push(other.to_string()),
        }
    }

    raw
}

/// Decode backslash escapes in a config value.
///
/// Supports `\t \n \r \0 \\ \" \'`. Any other escape, and a trailing lone
/// backslash, is kept verbatim.
pub fn decode_escapes(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('"') => out.push('"'),
            Some('\'') => out.push('\''),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }

    out
}

/// Read and parse one config file.
pub fn load_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    if metadata.len() > constants::MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max_size: constants::MAX_CONFIG_FILE_SIZE,
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let raw = parse_config(&content);
    for key in &raw.unknown_keys {
        tracing::debug!(path = %path.display(), key = %key, "Ignoring unknown config key");
    }
    tracing::info!(path = %path.display(), "Loaded config file");
    Ok(raw)
}

/// Load the explicit config file, or the platform default if none was given.
///
/// A missing default file is normal (first run) and yields empty settings;
/// a missing explicit file is an error.
pub fn load_config(
    explicit: Option<&Path>,
    paths: &PlatformPaths,
) -> Result<RawConfig, ConfigError> {
    if let Some(path) = explicit {
        return load_config_file(path);
    }

    let default_path = paths.config_file();
    match load_config_file(&default_path) {
        Err(ConfigError::NotFound { .. }) => {
            tracing::debug!(path = %default_path.display(), "No config file found; using defaults");
            Ok(RawConfig::default())
        }
        other => other,
    }
}

// =============================================================================
// Validated configuration
// =============================================================================

/// Validated run configuration derived from the config file.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub detector: DetectorConfig,
    pub exclusions: ExclusionRules,
    pub templates: ReportTemplates,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
}

impl AppConfig {
    /// Validate raw settings. The first invalid value is returned as an error.
    pub fn from_raw(raw: &RawConfig) -> Result<Self, ConfigError> {
        let mut config = AppConfig {
            templates: ReportTemplates::new(
                raw.head.as_deref(),
                raw.body.as_deref(),
                raw.foot.as_deref(),
            ),
            ..AppConfig::default()
        };

        if let Some(ref value) = raw.max_interval {
            config.detector.interval_threshold_secs = value
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|secs| *secs >= constants::MIN_INTERVAL_THRESHOLD_SECS)
                .ok_or_else(|| ConfigError::InvalidValue {
                    field: "max_interval".to_string(),
                    value: value.clone(),
                    expected: format!(
                        "an integer number of seconds >= {}",
                        constants::MIN_INTERVAL_THRESHOLD_SECS
                    ),
                })?;
        }

        if let Some(ref value) = raw.min_seq {
            config.detector.sequence_threshold = value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|count| *count >= constants::MIN_SEQUENCE_THRESHOLD)
                .ok_or_else(|| ConfigError::InvalidValue {
                    field: "min_seq".to_string(),
                    value: value.clone(),
                    expected: format!(
                        "an integer count >= {}",
                        constants::MIN_SEQUENCE_THRESHOLD
                    ),
                })?;
        }

        let mut exclusions = ExclusionRules::default();
        if let Some(ref hosts) = raw.exc_hosts {
            exclusions = exclusions.with_hosts(
                hosts
                    .split(',')
                    .map(str::trim)
                    .filter(|host| !host.is_empty()),
            );
        }
        if let Some(ref pattern) = raw.exc_ua_match {
            check_pattern_length("exc_ua_match", pattern)?;
            exclusions = exclusions
                .with_user_agent_pattern(pattern)
                .map_err(|e| regex_error("exc_ua_match", e))?;
        }
        if let Some(ref pattern) = raw.exc_path_match {
            check_pattern_length("exc_path_match", pattern)?;
            exclusions = exclusions
                .with_path_pattern(pattern)
                .map_err(|e| regex_error("exc_path_match", e))?;
        }
        config.exclusions = exclusions;

        if let Some(ref level) = raw.log_level {
            let level = level.trim().to_lowercase();
            if !constants::VALID_LOG_LEVELS.contains(&level.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "log_level".to_string(),
                    value: level,
                    expected: constants::VALID_LOG_LEVELS.join(", "),
                });
            }
            config.log_level = Some(level);
        }

        Ok(config)
    }
}

fn check_pattern_length(field: &'static str, pattern: &str) -> Result<(), ConfigError> {
    let length = pattern.chars().count();
    if length > constants::MAX_REGEX_PATTERN_LENGTH {
        return Err(ConfigError::RegexTooLong {
            field,
            length,
            max_length: constants::MAX_REGEX_PATTERN_LENGTH,
        });
    }
    Ok(())
}

fn regex_error(field: &'static str, error: FilterError) -> ConfigError {
    match error {
        FilterError::InvalidRegex { pattern, source } => ConfigError::InvalidRegex {
            field,
            pattern,
            source,
        },
    }
}
