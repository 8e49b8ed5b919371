// BurstScan - tests/e2e_detection.rs
//
// End-to-end tests for the detection pipeline.
//
// These tests read real fixture files from disk, load real config files
// through the platform layer, and render through the real report sinks,
// covering the full path from raw access-log lines to report text.

use burstscan::app::pipeline::run;
use burstscan::core::detector::DetectorConfig;
use burstscan::core::filter::ExclusionRules;
use burstscan::core::normalizer::LogFormat;
use burstscan::core::report::{JsonLinesReport, TextReport};
use burstscan::core::template::ReportTemplates;
use burstscan::platform::config::{load_config, load_config_file, AppConfig, PlatformPaths};
use std::fs;
use std::path::PathBuf;

// =============================================================================
// Helpers
// =============================================================================

/// Absolute path to the on-disk fixture files.
fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Run the text report over the given fixtures with an explicit config.
fn run_text(
    names: &[&str],
    format: LogFormat,
    config: AppConfig,
) -> (String, burstscan::core::model::RunSummary) {
    let inputs: Vec<PathBuf> = names.iter().map(|n| fixture(n)).collect();
    let mut report = TextReport::new(config.templates, Vec::new());
    let summary = run(
        &inputs,
        format,
        config.detector,
        config.exclusions,
        &mut report,
    )
    .unwrap();
    (String::from_utf8(report.into_inner()).unwrap(), summary)
}

// =============================================================================
// Combined log format
// =============================================================================

/// Nine requests one second apart produce one report of nine body lines,
/// headed by the first request's fields.
#[test]
fn e2e_single_burst_default_templates() {
    let (output, summary) = run_text(
        &["burst_combined.log"],
        LogFormat::Combined,
        AppConfig::default(),
    );

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 10, "head + 9 body lines, got:\n{output}");
    assert_eq!(lines[0], "1.2.3.4\t9\tEvilScanner/1.0");
    assert_eq!(
        lines[1],
        "2023-10-10T13:55:00+00:00\t/wp-login.php?try=0\t-"
    );
    assert_eq!(
        lines[9],
        "2023-10-10T13:55:08+00:00\t/wp-login.php?try=8\t-"
    );

    assert_eq!(summary.lines_read, 13);
    assert_eq!(summary.records_parsed, 11);
    assert_eq!(summary.lines_skipped, 1);
    assert_eq!(summary.bursts_reported, 1);
}

/// Fewer requests than the sequence threshold report nothing.
#[test]
fn e2e_short_run_reports_nothing() {
    let (output, summary) = run_text(
        &["short_run_combined.log"],
        LogFormat::Combined,
        AppConfig::default(),
    );
    assert!(output.is_empty(), "unexpected output:\n{output}");
    assert_eq!(summary.records_parsed, 5);
    assert_eq!(summary.bursts_reported, 0);
}

/// A ten-second pause splits one host's traffic into two reports.
#[test]
fn e2e_gap_splits_two_runs() {
    let config = AppConfig {
        templates: ReportTemplates::new(Some("$host $count $time\n"), Some(""), None),
        ..AppConfig::default()
    };
    let (output, summary) = run_text(&["two_runs_combined.log"], LogFormat::Combined, config);

    assert_eq!(
        output,
        "1.2.3.4 8 10/Oct/2023:14:00:00 +0000\n\
         1.2.3.4 8 10/Oct/2023:14:00:17 +0000\n"
    );
    assert_eq!(summary.bursts_reported, 2);
}

/// Raising the sequence threshold above the run length suppresses the report.
#[test]
fn e2e_sequence_threshold_boundary() {
    let mut config = AppConfig::default();
    config.detector = DetectorConfig {
        interval_threshold_secs: 3,
        sequence_threshold: 9,
    };
    let (output, _) = run_text(&["burst_combined.log"], LogFormat::Combined, config.clone());
    assert!(output.starts_with("1.2.3.4\t9\t"));

    config.detector.sequence_threshold = 10;
    let (output, _) = run_text(&["burst_combined.log"], LogFormat::Combined, config);
    assert!(output.is_empty());
}

/// Multiple inputs are one stream: the two runs of the second file are still
/// distinct from the single burst of the first because of the time gap.
#[test]
fn e2e_multiple_inputs_concatenate() {
    let (output, summary) = run_text(
        &["burst_combined.log", "two_runs_combined.log"],
        LogFormat::Combined,
        AppConfig::default(),
    );
    let heads: Vec<&str> = output
        .lines()
        .filter(|l| l.starts_with("1.2.3.4\t"))
        .collect();
    assert_eq!(heads, vec!["1.2.3.4\t9\tEvilScanner/1.0", "1.2.3.4\t8\tpython-requests/2.31", "1.2.3.4\t8\tpython-requests/2.31"]);
    assert_eq!(summary.bursts_reported, 3);
}

// =============================================================================
// Exclusions via config file
// =============================================================================

/// An excluded host never produces a report, whatever its burst shape.
#[test]
fn e2e_config_excluded_host() {
    let dir = tempfile::tempdir().unwrap();
    let conf = dir.path().join("burstscan.conf");
    fs::write(&conf, "# exclusions\nexc_hosts=10.0.0.1,1.2.3.4\n").unwrap();

    let raw = load_config_file(&conf).unwrap();
    let config = AppConfig::from_raw(&raw).unwrap();
    let (output, summary) = run_text(&["burst_combined.log"], LogFormat::Combined, config);

    assert!(output.is_empty());
    assert_eq!(summary.records_excluded, 9);
}

/// The user-agent pattern is case-insensitive; the path pattern ignores
/// the query string.
#[test]
fn e2e_config_pattern_exclusions() {
    let dir = tempfile::tempdir().unwrap();
    let paths = PlatformPaths {
        config_dir: dir.path().to_path_buf(),
    };

    fs::write(paths.config_file(), "exc_ua_match=evilscanner\n").unwrap();
    let config = AppConfig::from_raw(&load_config(None, &paths).unwrap()).unwrap();
    let (output, _) = run_text(&["burst_combined.log"], LogFormat::Combined, config);
    assert!(output.is_empty());

    fs::write(paths.config_file(), "exc_path_match=^/wp-login\\.php$\n").unwrap();
    let config = AppConfig::from_raw(&load_config(None, &paths).unwrap()).unwrap();
    let (output, _) = run_text(&["burst_combined.log"], LogFormat::Combined, config);
    assert!(output.is_empty());
}

/// Templates from the config file have their escapes decoded.
#[test]
fn e2e_config_templates() {
    let dir = tempfile::tempdir().unwrap();
    let conf = dir.path().join("custom.conf");
    fs::write(
        &conf,
        "head=== $host ($count) ==\\n\nbody=\\t$method $path [$status]\\n\nfoot=--\\n\n",
    )
    .unwrap();

    let config = AppConfig::from_raw(&load_config_file(&conf).unwrap()).unwrap();
    let (output, _) = run_text(&["short_run_combined.log"], LogFormat::Combined, {
        let mut c = config;
        c.detector.sequence_threshold = 5;
        c
    });

    let expected = "== 1.2.3.4 (5) ==\n\
                    \tGET / [200]\n\
                    \tGET / [200]\n\
                    \tGET / [200]\n\
                    \tGET / [200]\n\
                    \tGET / [200]\n\
                    --\n";
    assert_eq!(output, expected);
}

// =============================================================================
// LTSV
// =============================================================================

/// LTSV input with two-second gaps: extra labels render through templates and
/// lines without a time label are skipped.
#[test]
fn e2e_ltsv_burst_with_extra_label() {
    let config = AppConfig {
        templates: ReportTemplates::new(Some("$host\t$count\t$vhost\n"), Some("$date $query\n"), None),
        ..AppConfig::default()
    };
    let (output, summary) = run_text(&["burst.ltsv"], LogFormat::Ltsv, config);

    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 9, "got:\n{output}");
    assert_eq!(lines[0], "9.9.9.9\t8\tapi.example.com");
    assert_eq!(lines[1], "2023-10-10T16:00:00+09:00 page=0");
    assert_eq!(lines[8], "2023-10-10T16:00:14+09:00 page=14");
    assert_eq!(summary.lines_skipped, 1);
    assert_eq!(summary.records_parsed, 9);
}

/// Combined input read with the LTSV normalizer yields no records at all.
#[test]
fn e2e_wrong_format_skips_every_line() {
    let (output, summary) = run_text(
        &["burst_combined.log"],
        LogFormat::Ltsv,
        AppConfig::default(),
    );
    assert!(output.is_empty());
    assert_eq!(summary.records_parsed, 0);
    assert_eq!(summary.lines_skipped, 12);
}

// =============================================================================
// JSON output
// =============================================================================

#[test]
fn e2e_json_lines_output() {
    let inputs = vec![fixture("two_runs_combined.log")];
    let mut report = JsonLinesReport::new(Vec::new());
    run(
        &inputs,
        LogFormat::Combined,
        DetectorConfig::default(),
        ExclusionRules::default(),
        &mut report,
    )
    .unwrap();

    let output = String::from_utf8(report.into_inner()).unwrap();
    let bursts: Vec<serde_json::Value> = output
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(bursts.len(), 2);
    assert_eq!(bursts[0]["count"], 8);
    assert_eq!(bursts[0]["first_seen"], "2023-10-10T14:00:00+00:00");
    assert_eq!(bursts[0]["last_seen"], "2023-10-10T14:00:07+00:00");
    assert_eq!(bursts[1]["first_seen"], "2023-10-10T14:00:17+00:00");
    assert_eq!(bursts[1]["records"][0]["method"], "POST");
}
