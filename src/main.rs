// BurstScan - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config file loading and validation
// 3. Logging initialisation (debug mode support)
// 4. Running the detection pipeline from stdin or files to stdout

use burstscan::app::pipeline;
use burstscan::core::normalizer::LogFormat;
use burstscan::core::report::{BurstSink, JsonLinesReport, OutputMode, TextReport};
use burstscan::platform::config::{load_config, AppConfig, PlatformPaths};
use burstscan::util;
use burstscan::util::error::{BurstScanError, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

/// Report format for detected bursts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputArg {
    /// Head/body/foot templates from the config file.
    Text,
    /// One JSON object per burst per line.
    Json,
}

impl From<OutputArg> for OutputMode {
    fn from(arg: OutputArg) -> Self {
        match arg {
            OutputArg::Text => OutputMode::Text,
            OutputArg::Json => OutputMode::Json,
        }
    }
}

/// BurstScan - flag clients sending tight bursts of requests.
///
/// Reads Apache/Nginx combined or LTSV access logs and reports every run of
/// requests from one host whose consecutive gaps stay within the maximum
/// interval and whose length reaches the minimum sequence count.
#[derive(Parser, Debug)]
#[command(name = "burstscan", version, about)]
struct Cli {
    /// Access log files, read in order as one stream ("-" or none = stdin).
    inputs: Vec<PathBuf>,

    /// Input is LTSV instead of combined log format.
    #[arg(short = 'l', long = "ltsv")]
    ltsv: bool,

    /// Minimum number of sequential requests to report.
    #[arg(
        short = 's',
        long = "min-seq",
        value_name = "COUNT",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    min_seq: Option<u64>,

    /// Maximum seconds between sequential requests.
    #[arg(
        short = 'i',
        long = "max-interval",
        value_name = "SECONDS",
        value_parser = clap::value_parser!(i64).range(0..)
    )]
    max_interval: Option<i64>,

    /// Configuration file (default: platform config dir / burstscan.conf).
    #[arg(short = 'f', long = "config", value_name = "CONFFILE")]
    config: Option<PathBuf>,

    /// Report format.
    #[arg(short = 'o', long = "output", value_enum, default_value = "text")]
    output: OutputArg,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config is loaded before logging so its log_level can take effect.
    let paths = PlatformPaths::resolve();
    let loaded = load_config(cli.config.as_deref(), &paths)
        .and_then(|raw| AppConfig::from_raw(&raw))
        .map_err(BurstScanError::from);

    let config_level = loaded.as_ref().ok().and_then(|c| c.log_level.clone());
    util::logging::init(cli.debug, config_level.as_deref());

    tracing::debug!(
        version = util::constants::APP_VERSION,
        inputs = cli.inputs.len(),
        ltsv = cli.ltsv,
        "BurstScan starting"
    );

    match loaded.and_then(|config| run(&cli, config)) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Detection run failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, mut config: AppConfig) -> Result<burstscan::core::model::RunSummary> {
    // CLI > config file > built-in defaults.
    if let Some(count) = cli.min_seq {
        config.detector.sequence_threshold = usize::try_from(count).unwrap_or(usize::MAX);
    }
    if let Some(secs) = cli.max_interval {
        config.detector.interval_threshold_secs = secs;
    }

    let format = if cli.ltsv {
        LogFormat::Ltsv
    } else {
        LogFormat::Combined
    };

    let stdout = io::stdout();
    let writer = BufWriter::new(stdout.lock());
    let mut sink: Box<dyn BurstSink> = match OutputMode::from(cli.output) {
        OutputMode::Text => Box::new(TextReport::new(config.templates, writer)),
        OutputMode::Json => Box::new(JsonLinesReport::new(writer)),
    };

    pipeline::run(
        &cli.inputs,
        format,
        config.detector,
        config.exclusions,
        sink.as_mut(),
    )
}
