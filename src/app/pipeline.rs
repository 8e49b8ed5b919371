// BurstScan - app/pipeline.rs
//
// Single-pass detection run: read lines, normalise, drop excluded records,
// feed the detector, and hand every reported burst to the sink.
//
// Strictly sequential. The detector is owned by the pipeline and nothing
// else touches it; end of input is the only signal that closes open runs.

use crate::core::detector::{DetectorConfig, SequenceDetector};
use crate::core::filter::ExclusionRules;
use crate::core::model::RunSummary;
use crate::core::normalizer::{LineNormalizer, LogFormat};
use crate::core::report::BurstSink;
use crate::util::constants;
use crate::util::error::{BurstScanError, ReportError, Result};
use crate::util::logging::preview;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// One detection run over one logical input stream.
pub struct Pipeline {
    format: LogFormat,
    normalizer: &'static dyn LineNormalizer,
    exclusions: ExclusionRules,
    detector: SequenceDetector,
    summary: RunSummary,
    started: Instant,
}

impl Pipeline {
    pub fn new(format: LogFormat, detector: DetectorConfig, exclusions: ExclusionRules) -> Self {
        tracing::debug!(
            format = %format,
            interval_secs = detector.interval_threshold_secs,
            min_sequence = detector.sequence_threshold,
            exclusions = !exclusions.is_empty(),
            "Pipeline created"
        );
        Self {
            format,
            normalizer: format.normalizer(),
            exclusions,
            detector: SequenceDetector::new(detector),
            summary: RunSummary::default(),
            started: Instant::now(),
        }
    }

    /// Statistics so far.
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Process one raw line. Malformed and excluded lines are counted and
    /// otherwise ignored; only a sink failure is an error.
    pub fn feed_line(
        &mut self,
        line: &str,
        sink: &mut (impl BurstSink + ?Sized),
    ) -> std::result::Result<(), ReportError> {
        self.summary.lines_read += 1;

        let record = match self.normalizer.try_normalize(line) {
            Ok(Some(record)) => record,
            Ok(None) => return Ok(()),
            Err(reason) => {
                self.summary.lines_skipped += 1;
                tracing::debug!(
                    line_number = self.summary.lines_read,
                    format = %self.format,
                    reason = %reason,
                    line = preview(line),
                    "Skipping malformed line"
                );
                return Ok(());
            }
        };
        self.summary.records_parsed += 1;

        if self.exclusions.should_drop(&record) {
            self.summary.records_excluded += 1;
            return Ok(());
        }

        if let Some(burst) = self.detector.process(record) {
            tracing::debug!(host = %burst.host, count = burst.count(), "Burst closed by gap");
            sink.write_burst(&burst)?;
            self.summary.bursts_reported += 1;
        }
        Ok(())
    }

    /// Process every line of `reader`. `source` names the input in errors.
    ///
    /// Lines are decoded lossily so stray non-UTF-8 bytes never abort a run.
    pub fn consume<R: BufRead>(
        &mut self,
        mut reader: R,
        source: &Path,
        sink: &mut (impl BurstSink + ?Sized),
    ) -> Result<()> {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| BurstScanError::Io {
                    path: source.to_path_buf(),
                    operation: "read",
                    source: e,
                })?;
            if read == 0 {
                return Ok(());
            }
            let line = String::from_utf8_lossy(&buf);
            self.feed_line(&line, sink)?;
        }
    }

    /// Close all open runs, flush the sink, and return the run statistics.
    pub fn finish(self, sink: &mut (impl BurstSink + ?Sized)) -> Result<RunSummary> {
        let mut summary = self.summary;

        for burst in self.detector.finalize() {
            tracing::debug!(host = %burst.host, count = burst.count(), "Burst open at end of input");
            sink.write_burst(&burst)?;
            summary.bursts_reported += 1;
        }
        sink.finish()?;

        summary.duration = self.started.elapsed();
        tracing::info!(
            lines = summary.lines_read,
            records = summary.records_parsed,
            skipped = summary.lines_skipped,
            excluded = summary.records_excluded,
            bursts = summary.bursts_reported,
            elapsed_ms = summary.duration.as_millis() as u64,
            "Detection complete"
        );
        Ok(summary)
    }
}

/// Run the pipeline over the given inputs as one concatenated stream.
///
/// An empty list, or a `-` entry, reads standard input.
pub fn run(
    inputs: &[PathBuf],
    format: LogFormat,
    detector: DetectorConfig,
    exclusions: ExclusionRules,
    sink: &mut (impl BurstSink + ?Sized),
) -> Result<RunSummary> {
    let mut pipeline = Pipeline::new(format, detector, exclusions);
    let stdin_path = PathBuf::from(constants::STDIN_PATH);
    let stdin_only = [stdin_path];
    let inputs = if inputs.is_empty() {
        &stdin_only[..]
    } else {
        inputs
    };

    for path in inputs {
        if path.as_os_str() == constants::STDIN_PATH {
            tracing::debug!("Reading standard input");
            pipeline.consume(io::stdin().lock(), path, sink)?;
            continue;
        }

        let file = std::fs::File::open(path).map_err(|e| BurstScanError::Io {
            path: path.clone(),
            operation: "open",
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "Reading input file");
        pipeline.consume(BufReader::new(file), path, sink)?;
    }

    pipeline.finish(sink)
}
