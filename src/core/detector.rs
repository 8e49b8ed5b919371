// BurstScan - core/detector.rs
//
// Per-host burst detection over a single pass of records.
//
// Each host keeps one open run. A request joins the run when it arrives at
// most `interval_threshold_secs` after the previous request from the same
// host; a larger gap closes the run and starts a new one with that request.
// Closed runs of at least `sequence_threshold` requests are returned as
// bursts. The gap is always measured against the most recent request, so a
// run has no maximum length.
//
// Input is assumed to be in non-decreasing time order per host. A negative
// gap is not validated and simply extends the run.

use crate::core::model::{Burst, LogRecord};
use crate::util::constants;
use std::collections::HashMap;

/// Detection thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Maximum gap in seconds between consecutive requests of one run.
    pub interval_threshold_secs: i64,

    /// Minimum run length that is reported.
    pub sequence_threshold: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            interval_threshold_secs: constants::DEFAULT_INTERVAL_THRESHOLD_SECS,
            sequence_threshold: constants::DEFAULT_SEQUENCE_THRESHOLD,
        }
    }
}

/// The open run of one host.
#[derive(Debug)]
struct HostWindow {
    /// Epoch seconds of the most recently accepted request.
    last_epoch: i64,

    /// Requests of the current run, in arrival order. Never empty.
    sequence: Vec<LogRecord>,

    /// Position of the host in first-seen order; survives window resets.
    first_seen: u64,
}

impl HostWindow {
    fn start(epoch: i64, record: LogRecord, first_seen: u64) -> Self {
        Self {
            last_epoch: epoch,
            sequence: vec![record],
            first_seen,
        }
    }
}

/// Stateful burst detector. One instance per run, owned by the pipeline.
#[derive(Debug)]
pub struct SequenceDetector {
    config: DetectorConfig,
    windows: HashMap<String, HostWindow>,
    hosts_seen: u64,
}

impl SequenceDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            windows: HashMap::new(),
            hosts_seen: 0,
        }
    }

    pub fn config(&self) -> DetectorConfig {
        self.config
    }

    /// Number of hosts currently holding an open run.
    pub fn tracked_hosts(&self) -> usize {
        self.windows.len()
    }

    /// Feed one accepted record.
    ///
    /// Returns the host's previous run when this record closes it and the
    /// run is long enough to report.
    pub fn process(&mut self, record: LogRecord) -> Option<Burst> {
        let epoch = record.epoch_secs();

        if let Some(window) = self.windows.get_mut(&record.host) {
            let delta = epoch - window.last_epoch;
            if delta <= self.config.interval_threshold_secs {
                window.sequence.push(record);
                window.last_epoch = epoch;
                return None;
            }

            let host = record.host.clone();
            let order = window.first_seen;
            let closed = std::mem::replace(window, HostWindow::start(epoch, record, order));
            return self.report(host, closed.sequence);
        }

        let order = self.hosts_seen;
        self.hosts_seen += 1;
        self.windows
            .insert(record.host.clone(), HostWindow::start(epoch, record, order));
        None
    }

    /// Close every open run at end of input.
    ///
    /// Consumes the detector, so it can only happen once. Bursts are
    /// returned in the order their hosts first appeared in the stream.
    pub fn finalize(self) -> Vec<Burst> {
        let threshold = self.config.sequence_threshold;
        let mut open: Vec<(String, HostWindow)> = self.windows.into_iter().collect();
        open.sort_by_key(|(_, window)| window.first_seen);

        open.into_iter()
            .filter(|(_, window)| window.sequence.len() >= threshold)
            .map(|(host, window)| Burst {
                host,
                records: window.sequence,
            })
            .collect()
    }

    fn report(&self, host: String, sequence: Vec<LogRecord>) -> Option<Burst> {
        if sequence.len() < self.config.sequence_threshold {
            return None;
        }
        Some(Burst {
            host,
            records: sequence,
        })
    }
}

impl Default for SequenceDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}
