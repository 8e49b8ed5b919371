// BurstScan - core/report.rs
//
// Burst report sinks: template-rendered text or one JSON object per line.
// Core layer: writes to any Write trait object.

use crate::core::model::{Burst, LogRecord};
use crate::core::template::ReportTemplates;
use crate::util::error::ReportError;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::io::Write;

/// Destination for detected bursts.
pub trait BurstSink {
    /// Write one burst report.
    fn write_burst(&mut self, burst: &Burst) -> Result<(), ReportError>;

    /// Flush buffered output. Called once after the last burst.
    fn finish(&mut self) -> Result<(), ReportError>;
}

/// Output style selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Head/body/foot templates.
    #[default]
    Text,
    /// One JSON object per burst per line.
    Json,
}

// =============================================================================
// Text
// =============================================================================

/// Renders each burst through the head/body/foot templates.
pub struct TextReport<W: Write> {
    templates: ReportTemplates,
    writer: W,
}

impl<W: Write> TextReport<W> {
    pub fn new(templates: ReportTemplates, writer: W) -> Self {
        Self { templates, writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> BurstSink for TextReport<W> {
    fn write_burst(&mut self, burst: &Burst) -> Result<(), ReportError> {
        self.templates.render_burst(&mut self.writer, burst)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ReportError> {
        self.writer.flush()?;
        Ok(())
    }
}

// =============================================================================
// JSON lines
// =============================================================================

/// Serialised shape of one burst.
#[derive(Debug, Serialize)]
struct BurstRecord<'a> {
    host: &'a str,
    count: usize,
    first_seen: Option<DateTime<FixedOffset>>,
    last_seen: Option<DateTime<FixedOffset>>,
    records: &'a [LogRecord],
}

/// Writes each burst as a single-line JSON object.
pub struct JsonLinesReport<W: Write> {
    writer: W,
}

impl<W: Write> JsonLinesReport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> BurstSink for JsonLinesReport<W> {
    fn write_burst(&mut self, burst: &Burst) -> Result<(), ReportError> {
        let record = BurstRecord {
            host: &burst.host,
            count: burst.count(),
            first_seen: burst.first().map(|r| r.timestamp),
            last_seen: burst.last().map(|r| r.timestamp),
            records: &burst.records,
        };
        serde_json::to_writer(&mut self.writer, &record)
            .map_err(|source| ReportError::Json { source })?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), ReportError> {
        self.writer.flush()?;
        Ok(())
    }
}
