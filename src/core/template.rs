// BurstScan - core/template.rs
//
// Placeholder templates for burst reports.
//
// A template is plain text with `$name` placeholders, where `name` is one or
// more lowercase ASCII letters. `$count` renders the burst length; every
// other name is looked up on the record (`LogRecord::field`) and renders
// empty when the record has no such field. Nothing is appended to the
// rendered text, so a template that wants a line break must contain one.

use crate::core::model::{Burst, LogRecord};
use crate::util::constants;
use regex::Regex;
use std::io::{self, Write};
use std::sync::OnceLock;

/// One compiled piece of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied verbatim.
    Literal(String),
    /// A record field looked up by name.
    Field(String),
    /// The burst length.
    Count,
}

/// A compiled template: segments in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

fn field_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(constants::TEMPLATE_FIELD_PATTERN).expect("template field pattern is valid")
    })
}

impl Template {
    /// Compile template source into segments. Never fails: text that is not
    /// a placeholder is literal.
    pub fn compile(source: &str) -> Self {
        let mut segments = Vec::new();
        let mut literal_start = 0;

        for m in field_pattern().find_iter(source) {
            if m.start() > literal_start {
                segments.push(Segment::Literal(source[literal_start..m.start()].to_string()));
            }
            let name = &m.as_str()[1..];
            segments.push(if name == constants::TEMPLATE_COUNT_FIELD {
                Segment::Count
            } else {
                Segment::Field(name.to_string())
            });
            literal_start = m.end();
        }

        if literal_start < source.len() {
            segments.push(Segment::Literal(source[literal_start..].to_string()));
        }

        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// True when rendering would never write anything.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Render against one record.
    ///
    /// `count` is `None` for body lines, where `$count` renders empty.
    pub fn render<W: Write + ?Sized>(
        &self,
        out: &mut W,
        record: &LogRecord,
        count: Option<usize>,
    ) -> io::Result<()> {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.write_all(text.as_bytes())?,
                Segment::Field(name) => {
                    if let Some(value) = record.field(name) {
                        out.write_all(value.as_bytes())?;
                    }
                }
                Segment::Count => {
                    if let Some(n) = count {
                        write!(out, "{n}")?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Render into a new string.
    pub fn render_to_string(&self, record: &LogRecord, count: Option<usize>) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.render(&mut buf, record, count);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

/// The head, body and foot templates of a text report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTemplates {
    pub head: Template,
    pub body: Template,
    pub foot: Template,
}

impl Default for ReportTemplates {
    fn default() -> Self {
        Self::new(None, None, None)
    }
}

impl ReportTemplates {
    /// Compile the three templates, using the built-in default for any
    /// template that is not given.
    pub fn new(head: Option<&str>, body: Option<&str>, foot: Option<&str>) -> Self {
        Self {
            head: Template::compile(head.unwrap_or(constants::DEFAULT_HEAD_TEMPLATE)),
            body: Template::compile(body.unwrap_or(constants::DEFAULT_BODY_TEMPLATE)),
            foot: Template::compile(foot.unwrap_or(constants::DEFAULT_FOOT_TEMPLATE)),
        }
    }

    /// Write one burst: head, one body per record, foot.
    ///
    /// Head and foot render against the first record with the burst length.
    pub fn render_burst<W: Write + ?Sized>(&self, out: &mut W, burst: &Burst) -> io::Result<()> {
        let Some(first) = burst.first() else {
            return Ok(());
        };
        let count = Some(burst.count());

        self.head.render(out, first, count)?;
        for record in &burst.records {
            self.body.render(out, record, None)?;
        }
        self.foot.render(out, first, count)
    }
}
