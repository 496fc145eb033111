//! tsvclean - Streaming cleaner
//!
//! Reads a tab-delimited stream one row at a time, truncates constrained
//! columns to their byte limits, drops exact duplicates, and writes each
//! surviving row immediately.
//!
//! # Pipeline
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌───────────────┐     ┌──────────┐
//! │  TSV reader │────▶│  shape check │────▶│   truncate    │────▶│ seen set │──▶ TSV writer
//! │ (row-by-row)│     │ (strict/len.)│     │ (byte limits) │     │ (exact)  │
//! └─────────────┘     └──────────────┘     └───────────────┘     └──────────┘
//! ```
//!
//! Memory is bounded by the current row plus the set of distinct output rows;
//! the input and output are never held in full.

use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use csv::{QuoteStyle, ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use tracing::{debug, info, trace, warn};

use crate::error::{CleanError, Result};
use crate::schema::ColumnLimits;
use crate::truncate::{exceeds, truncate_to_bytes};

/// Field delimiter for both input and output.
pub const DELIMITER: u8 = b'\t';

/// Path that selects stdin (for input) or stdout (for output).
pub const STDIO_PATH: &str = "-";

// ─── Policy ─────────────────────────────────────────────────────────────────

/// What to do with a data row whose field count differs from the header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShapePolicy {
    /// Abort the run with `CleanError::RowShape`.
    #[default]
    Strict,
    /// Pad missing trailing fields with empty strings and drop surplus fields.
    Lenient,
}

impl std::fmt::Display for ShapePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Lenient => write!(f, "lenient"),
        }
    }
}

// ─── Summary ────────────────────────────────────────────────────────────────

/// Counters for one cleaning run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanSummary {
    /// Data rows read (header excluded).
    pub rows_read: u64,
    /// Data rows written (header excluded).
    pub rows_written: u64,
    /// Rows dropped because their post-truncation values were already seen.
    pub duplicates_dropped: u64,
    /// Individual field values shortened to fit a limit.
    pub fields_truncated: u64,
    /// Rows padded or cut to the header width under `ShapePolicy::Lenient`.
    pub rows_repaired: u64,
}

impl CleanSummary {
    /// Fraction of data rows dropped as duplicates (0.0 – 1.0).
    pub fn dedup_ratio(&self) -> f64 {
        if self.rows_read == 0 {
            return 0.0;
        }
        self.duplicates_dropped as f64 / self.rows_read as f64
    }

    /// Human-readable summary string.
    pub fn summary(&self) -> String {
        format!(
            "{} read | {} written | {} duplicates ({:.1}%) | {} fields truncated | {} rows repaired",
            self.rows_read,
            self.rows_written,
            self.duplicates_dropped,
            self.dedup_ratio() * 100.0,
            self.fields_truncated,
            self.rows_repaired,
        )
    }
}

// ─── RowSink ────────────────────────────────────────────────────────────────

/// Output adapter that only hands whole rows to the buffered writer.
///
/// The csv writer may spill its internal buffer in the middle of a record.
/// Those bytes are held in `pending` until `flush()` marks a row boundary, so
/// whatever reaches the file ends on a complete line. `flush()` does not
/// force a write to the OS; `finish()` does.
struct RowSink<W: Write> {
    inner: BufWriter<W>,
    pending: Vec<u8>,
}

impl<W: Write> RowSink<W> {
    fn new(inner: W) -> Self {
        Self {
            inner: BufWriter::new(inner),
            pending: Vec::new(),
        }
    }

    #[cfg(test)]
    fn with_capacity(capacity: usize, inner: W) -> Self {
        Self {
            inner: BufWriter::with_capacity(capacity, inner),
            pending: Vec::new(),
        }
    }

    /// Commit the last row and flush everything to the underlying writer.
    fn finish(mut self) -> io::Result<()> {
        self.flush()?;
        self.inner.flush()
    }
}

impl<W: Write> Write for RowSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.pending.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.write_all(&self.pending)?;
        self.pending.clear();
        Ok(())
    }
}

// ─── Cleaner ────────────────────────────────────────────────────────────────

/// Column layout resolved against the active limits once the header is read.
struct Header {
    columns: Vec<String>,
    /// Byte limit per column position, `None` for unconstrained columns.
    limits: Vec<Option<usize>>,
}

impl Header {
    fn resolve(record: &StringRecord, limits: &ColumnLimits) -> Self {
        let columns: Vec<String> = record.iter().map(str::to_string).collect();
        let limits = columns.iter().map(|c| limits.limit(c)).collect();
        Self { columns, limits }
    }

    fn width(&self) -> usize {
        self.columns.len()
    }
}

enum State {
    AwaitHeader,
    Streaming(Header),
    Done,
}

/// Single-pass truncating deduplicator for one input → output mapping.
pub struct Cleaner<'a> {
    limits: &'a ColumnLimits,
    policy: ShapePolicy,
}

impl<'a> Cleaner<'a> {
    pub fn new(limits: &'a ColumnLimits) -> Self {
        Self {
            limits,
            policy: ShapePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ShapePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Clean `input` into `output`.
    ///
    /// The header line is copied through; each data row is truncated,
    /// checked against the rows already written, and emitted at once if new.
    /// `output` only ever receives whole lines and is flushed before
    /// returning `Ok`.
    pub fn run<R: Read, W: Write>(&self, input: R, output: W) -> Result<CleanSummary> {
        let mut reader = ReaderBuilder::new()
            .delimiter(DELIMITER)
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .from_reader(input);
        let mut writer = WriterBuilder::new()
            .delimiter(DELIMITER)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(RowSink::new(output));

        let mut record = StringRecord::new();
        let mut seen: HashSet<Box<[String]>> = HashSet::new();
        let mut summary = CleanSummary::default();
        let mut state = State::AwaitHeader;

        loop {
            state = match state {
                State::AwaitHeader => {
                    if !reader.read_record(&mut record)? {
                        return Err(CleanError::MalformedInput);
                    }
                    let header = Header::resolve(&record, self.limits);
                    debug!(
                        "Header has {} columns, {} constrained",
                        header.width(),
                        header.limits.iter().filter(|l| l.is_some()).count()
                    );
                    writer.write_record(&record)?;
                    writer.flush()?;
                    State::Streaming(header)
                }
                State::Streaming(header) => {
                    while reader.read_record(&mut record)? {
                        summary.rows_read += 1;
                        let fields = self.clean_row(&header, &record, &mut summary)?;

                        if seen.contains(&fields[..]) {
                            summary.duplicates_dropped += 1;
                            trace!("Dropped duplicate row at line {}", line_of(&record));
                            continue;
                        }
                        writer.write_record(&fields)?;
                        // Row boundary: hand the complete line to the sink.
                        writer.flush()?;
                        seen.insert(fields.into_boxed_slice());
                        summary.rows_written += 1;
                    }
                    State::Done
                }
                State::Done => break,
            };
        }

        writer
            .into_inner()
            .map_err(|e| CleanError::Io(e.into_error()))?
            .finish()?;
        Ok(summary)
    }

    /// Shape-check one data row and apply the column limits.
    fn clean_row(
        &self,
        header: &Header,
        record: &StringRecord,
        summary: &mut CleanSummary,
    ) -> Result<Vec<String>> {
        let expected = header.width();
        let found = record.len();
        if found != expected {
            let line = line_of(record);
            match self.policy {
                ShapePolicy::Strict => {
                    return Err(CleanError::RowShape {
                        line,
                        expected,
                        found,
                    });
                }
                ShapePolicy::Lenient => {
                    warn!(
                        "Line {}: expected {} fields, found {} (repaired)",
                        line, expected, found
                    );
                    summary.rows_repaired += 1;
                }
            }
        }

        let mut fields = Vec::with_capacity(expected);
        for (i, limit) in header.limits.iter().enumerate() {
            let value = record.get(i).unwrap_or("");
            let value = match *limit {
                Some(max_bytes) if exceeds(value, max_bytes) => {
                    summary.fields_truncated += 1;
                    truncate_to_bytes(value, max_bytes).into_owned()
                }
                _ => value.to_string(),
            };
            fields.push(value);
        }
        Ok(fields)
    }
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

// ─── File entry point ───────────────────────────────────────────────────────

/// Clean the file at `input` into the file at `output`.
///
/// Either path may be `-` for stdin / stdout. The input is opened before the
/// output is created, so an unreadable input never leaves an empty output
/// file behind. Both handles are closed on every return path.
pub fn clean_file(
    limits: &ColumnLimits,
    input: &Path,
    output: &Path,
    policy: ShapePolicy,
) -> Result<CleanSummary> {
    info!(
        "Cleaning {} → {} ({} limited columns, {} shape policy)",
        input.display(),
        output.display(),
        limits.len(),
        policy
    );

    let reader = open_input(input)?;
    let writer = open_output(output)?;
    let summary = Cleaner::new(limits).with_policy(policy).run(reader, writer)?;

    info!("Done: {}", summary.summary());
    Ok(summary)
}

fn is_stdio(path: &Path) -> bool {
    path == Path::new(STDIO_PATH)
}

fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if is_stdio(path) {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).map_err(|source| CleanError::PathIo {
        action: "open input",
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Box::new(file))
}

fn open_output(path: &Path) -> Result<Box<dyn Write>> {
    if is_stdio(path) {
        return Ok(Box::new(io::stdout().lock()));
    }
    let file = File::create(path).map_err(|source| CleanError::PathIo {
        action: "create output",
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Box::new(file))
}

// ─── Tests ──────────────────────────────────────────────────────────────────
