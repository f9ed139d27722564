use std::fs::File;
use std::io::{BufRead, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::warn;

use crate::core::entity::EntityRecord;
use crate::parsing::compression::open_reader;
use crate::utils::validation::check_record_limit;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid record input: {0}")]
    InvalidFormat(String),

    #[error("Too many records: {0} exceeds maximum allowed")]
    TooManyRecords(usize),
}

/// One input record, kept alongside its raw text so that records which fail
/// to parse can still be passed through.
#[derive(Debug)]
pub struct RecordItem {
    /// 1-based line number (JSON lines) or array position (JSON array)
    pub line: usize,
    pub raw: String,
    pub record: Result<EntityRecord, serde_json::Error>,
}

impl RecordItem {
    fn new(line: usize, raw: String) -> Self {
        let record = serde_json::from_str(&raw);
        Self { line, raw, record }
    }
}

enum Source {
    Lines(Lines<Box<dyn BufRead>>),
    Array(std::vec::IntoIter<serde_json::Value>),
}

/// Streaming reader over entity records in JSON lines or JSON array form
pub struct RecordReader {
    source: Source,
    position: usize,
    count: usize,
}

/// Open an entity record file (optionally gzipped).
///
/// The format is detected from the first non-whitespace byte: `[` starts a
/// JSON array, anything else is read as JSON lines.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or
/// `ParseError::InvalidFormat` if a JSON array input is malformed.
pub fn read_records(path: &Path) -> Result<RecordReader, ParseError> {
    let reader = open_reader(path)?;
    RecordReader::new(reader)
}

impl RecordReader {
    /// Create a reader over any buffered input
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` on read failure, or
    /// `ParseError::InvalidFormat` if a JSON array input is malformed.
    pub fn new(mut reader: Box<dyn BufRead>) -> Result<Self, ParseError> {
        let source = if starts_with_array(reader.as_mut())? {
            let values: Vec<serde_json::Value> = serde_json::from_reader(reader)
                .map_err(|e| ParseError::InvalidFormat(format!("JSON array: {e}")))?;
            Source::Array(values.into_iter())
        } else {
            Source::Lines(reader.lines())
        };

        Ok(Self {
            source,
            position: 0,
            count: 0,
        })
    }
}

/// Skip leading whitespace and report whether the input opens a JSON array
fn starts_with_array(reader: &mut dyn BufRead) -> std::io::Result<bool> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(false);
        }
        let skip = buf.iter().take_while(|b| b.is_ascii_whitespace()).count();
        if skip < buf.len() {
            let opens_array = buf[skip] == b'[';
            reader.consume(skip);
            return Ok(opens_array);
        }
        let len = buf.len();
        reader.consume(len);
    }
}

impl Iterator for RecordReader {
    type Item = Result<RecordItem, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        let (line, raw) = match &mut self.source {
            Source::Lines(lines) => loop {
                self.position += 1;
                match lines.next()? {
                    Ok(text) if text.trim().is_empty() => continue,
                    Ok(text) => break (self.position, text),
                    Err(e) => return Some(Err(ParseError::Io(e))),
                }
            },
            Source::Array(values) => {
                self.position += 1;
                (self.position, values.next()?.to_string())
            }
        };

        if check_record_limit(self.count).is_some() {
            return Some(Err(ParseError::TooManyRecords(self.count)));
        }
        self.count += 1;

        let item = RecordItem::new(line, raw);
        if let Err(e) = &item.record {
            warn!(line = item.line, error = %e, "Malformed entity record");
        }
        Some(Ok(item))
    }
}

enum Sink {
    Stdout(BufWriter<std::io::Stdout>),
    File {
        writer: BufWriter<NamedTempFile>,
        target: PathBuf,
    },
}

/// JSON lines writer for processed records.
///
/// File output goes to a temporary file next to the target and is moved into
/// place by [`RecordWriter::finish`], so a failed run never leaves a
/// truncated output behind.
pub struct RecordWriter {
    sink: Sink,
    written: usize,
}

impl RecordWriter {
    pub fn stdout() -> Self {
        Self {
            sink: Sink::Stdout(BufWriter::new(std::io::stdout())),
            written: 0,
        }
    }

    /// Create a writer that replaces `path` when finished
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the temporary file cannot be created.
    pub fn create(path: &Path) -> Result<Self, ParseError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let temp = NamedTempFile::new_in(dir)?;
        Ok(Self {
            sink: Sink::File {
                writer: BufWriter::new(temp),
                target: path.to_path_buf(),
            },
            written: 0,
        })
    }

    fn writer(&mut self) -> &mut dyn Write {
        match &mut self.sink {
            Sink::Stdout(w) => w,
            Sink::File { writer, .. } => writer,
        }
    }

    /// Write one record as a single JSON line
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` on write failure.
    pub fn write_record(&mut self, record: &EntityRecord) -> Result<(), ParseError> {
        let line = serde_json::to_string(record)
            .map_err(|e| ParseError::InvalidFormat(format!("Cannot serialize record: {e}")))?;
        self.write_raw(&line)
    }

    /// Write a line through unchanged
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` on write failure.
    pub fn write_raw(&mut self, line: &str) -> Result<(), ParseError> {
        let writer = self.writer();
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    /// Number of lines written so far
    pub fn written(&self) -> usize {
        self.written
    }

    /// Flush and, for file output, move the temporary file into place
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if flushing or renaming fails.
    pub fn finish(self) -> Result<(), ParseError> {
        match self.sink {
            Sink::Stdout(mut w) => w.flush()?,
            Sink::File { writer, target } => {
                let temp = writer.into_inner().map_err(|e| e.into_error())?;
                let _: File = temp.persist(&target).map_err(|e| e.error)?;
            }
        }
        Ok(())
    }
}
