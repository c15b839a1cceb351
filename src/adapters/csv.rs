//! Delimited file source and sink
//!
//! Reads input rows into [`Record`]s and writes anonymized records back out,
//! keeping the column order of the input header.

use crate::domain::{AnonymizerError, Record, Result};
use csv::{Reader, ReaderBuilder, StringRecord, Writer, WriterBuilder};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Buffer size for CSV writing
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Parse a one-character delimiter setting into the byte the csv crate wants
pub fn parse_delimiter(delimiter: &str) -> Result<u8> {
    match delimiter.as_bytes() {
        [b] => Ok(*b),
        _ if delimiter == "\\t" => Ok(b'\t'),
        _ => Err(AnonymizerError::Configuration(format!(
            "Delimiter must be a single ASCII character, got '{delimiter}'"
        ))),
    }
}

/// Headered delimited file opened for reading
pub struct CsvSource {
    path: PathBuf,
    reader: Reader<File>,
    headers: Vec<String>,
    rows_read: u64,
}

impl CsvSource {
    /// Open `path` and read its header row
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened, or a CSV error if
    /// the header row cannot be parsed.
    pub fn open(path: impl AsRef<Path>, delimiter: u8) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| {
            AnonymizerError::Io(format!("Failed to open data file {}: {e}", path.display()))
        })?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .from_reader(file);

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect::<Vec<_>>();

        tracing::debug!(
            path = %path.display(),
            columns = headers.len(),
            "Opened data file"
        );

        Ok(Self {
            path,
            reader,
            headers,
            rows_read: 0,
        })
    }

    /// Column names from the header row
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Path the source was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of data rows read so far
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Read up to `max` further rows
    ///
    /// Returns an empty vector once the file is exhausted.
    pub fn next_chunk(&mut self, max: usize) -> Result<Vec<Record>> {
        let mut chunk = Vec::with_capacity(max);
        let mut row = StringRecord::new();

        while chunk.len() < max {
            if !self.reader.read_record(&mut row)? {
                break;
            }
            self.rows_read += 1;
            chunk.push(Record::from_row(
                &self.headers,
                row.iter().map(str::to_string),
            ));
        }

        Ok(chunk)
    }

    /// Iterate over all remaining rows
    pub fn records(&mut self) -> impl Iterator<Item = Result<Record>> + '_ {
        let headers = self.headers.clone();
        self.reader.records().map(move |row| {
            let row = row?;
            Ok(Record::from_row(&headers, row.iter().map(str::to_string)))
        })
    }
}

/// Headered delimited file opened for writing
pub struct CsvSink {
    path: PathBuf,
    writer: Writer<BufWriter<File>>,
    rows_written: u64,
}

impl CsvSink {
    /// Create (or truncate) `path` and write the header row
    ///
    /// Missing parent directories are created.
    pub fn create(path: impl AsRef<Path>, delimiter: u8, headers: &[String]) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let file = File::create(&path).map_err(|e| {
            AnonymizerError::Io(format!("Failed to create output file {}: {e}", path.display()))
        })?;
        let mut writer = WriterBuilder::new()
            .delimiter(delimiter)
            .from_writer(BufWriter::with_capacity(DEFAULT_BUFFER_SIZE, file));

        writer.write_record(headers)?;

        Ok(Self {
            path,
            writer,
            rows_written: 0,
        })
    }

    /// Append one record, values in the record's field order
    pub fn write_record(&mut self, record: &Record) -> Result<()> {
        self.writer.write_record(record.values())?;
        self.rows_written += 1;
        Ok(())
    }

    /// Number of data rows written
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Path being written
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush buffered rows to disk
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Values of the first row of a headerless delimited file
///
/// Values are trimmed and empty cells dropped. A file with no rows yields an
/// empty vector.
pub fn read_first_row(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path.as_ref())?;

    let mut row = StringRecord::new();
    if !reader.read_record(&mut row)? {
        return Ok(Vec::new());
    }

    Ok(row
        .iter()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect())
}
