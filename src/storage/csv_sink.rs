//! CSV-backed incremental record sink

use crate::record::EventRecord;
use crate::storage::traits::{RecordSink, SinkError, SinkResult};
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Appends records to a CSV file, one durable row at a time
///
/// Nothing is buffered between records. Each `append` opens the file, writes
/// the full row with a single write, and syncs it to disk before returning.
#[derive(Debug)]
pub struct CsvRecordSink {
    path: PathBuf,
    /// Set once the existing file's header is checked and any torn tail removed
    checked: bool,
    rows_written: u64,
}

impl CsvRecordSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            checked: false,
            rows_written: 0,
        }
    }

    /// Rows appended through this sink (not counting rows from earlier runs)
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    fn io_error(&self, source: std::io::Error) -> SinkError {
        SinkError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn csv_error(&self, source: csv::Error) -> SinkError {
        SinkError::Csv {
            path: self.path.display().to_string(),
            source,
        }
    }

    /// Checks the header of an existing dataset and cuts off a trailing row
    /// left incomplete by a crash
    ///
    /// A file whose header is not ours is rejected before anything in it is
    /// touched. Returns the length of the file once repaired.
    fn check_existing(&self, file: &File, expected: &[&str]) -> SinkResult<u64> {
        let content = fs::read(&self.path).map_err(|e| self.io_error(e))?;
        if content.is_empty() {
            return Ok(0);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_slice());
        let mut row = csv::ByteRecord::new();

        let header_read = matches!(reader.read_byte_record(&mut row), Ok(true));
        let header_end = reader.position().byte() as usize;
        let header_complete = header_read && content[..header_end].ends_with(b"\n");

        if !header_complete {
            // Only a prefix of our own header line can be a header cut short by
            // a crash; anything else belongs to someone else.
            let ours = format!("{}\n", expected.join(","));
            if ours.as_bytes().starts_with(&content) {
                tracing::warn!(
                    "Discarding incomplete header at start of {}",
                    self.path.display()
                );
                self.truncate(file, 0)?;
                return Ok(0);
            }
            return Err(self.header_mismatch(expected, &row));
        }

        if row.iter().ne(expected.iter().map(|field| field.as_bytes())) {
            return Err(self.header_mismatch(expected, &row));
        }

        let mut last_start = 0u64;
        let mut last_len = row.len();

        loop {
            let start = reader.position().byte();
            match reader.read_byte_record(&mut row) {
                Ok(true) => {
                    last_start = start;
                    last_len = row.len();
                }
                Ok(false) => break,
                Err(e) => {
                    tracing::warn!(
                        "Unreadable data at byte {} of {}: {}",
                        start,
                        self.path.display(),
                        e
                    );
                    last_start = start;
                    last_len = 0;
                    break;
                }
            }
        }

        let torn = !content.ends_with(b"\n") || last_len != expected.len();
        if !torn {
            return Ok(content.len() as u64);
        }

        tracing::warn!(
            "Discarding {} bytes of incomplete row at end of {}",
            content.len() as u64 - last_start,
            self.path.display()
        );
        self.truncate(file, last_start)?;
        Ok(last_start)
    }

    fn truncate(&self, file: &File, len: u64) -> SinkResult<()> {
        file.set_len(len).map_err(|e| self.io_error(e))?;
        file.sync_all().map_err(|e| self.io_error(e))
    }

    fn header_mismatch(&self, expected: &[&str], found: &csv::ByteRecord) -> SinkError {
        SinkError::HeaderMismatch {
            path: self.path.display().to_string(),
            expected: expected.iter().map(|s| s.to_string()).collect(),
            found: found
                .iter()
                .map(|field| String::from_utf8_lossy(field).into_owned())
                .collect(),
        }
    }
}

impl RecordSink for CsvRecordSink {
    fn append(&mut self, record: &EventRecord) -> SinkResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        let len = if self.checked {
            file.metadata().map_err(|e| self.io_error(e))?.len()
        } else {
            let len = self.check_existing(&file, record.field_names())?;
            self.checked = true;
            len
        };

        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        if len == 0 {
            writer
                .write_record(record.field_names())
                .map_err(|e| self.csv_error(e))?;
        }
        writer
            .write_record(record.values())
            .map_err(|e| self.csv_error(e))?;

        let bytes = writer
            .into_inner()
            .map_err(|e| self.io_error(e.into_error()))?;

        file.seek(SeekFrom::End(0)).map_err(|e| self.io_error(e))?;
        file.write_all(&bytes).map_err(|e| self.io_error(e))?;
        file.sync_all().map_err(|e| self.io_error(e))?;

        self.rows_written += 1;
        Ok(())
    }

    fn location(&self) -> &Path {
        &self.path
    }
}

/// Counts the data rows in a dataset, excluding the header
pub fn count_rows(path: &Path) -> SinkResult<u64> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|source| SinkError::Csv {
            path: path.display().to_string(),
            source,
        })?;

    let mut count = 0;
    for row in reader.byte_records() {
        row.map_err(|source| SinkError::Csv {
            path: path.display().to_string(),
            source,
        })?;
        count += 1;
    }
    Ok(count)
}
