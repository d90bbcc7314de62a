//! Append-only tabular sink.
//!
//! Shared by the legitimate stream and the fraud injector. Rows are
//! streamed straight through the csv writer, so memory stays O(1) in
//! row count.

use crate::error::GenResult;
use crate::record::{TransactionRecord, CSV_HEADER};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct OutputWriter<W: Write> {
    inner: csv::Writer<W>,
    rows: u64,
}

impl OutputWriter<BufWriter<File>> {
    /// Open a file sink, creating parent directories if absent.
    pub fn create<P: AsRef<Path>>(path: P) -> GenResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(path)?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> OutputWriter<W> {
    /// Wrap any sink. The header row is written immediately so even
    /// an empty run produces a schema-complete file.
    pub fn new(sink: W) -> GenResult<Self> {
        let mut inner = csv::WriterBuilder::new().has_headers(false).from_writer(sink);
        inner.write_record(CSV_HEADER)?;
        Ok(Self { inner, rows: 0 })
    }

    /// Append one record.
    pub fn append(&mut self, record: &TransactionRecord) -> GenResult<()> {
        self.inner.serialize(record)?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, excluding the header.
    pub fn rows_written(&self) -> u64 {
        self.rows
    }

    /// Flush and release the sink.
    pub fn finish(mut self) -> GenResult<()> {
        self.inner.flush()?;
        Ok(())
    }
}
