//! JSON Lines record sink
//!
//! One JSON object per record, in batch order. Paths ending in `.gz` are
//! gzip-compressed. With `pretty_json` each object is indented, which
//! produces a concatenated JSON stream rather than strict JSONL.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use tracing::debug;

use logrebase_core::error::RebaseError;
use logrebase_core::pipeline::RecordSink;
use logrebase_core::types::LogRecord;

use crate::source::is_gzip;

enum OutputFile {
    Plain(BufWriter<File>),
    Gzip(GzEncoder<BufWriter<File>>),
}

impl OutputFile {
    fn finish(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Gzip(w) => {
                w.try_finish()?;
                w.get_mut().flush()
            }
        }
    }
}

impl Write for OutputFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(w) => w.write(buf),
            Self::Gzip(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(w) => w.flush(),
            Self::Gzip(w) => w.flush(),
        }
    }
}

/// Writes records to a JSONL file.
pub struct JsonlSink {
    path: PathBuf,
    out: OutputFile,
    pretty: bool,
    written: usize,
}

impl JsonlSink {
    /// Create (or truncate) the output file.
    pub fn create(path: &Path, pretty: bool) -> io::Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        let out = if is_gzip(path) {
            OutputFile::Gzip(GzEncoder::new(file, Compression::default()))
        } else {
            OutputFile::Plain(file)
        };
        debug!(path = %path.display(), pretty, "opened JSONL sink");
        Ok(Self {
            path: path.to_path_buf(),
            out,
            pretty,
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records written so far.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Write every record, then finish the file.
    pub fn write_all<'a, I>(&mut self, records: I) -> Result<usize, RebaseError>
    where
        I: IntoIterator<Item = &'a LogRecord>,
    {
        for record in records {
            self.write_record(record)?;
        }
        self.finish()?;
        Ok(self.written)
    }
}

impl RecordSink for JsonlSink {
    fn write_record(&mut self, record: &LogRecord) -> Result<(), RebaseError> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.out, record).map_err(io::Error::from)?;
        } else {
            serde_json::to_writer(&mut self.out, record).map_err(io::Error::from)?;
        }
        self.out.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RebaseError> {
        self.out.finish()?;
        debug!(path = %self.path.display(), written = self.written, "JSONL sink finished");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use chrono::NaiveDate;
    use flate2::read::GzDecoder;
    use logrebase_core::types::HadoopRecord;

    fn record(seq: usize) -> LogRecord {
        let timestamp = NaiveDate::from_ymd_opt(2015, 10, 18)
            .unwrap()
            .and_hms_milli_opt(18, 1, 47, 978)
            .unwrap();
        LogRecord::Hadoop(HadoopRecord {
            seq,
            timestamp,
            severity: "INFO".to_owned(),
            thread: "main".to_owned(),
            source: "org.apache.hadoop.X".to_owned(),
            msg: "hello".to_owned(),
            logline: "2015-10-18 18:01:47,978 INFO [main] org.apache.hadoop.X: hello".to_owned(),
        })
    }

    #[test]
    fn test_plain_jsonl_one_object_per_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.jsonl");
        let mut sink = JsonlSink::create(&path, false).expect("create");
        let records = [record(0), record(1)];
        assert_eq!(sink.write_all(records.iter()).expect("write"), 2);

        let content = std::fs::read_to_string(&path).expect("read back");
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("valid json");
        assert_eq!(first["format"], "hadoop");
        assert_eq!(first["seq"], 0);
        assert_eq!(first["timestamp"], "2015-10-18T18:01:47.978000");
    }

    #[test]
    fn test_gzip_output_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.jsonl.gz");
        let mut sink = JsonlSink::create(&path, false).expect("create");
        sink.write_all([record(3)].iter()).expect("write");
        assert_eq!(sink.written(), 1);

        let mut decoded = String::new();
        GzDecoder::new(File::open(&path).expect("open"))
            .read_to_string(&mut decoded)
            .expect("gzip should be complete");
        let value: serde_json::Value =
            serde_json::from_str(decoded.trim_end()).expect("valid json");
        assert_eq!(value["seq"], 3);
    }

    #[test]
    fn test_pretty_output_is_indented() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pretty.json");
        let mut sink = JsonlSink::create(&path, true).expect("create");
        sink.write_all([record(0)].iter()).expect("write");

        let content = std::fs::read_to_string(&path).expect("read back");
        assert!(content.lines().count() > 1);
        assert!(content.contains("  \"format\": \"hadoop\""));
    }
}
