//! Line source over plain or gzip-compressed log files
//!
//! Bytes are split on `\n`; a trailing `\r` is dropped and invalid UTF-8
//! is replaced rather than rejected, so one bad byte never aborts a batch.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;
use tracing::debug;

/// Whether a path names a gzip file (by extension).
pub fn is_gzip(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

/// Iterator over the lines of an input file.
pub struct LineSource {
    path: PathBuf,
    reader: Box<dyn BufRead + Send>,
    buf: Vec<u8>,
    lines_read: usize,
}

impl LineSource {
    /// Open `path`, decompressing on the fly when it ends in `.gz`.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        let compressed = is_gzip(path);
        debug!(path = %path.display(), compressed, "opening line source");
        let reader: Box<dyn BufRead + Send> = if compressed {
            Box::new(BufReader::new(MultiGzDecoder::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Ok(Self::from_reader(path, reader))
    }

    /// Wrap an existing reader.
    pub fn from_reader(path: &Path, reader: Box<dyn BufRead + Send>) -> Self {
        Self {
            path: path.to_path_buf(),
            reader,
            buf: Vec::new(),
            lines_read: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lines_read(&self) -> usize {
        self.lines_read
    }
}

impl Iterator for LineSource {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                }
                if self.buf.last() == Some(&b'\r') {
                    self.buf.pop();
                }
                self.lines_read += 1;
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn collect(source: LineSource) -> Vec<String> {
        source
            .collect::<io::Result<Vec<_>>>()
            .expect("in-memory read should succeed")
    }

    #[test]
    fn test_is_gzip_by_extension() {
        assert!(is_gzip(Path::new("Linux.log.gz")));
        assert!(is_gzip(Path::new("/data/x.GZ")));
        assert!(!is_gzip(Path::new("Linux.log")));
        assert!(!is_gzip(Path::new("gz")));
    }

    #[test]
    fn test_splits_lines_and_strips_crlf() {
        let data = b"first\r\nsecond\n\nthird".to_vec();
        let source = LineSource::from_reader(Path::new("mem"), Box::new(Cursor::new(data)));
        assert_eq!(collect(source), vec!["first", "second", "", "third"]);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        let data = b"ok\nbad \xff byte\n".to_vec();
        let source = LineSource::from_reader(Path::new("mem"), Box::new(Cursor::new(data)));
        let lines = collect(source);
        assert_eq!(lines[0], "ok");
        assert!(lines[1].starts_with("bad "));
        assert!(lines[1].ends_with(" byte"));
    }

    #[test]
    fn test_open_gzip_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("sample.log.gz");
        let file = File::create(&path).expect("create");
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder
            .write_all(b"Jun  9 06:06:20 combo kernel: a\nJun  9 06:06:21 combo kernel: b\n")
            .expect("write");
        encoder.finish().expect("finish");

        let mut source = LineSource::open(&path).expect("open");
        assert_eq!(source.path(), path.as_path());
        let first = source.next().expect("first line").expect("read");
        assert_eq!(first, "Jun  9 06:06:20 combo kernel: a");
        assert_eq!(source.by_ref().count(), 1);
        assert_eq!(source.lines_read(), 2);
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let err = LineSource::open(Path::new("/nonexistent/logrebase/input.log"))
            .err()
            .expect("should fail");
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
