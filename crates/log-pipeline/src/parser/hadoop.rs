//! 분산 파일시스템(hadoop) 로그 파서
//!
//! # 형식
//! ```text
//! YYYY-MM-DD HH:MM:SS,mmm SEVERITY [thread] source: message
//! ```
//!
//! 밀리초는 마이크로초 정밀도로 보관합니다.

use logrebase_core::error::ParseError;
use logrebase_core::pipeline::{LogParser, ParseContext};
use logrebase_core::types::{HadoopRecord, LogFormat, LogRecord};

use super::cursor::Cursor;
use super::malformed;
use crate::temporal::{self, SurfaceKind};

const FORMAT: LogFormat = LogFormat::Hadoop;

/// 분산 파일시스템 로그 파서
#[derive(Debug, Default, Clone, Copy)]
pub struct HadoopParser;

impl HadoopParser {
    pub fn new() -> Self {
        Self
    }
}

impl LogParser for HadoopParser {
    fn format(&self) -> LogFormat {
        FORMAT
    }

    fn parse(&self, line: &str, ctx: &ParseContext) -> Result<LogRecord, ParseError> {
        let err = |offset: usize, reason: &str| malformed(FORMAT, line, offset, reason);

        let stamp = temporal::match_at(SurfaceKind::Iso, line, 0)
            .ok_or_else(|| err(0, "expected 'YYYY-MM-DD HH:MM:SS,mmm' timestamp"))?;
        let timestamp = stamp
            .fields
            .resolve(None, false)
            .map_err(|e| malformed(FORMAT, line, 0, e.to_string()))?;

        let mut cur = Cursor::at(line, stamp.end);
        if cur.expect_ws().is_none() {
            return Err(err(cur.pos(), "expected whitespace after timestamp"));
        }

        let severity = cur.take_while(|c| c.is_alphanumeric() || c == '_');
        if severity.is_empty() {
            return Err(err(cur.pos(), "expected severity"));
        }
        if cur.expect_ws().is_none() {
            return Err(err(cur.pos(), "expected whitespace after severity"));
        }

        if !cur.eat('[') {
            return Err(err(cur.pos(), "expected '[' before thread"));
        }
        let thread_at = cur.pos();
        let thread = cur
            .take_until(']')
            .filter(|t| !t.is_empty())
            .ok_or_else(|| err(thread_at, "expected non-empty thread"))?;
        cur.eat(']');
        if cur.expect_ws().is_none() {
            return Err(err(cur.pos(), "expected whitespace after thread"));
        }

        let source_at = cur.pos();
        let source = cur
            .take_until(':')
            .filter(|s| !s.is_empty())
            .ok_or_else(|| err(source_at, "expected 'source:'"))?;
        cur.eat(':');
        if cur.expect_ws().is_none() {
            return Err(err(cur.pos(), "expected whitespace after 'source:'"));
        }

        Ok(LogRecord::Hadoop(HadoopRecord {
            seq: ctx.seq,
            timestamp,
            severity: severity.to_owned(),
            thread: thread.to_owned(),
            source: source.to_owned(),
            msg: cur.rest().trim().to_owned(),
            logline: line.to_owned(),
        }))
    }
}
