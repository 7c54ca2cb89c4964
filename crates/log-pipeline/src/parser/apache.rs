//! 웹 서버 에러 로그 파서
//!
//! # 형식
//! ```text
//! [Www Mmm DD HH:MM:SS YYYY] [severity] [client <addr>]? <function>()? message <path>?
//! ```
//!
//! - `[client <addr>]` 주석은 뒤에 공백이 있을 때만 인식합니다.
//! - 메시지 맨 앞의 `name()` 토큰(뒤에 공백 필요)은 `function`으로 추출합니다.
//! - 메시지 끝의 경로 형태 토큰(`/seg/seg` 이상)은 `path`로 추출합니다.
//!   `function`과 `path`는 메시지에서 제거되지 않습니다.

use logrebase_core::error::ParseError;
use logrebase_core::pipeline::{LogParser, ParseContext};
use logrebase_core::types::{ApacheRecord, LogFormat, LogRecord};

use super::cursor::Cursor;
use super::malformed;
use crate::temporal::{self, SurfaceKind};

const FORMAT: LogFormat = LogFormat::Apache;

/// 웹 서버 에러 로그 파서
#[derive(Debug, Default, Clone, Copy)]
pub struct ApacheParser;

impl ApacheParser {
    pub fn new() -> Self {
        Self
    }
}

impl LogParser for ApacheParser {
    fn format(&self) -> LogFormat {
        FORMAT
    }

    fn parse(&self, line: &str, ctx: &ParseContext) -> Result<LogRecord, ParseError> {
        let err = |offset: usize, reason: &str| malformed(FORMAT, line, offset, reason);

        // [timestamp]
        let mut cur = Cursor::new(line);
        if !cur.eat('[') {
            return Err(err(0, "expected '[' before timestamp"));
        }
        let stamp = temporal::match_at(SurfaceKind::Ctime, line, cur.pos())
            .ok_or_else(|| err(1, "expected 'Www Mmm DD HH:MM:SS YYYY' timestamp"))?;
        let mut cur = Cursor::at(line, stamp.end);
        if !cur.eat(']') {
            return Err(err(cur.pos(), "expected ']' after timestamp"));
        }
        let timestamp = stamp
            .fields
            .resolve(None, false)
            .map_err(|e| malformed(FORMAT, line, 1, e.to_string()))?;
        if cur.expect_ws().is_none() {
            return Err(err(cur.pos(), "expected whitespace after timestamp"));
        }

        // [severity]
        if !cur.eat('[') {
            return Err(err(cur.pos(), "expected '[' before severity"));
        }
        let severity_at = cur.pos();
        let severity = cur
            .take_until(']')
            .filter(|s| !s.is_empty())
            .ok_or_else(|| err(severity_at, "expected non-empty severity"))?;
        cur.eat(']');
        if cur.expect_ws().is_none() {
            return Err(err(cur.pos(), "expected whitespace after severity"));
        }

        // [client addr] (optional)
        let client = client_annotation(&mut cur);

        let msg = cur.rest().trim();
        let function = leading_function(msg);
        let path = trailing_path(msg);

        Ok(LogRecord::Apache(ApacheRecord {
            seq: ctx.seq,
            timestamp,
            severity: severity.to_owned(),
            client: client.map(str::to_owned),
            function: function.map(str::to_owned),
            path: path.map(str::to_owned),
            msg: msg.to_owned(),
            logline: line.to_owned(),
        }))
    }
}

/// `[client <addr>]` 뒤에 공백이 있으면 소비하고 주소를 반환합니다.
fn client_annotation<'a>(cur: &mut Cursor<'a>) -> Option<&'a str> {
    let mut probe = *cur;
    if !probe.eat_str("[client") || probe.expect_ws().is_none() {
        return None;
    }
    let addr = probe.take_until(']').filter(|a| !a.is_empty())?;
    probe.eat(']');
    probe.expect_ws()?;
    *cur = probe;
    Some(addr)
}

/// 메시지 맨 앞의 `name()` 토큰 (뒤에 공백 필요)
fn leading_function(msg: &str) -> Option<&str> {
    let mut cur = Cursor::new(msg);
    let name = cur.take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if name.is_empty() || !cur.eat_str("()") {
        return None;
    }
    let end = cur.pos();
    cur.expect_ws()?;
    Some(&msg[..end])
}

/// 메시지 끝까지 이어지는 가장 이른 경로 토큰
fn trailing_path(msg: &str) -> Option<&str> {
    msg.match_indices('/')
        .map(|(i, _)| &msg[i..])
        .find(|suffix| is_path(suffix))
}

fn is_path_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-')
}

/// `(/seg){2,}/?` 전체 일치 여부
fn is_path(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    let mut segments = 0;
    while i < bytes.len() {
        if bytes[i] != b'/' {
            return false;
        }
        let seg_start = i + 1;
        let mut j = seg_start;
        while j < bytes.len() && is_path_byte(bytes[j]) {
            j += 1;
        }
        if j == seg_start {
            // 끝의 '/' 하나만 허용
            return j == bytes.len() && segments >= 2;
        }
        segments += 1;
        i = j;
    }
    segments >= 2
}
