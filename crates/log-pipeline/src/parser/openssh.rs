//! 원격 로그인 데몬(openssh) 로그 파서
//!
//! # 형식
//! ```text
//! Mmm DD HH:MM:SS hostname sshd[pid]: message
//! ```
//!
//! syslog 봉투를 그대로 사용하되 `name[pid]`가 반드시 있어야 합니다.
//! `ip`와 `user`는 파이프라인의 enricher가 채웁니다.

use logrebase_core::error::ParseError;
use logrebase_core::pipeline::{LogParser, ParseContext};
use logrebase_core::types::{LogFormat, LogRecord, OpenSshRecord};

use super::linux::Envelope;
use super::{bracketed_digits, malformed};

const FORMAT: LogFormat = LogFormat::OpenSsh;

/// 원격 로그인 데몬 로그 파서
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenSshParser;

impl OpenSshParser {
    pub fn new() -> Self {
        Self
    }
}

impl LogParser for OpenSshParser {
    fn format(&self) -> LogFormat {
        FORMAT
    }

    fn parse(&self, line: &str, ctx: &ParseContext) -> Result<LogRecord, ParseError> {
        let env = Envelope::parse(FORMAT, line, ctx.year)?;

        let (source, digits) = env
            .source_full
            .split_whitespace()
            .find_map(process_token)
            .ok_or_else(|| malformed(FORMAT, line, env.source_at, "missing pid"))?;
        let pid = digits
            .parse::<u32>()
            .map_err(|_| malformed(FORMAT, line, env.source_at, "pid out of range"))?;

        Ok(LogRecord::OpenSsh(OpenSshRecord {
            seq: ctx.seq,
            timestamp: env.timestamp,
            hostname: env.hostname.to_owned(),
            source: source.to_owned(),
            pid,
            msg: env.msg.to_owned(),
            logline: line.to_owned(),
            ip: None,
            user: None,
        }))
    }
}

/// `name[digits]`로 시작하는 토큰을 (name, digits)로 나눕니다.
///
/// `[digits]`가 뒤따르는 `[` 중 가장 오른쪽 것을 고릅니다.
/// 그 뒤에 남는 문자는 무시합니다.
fn process_token(token: &str) -> Option<(&str, &str)> {
    token
        .match_indices('[')
        .rev()
        .filter(|&(k, _)| k >= 1)
        .find_map(|(k, _)| bracketed_digits(token, k).map(|digits| (&token[..k], digits)))
}
