//! syslog 형식 파서
//!
//! # 형식
//! ```text
//! Mmm DD HH:MM:SS hostname source(extra)[pid]: message
//! ```
//!
//! 라인에 연도가 없으므로 [`ParseContext::year`]를 사용합니다.
//! 연도 전환(12월 -> 1월) 추적은 파이프라인의 [`YearTracker`](crate::rollover::YearTracker)가 담당합니다.

use chrono::NaiveDateTime;

use logrebase_core::error::ParseError;
use logrebase_core::pipeline::{LogParser, ParseContext};
use logrebase_core::types::{LinuxRecord, LogFormat, LogRecord};

use super::cursor::Cursor;
use super::{bracketed_digits, malformed};
use crate::temporal::{self, SurfaceKind};

const FORMAT: LogFormat = LogFormat::Linux;

/// syslog 형식 파서
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxParser;

impl LinuxParser {
    pub fn new() -> Self {
        Self
    }
}

impl LogParser for LinuxParser {
    fn format(&self) -> LogFormat {
        FORMAT
    }

    fn parse(&self, line: &str, ctx: &ParseContext) -> Result<LogRecord, ParseError> {
        let env = Envelope::parse(FORMAT, line, ctx.year)?;

        let pid = match env.source_full.rfind('[') {
            Some(open) => match bracketed_digits(env.source_full, open) {
                Some(digits) => Some(digits.parse::<u32>().map_err(|_| {
                    malformed(FORMAT, line, env.source_at + open + 1, "pid out of range")
                })?),
                None => None,
            },
            None => None,
        };

        Ok(LogRecord::Linux(LinuxRecord {
            seq: ctx.seq,
            timestamp: env.timestamp,
            hostname: env.hostname.to_owned(),
            source: component_name(env.source_full).to_owned(),
            pid,
            msg: env.msg.to_owned(),
            logline: line.to_owned(),
        }))
    }
}

/// `source(extra)[pid]`에서 괄호 앞의 이름만 남깁니다.
///
/// 이름 부분이 비어 있으면 원문 전체를 사용합니다.
fn component_name(source_full: &str) -> &str {
    let cut = source_full
        .find(['(', '['])
        .unwrap_or(source_full.len());
    match source_full[..cut].trim() {
        "" => source_full,
        name => name,
    }
}

/// syslog 계열 형식이 공유하는 라인 봉투
///
/// `timestamp hostname source_full: msg`
#[derive(Debug)]
pub(crate) struct Envelope<'a> {
    pub(crate) timestamp: NaiveDateTime,
    pub(crate) hostname: &'a str,
    pub(crate) source_full: &'a str,
    /// `source_full`의 라인 내 시작 위치
    pub(crate) source_at: usize,
    pub(crate) msg: &'a str,
}

impl<'a> Envelope<'a> {
    pub(crate) fn parse(format: LogFormat, line: &'a str, year: i32) -> Result<Self, ParseError> {
        let err = |offset: usize, reason: &str| malformed(format, line, offset, reason);

        let stamp = temporal::match_at(SurfaceKind::Syslog, line, 0)
            .ok_or_else(|| err(0, "expected 'Mmm DD HH:MM:SS' timestamp"))?;
        let timestamp = stamp
            .fields
            .resolve(Some(year), false)
            .map_err(|e| malformed(format, line, 0, e.to_string()))?;

        let mut cur = Cursor::at(line, stamp.end);
        if cur.expect_ws().is_none() {
            return Err(err(cur.pos(), "expected whitespace after timestamp"));
        }

        let hostname = cur.take_while(|c| !c.is_whitespace());
        if hostname.is_empty() {
            return Err(err(cur.pos(), "expected hostname"));
        }
        if cur.expect_ws().is_none() {
            return Err(err(cur.pos(), "expected whitespace after hostname"));
        }

        let source_at = cur.pos();
        let source_full = cur
            .take_until(':')
            .ok_or_else(|| err(source_at, "expected 'source:'"))?;
        cur.eat(':');
        cur.skip_ws();

        Ok(Self {
            timestamp,
            hostname,
            source_full,
            source_at,
            msg: cur.rest(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_in(line: &str, year: i32) -> Result<LinuxRecord, ParseError> {
        match LinuxParser::new().parse(line, &ParseContext::new(0, year))? {
            LogRecord::Linux(r) => Ok(r),
            other => panic!("unexpected record {other:?}"),
        }
    }

    fn parse(line: &str) -> Result<LinuxRecord, ParseError> {
        parse_in(line, 2005)
    }

    #[test]
    fn parse_source_with_extra_and_pid() {
        let line = "Jun 14 15:16:01 combo sshd(pam_unix)[19939]: authentication failure; logname= uid=0";
        let r = parse(line).unwrap();
        assert_eq!(r.timestamp.to_string(), "2005-06-14 15:16:01");
        assert_eq!(r.hostname, "combo");
        assert_eq!(r.source, "sshd");
        assert_eq!(r.pid, Some(19939));
        assert_eq!(r.msg, "authentication failure; logname= uid=0");
        assert_eq!(r.logline, line);
    }

    #[test]
    fn parse_without_pid() {
        let r = parse("Jun  9 06:06:20 combo kernel: Linux version 2.6.5-1.358").unwrap();
        assert_eq!(r.source, "kernel");
        assert_eq!(r.pid, None);
        assert_eq!(r.timestamp.to_string(), "2005-06-09 06:06:20");
    }

    #[test]
    fn pid_is_last_bracket_group() {
        let r = parse("Jul 10 10:00:00 combo xinetd[2]x[26482]: START").unwrap();
        assert_eq!(r.pid, Some(26482));
        assert_eq!(r.source, "xinetd");
    }

    #[test]
    fn multi_word_source_is_kept() {
        let r = parse("Jun 15 04:06:18 combo su(pam_unix)[21416]: session opened").unwrap();
        assert_eq!(r.source, "su");
        let r = parse("Jul  1 09:00:55 combo logrotate: ALERT exited abnormally").unwrap();
        assert_eq!(r.source, "logrotate");
        let r = parse("Jul  1 09:00:55 combo rpc statd: unlink of /var/lib").unwrap();
        assert_eq!(r.source, "rpc statd");
    }

    #[test]
    fn empty_name_falls_back_to_source_full() {
        let r = parse("Jul  1 09:00:55 combo [123]: odd").unwrap();
        assert_eq!(r.source, "[123]");
        assert_eq!(r.pid, Some(123));
    }

    #[test]
    fn message_may_be_empty() {
        let r = parse("Jul  1 09:00:55 combo kernel:").unwrap();
        assert_eq!(r.msg, "");
    }

    #[test]
    fn year_comes_from_context() {
        let r = parse_in("Jan  1 00:00:01 combo kernel: x", 2006).unwrap();
        assert_eq!(r.timestamp.to_string(), "2006-01-01 00:00:01");
    }

    #[test]
    fn leap_day_depends_on_year() {
        assert!(parse_in("Feb 29 10:00:00 combo kernel: x", 2004).is_ok());
        let err = parse_in("Feb 29 10:00:00 combo kernel: x", 2005).unwrap_err();
        assert!(err.to_string().contains("not a calendar date"));
    }

    #[test]
    fn pid_overflow_is_malformed() {
        let err = parse("Jul  1 09:00:55 combo cron[99999999999]: x").unwrap_err();
        assert!(err.to_string().contains("pid out of range"));
    }

    #[test]
    fn reject_missing_colon() {
        assert!(parse("Jul  1 09:00:55 combo no colon here").is_err());
    }

    #[test]
    fn reject_missing_hostname() {
        assert!(parse("Jul  1 09:00:55").is_err());
        assert!(parse("Jul  1 09:00:55 ").is_err());
    }

    #[test]
    fn reject_bad_month() {
        assert!(parse("Foo  1 09:00:55 combo kernel: x").is_err());
        assert!(parse("jul  1 09:00:55 combo kernel: x").is_err());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn parse_arbitrary_text_does_not_panic(line in "\\PC{0,200}") {
                let _ = LinuxParser::new().parse(&line, &ParseContext::new(0, 2005));
            }

            #[test]
            fn pid_roundtrips(pid in any::<u32>()) {
                let line = format!("Jul  1 09:00:55 combo cron[{pid}]: job");
                let r = parse(&line).unwrap();
                prop_assert_eq!(r.pid, Some(pid));
            }
        }
    }
}
