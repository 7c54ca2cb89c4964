//! 로그 파싱 모듈 -- 형식별 문법 파서
//!
//! 각 파서는 core의 [`LogParser`](logrebase_core::pipeline::LogParser) trait을 구현하며,
//! 정규식 대신 [`cursor`] 기반의 수작업 스캐너로 한 라인을 레코드로 변환합니다.
//! 날짜 부분은 [`temporal`](crate::temporal) 모듈의 표면 문법을 공유합니다.
//!
//! # 지원 형식
//! - 웹 서버 에러 로그 ([`ApacheParser`])
//! - 분산 파일시스템 로그 ([`HadoopParser`])
//! - syslog 형식 ([`LinuxParser`])
//! - 원격 로그인 데몬 ([`OpenSshParser`])
//!
//! # 사용 예시
//! ```
//! use logrebase_core::{LogFormat, ParseContext};
//! use logrebase_pipeline::parser::ParserRegistry;
//!
//! let registry = ParserRegistry::with_defaults();
//! let record = registry
//!     .parse_with(
//!         LogFormat::Linux,
//!         "Jun 14 15:16:01 combo sshd(pam_unix)[19939]: check pass; user unknown",
//!         &ParseContext::new(0, 2005),
//!     )
//!     .unwrap();
//! assert_eq!(record.timestamp().to_string(), "2005-06-14 15:16:01");
//! ```

pub mod apache;
pub(crate) mod cursor;
pub mod hadoop;
pub mod linux;
pub mod openssh;

pub use apache::ApacheParser;
pub use hadoop::HadoopParser;
pub use linux::LinuxParser;
pub use openssh::OpenSshParser;

use logrebase_core::error::ParseError;
use logrebase_core::pipeline::{LogParser, ParseContext};
use logrebase_core::types::{LogFormat, LogRecord};

use crate::error::LogPipelineError;

/// 파서 레지스트리 -- 형식별 파서를 보관하고 형식으로 조회합니다.
///
/// 형식은 배치 단위로 명시되므로 자동 감지는 하지 않습니다.
pub struct ParserRegistry {
    /// 등록된 파서 목록
    parsers: Vec<Box<dyn LogParser>>,
}

impl ParserRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self {
            parsers: Vec::new(),
        }
    }

    /// 네 가지 기본 파서가 등록된 레지스트리를 생성합니다.
    pub fn with_defaults() -> Self {
        LogFormat::ALL
            .into_iter()
            .fold(Self::new(), |registry, format| registry.register(parser_for(format)))
    }

    /// 파서를 등록합니다. 같은 형식의 파서가 이미 있으면 교체합니다.
    pub fn register(mut self, parser: Box<dyn LogParser>) -> Self {
        let format = parser.format();
        self.parsers.retain(|p| p.format() != format);
        self.parsers.push(parser);
        self
    }

    /// 형식에 해당하는 파서를 반환합니다.
    pub fn get(&self, format: LogFormat) -> Option<&dyn LogParser> {
        self.parsers
            .iter()
            .find(|p| p.format() == format)
            .map(|p| p.as_ref())
    }

    /// 특정 형식의 파서로 직접 파싱합니다.
    pub fn parse_with(
        &self,
        format: LogFormat,
        line: &str,
        ctx: &ParseContext,
    ) -> Result<LogRecord, LogPipelineError> {
        let parser = self
            .get(format)
            .ok_or_else(|| LogPipelineError::UnsupportedFormat(format.to_string()))?;
        Ok(parser.parse(line, ctx)?)
    }

    /// 형식 이름으로 파싱합니다.
    pub fn parse_with_name(
        &self,
        format_name: &str,
        line: &str,
        ctx: &ParseContext,
    ) -> Result<LogRecord, LogPipelineError> {
        let format = LogFormat::from_str_loose(format_name)
            .ok_or_else(|| LogPipelineError::UnsupportedFormat(format_name.to_owned()))?;
        self.parse_with(format, line, ctx)
    }

    /// 등록된 파서 형식 목록을 반환합니다.
    pub fn registered_formats(&self) -> Vec<LogFormat> {
        self.parsers.iter().map(|p| p.format()).collect()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// 형식의 기본 파서를 생성합니다.
pub fn parser_for(format: LogFormat) -> Box<dyn LogParser> {
    match format {
        LogFormat::Apache => Box::new(ApacheParser::new()),
        LogFormat::Hadoop => Box::new(HadoopParser::new()),
        LogFormat::Linux => Box::new(LinuxParser::new()),
        LogFormat::OpenSsh => Box::new(OpenSshParser::new()),
    }
}

/// `MalformedLine` 에러 생성 헬퍼
pub(crate) fn malformed(
    format: LogFormat,
    line: &str,
    offset: usize,
    reason: impl Into<String>,
) -> ParseError {
    ParseError::MalformedLine {
        format,
        offset,
        reason: reason.into(),
        line: line.to_owned(),
    }
}

/// `[digits]` 구간을 찾습니다. `open`은 `[`의 위치입니다.
///
/// 반환값: 괄호 안의 숫자 문자열
pub(crate) fn bracketed_digits(s: &str, open: usize) -> Option<&str> {
    let inner = s.get(open + 1..)?;
    let len = inner.bytes().take_while(u8::is_ascii_digit).count();
    (len > 0 && inner.as_bytes().get(len) == Some(&b']')).then(|| &inner[..len])
}
