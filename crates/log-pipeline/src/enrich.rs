//! 필드 보강 -- 파싱된 레코드의 메시지에서 선택 필드를 추가로 추출합니다.
//!
//! 보강은 레코드를 실패시키지 않습니다. 일치하는 패턴이 없으면 필드는 비어 있는 채로 남습니다.
//! 정규식은 생성 시 한 번만 컴파일합니다.

use regex::Regex;

use logrebase_core::types::{LogFormat, LogRecord};

use crate::error::LogPipelineError;

/// 단어 경계가 있는 IPv4 점 표기 (옥텟 0-255)
pub const IPV4_PATTERN: &str = r"\b(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\b";

/// 사용자 이름 패턴 (순서대로 시도, 첫 일치 사용)
pub const USER_PATTERNS: [&str; 8] = [
    r"user=(\S+)",
    r"user\s+(\S+)",
    r"Invalid user (\S+)",
    r"for invalid user (\S+)",
    r"for user (\S+)",
    r"password for (\S+)",
    r"authentication failure.* for (\S+)",
    r"authentication failures? for (\S+)",
];

/// 메시지 기반 필드 보강기
pub trait FieldEnricher: Send + Sync {
    /// 보강기 이름 (로그용)
    fn name(&self) -> &str;

    /// 레코드를 보강합니다. 필드를 채웠으면 true.
    fn enrich(&self, record: &mut LogRecord) -> bool;
}

/// 메시지의 첫 IPv4 주소를 `ip`로 채웁니다.
#[derive(Debug, Clone)]
pub struct AddressEnricher {
    pattern: Regex,
}

impl AddressEnricher {
    pub fn new() -> Result<Self, LogPipelineError> {
        Ok(Self {
            pattern: Regex::new(IPV4_PATTERN)?,
        })
    }

    /// 메시지에서 첫 주소를 찾습니다.
    pub fn find<'a>(&self, msg: &'a str) -> Option<&'a str> {
        self.pattern.find(msg).map(|m| m.as_str())
    }
}

impl FieldEnricher for AddressEnricher {
    fn name(&self) -> &str {
        "address"
    }

    fn enrich(&self, record: &mut LogRecord) -> bool {
        let LogRecord::OpenSsh(r) = record else {
            return false;
        };
        match self.find(&r.msg) {
            Some(ip) => {
                r.ip = Some(ip.to_owned());
                true
            }
            None => false,
        }
    }
}

/// 여러 표현 중 첫 번째로 일치하는 사용자 이름을 `user`로 채웁니다.
#[derive(Debug, Clone)]
pub struct UserEnricher {
    patterns: Vec<Regex>,
}

impl UserEnricher {
    /// 기본 패턴([`USER_PATTERNS`])으로 생성합니다.
    pub fn new() -> Result<Self, LogPipelineError> {
        Self::with_patterns(&USER_PATTERNS)
    }

    /// 사용자 지정 패턴으로 생성합니다. 각 패턴은 캡처 그룹 1에 이름을 담아야 합니다.
    pub fn with_patterns(patterns: &[&str]) -> Result<Self, LogPipelineError> {
        let patterns = patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// 메시지에서 사용자 이름을 찾습니다.
    pub fn find<'a>(&self, msg: &'a str) -> Option<&'a str> {
        self.patterns
            .iter()
            .find_map(|re| re.captures(msg)?.get(1))
            .map(|m| m.as_str())
    }
}

impl FieldEnricher for UserEnricher {
    fn name(&self) -> &str {
        "user"
    }

    fn enrich(&self, record: &mut LogRecord) -> bool {
        let LogRecord::OpenSsh(r) = record else {
            return false;
        };
        match self.find(&r.msg) {
            Some(user) => {
                r.user = Some(user.to_owned());
                true
            }
            None => false,
        }
    }
}

/// 형식의 기본 보강기 목록
///
/// openssh만 `[AddressEnricher, UserEnricher]`를 사용하고 나머지는 비어 있습니다.
pub fn default_enrichers(
    format: LogFormat,
) -> Result<Vec<Box<dyn FieldEnricher>>, LogPipelineError> {
    match format {
        LogFormat::OpenSsh => Ok(vec![
            Box::new(AddressEnricher::new()?),
            Box::new(UserEnricher::new()?),
        ]),
        LogFormat::Apache | LogFormat::Hadoop | LogFormat::Linux => Ok(Vec::new()),
    }
}
