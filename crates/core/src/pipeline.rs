//! 파이프라인 trait — 모듈 확장 포인트 정의

use crate::error::{ParseError, RebaseError};
use crate::types::{LogFormat, LogRecord};

/// 한 라인을 파싱할 때 필요한 문맥
///
/// 연도가 없는 형식은 `year`를 사용해 날짜를 확정합니다.
/// 연도를 명시하는 형식은 이 값을 무시합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseContext {
    /// 배치 내 원본 라인 순번
    pub seq: usize,
    /// 현재 추론된 연도
    pub year: i32,
}

impl ParseContext {
    pub fn new(seq: usize, year: i32) -> Self {
        Self { seq, year }
    }

    /// 같은 라인을 다른 연도로 다시 파싱할 때 사용합니다.
    pub fn with_year(self, year: i32) -> Self {
        Self { year, ..self }
    }
}

/// 로그 파서 trait
///
/// 새로운 로그 형식을 지원하려면 이 trait을 구현합니다.
/// 파서는 레코드를 완전히 채우거나 `MalformedLine`으로 실패하며, 부분적으로 채운 레코드를 반환하지 않습니다.
pub trait LogParser: Send + Sync {
    /// 지원하는 로그 형식
    fn format(&self) -> LogFormat;

    /// 한 라인(앞뒤 공백 제거 완료)을 레코드로 파싱
    fn parse(&self, line: &str, ctx: &ParseContext) -> Result<LogRecord, ParseError>;
}

/// 정규화된 레코드를 받는 외부 저장소 trait
///
/// 스키마와 전송 방식은 구현체가 결정합니다.
pub trait RecordSink {
    /// 레코드 하나를 기록
    fn write_record(&mut self, record: &LogRecord) -> Result<(), RebaseError>;

    /// 버퍼를 비우고 기록을 마무리
    fn finish(&mut self) -> Result<(), RebaseError>;
}
