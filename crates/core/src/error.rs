//! 에러 타입 — 도메인별 에러 정의

use crate::types::LogFormat;

/// logrebase 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum RebaseError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 라인 파싱 에러
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// 배치 단위 에러
    #[error("batch error: {0}")]
    Batch(#[from] BatchError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 라인 파싱 에러
///
/// 한 라인에 국한되며 배치 전체를 중단시키지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// 형식 문법과 일치하지 않는 라인
    #[error("malformed {format} line at offset {offset}: {reason}")]
    MalformedLine {
        format: LogFormat,
        offset: usize,
        reason: String,
        line: String,
    },

    /// 입력 데이터 초과
    #[error("input too large: {size} bytes (max: {max})")]
    TooLarge { size: usize, max: usize },
}

impl ParseError {
    /// 문제가 된 원본 라인 (있을 경우)
    pub fn line(&self) -> Option<&str> {
        match self {
            Self::MalformedLine { line, .. } => Some(line),
            Self::TooLarge { .. } => None,
        }
    }
}

/// 배치 단위 에러 — 배치 전체를 중단시킵니다.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// 파싱된 레코드가 하나도 없음
    #[error("empty {format} batch: no parseable lines ({malformed} malformed)")]
    EmptyBatch { format: LogFormat, malformed: usize },

    /// 시프트 결과가 표현 가능한 시각 범위를 벗어남
    #[error("timestamp shift overflow for record #{seq}: {reason}")]
    ShiftOverflow { seq: usize, reason: String },
}
