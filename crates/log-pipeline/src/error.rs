//! 로그 파이프라인 에러 타입
//!
//! [`LogPipelineError`]는 파싱/시프트/재작성 파이프라인 내부에서 발생하는 에러를 표현합니다.
//! `From<LogPipelineError> for RebaseError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 자연스럽게 전파할 수 있습니다.

use logrebase_core::error::{BatchError, ConfigError, ParseError, RebaseError};
use logrebase_core::types::LogFormat;

/// 로그 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum LogPipelineError {
    /// 라인 파싱 실패 (배치에서 제외되며 치명적이지 않음)
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// 지원하지 않는 로그 형식
    #[error("unsupported log format: {0}")]
    UnsupportedFormat(String),

    /// 파싱된 레코드가 없는 배치
    #[error("empty {format} batch: no parseable lines ({malformed} malformed)")]
    EmptyBatch {
        /// 배치 형식
        format: LogFormat,
        /// 제외된 라인 수
        malformed: usize,
    },

    /// 시프트 결과가 표현 범위를 벗어남
    #[error("shift overflow for record #{seq}: {reason}")]
    ShiftOverflow {
        /// 원본 라인 순번
        seq: usize,
        /// 실패 사유
        reason: String,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 정규식 컴파일 에러
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<LogPipelineError> for RebaseError {
    fn from(err: LogPipelineError) -> Self {
        match err {
            LogPipelineError::Parse(e) => RebaseError::Parse(e),
            LogPipelineError::EmptyBatch { format, malformed } => {
                RebaseError::Batch(BatchError::EmptyBatch { format, malformed })
            }
            LogPipelineError::ShiftOverflow { seq, reason } => {
                RebaseError::Batch(BatchError::ShiftOverflow { seq, reason })
            }
            LogPipelineError::Config { field, reason } => {
                RebaseError::Config(ConfigError::InvalidValue { field, reason })
            }
            LogPipelineError::UnsupportedFormat(name) => {
                RebaseError::Config(ConfigError::InvalidValue {
                    field: "format".to_owned(),
                    reason: format!("unsupported log format: {name}"),
                })
            }
            LogPipelineError::Regex(e) => RebaseError::Config(ConfigError::InvalidValue {
                field: "enricher.pattern".to_owned(),
                reason: e.to_string(),
            }),
            LogPipelineError::Io(e) => RebaseError::Io(e),
        }
    }
}
