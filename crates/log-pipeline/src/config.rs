//! 배치 파이프라인 설정
//!
//! [`PipelineConfig`]는 core의 [`BatchConfig`](logrebase_core::config::BatchConfig)와
//! 배치 형식으로부터 만들어집니다.
//!
//! # 사용 예시
//! ```
//! use logrebase_core::{LogFormat, RebaseConfig};
//! use logrebase_pipeline::config::PipelineConfig;
//!
//! let core_config = RebaseConfig::default();
//! let config = PipelineConfig::from_core(&core_config.batch, LogFormat::OpenSsh);
//! assert_eq!(config.start_year, 2023);
//! ```

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use logrebase_core::config::{BatchConfig, DEFAULT_MAX_LINE_LENGTH};
use logrebase_core::types::LogFormat;

use crate::error::LogPipelineError;

/// 연도 상한 (네 자리 렌더링)
const MAX_YEAR: i32 = 9999;

/// 배치 파이프라인 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// 배치 형식
    pub format: LogFormat,
    /// 연도가 없는 형식의 시작 연도
    pub start_year: i32,
    /// 시프트 기준 시각 (None이면 호출자가 정규화 시점에 전달)
    pub now: Option<NaiveDateTime>,
    /// 라인 길이 상한 (바이트)
    pub max_line_length: usize,
    /// 형식별 기본 보강기 사용 여부
    pub enrich: bool,
}

impl PipelineConfig {
    /// 형식의 기본값으로 설정을 생성합니다.
    pub fn for_format(format: LogFormat) -> Self {
        Self {
            format,
            start_year: format.default_start_year(),
            now: None,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            enrich: true,
        }
    }

    /// core의 `BatchConfig`에서 파이프라인 설정을 생성합니다.
    pub fn from_core(core: &BatchConfig, format: LogFormat) -> Self {
        Self {
            start_year: core.start_year_for(format),
            now: core.now,
            max_line_length: core.max_line_length,
            ..Self::for_format(format)
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogPipelineError> {
        if !(1..=MAX_YEAR).contains(&self.start_year) {
            return Err(LogPipelineError::Config {
                field: "start_year".to_owned(),
                reason: format!("must be 1-{MAX_YEAR}, got {}", self.start_year),
            });
        }

        if let Some(year) = self
            .now
            .map(|now| now.year())
            .filter(|year| !(1..=MAX_YEAR).contains(year))
        {
            return Err(LogPipelineError::Config {
                field: "now".to_owned(),
                reason: format!("year must be 1-{MAX_YEAR}, got {year}"),
            });
        }

        if self.max_line_length == 0 {
            return Err(LogPipelineError::Config {
                field: "max_line_length".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::for_format(LogFormat::Linux)
    }
}
