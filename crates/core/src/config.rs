//! 설정 관리 — logrebase.toml 파싱 및 런타임 설정
//!
//! [`RebaseConfig`]는 모든 크레이트의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`LOGREBASE_BATCH_START_YEAR=2005` 형식)
//! 3. 설정 파일 (`logrebase.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logrebase_core::error::RebaseError> {
//! use logrebase_core::config::RebaseConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = RebaseConfig::load("logrebase.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = RebaseConfig::parse("[batch]\nstart_year = 2005")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, RebaseError};
use crate::types::LogFormat;

/// 라인 길이 상한 기본값 (64 KiB)
pub const DEFAULT_MAX_LINE_LENGTH: usize = 64 * 1024;

/// logrebase 통합 설정
///
/// `logrebase.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RebaseConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 배치 처리 설정
    #[serde(default)]
    pub batch: BatchConfig,
    /// 출력 설정
    #[serde(default)]
    pub output: OutputConfig,
}

impl RebaseConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RebaseError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, RebaseError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RebaseError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                RebaseError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, RebaseError> {
        toml::from_str(toml_str).map_err(|e| {
            RebaseError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGREBASE_{SECTION}_{FIELD}`
    /// 예: `LOGREBASE_BATCH_NOW=2030-01-01T00:00:00`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGREBASE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGREBASE_GENERAL_LOG_FORMAT");

        // Batch
        override_opt_i32(&mut self.batch.start_year, "LOGREBASE_BATCH_START_YEAR");
        override_opt_datetime(&mut self.batch.now, "LOGREBASE_BATCH_NOW");
        override_usize(
            &mut self.batch.max_line_length,
            "LOGREBASE_BATCH_MAX_LINE_LENGTH",
        );

        // Output
        override_bool(&mut self.output.pretty_json, "LOGREBASE_OUTPUT_PRETTY_JSON");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), RebaseError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        // start_year / now 연도 범위 검증
        if let Some(year) = self.batch.start_year.filter(|y| !(1..=9999).contains(y)) {
            return Err(ConfigError::InvalidValue {
                field: "batch.start_year".to_owned(),
                reason: format!("{year} is outside 1..=9999"),
            }
            .into());
        }

        if let Some(now) = self.batch.now.filter(|n| !(1..=9999).contains(&n.year())) {
            return Err(ConfigError::InvalidValue {
                field: "batch.now".to_owned(),
                reason: format!("year {} is outside 1..=9999", now.year()),
            }
            .into());
        }

        if self.batch.max_line_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batch.max_line_length".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
        }
    }
}

/// 배치 처리 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// 연도가 없는 형식의 시작 연도 (없으면 형식별 기본값)
    pub start_year: Option<i32>,
    /// 시프트 기준 시각 (없으면 로컬 현재 시각)
    pub now: Option<NaiveDateTime>,
    /// 라인 길이 상한 (바이트)
    pub max_line_length: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            start_year: None,
            now: None,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
        }
    }
}

impl BatchConfig {
    /// 형식에 적용할 시작 연도
    pub fn start_year_for(&self, format: LogFormat) -> i32 {
        self.start_year
            .unwrap_or_else(|| format.default_start_year())
    }
}

/// 출력 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// JSON 출력을 들여쓰기할지 여부
    pub pretty_json: bool,
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_opt_i32(target: &mut Option<i32>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.trim().parse::<i32>() {
            Ok(parsed) => *target = Some(parsed),
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse i32 from env var, ignoring"
            ),
        }
    }
}

fn override_opt_datetime(target: &mut Option<NaiveDateTime>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.trim().parse::<NaiveDateTime>() {
            Ok(parsed) => *target = Some(parsed),
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse datetime from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn default_config_has_sane_values() {
        let config = RebaseConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "pretty");
        assert!(config.batch.start_year.is_none());
        assert!(config.batch.now.is_none());
        assert_eq!(config.batch.max_line_length, DEFAULT_MAX_LINE_LENGTH);
        assert!(!config.output.pretty_json);
    }

    #[test]
    fn default_config_passes_validation() {
        RebaseConfig::default().validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = RebaseConfig::parse("").unwrap();
        config.validate().unwrap();
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let config = RebaseConfig::parse(
            r#"
[batch]
start_year = 2010
"#,
        )
        .unwrap();
        assert_eq!(config.batch.start_year, Some(2010));
        assert_eq!(config.batch.max_line_length, DEFAULT_MAX_LINE_LENGTH);
        assert_eq!(config.general.log_format, "pretty");
    }

    #[test]
    fn from_str_full_toml() {
        let config = RebaseConfig::parse(
            r#"
[general]
log_level = "debug"
log_format = "json"

[batch]
start_year = 2005
now = "2030-01-01T00:00:00"
max_line_length = 4096

[output]
pretty_json = true
"#,
        )
        .unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.general.log_format, "json");
        assert_eq!(config.batch.start_year, Some(2005));
        assert_eq!(
            config.batch.now,
            Some(
                NaiveDate::from_ymd_opt(2030, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
            )
        );
        assert_eq!(config.batch.max_line_length, 4096);
        assert!(config.output.pretty_json);
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let err = RebaseConfig::parse("[batch\nstart_year = ").unwrap_err();
        assert!(matches!(
            err,
            RebaseError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn from_str_invalid_now_returns_error() {
        let err = RebaseConfig::parse("[batch]\nnow = \"yesterday\"").unwrap_err();
        assert!(matches!(
            err,
            RebaseError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = RebaseConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("general.log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = RebaseConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("general.log_format"));
    }

    #[test]
    fn validate_rejects_out_of_range_start_year() {
        let mut config = RebaseConfig::default();
        config.batch.start_year = Some(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("batch.start_year"));
    }

    #[test]
    fn validate_rejects_zero_max_line_length() {
        let mut config = RebaseConfig::default();
        config.batch.max_line_length = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("batch.max_line_length"));
    }

    #[test]
    fn start_year_for_falls_back_to_format_default() {
        let mut batch = BatchConfig::default();
        assert_eq!(batch.start_year_for(LogFormat::Linux), 2005);
        assert_eq!(batch.start_year_for(LogFormat::OpenSsh), 2023);
        batch.start_year = Some(2012);
        assert_eq!(batch.start_year_for(LogFormat::OpenSsh), 2012);
    }

    #[test]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_LOGREBASE_STR", "overridden") };
        override_string(&mut val, "TEST_LOGREBASE_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_LOGREBASE_STR") };
    }

    #[test]
    fn env_override_bool_invalid_keeps_original() {
        let mut val = false;
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_LOGREBASE_BOOL_BAD", "not-a-bool") };
        override_bool(&mut val, "TEST_LOGREBASE_BOOL_BAD");
        assert!(!val);
        unsafe { std::env::remove_var("TEST_LOGREBASE_BOOL_BAD") };
    }

    #[test]
    fn env_override_opt_i32() {
        let mut val = None;
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_LOGREBASE_YEAR", " 2007 ") };
        override_opt_i32(&mut val, "TEST_LOGREBASE_YEAR");
        assert_eq!(val, Some(2007));
        unsafe { std::env::remove_var("TEST_LOGREBASE_YEAR") };
    }

    #[test]
    fn env_override_datetime_invalid_keeps_original() {
        let mut val = None;
        // SAFETY: 테스트는 단일 스레드에서 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_LOGREBASE_NOW_BAD", "tomorrow") };
        override_opt_datetime(&mut val, "TEST_LOGREBASE_NOW_BAD");
        assert!(val.is_none());
        unsafe { std::env::remove_var("TEST_LOGREBASE_NOW_BAD") };
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = "original".to_owned();
        override_string(&mut val, "TEST_LOGREBASE_NONEXISTENT_12345");
        assert_eq!(val, "original");
    }

    #[test]
    fn config_serialize_roundtrip() {
        let mut config = RebaseConfig::default();
        config.batch.start_year = Some(2005);
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = RebaseConfig::parse(&toml_str).unwrap();
        assert_eq!(config.general.log_level, parsed.general.log_level);
        assert_eq!(parsed.batch.start_year, Some(2005));
        assert_eq!(
            config.batch.max_line_length,
            parsed.batch.max_line_length
        );
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = RebaseConfig::from_file("/nonexistent/path/logrebase.toml").await;
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            RebaseError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
