//! 배치 타임스탬프 시프터
//!
//! 배치 전체의 최대 타임스탬프를 기준 시각(`now`)으로 옮기는 단일 delta를 계산하고,
//! 모든 레코드의 구조화 타임스탬프에 그대로 더합니다.
//!
//! ```text
//! delta  = now - max(timestamp)
//! new_ts = ts + delta
//! ```

use chrono::{NaiveDateTime, TimeDelta};
use serde::Serialize;

use logrebase_core::types::{LogFormat, LogRecord};

use crate::error::LogPipelineError;

/// 배치 하나에 적용할 시프트 값
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ShiftDelta {
    /// 배치의 최대 타임스탬프 (시프트 전)
    pub max: NaiveDateTime,
    /// 기준 시각 (형식 정밀도로 절삭됨)
    pub now: NaiveDateTime,
    /// `now - max`
    #[serde(serialize_with = "serialize_delta")]
    pub delta: TimeDelta,
}

impl ShiftDelta {
    /// 최대값과 기준 시각으로 delta를 계산합니다.
    pub fn between(max: NaiveDateTime, now: NaiveDateTime) -> Self {
        Self {
            max,
            now,
            delta: now.signed_duration_since(max),
        }
    }

    /// 시각 하나에 delta를 더합니다. 표현 범위를 벗어나면 None.
    pub fn apply(&self, ts: NaiveDateTime) -> Option<NaiveDateTime> {
        ts.checked_add_signed(self.delta)
    }
}

fn serialize_delta<S: serde::Serializer>(delta: &TimeDelta, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(delta.num_seconds())
}

/// 배치 단위 시프터
#[derive(Debug, Clone, Copy)]
pub struct BatchShifter {
    format: LogFormat,
    now: NaiveDateTime,
}

impl BatchShifter {
    /// 형식과 기준 시각으로 시프터를 만듭니다.
    ///
    /// `now`는 형식 고유의 초 이하 자릿수로 절삭됩니다.
    pub fn new(format: LogFormat, now: NaiveDateTime) -> Self {
        Self {
            format,
            now: format.truncate(now),
        }
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// 절삭된 기준 시각
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// 배치 전체를 보고 delta를 계산합니다.
    ///
    /// # Errors
    /// 레코드가 없으면 [`LogPipelineError::EmptyBatch`]
    pub fn plan(&self, records: &[LogRecord]) -> Result<ShiftDelta, LogPipelineError> {
        let max = records
            .iter()
            .map(LogRecord::timestamp)
            .max()
            .ok_or(LogPipelineError::EmptyBatch {
                format: self.format,
                malformed: 0,
            })?;
        Ok(ShiftDelta::between(max, self.now))
    }

    /// 레코드 하나의 구조화 타임스탬프를 시프트합니다.
    pub fn apply(&self, shift: &ShiftDelta, record: &mut LogRecord) -> Result<(), LogPipelineError> {
        let original = record.timestamp();
        let shifted = shift
            .apply(original)
            .ok_or_else(|| LogPipelineError::ShiftOverflow {
                seq: record.seq(),
                reason: format!("{original} + {}s is out of range", shift.delta.num_seconds()),
            })?;
        record.set_timestamp(shifted);
        Ok(())
    }

    /// delta를 계산하고 모든 레코드에 적용합니다.
    pub fn shift_all(&self, records: &mut [LogRecord]) -> Result<ShiftDelta, LogPipelineError> {
        let shift = self.plan(records)?;
        for record in records.iter_mut() {
            self.apply(&shift, record)?;
        }
        Ok(shift)
    }
}
