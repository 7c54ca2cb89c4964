//! 연도 전환 추적기
//!
//! 연도가 없는 형식(linux, openssh)은 라인 순서대로 월을 관찰하여
//! 12월 다음에 1월이 나오면 연도를 하나 올립니다.
//!
//! [`YearTracker`]는 `Copy` 값이며 [`YearTracker::step`]은 순수 전이 함수입니다.
//! 호출자가 라인 순서대로 상태를 넘겨받아 사용합니다.

/// 한 번의 전이에서 연도가 바뀌었는지 여부
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rollover {
    /// 연도 유지
    None,
    /// 12월 -> 1월 전환으로 연도 증가
    Advanced,
}

impl Rollover {
    pub fn is_advanced(&self) -> bool {
        matches!(self, Self::Advanced)
    }
}

/// (현재 연도, 직전 월) 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearTracker {
    year: i32,
    previous_month: Option<u32>,
}

impl YearTracker {
    /// 시작 연도로 초기화합니다. 직전 월은 없습니다.
    pub fn new(start_year: i32) -> Self {
        Self {
            year: start_year,
            previous_month: None,
        }
    }

    /// 현재 추정 연도
    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn previous_month(&self) -> Option<u32> {
        self.previous_month
    }

    /// 파싱에 성공한 라인의 월(1..=12)을 관찰합니다.
    ///
    /// 직전 월이 12월이고 이번 월이 1월이면 연도가 1 증가합니다.
    pub fn step(self, month: u32) -> (Self, Rollover) {
        let rollover = match (self.previous_month, month) {
            (Some(12), 1) => Rollover::Advanced,
            _ => Rollover::None,
        };
        let year = match rollover {
            Rollover::Advanced => self.year.saturating_add(1),
            Rollover::None => self.year,
        };
        (
            Self {
                year,
                previous_month: Some(month),
            },
            rollover,
        )
    }
}
