//! 날짜 표면(surface) 문법 -- 라인 파서와 내장 날짜 재작성기가 함께 사용합니다.
//!
//! 세 가지 표면을 인식합니다.
//!
//! | 표면 | 예시 | 요일 | 연도 |
//! |------|------|------|------|
//! | [`SurfaceKind::Ctime`] | `Mon Nov 28 18:36:18 2005` | O | O |
//! | [`SurfaceKind::Syslog`] | `Jan  3 21:20:56` | X | X |
//! | [`SurfaceKind::Iso`] | `2015-10-18 18:01:47,978` | X | O |
//!
//! 매칭 결과([`SurfaceMatch`])는 각 구성요소의 위치를 기억하므로,
//! 재렌더링 시 구성요소 사이의 구분자는 원문 그대로 보존됩니다.

use std::fmt;
use std::ops::Range;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::Serialize;

use crate::parser::cursor::Cursor;

/// 월 약어 (1월부터)
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// 요일 약어 (월요일부터)
pub const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const WEEKDAY_VALUES: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// 날짜 표면 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SurfaceKind {
    /// `Www Mmm DD HH:MM:SS YYYY`
    Ctime,
    /// `Mmm DD HH:MM:SS` (연도 없음)
    Syslog,
    /// `YYYY-MM-DD HH:MM:SS,fff`
    Iso,
}

impl SurfaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ctime => "ctime",
            Self::Syslog => "syslog",
            Self::Iso => "iso",
        }
    }

    /// 표면에 연도가 포함되는지 여부
    pub fn has_year(&self) -> bool {
        !matches!(self, Self::Syslog)
    }
}

impl fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 일(day) 렌더링 규칙
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DayPad {
    /// `04`
    Zero,
    /// ` 4` / `14` (구분자 포함 폭 유지, 오른쪽 정렬)
    Space,
    /// `4`
    None,
}

/// 원문 구간에서 관찰한 렌더링 규칙
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SurfaceStyle {
    pub kind: SurfaceKind,
    pub day_pad: DayPad,
    /// `Space` 규칙에서 앞 공백을 포함한 일 필드 폭
    pub day_width: usize,
    /// 초 이하 자릿수 (`Iso`만 0보다 큼)
    pub subsec_digits: u32,
}

/// 표면에서 읽은 달력 구성요소 (검증 전)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFields {
    pub weekday: Option<Weekday>,
    pub year: Option<i32>,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub nanos: u32,
}

/// 구성요소를 달력 값으로 확정하지 못한 이유
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("no year available for a yearless date")]
    MissingYear,

    #[error("{year:04}-{month:02}-{day:02} is not a calendar date")]
    InvalidDate { year: i32, month: u32, day: u32 },

    #[error("{hour:02}:{minute:02}:{second:02} is not a time of day")]
    InvalidTime { hour: u32, minute: u32, second: u32 },

    #[error("weekday {found} does not match the date ({expected})")]
    WeekdayMismatch { found: Weekday, expected: Weekday },
}

impl DateFields {
    /// 달력 값으로 확정합니다.
    ///
    /// 표면에 연도가 없으면 `year_ctx`를 사용합니다.
    /// `check_weekday`가 true이면 표면의 요일이 날짜와 일치해야 합니다.
    pub fn resolve(
        &self,
        year_ctx: Option<i32>,
        check_weekday: bool,
    ) -> Result<NaiveDateTime, DateError> {
        let year = self.year.or(year_ctx).ok_or(DateError::MissingYear)?;
        let date =
            NaiveDate::from_ymd_opt(year, self.month, self.day).ok_or(DateError::InvalidDate {
                year,
                month: self.month,
                day: self.day,
            })?;
        let time = NaiveTime::from_hms_nano_opt(self.hour, self.minute, self.second, self.nanos)
            .ok_or(DateError::InvalidTime {
                hour: self.hour,
                minute: self.minute,
                second: self.second,
            })?;

        if check_weekday {
            if let Some(found) = self.weekday {
                let expected = date.weekday();
                if found != expected {
                    return Err(DateError::WeekdayMismatch { found, expected });
                }
            }
        }

        Ok(NaiveDateTime::new(date, time))
    }
}

/// 구성요소별 원문 위치
#[derive(Debug, Clone, PartialEq, Eq)]
struct Parts {
    weekday: Option<Range<usize>>,
    year: Option<Range<usize>>,
    month: Range<usize>,
    day: Range<usize>,
    time: Range<usize>,
    subsec: Option<Range<usize>>,
}

/// 텍스트에서 찾은 날짜 표면 한 건
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceMatch {
    pub start: usize,
    pub end: usize,
    pub fields: DateFields,
    pub style: SurfaceStyle,
    parts: Parts,
}

/// 확정된 값이 붙은 내장 날짜 구간
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmbeddedDateSpan {
    pub start: usize,
    pub end: usize,
    pub value: NaiveDateTime,
    pub style: SurfaceStyle,
}

impl SurfaceMatch {
    /// 원문 구간
    pub fn text<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }

    /// 확정된 값으로 [`EmbeddedDateSpan`]을 만듭니다.
    pub fn into_span(self, value: NaiveDateTime) -> EmbeddedDateSpan {
        EmbeddedDateSpan {
            start: self.start,
            end: self.end,
            value,
            style: self.style,
        }
    }

    /// 새 값을 원문과 같은 모양으로 렌더링합니다.
    ///
    /// 반환값은 `text[start..end]`를 대체할 문자열이며, 구성요소 사이 구분자는 원문에서 복사합니다.
    /// 연도가 있는 표면에서 `value`의 연도는 0..=9999 범위여야 합니다.
    pub fn render(&self, text: &str, value: &NaiveDateTime) -> String {
        let style = &self.style;
        let mut pieces: Vec<(Range<usize>, String)> = Vec::with_capacity(6);

        if let Some(range) = &self.parts.weekday {
            let idx = value.weekday().num_days_from_monday() as usize;
            pieces.push((range.clone(), WEEKDAYS[idx].to_owned()));
        }
        if let Some(range) = &self.parts.year {
            pieces.push((range.clone(), format!("{:04}", value.year())));
        }

        let month = match style.kind {
            SurfaceKind::Iso => format!("{:02}", value.month()),
            SurfaceKind::Ctime | SurfaceKind::Syslog => MONTHS[value.month0() as usize].to_owned(),
        };
        pieces.push((self.parts.month.clone(), month));
        pieces.push((self.parts.day.clone(), render_day(value.day(), style)));
        pieces.push((
            self.parts.time.clone(),
            value.format("%H:%M:%S").to_string(),
        ));

        if let Some(range) = &self.parts.subsec {
            let nanos = format!("{:09}", value.nanosecond() % 1_000_000_000);
            let digits = (style.subsec_digits as usize).min(9);
            pieces.push((range.clone(), nanos[..digits].to_owned()));
        }

        pieces.sort_by_key(|(range, _)| range.start);

        let mut out = String::with_capacity(self.end - self.start + 2);
        let mut at = self.start;
        for (range, piece) in pieces {
            out.push_str(&text[at..range.start]);
            out.push_str(&piece);
            at = range.end;
        }
        out.push_str(&text[at..self.end]);
        out
    }
}

fn render_day(day: u32, style: &SurfaceStyle) -> String {
    match style.day_pad {
        DayPad::Zero => format!("{day:02}"),
        DayPad::None => day.to_string(),
        DayPad::Space => format!("{day:>width$}", width = style.day_width),
    }
}

/// `pos`에서 시작하는 표면을 매칭합니다.
pub fn match_at(kind: SurfaceKind, text: &str, pos: usize) -> Option<SurfaceMatch> {
    if pos >= text.len() || !text.as_bytes()[pos].is_ascii() {
        return None;
    }
    match kind {
        SurfaceKind::Ctime => match_ctime(text, pos),
        SurfaceKind::Syslog => match_syslog(text, pos),
        SurfaceKind::Iso => match_iso(text, pos),
    }
}

/// 텍스트의 모든 시작 위치에서 매칭을 시도합니다 (겹칠 수 있음).
pub fn candidates(kind: SurfaceKind, text: &str) -> impl Iterator<Item = SurfaceMatch> + '_ {
    let starts_with = move |b: u8| match kind {
        SurfaceKind::Ctime | SurfaceKind::Syslog => b.is_ascii_uppercase(),
        SurfaceKind::Iso => b.is_ascii_digit(),
    };
    text.bytes()
        .enumerate()
        .filter(move |&(_, b)| starts_with(b))
        .filter_map(move |(pos, _)| match_at(kind, text, pos))
}

/// 가장 앞에서 시작하는 표면
pub fn find_first(kind: SurfaceKind, text: &str) -> Option<SurfaceMatch> {
    candidates(kind, text).next()
}

/// 왼쪽부터 겹치지 않는 모든 표면
pub fn find_all(kind: SurfaceKind, text: &str) -> Vec<SurfaceMatch> {
    let mut found: Vec<SurfaceMatch> = Vec::new();
    for m in candidates(kind, text) {
        if found.last().is_none_or(|prev| m.start >= prev.end) {
            found.push(m);
        }
    }
    found
}

fn month_field(cur: &mut Cursor<'_>) -> Option<(u32, Range<usize>)> {
    let start = cur.pos();
    let idx = cur.one_of(&MONTHS)?;
    Some((idx as u32 + 1, start..cur.pos()))
}

/// 공백 구분자 + 1~2자리 일
fn day_field(cur: &mut Cursor<'_>) -> Option<(u32, Range<usize>, DayPad, usize)> {
    let sep_start = cur.pos();
    let sep = cur.take_while(|c| c == ' ').len();
    if sep == 0 {
        return None;
    }
    let digits_start = cur.pos();
    let (day, len) = cur.digits(1, 2)?;
    let zero_led = cur.input().as_bytes()[digits_start] == b'0';

    let pad = match (len, zero_led, sep) {
        (2, true, _) => DayPad::Zero,
        (1, _, 1) => DayPad::None,
        _ => DayPad::Space,
    };
    let (range, width) = match pad {
        DayPad::Space => (sep_start..cur.pos(), sep + len),
        DayPad::Zero | DayPad::None => (digits_start..cur.pos(), len),
    };
    Some((day, range, pad, width))
}

/// `HH:MM:SS`
fn clock_field(cur: &mut Cursor<'_>) -> Option<(u32, u32, u32, Range<usize>)> {
    let start = cur.pos();
    let hour = cur.fixed_digits(2)?;
    cur.eat(':').then_some(())?;
    let minute = cur.fixed_digits(2)?;
    cur.eat(':').then_some(())?;
    let second = cur.fixed_digits(2)?;
    Some((hour, minute, second, start..cur.pos()))
}

fn match_ctime(text: &str, pos: usize) -> Option<SurfaceMatch> {
    let mut cur = Cursor::at(text, pos);

    let wd_start = cur.pos();
    let wd_idx = cur.one_of(&WEEKDAYS)?;
    let weekday_range = wd_start..cur.pos();
    cur.eat(' ').then_some(())?;

    let (month, month_range) = month_field(&mut cur)?;
    let (day, day_range, day_pad, day_width) = day_field(&mut cur)?;
    cur.eat(' ').then_some(())?;
    let (hour, minute, second, time_range) = clock_field(&mut cur)?;
    cur.eat(' ').then_some(())?;

    let year_start = cur.pos();
    let year = cur.fixed_digits(4)?;
    let year_range = year_start..cur.pos();

    Some(SurfaceMatch {
        start: pos,
        end: cur.pos(),
        fields: DateFields {
            weekday: Some(WEEKDAY_VALUES[wd_idx]),
            year: Some(year as i32),
            month,
            day,
            hour,
            minute,
            second,
            nanos: 0,
        },
        style: SurfaceStyle {
            kind: SurfaceKind::Ctime,
            day_pad,
            day_width,
            subsec_digits: 0,
        },
        parts: Parts {
            weekday: Some(weekday_range),
            year: Some(year_range),
            month: month_range,
            day: day_range,
            time: time_range,
            subsec: None,
        },
    })
}

fn match_syslog(text: &str, pos: usize) -> Option<SurfaceMatch> {
    let mut cur = Cursor::at(text, pos);

    let (month, month_range) = month_field(&mut cur)?;
    let (day, day_range, day_pad, day_width) = day_field(&mut cur)?;
    cur.expect_ws()?;
    let (hour, minute, second, time_range) = clock_field(&mut cur)?;

    Some(SurfaceMatch {
        start: pos,
        end: cur.pos(),
        fields: DateFields {
            weekday: None,
            year: None,
            month,
            day,
            hour,
            minute,
            second,
            nanos: 0,
        },
        style: SurfaceStyle {
            kind: SurfaceKind::Syslog,
            day_pad,
            day_width,
            subsec_digits: 0,
        },
        parts: Parts {
            weekday: None,
            year: None,
            month: month_range,
            day: day_range,
            time: time_range,
            subsec: None,
        },
    })
}

fn match_iso(text: &str, pos: usize) -> Option<SurfaceMatch> {
    let mut cur = Cursor::at(text, pos);

    let year = cur.fixed_digits(4)?;
    let year_range = pos..cur.pos();
    cur.eat('-').then_some(())?;
    let month_start = cur.pos();
    let month = cur.fixed_digits(2)?;
    let month_range = month_start..cur.pos();
    cur.eat('-').then_some(())?;
    let day_start = cur.pos();
    let day = cur.fixed_digits(2)?;
    let day_range = day_start..cur.pos();
    cur.eat(' ').then_some(())?;
    let (hour, minute, second, time_range) = clock_field(&mut cur)?;
    cur.eat(',').then_some(())?;

    let subsec_start = cur.pos();
    let frac = cur.fixed_digits(3)?;
    if cur.peek().is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }
    let nanos = frac * 1_000_000;

    Some(SurfaceMatch {
        start: pos,
        end: cur.pos(),
        fields: DateFields {
            weekday: None,
            year: Some(year as i32),
            month,
            day,
            hour,
            minute,
            second,
            nanos,
        },
        style: SurfaceStyle {
            kind: SurfaceKind::Iso,
            day_pad: DayPad::Zero,
            day_width: 2,
            subsec_digits: 3,
        },
        parts: Parts {
            weekday: None,
            year: Some(year_range),
            month: month_range,
            day: day_range,
            time: time_range,
            subsec: Some(subsec_start..cur.pos()),
        },
    })
}
