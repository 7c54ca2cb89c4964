//! 내장 날짜 재작성기
//!
//! 레코드의 자유 텍스트(`logline`, `msg`) 안에 있는 날짜를 찾아
//! 배치 delta만큼 옮긴 값으로 다시 렌더링하고, 찾은 구간만 교체합니다.
//!
//! # 형식별 규칙
//! | 형식 | 필드 | 표면 | 범위 |
//! |------|------|------|------|
//! | apache | logline | `[ctime]` | 첫 번째 |
//! | hadoop | logline | iso | 첫 번째 |
//! | openssh | logline | syslog | 첫 번째 |
//! | linux | logline, msg | 0번 위치 syslog + 모든 ctime | 전부 |
//!
//! 연도가 없는 syslog 표면은 레코드의 시프트 전 타임스탬프(`anchor`)의 연도로 확정합니다.
//! 확정할 수 없는 구간은 원문을 그대로 두고 [`AmbiguousDate`]로 보고합니다.

use std::fmt;

use chrono::{Datelike, NaiveDateTime, TimeDelta};
use serde::Serialize;
use tracing::warn;

use logrebase_core::metrics as m;
use logrebase_core::types::{LogFormat, LogRecord};

use crate::temporal::{self, DateError, EmbeddedDateSpan, SurfaceKind, SurfaceMatch};

/// 재작성 대상 텍스트 필드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextField {
    Logline,
    Msg,
}

impl TextField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Logline => "logline",
            Self::Msg => "msg",
        }
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 날짜 구간을 옮기지 못한 이유
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AmbiguityReason {
    /// 달력 값으로 확정 불가 (잘못된 날짜, 연도 없음 등)
    #[error(transparent)]
    Date(#[from] DateError),

    /// 레코드의 연도 문맥으로 확정한 값이 구조화 타임스탬프와 다름
    #[error("resolved to {found} but the record timestamp is {expected}")]
    YearContextMismatch {
        found: NaiveDateTime,
        expected: NaiveDateTime,
    },

    /// delta를 더하면 표현 범위를 벗어남
    #[error("shifted value is out of range")]
    Overflow,

    /// 시프트 결과 연도를 네 자리로 렌더링할 수 없음
    #[error("shifted year {0} cannot be rendered")]
    YearOutOfRange(i32),
}

/// 원문 그대로 남겨 둔 내장 날짜 한 건
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbiguousDate {
    pub field: TextField,
    /// 필드 내 바이트 오프셋
    pub offset: usize,
    pub surface: SurfaceKind,
    /// 원문 구간
    pub text: String,
    #[serde(serialize_with = "serialize_reason")]
    pub reason: AmbiguityReason,
}

fn serialize_reason<S: serde::Serializer>(reason: &AmbiguityReason, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(reason)
}

/// 레코드 하나의 재작성 결과
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteOutcome {
    /// 교체된 구간 수
    pub rewritten: usize,
    /// 교체된 구간 (원문 위치와 시프트 전 값)
    pub spans: Vec<(TextField, EmbeddedDateSpan)>,
    /// 교체하지 못한 구간
    pub ambiguous: Vec<AmbiguousDate>,
}

impl RewriteOutcome {
    pub fn is_clean(&self) -> bool {
        self.ambiguous.is_empty()
    }

    fn merge(&mut self, other: RewriteOutcome) {
        self.rewritten += other.rewritten;
        self.spans.extend(other.spans);
        self.ambiguous.extend(other.ambiguous);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// 가장 앞의 한 건
    First,
    /// 필드 맨 앞에서 시작하는 한 건
    Anchored,
    /// 겹치지 않는 모든 건
    Every,
}

#[derive(Debug, Clone, Copy)]
struct SpanRule {
    kind: SurfaceKind,
    scope: Scope,
    /// `[`와 `]`로 둘러싸인 구간만 인정
    bracketed: bool,
}

impl SpanRule {
    const fn new(kind: SurfaceKind, scope: Scope) -> Self {
        Self {
            kind,
            scope,
            bracketed: false,
        }
    }

    const fn bracketed(self) -> Self {
        Self {
            bracketed: true,
            ..self
        }
    }

    fn accepts(&self, text: &str, span: &SurfaceMatch) -> bool {
        !self.bracketed
            || (span.start > 0
                && text.as_bytes()[span.start - 1] == b'['
                && text.as_bytes().get(span.end) == Some(&b']'))
    }

    fn locate(&self, text: &str) -> Vec<SurfaceMatch> {
        match self.scope {
            Scope::Anchored => temporal::match_at(self.kind, text, 0).into_iter().collect(),
            Scope::First => temporal::candidates(self.kind, text)
                .find(|span| self.accepts(text, span))
                .into_iter()
                .collect(),
            Scope::Every => temporal::find_all(self.kind, text)
                .into_iter()
                .filter(|span| self.accepts(text, span))
                .collect(),
        }
    }
}

/// 형식별 내장 날짜 재작성기
#[derive(Debug, Clone)]
pub struct EmbeddedDateRewriter {
    format: LogFormat,
    fields: &'static [TextField],
    rules: &'static [SpanRule],
}

const APACHE_RULES: &[SpanRule] = &[SpanRule::new(SurfaceKind::Ctime, Scope::First).bracketed()];
const HADOOP_RULES: &[SpanRule] = &[SpanRule::new(SurfaceKind::Iso, Scope::First)];
const OPENSSH_RULES: &[SpanRule] = &[SpanRule::new(SurfaceKind::Syslog, Scope::First)];
const LINUX_RULES: &[SpanRule] = &[
    SpanRule::new(SurfaceKind::Syslog, Scope::Anchored),
    SpanRule::new(SurfaceKind::Ctime, Scope::Every),
];

impl EmbeddedDateRewriter {
    /// 형식의 기본 규칙으로 재작성기를 만듭니다.
    pub fn for_format(format: LogFormat) -> Self {
        let (fields, rules): (&'static [TextField], &'static [SpanRule]) = match format {
            LogFormat::Apache => (&[TextField::Logline], APACHE_RULES),
            LogFormat::Hadoop => (&[TextField::Logline], HADOOP_RULES),
            LogFormat::OpenSsh => (&[TextField::Logline], OPENSSH_RULES),
            LogFormat::Linux => (&[TextField::Logline, TextField::Msg], LINUX_RULES),
        };
        Self {
            format,
            fields,
            rules,
        }
    }

    pub fn format(&self) -> LogFormat {
        self.format
    }

    /// 재작성 대상 필드 목록
    pub fn fields(&self) -> &[TextField] {
        self.fields
    }

    /// 레코드의 텍스트 필드를 재작성합니다.
    ///
    /// `anchor`는 레코드의 시프트 전 구조화 타임스탬프입니다.
    pub fn rewrite(
        &self,
        record: &mut LogRecord,
        anchor: NaiveDateTime,
        delta: TimeDelta,
    ) -> RewriteOutcome {
        let seq = record.seq();
        let mut outcome = RewriteOutcome::default();
        for &field in self.fields {
            let text = match field {
                TextField::Logline => record.logline_mut(),
                TextField::Msg => record.msg_mut(),
            };
            let (rewritten, field_outcome) = self.rewrite_text(field, text, anchor, delta);
            if let Some(rewritten) = rewritten {
                *text = rewritten;
            }
            outcome.merge(field_outcome);
        }

        for amb in &outcome.ambiguous {
            warn!(
                seq,
                format = %self.format,
                field = %amb.field,
                offset = amb.offset,
                surface = %amb.surface,
                text = amb.text.as_str(),
                reason = %amb.reason,
                "embedded date left unshifted"
            );
        }
        outcome
    }

    /// 텍스트 하나를 재작성합니다. 바뀐 구간이 없으면 첫 값은 None입니다.
    pub fn rewrite_text(
        &self,
        field: TextField,
        text: &str,
        anchor: NaiveDateTime,
        delta: TimeDelta,
    ) -> (Option<String>, RewriteOutcome) {
        let mut located: Vec<SurfaceMatch> = Vec::new();
        for rule in self.rules {
            for found in rule.locate(text) {
                let overlaps = located
                    .iter()
                    .any(|prev| found.start < prev.end && prev.start < found.end);
                if !overlaps {
                    located.push(found);
                }
            }
        }
        located.sort_by_key(|span| span.start);

        let mut outcome = RewriteOutcome::default();
        let mut replacements: Vec<(usize, usize, String)> = Vec::with_capacity(located.len());
        for span in &located {
            let surface = span.style.kind;
            match shift_span(field, span, anchor, delta) {
                Ok((original, shifted)) => {
                    replacements.push((span.start, span.end, span.render(text, &shifted)));
                    outcome.rewritten += 1;
                    outcome.spans.push((field, span.clone().into_span(original)));
                    metrics::counter!(
                        m::DATES_REWRITTEN_TOTAL,
                        m::LABEL_FORMAT => self.format.as_str(),
                        m::LABEL_SURFACE => surface.as_str()
                    )
                    .increment(1);
                }
                Err(reason) => {
                    outcome.ambiguous.push(AmbiguousDate {
                        field,
                        offset: span.start,
                        surface,
                        text: span.text(text).to_owned(),
                        reason,
                    });
                    metrics::counter!(
                        m::AMBIGUOUS_DATES_TOTAL,
                        m::LABEL_FORMAT => self.format.as_str(),
                        m::LABEL_SURFACE => surface.as_str()
                    )
                    .increment(1);
                }
            }
        }

        if replacements.is_empty() {
            return (None, outcome);
        }
        (Some(splice(text, &replacements)), outcome)
    }
}

/// 구간을 달력 값으로 확정하고 delta를 더합니다.
///
/// `logline`의 syslog 구간은 레코드 자신의 타임스탬프여야 합니다.
/// `msg`의 syslog 구간은 `anchor`의 연도로만 확정합니다.
///
/// 반환값: (원래 값, 시프트된 값)
fn shift_span(
    field: TextField,
    span: &SurfaceMatch,
    anchor: NaiveDateTime,
    delta: TimeDelta,
) -> Result<(NaiveDateTime, NaiveDateTime), AmbiguityReason> {
    let original = match span.style.kind {
        SurfaceKind::Syslog => {
            let found = span.fields.resolve(Some(anchor.year()), false)?;
            if field == TextField::Logline && found != anchor {
                return Err(AmbiguityReason::YearContextMismatch {
                    found,
                    expected: anchor,
                });
            }
            found
        }
        SurfaceKind::Ctime => span.fields.resolve(None, false)?,
        SurfaceKind::Iso => span.fields.resolve(None, false)?,
    };

    let shifted = original
        .checked_add_signed(delta)
        .ok_or(AmbiguityReason::Overflow)?;
    if !(0..=9999).contains(&shifted.year()) {
        return Err(AmbiguityReason::YearOutOfRange(shifted.year()));
    }
    Ok((original, shifted))
}

/// 정렬되고 겹치지 않는 구간들을 교체합니다.
fn splice(text: &str, replacements: &[(usize, usize, String)]) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    let mut at = 0;
    for (start, end, piece) in replacements {
        out.push_str(&text[at..*start]);
        out.push_str(piece);
        at = *end;
    }
    out.push_str(&text[at..]);
    out
}
