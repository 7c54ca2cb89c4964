//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 파이프라인은 이 상수를 사용하여 `metrics::counter!()` 매크로를 호출합니다.
//! 레코더는 호스트 프로세스가 설치하며, 설치되지 않으면 기록은 무시됩니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logrebase_`
//! - 접미어: `_total` (counter)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(logrebase_core::metrics::LINES_PARSED_TOTAL, "format" => "linux").increment(1);
//! ```

use metrics::describe_counter;

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 로그 형식 레이블 키 (apache, hadoop, linux, openssh)
pub const LABEL_FORMAT: &str = "format";

/// 날짜 표면 레이블 키 (ctime, syslog, iso)
pub const LABEL_SURFACE: &str = "surface";

// ─── 파이프라인 메트릭 ─────────────────────────────────────────────

/// 파싱에 성공한 라인 수 (counter, label: format)
pub const LINES_PARSED_TOTAL: &str = "logrebase_lines_parsed_total";

/// 문법과 일치하지 않아 제외된 라인 수 (counter, label: format)
pub const MALFORMED_LINES_TOTAL: &str = "logrebase_malformed_lines_total";

/// 재작성하지 못하고 원문을 유지한 내장 날짜 수 (counter, labels: format, surface)
pub const AMBIGUOUS_DATES_TOTAL: &str = "logrebase_ambiguous_dates_total";

/// 재작성된 내장 날짜 수 (counter, label: format)
pub const DATES_REWRITTEN_TOTAL: &str = "logrebase_dates_rewritten_total";

/// 12월→1월 연도 전환 횟수 (counter, label: format)
pub const YEAR_ROLLOVERS_TOTAL: &str = "logrebase_year_rollovers_total";

/// 정규화가 완료된 배치 수 (counter, label: format)
pub const BATCHES_NORMALIZED_TOTAL: &str = "logrebase_batches_normalized_total";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더 설치 직후 한 번 호출합니다.
pub fn describe_all() {
    describe_counter!(LINES_PARSED_TOTAL, "Lines parsed into structured records");
    describe_counter!(
        MALFORMED_LINES_TOTAL,
        "Lines that did not match their format grammar"
    );
    describe_counter!(
        AMBIGUOUS_DATES_TOTAL,
        "Embedded dates left unchanged because they could not be resolved"
    );
    describe_counter!(DATES_REWRITTEN_TOTAL, "Embedded dates shifted in place");
    describe_counter!(
        YEAR_ROLLOVERS_TOTAL,
        "December to January transitions in yearless formats"
    );
    describe_counter!(BATCHES_NORMALIZED_TOTAL, "Batches shifted and rewritten");
}
