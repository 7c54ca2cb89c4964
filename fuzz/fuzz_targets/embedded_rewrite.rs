#![no_main]

use arbitrary::Arbitrary;
use chrono::{NaiveDate, TimeDelta};
use libfuzzer_sys::fuzz_target;

use logrebase_core::types::LogFormat;
use logrebase_pipeline::{EmbeddedDateRewriter, TextField};

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    format_index: u8,
    text: String,
    /// 기준 연도 (1..=9999로 접음)
    anchor_year: u16,
    anchor_ordinal: u16,
    delta_seconds: i64,
}

fuzz_target!(|input: FuzzInput| {
    let format = LogFormat::ALL[usize::from(input.format_index) % LogFormat::ALL.len()];
    let year = i32::from(input.anchor_year % 9999) + 1;
    let Some(anchor) = NaiveDate::from_yo_opt(year, u32::from(input.anchor_ordinal % 365) + 1)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
    else {
        return;
    };
    let Some(delta) = TimeDelta::try_seconds(input.delta_seconds % (400 * 365 * 86_400)) else {
        return;
    };

    let rewriter = EmbeddedDateRewriter::for_format(format);
    let (rewritten, outcome) = rewriter.rewrite_text(TextField::Msg, &input.text, anchor, delta);

    // 바뀐 구간이 없으면 새 문자열도 없다
    if outcome.rewritten == 0 {
        assert!(rewritten.is_none());
    }
    // delta 0이면 텍스트는 그대로
    if delta.is_zero() {
        if let Some(text) = rewritten {
            assert_eq!(text, input.text);
        }
    }
});
