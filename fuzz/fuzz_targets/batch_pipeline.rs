#![no_main]

use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

use logrebase_core::types::LogFormat;
use logrebase_pipeline::{BatchPipelineBuilder, PipelineConfig};

fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    let format = LogFormat::ALL[usize::from(selector) % LogFormat::ALL.len()];
    let Ok(pipeline) = BatchPipelineBuilder::new()
        .config(PipelineConfig::for_format(format))
        .build()
    else {
        return;
    };
    let Some(now) = NaiveDate::from_ymd_opt(2030, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)) else {
        return;
    };

    if let Ok(batch) = pipeline.run(text.lines(), now) {
        // 최신 레코드는 정확히 now로 이동
        let newest = batch.records.iter().map(|r| r.timestamp()).max();
        assert_eq!(newest, Some(batch.shift.now));
        assert_eq!(batch.records.len() + batch.malformed.len() + batch.stats.blank, batch.stats.lines);
    }
});
