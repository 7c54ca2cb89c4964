#![no_main]

use libfuzzer_sys::fuzz_target;
use logrebase_core::pipeline::ParseContext;
use logrebase_core::types::LogFormat;
use logrebase_pipeline::ParserRegistry;

fuzz_target!(|data: &[u8]| {
    let Ok(line) = std::str::from_utf8(data) else {
        return;
    };
    let registry = ParserRegistry::with_defaults();

    // 모든 문법이 패닉 없이 Ok 또는 Err을 반환해야 한다
    for format in LogFormat::ALL {
        let ctx = ParseContext::new(0, format.default_start_year());
        if let Ok(record) = registry.parse_with(format, line, &ctx) {
            // 파싱 성공 시 원본 라인은 그대로 보존
            assert_eq!(record.logline(), line);
            assert_eq!(record.format(), format);
        }
    }
});
