//! 내장 날짜 재작성 / 배치 정규화 벤치마크
//!
//! 텍스트 재작성 비용과 배치 전체(파싱 + 시프트 + 재작성) 처리량을 측정합니다.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use logrebase_core::types::LogFormat;
use logrebase_pipeline::{BatchPipelineBuilder, EmbeddedDateRewriter, PipelineConfig, TextField};

fn dt(y: i32, mo: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, mo, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// 형식별 배치 샘플 라인 생성
fn sample_lines(format: LogFormat, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let sec = i % 60;
            let min = (i / 60) % 60;
            match format {
                LogFormat::Apache => format!(
                    "[Sun Dec 04 04:{min:02}:{sec:02} 2005] [error] mod_jk child workerEnv in error state {i}"
                ),
                LogFormat::Hadoop => format!(
                    "2015-10-18 18:{min:02}:{sec:02},{:03} INFO [main] org.apache.hadoop.X: event {i}",
                    i % 1000
                ),
                LogFormat::Linux => format!(
                    "Jun 14 15:{min:02}:{sec:02} combo ftpd[{i}]: connection from 24.54.76.216 at Tue Jun 14 15:16:01 2005"
                ),
                LogFormat::OpenSsh => format!(
                    "Dec 10 06:{min:02}:{sec:02} LabSZ sshd[{i}]: Invalid user admin from 10.0.0.{}",
                    i % 256
                ),
            }
        })
        .collect()
}

fn bench_rewrite_text(c: &mut Criterion) {
    let mut group = c.benchmark_group("rewrite_text");
    group.throughput(Throughput::Elements(1));

    let delta = TimeDelta::days(7);
    let anchor = dt(2005, 6, 14);

    let linux = EmbeddedDateRewriter::for_format(LogFormat::Linux);
    let line = "Jun 14 15:16:01 combo ftpd[24085]: connection from 24.54.76.216 at Tue Jun 14 15:16:01 2005";
    group.bench_function("linux_two_surfaces", |b| {
        b.iter(|| linux.rewrite_text(TextField::Logline, black_box(line), anchor, delta))
    });

    let no_date = "Jun 14 15:16:01 combo kernel: no embedded dates in this message at all";
    group.bench_function("linux_no_embedded", |b| {
        b.iter(|| linux.rewrite_text(TextField::Msg, black_box(no_date), anchor, delta))
    });

    let apache = EmbeddedDateRewriter::for_format(LogFormat::Apache);
    let line = "[Sun Dec 04 04:47:44 2005] [notice] workerEnv.init() ok /etc/httpd/conf/workers2.properties";
    group.bench_function("apache_header", |b| {
        b.iter(|| apache.rewrite_text(TextField::Logline, black_box(line), dt(2005, 12, 4), delta))
    });

    group.finish();
}

fn bench_batch_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("batch_run");
    let now = dt(2030, 1, 1);

    for format in LogFormat::ALL {
        let pipeline = BatchPipelineBuilder::new()
            .config(PipelineConfig::for_format(format))
            .build()
            .unwrap();
        let lines = sample_lines(format, 1000);

        group.throughput(Throughput::Elements(lines.len() as u64));
        group.bench_with_input(BenchmarkId::new("format", format.as_str()), &lines, |b, lines| {
            b.iter(|| pipeline.run(black_box(lines.iter()), now).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rewrite_text, bench_batch_run);
criterion_main!(benches);
