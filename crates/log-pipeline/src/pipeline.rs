//! 배치 파이프라인 오케스트레이션 -- 파싱/보강/연도 추적/시프트/재작성의 전체 흐름을 관리합니다.
//!
//! # 2단계 처리
//! ```text
//! pass 1: lines -> Ingestor (parse -> YearTracker -> enrich) -> ParsedBatch
//! pass 2: ParsedBatch -> BatchShifter(plan) -> per record: rewrite + shift -> NormalizedBatch
//! ```
//!
//! 최대 타임스탬프를 알아야 delta를 정할 수 있으므로 배치 전체를 메모리에 보관합니다.
//! 레코드는 원본 라인 순서(`seq`)를 유지합니다.

use chrono::{Datelike, Local, NaiveDateTime, TimeDelta};
use serde::Serialize;
use tracing::{debug, info};

use logrebase_core::error::ParseError;
use logrebase_core::metrics as m;
use logrebase_core::pipeline::{LogParser, ParseContext};
use logrebase_core::types::{LogFormat, LogRecord};

use crate::config::PipelineConfig;
use crate::enrich::{FieldEnricher, default_enrichers};
use crate::error::LogPipelineError;
use crate::parser::parser_for;
use crate::rewrite::{AmbiguousDate, EmbeddedDateRewriter};
use crate::rollover::YearTracker;
use crate::shift::{BatchShifter, ShiftDelta};

/// 배치 파이프라인
///
/// # 사용 예시
/// ```
/// use chrono::NaiveDate;
/// use logrebase_core::LogFormat;
/// use logrebase_pipeline::{BatchPipelineBuilder, PipelineConfig};
///
/// let pipeline = BatchPipelineBuilder::new()
///     .config(PipelineConfig::for_format(LogFormat::Apache))
///     .build()
///     .unwrap();
/// let now = NaiveDate::from_ymd_opt(2030, 1, 1)
///     .unwrap()
///     .and_hms_opt(0, 0, 0)
///     .unwrap();
/// let batch = pipeline
///     .run(["[Mon Nov 28 18:36:18 2005] [notice] ready"], now)
///     .unwrap();
/// assert_eq!(batch.records[0].logline(), "[Tue Jan  1 00:00:00 2030] [notice] ready");
/// ```
pub struct BatchPipeline {
    config: PipelineConfig,
    parser: Box<dyn LogParser>,
    enrichers: Vec<Box<dyn FieldEnricher>>,
    rewriter: EmbeddedDateRewriter,
}

impl BatchPipeline {
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn format(&self) -> LogFormat {
        self.config.format
    }

    /// 등록된 보강기 이름 목록
    pub fn enricher_names(&self) -> Vec<&str> {
        self.enrichers.iter().map(|e| e.name()).collect()
    }

    /// 설정된 기준 시각, 없으면 로컬 현재 시각
    pub fn reference_now(&self) -> NaiveDateTime {
        self.config
            .now
            .unwrap_or_else(|| Local::now().naive_local())
    }

    /// pass 1 수집기를 생성합니다.
    pub fn ingestor(&self) -> Ingestor<'_> {
        Ingestor {
            pipeline: self,
            tracker: YearTracker::new(self.config.start_year),
            next_seq: 0,
            records: Vec::new(),
            malformed: Vec::new(),
            stats: IngestStats::default(),
        }
    }

    /// 라인 전체를 pass 1로 파싱합니다.
    pub fn parse_lines<I, S>(&self, lines: I) -> ParsedBatch
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ingestor = self.ingestor();
        for line in lines {
            ingestor.push(line.as_ref());
        }
        ingestor.finish()
    }

    /// pass 2: delta를 계산하고 모든 레코드를 재작성 후 시프트합니다.
    ///
    /// # Errors
    /// - 레코드가 없으면 [`LogPipelineError::EmptyBatch`]
    /// - 시프트 결과가 범위를 벗어나면 [`LogPipelineError::ShiftOverflow`]
    pub fn normalize(
        &self,
        batch: ParsedBatch,
        now: NaiveDateTime,
    ) -> Result<NormalizedBatch, LogPipelineError> {
        let format = self.format();
        let ParsedBatch {
            mut records,
            malformed,
            stats,
            final_year,
            ..
        } = batch;

        if records.is_empty() {
            return Err(LogPipelineError::EmptyBatch {
                format,
                malformed: malformed.len(),
            });
        }

        let shifter = BatchShifter::new(format, now);
        let shift = shifter.plan(&records)?;

        let mut rewrite = RewriteStats::default();
        for record in records.iter_mut() {
            // 내장 날짜는 시프트 전 타임스탬프를 연도 문맥으로 사용
            let anchor = record.timestamp();
            let seq = record.seq();
            let outcome = self.rewriter.rewrite(record, anchor, shift.delta);
            shifter.apply(&shift, record)?;

            rewrite.rewritten += outcome.rewritten;
            rewrite.ambiguous.extend(
                outcome
                    .ambiguous
                    .into_iter()
                    .map(|date| RecordAmbiguity { seq, date }),
            );
        }

        metrics::counter!(m::BATCHES_NORMALIZED_TOTAL, m::LABEL_FORMAT => format.as_str())
            .increment(1);
        info!(
            format = %format,
            records = records.len(),
            malformed = malformed.len(),
            max = %shift.max,
            now = %shift.now,
            delta_secs = shift.delta.num_seconds(),
            rewritten = rewrite.rewritten,
            ambiguous = rewrite.ambiguous.len(),
            "batch normalized"
        );

        Ok(NormalizedBatch {
            format,
            shift,
            records,
            malformed,
            stats,
            final_year,
            rewrite,
        })
    }

    /// pass 1과 pass 2를 이어서 실행합니다.
    pub fn run<I, S>(&self, lines: I, now: NaiveDateTime) -> Result<NormalizedBatch, LogPipelineError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let batch = self.parse_lines(lines);
        self.normalize(batch, now)
    }
}

/// 배치에서 제외된 라인
#[derive(Debug)]
pub struct MalformedLine {
    /// 원본 라인 순번
    pub seq: usize,
    pub error: ParseError,
}

/// pass 1 통계
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestStats {
    /// 입력 라인 수 (빈 라인 포함)
    pub lines: usize,
    /// 건너뛴 빈 라인 수
    pub blank: usize,
    pub parsed: usize,
    pub malformed: usize,
    /// 연도 전환 횟수
    pub rollovers: usize,
}

/// pass 1 결과
#[derive(Debug)]
pub struct ParsedBatch {
    pub format: LogFormat,
    /// 라인 순서대로 정렬된 레코드
    pub records: Vec<LogRecord>,
    pub malformed: Vec<MalformedLine>,
    pub stats: IngestStats,
    /// 마지막 라인 처리 후 추적기 연도
    pub final_year: i32,
}

/// 레코드에 속한 재작성 실패 구간
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordAmbiguity {
    pub seq: usize,
    #[serde(flatten)]
    pub date: AmbiguousDate,
}

/// 배치 재작성 통계
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteStats {
    pub rewritten: usize,
    pub ambiguous: Vec<RecordAmbiguity>,
}

/// pass 2 결과
#[derive(Debug)]
pub struct NormalizedBatch {
    pub format: LogFormat,
    pub shift: ShiftDelta,
    pub records: Vec<LogRecord>,
    pub malformed: Vec<MalformedLine>,
    pub stats: IngestStats,
    pub final_year: i32,
    pub rewrite: RewriteStats,
}

impl NormalizedBatch {
    pub fn delta(&self) -> TimeDelta {
        self.shift.delta
    }
}

/// pass 1 수집기 -- 라인을 순서대로 받아 레코드를 누적합니다.
///
/// 연도 추적 상태는 라인 순서대로만 갱신됩니다.
pub struct Ingestor<'p> {
    pipeline: &'p BatchPipeline,
    tracker: YearTracker,
    next_seq: usize,
    records: Vec<LogRecord>,
    malformed: Vec<MalformedLine>,
    stats: IngestStats,
}

impl Ingestor<'_> {
    /// 현재 추적 연도
    pub fn year(&self) -> i32 {
        self.tracker.year()
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// 라인 하나를 처리합니다. 실패한 라인은 기록만 하고 계속 진행합니다.
    pub fn push(&mut self, raw: &str) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.stats.lines += 1;

        let line = raw.trim();
        if line.is_empty() {
            self.stats.blank += 1;
            return;
        }

        let format = self.pipeline.format();
        match self.parse_line(seq, line) {
            Ok(record) => {
                self.stats.parsed += 1;
                metrics::counter!(m::LINES_PARSED_TOTAL, m::LABEL_FORMAT => format.as_str())
                    .increment(1);
                self.records.push(record);
            }
            Err(error) => {
                debug!(seq, format = %format, error = %error, "skipping malformed line");
                self.stats.malformed += 1;
                metrics::counter!(m::MALFORMED_LINES_TOTAL, m::LABEL_FORMAT => format.as_str())
                    .increment(1);
                self.malformed.push(MalformedLine { seq, error });
            }
        }
    }

    fn parse_line(&mut self, seq: usize, line: &str) -> Result<LogRecord, ParseError> {
        let config = &self.pipeline.config;
        if line.len() > config.max_line_length {
            return Err(ParseError::TooLarge {
                size: line.len(),
                max: config.max_line_length,
            });
        }

        let parser = self.pipeline.parser.as_ref();
        let ctx = ParseContext::new(seq, self.tracker.year());
        let mut record = parser.parse(line, &ctx)?;

        if !config.format.has_explicit_year() {
            let (next, rollover) = self.tracker.step(record.timestamp().month());
            self.tracker = next;
            if rollover.is_advanced() {
                self.stats.rollovers += 1;
                metrics::counter!(m::YEAR_ROLLOVERS_TOTAL, m::LABEL_FORMAT => config.format.as_str())
                    .increment(1);
                debug!(seq, year = next.year(), "year rollover");
                record = parser.parse(line, &ctx.with_year(next.year()))?;
            }
        }

        for enricher in &self.pipeline.enrichers {
            enricher.enrich(&mut record);
        }
        Ok(record)
    }

    /// pass 1을 마치고 결과를 반환합니다.
    pub fn finish(self) -> ParsedBatch {
        let format = self.pipeline.format();
        info!(
            format = %format,
            lines = self.stats.lines,
            parsed = self.stats.parsed,
            malformed = self.stats.malformed,
            rollovers = self.stats.rollovers,
            "batch parsed"
        );
        ParsedBatch {
            format,
            records: self.records,
            malformed: self.malformed,
            stats: self.stats,
            final_year: self.tracker.year(),
        }
    }
}

/// 배치 파이프라인 빌더
pub struct BatchPipelineBuilder {
    config: PipelineConfig,
    parser: Option<Box<dyn LogParser>>,
    enrichers: Option<Vec<Box<dyn FieldEnricher>>>,
}

impl BatchPipelineBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: PipelineConfig::default(),
            parser: None,
            enrichers: None,
        }
    }

    /// 파이프라인 설정을 지정합니다.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// 기본 파서 대신 사용할 파서를 지정합니다. 형식은 설정과 같아야 합니다.
    pub fn parser(mut self, parser: Box<dyn LogParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// 보강기를 추가합니다. 한 번이라도 호출하면 형식별 기본 보강기는 사용하지 않습니다.
    pub fn enricher(mut self, enricher: Box<dyn FieldEnricher>) -> Self {
        self.enrichers.get_or_insert_with(Vec::new).push(enricher);
        self
    }

    /// 파이프라인을 빌드합니다.
    pub fn build(self) -> Result<BatchPipeline, LogPipelineError> {
        self.config.validate()?;
        let format = self.config.format;

        let parser = self.parser.unwrap_or_else(|| parser_for(format));
        if parser.format() != format {
            return Err(LogPipelineError::Config {
                field: "parser".to_owned(),
                reason: format!(
                    "parser handles {} but the batch format is {format}",
                    parser.format()
                ),
            });
        }

        let enrichers = match self.enrichers {
            Some(enrichers) => enrichers,
            None if self.config.enrich => default_enrichers(format)?,
            None => Vec::new(),
        };

        Ok(BatchPipeline {
            config: self.config,
            parser,
            enrichers,
            rewriter: EmbeddedDateRewriter::for_format(format),
        })
    }
}

impl Default for BatchPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
