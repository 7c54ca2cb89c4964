#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`parser`]: 형식별 문법 파서와 파서 레지스트리
//! - [`temporal`]: 날짜 표면 문법 (ctime / syslog / iso)
//! - [`enrich`]: 메시지 기반 필드 보강 (주소, 사용자)
//! - [`rollover`]: 연도 없는 형식의 연도 전환 추적
//! - [`shift`]: 배치 delta 계산 및 구조화 타임스탬프 시프트
//! - [`rewrite`]: 자유 텍스트 내장 날짜 재작성
//! - [`pipeline`]: 2단계 배치 오케스트레이션
//! - [`config`]: 파이프라인 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! lines -> Parser -> YearTracker -> Enrichers -> ParsedBatch
//!                                                  |
//!                         BatchShifter (delta = now - max)
//!                                                  |
//!                  per record: EmbeddedDateRewriter + shift -> NormalizedBatch
//! ```

pub mod config;
pub mod enrich;
pub mod error;
pub mod parser;
pub mod pipeline;
pub mod rewrite;
pub mod rollover;
pub mod shift;
pub mod temporal;

// --- 주요 타입 re-export ---

// 파이프라인
pub use pipeline::{
    BatchPipeline, BatchPipelineBuilder, IngestStats, Ingestor, MalformedLine, NormalizedBatch,
    ParsedBatch, RecordAmbiguity, RewriteStats,
};

// 설정
pub use config::PipelineConfig;

// 에러
pub use error::LogPipelineError;

// 파서
pub use parser::{ApacheParser, HadoopParser, LinuxParser, OpenSshParser, ParserRegistry};

// 보강
pub use enrich::{AddressEnricher, FieldEnricher, UserEnricher};

// 시간 처리
pub use rewrite::{AmbiguityReason, AmbiguousDate, EmbeddedDateRewriter, RewriteOutcome, TextField};
pub use rollover::{Rollover, YearTracker};
pub use shift::{BatchShifter, ShiftDelta};
pub use temporal::{EmbeddedDateSpan, SurfaceKind, SurfaceStyle};
