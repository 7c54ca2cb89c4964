//! 도메인 타입 — 로그 형식과 정규화 레코드
//!
//! 모든 크레이트가 공유하는 레코드 구조를 정의합니다.
//! 형식별 레코드는 [`LogRecord`] 열거형으로 묶여 파서, 시프터, 싱크 사이를 이동합니다.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// 지원하는 로그 형식
///
/// 각 형식은 고정된 문법을 가지며, 연도 포함 여부와 타임스탬프 정밀도가 다릅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// 웹 서버 에러 로그 (`[Mon Nov 28 18:36:18 2005] [error] ...`)
    Apache,
    /// 분산 파일시스템 로그 (`2015-10-18 18:01:47,978 INFO [main] ...`)
    Hadoop,
    /// 커널/syslog 형식 로그 (연도 없음)
    Linux,
    /// 원격 로그인 데몬 로그 (연도 없음, pid 필수)
    #[serde(rename = "openssh")]
    OpenSsh,
}

impl LogFormat {
    /// 모든 형식 목록
    pub const ALL: [LogFormat; 4] = [
        LogFormat::Apache,
        LogFormat::Hadoop,
        LogFormat::Linux,
        LogFormat::OpenSsh,
    ];

    /// 형식 이름 (설정, CLI, 메트릭 레이블에 사용)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apache => "apache",
            Self::Hadoop => "hadoop",
            Self::Linux => "linux",
            Self::OpenSsh => "openssh",
        }
    }

    /// 문자열에서 형식을 파싱합니다.
    ///
    /// 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "apache" => Some(Self::Apache),
            "hadoop" | "hdfs" => Some(Self::Hadoop),
            "linux" | "syslog" => Some(Self::Linux),
            "openssh" | "ssh" | "sshd" => Some(Self::OpenSsh),
            _ => None,
        }
    }

    /// 원본 라인에 연도가 포함되는지 여부
    pub fn has_explicit_year(&self) -> bool {
        matches!(self, Self::Apache | Self::Hadoop)
    }

    /// 연도가 없는 형식의 시작 연도 기본값
    ///
    /// 연도를 명시하는 형식에서는 값이 사용되지 않습니다.
    pub fn default_start_year(&self) -> i32 {
        match self {
            Self::OpenSsh => 2023,
            Self::Apache | Self::Hadoop | Self::Linux => 2005,
        }
    }

    /// 구조화 타임스탬프의 직렬화 정밀도
    pub fn precision(&self) -> TimestampPrecision {
        match self {
            Self::Hadoop => TimestampPrecision::Micros,
            Self::Apache | Self::Linux | Self::OpenSsh => TimestampPrecision::Seconds,
        }
    }

    /// 원본 표면 형식이 가진 초 이하 자릿수 (hadoop은 밀리초 3자리)
    pub fn native_subsec_digits(&self) -> u32 {
        match self {
            Self::Hadoop => 3,
            Self::Apache | Self::Linux | Self::OpenSsh => 0,
        }
    }

    /// 주어진 시각을 형식 고유 정밀도로 절삭합니다.
    pub fn truncate(&self, ts: NaiveDateTime) -> NaiveDateTime {
        let digits = self.native_subsec_digits();
        let unit = 10u32.pow(9 - digits);
        let nanos = ts.nanosecond() % 1_000_000_000;
        ts.with_nanosecond(nanos - nanos % unit).unwrap_or(ts)
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_loose(s).ok_or_else(|| {
            format!(
                "unknown log format '{s}' (expected one of: apache, hadoop, linux, openssh)"
            )
        })
    }
}

/// 타임스탬프 직렬화 정밀도
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPrecision {
    /// `YYYY-MM-DDTHH:MM:SS`
    Seconds,
    /// `YYYY-MM-DDTHH:MM:SS.ffffff`
    Micros,
}

impl TimestampPrecision {
    /// ISO-8601 형식 문자열
    pub fn pattern(&self) -> &'static str {
        match self {
            Self::Seconds => "%Y-%m-%dT%H:%M:%S",
            Self::Micros => "%Y-%m-%dT%H:%M:%S%.6f",
        }
    }

    /// 타임스탬프를 ISO-8601 문자열로 렌더링합니다.
    pub fn render(&self, ts: &NaiveDateTime) -> String {
        ts.format(self.pattern()).to_string()
    }
}

/// 초 단위 ISO-8601 직렬화
mod iso_seconds {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TimestampPrecision;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&TimestampPrecision::Seconds.render(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse::<NaiveDateTime>()
            .map_err(serde::de::Error::custom)
    }
}

/// 마이크로초 ISO-8601 직렬화
mod iso_micros {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TimestampPrecision;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&TimestampPrecision::Micros.render(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse::<NaiveDateTime>()
            .map_err(serde::de::Error::custom)
    }
}

/// 웹 서버 에러 로그 레코드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApacheRecord {
    /// 배치 내 원본 라인 순번 (0부터)
    pub seq: usize,
    #[serde(with = "iso_seconds")]
    pub timestamp: NaiveDateTime,
    pub severity: String,
    /// `[client <addr>]` 주석의 주소
    pub client: Option<String>,
    /// 메시지 앞의 `name()` 토큰
    pub function: Option<String>,
    /// 메시지 끝의 경로 형태 토큰
    pub path: Option<String>,
    pub msg: String,
    pub logline: String,
}

/// 분산 파일시스템 로그 레코드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HadoopRecord {
    pub seq: usize,
    #[serde(with = "iso_micros")]
    pub timestamp: NaiveDateTime,
    pub severity: String,
    pub thread: String,
    pub source: String,
    pub msg: String,
    pub logline: String,
}

/// syslog 형식 레코드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinuxRecord {
    pub seq: usize,
    #[serde(with = "iso_seconds")]
    pub timestamp: NaiveDateTime,
    pub hostname: String,
    pub source: String,
    pub pid: Option<u32>,
    pub msg: String,
    pub logline: String,
}

/// 원격 로그인 데몬 레코드
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenSshRecord {
    pub seq: usize,
    #[serde(with = "iso_seconds")]
    pub timestamp: NaiveDateTime,
    pub hostname: String,
    pub source: String,
    pub pid: u32,
    pub msg: String,
    pub logline: String,
    /// 메시지에서 추출한 첫 IPv4 주소
    pub ip: Option<String>,
    /// 메시지에서 추출한 사용자명
    pub user: Option<String>,
}

/// 형식별 레코드의 닫힌 집합
///
/// 직렬화 시 `format` 태그 필드가 추가됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum LogRecord {
    Apache(ApacheRecord),
    Hadoop(HadoopRecord),
    Linux(LinuxRecord),
    #[serde(rename = "openssh")]
    OpenSsh(OpenSshRecord),
}

impl LogRecord {
    /// 레코드의 로그 형식
    pub fn format(&self) -> LogFormat {
        match self {
            Self::Apache(_) => LogFormat::Apache,
            Self::Hadoop(_) => LogFormat::Hadoop,
            Self::Linux(_) => LogFormat::Linux,
            Self::OpenSsh(_) => LogFormat::OpenSsh,
        }
    }

    pub fn seq(&self) -> usize {
        match self {
            Self::Apache(r) => r.seq,
            Self::Hadoop(r) => r.seq,
            Self::Linux(r) => r.seq,
            Self::OpenSsh(r) => r.seq,
        }
    }

    /// 구조화 타임스탬프
    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            Self::Apache(r) => r.timestamp,
            Self::Hadoop(r) => r.timestamp,
            Self::Linux(r) => r.timestamp,
            Self::OpenSsh(r) => r.timestamp,
        }
    }

    pub fn set_timestamp(&mut self, ts: NaiveDateTime) {
        match self {
            Self::Apache(r) => r.timestamp = ts,
            Self::Hadoop(r) => r.timestamp = ts,
            Self::Linux(r) => r.timestamp = ts,
            Self::OpenSsh(r) => r.timestamp = ts,
        }
    }

    /// 자유 텍스트 메시지
    pub fn msg(&self) -> &str {
        match self {
            Self::Apache(r) => &r.msg,
            Self::Hadoop(r) => &r.msg,
            Self::Linux(r) => &r.msg,
            Self::OpenSsh(r) => &r.msg,
        }
    }

    pub fn msg_mut(&mut self) -> &mut String {
        match self {
            Self::Apache(r) => &mut r.msg,
            Self::Hadoop(r) => &mut r.msg,
            Self::Linux(r) => &mut r.msg,
            Self::OpenSsh(r) => &mut r.msg,
        }
    }

    /// 원본 라인 전체
    pub fn logline(&self) -> &str {
        match self {
            Self::Apache(r) => &r.logline,
            Self::Hadoop(r) => &r.logline,
            Self::Linux(r) => &r.logline,
            Self::OpenSsh(r) => &r.logline,
        }
    }

    pub fn logline_mut(&mut self) -> &mut String {
        match self {
            Self::Apache(r) => &mut r.logline,
            Self::Hadoop(r) => &mut r.logline,
            Self::Linux(r) => &mut r.logline,
            Self::OpenSsh(r) => &mut r.logline,
        }
    }

    /// 형식 정밀도로 렌더링한 타임스탬프
    pub fn timestamp_iso(&self) -> String {
        self.format().precision().render(&self.timestamp())
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} [{}] {} {}",
            self.seq(),
            self.format(),
            self.timestamp_iso(),
            self.msg(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    fn sample_openssh() -> LogRecord {
        LogRecord::OpenSsh(OpenSshRecord {
            seq: 4,
            timestamp: ts(2023, 1, 3, 21, 20, 56),
            hostname: "host".to_owned(),
            source: "sshd".to_owned(),
            pid: 1234,
            msg: "Invalid user admin from 10.0.0.5".to_owned(),
            logline: "Jan  3 21:20:56 host sshd[1234]: Invalid user admin from 10.0.0.5"
                .to_owned(),
            ip: Some("10.0.0.5".to_owned()),
            user: Some("admin".to_owned()),
        })
    }

    #[test]
    fn format_from_str_loose() {
        assert_eq!(LogFormat::from_str_loose("Apache"), Some(LogFormat::Apache));
        assert_eq!(LogFormat::from_str_loose("SSHD"), Some(LogFormat::OpenSsh));
        assert_eq!(LogFormat::from_str_loose(" linux "), Some(LogFormat::Linux));
        assert_eq!(LogFormat::from_str_loose("nginx"), None);
    }

    #[test]
    fn format_from_str_error_lists_choices() {
        let err = "nginx".parse::<LogFormat>().unwrap_err();
        assert!(err.contains("openssh"));
    }

    #[test]
    fn format_display_matches_as_str() {
        for format in LogFormat::ALL {
            assert_eq!(format.to_string(), format.as_str());
            assert_eq!(format.as_str().parse::<LogFormat>().unwrap(), format);
        }
    }

    #[test]
    fn yearless_formats() {
        assert!(LogFormat::Apache.has_explicit_year());
        assert!(LogFormat::Hadoop.has_explicit_year());
        assert!(!LogFormat::Linux.has_explicit_year());
        assert!(!LogFormat::OpenSsh.has_explicit_year());
        assert_eq!(LogFormat::Linux.default_start_year(), 2005);
        assert_eq!(LogFormat::OpenSsh.default_start_year(), 2023);
    }

    #[test]
    fn truncate_to_native_precision() {
        let raw = NaiveDate::from_ymd_opt(2030, 1, 1)
            .unwrap()
            .and_hms_nano_opt(12, 0, 0, 123_456_789)
            .unwrap();
        let hadoop = LogFormat::Hadoop.truncate(raw);
        assert_eq!(hadoop.nanosecond(), 123_000_000);
        let linux = LogFormat::Linux.truncate(raw);
        assert_eq!(linux.nanosecond(), 0);
        assert_eq!(linux, ts(2030, 1, 1, 12, 0, 0));
    }

    #[test]
    fn precision_render() {
        let t = NaiveDate::from_ymd_opt(2015, 10, 18)
            .unwrap()
            .and_hms_milli_opt(18, 1, 47, 978)
            .unwrap();
        assert_eq!(
            TimestampPrecision::Micros.render(&t),
            "2015-10-18T18:01:47.978000"
        );
        assert_eq!(
            TimestampPrecision::Seconds.render(&t),
            "2015-10-18T18:01:47"
        );
    }

    #[test]
    fn record_accessors() {
        let mut record = sample_openssh();
        assert_eq!(record.format(), LogFormat::OpenSsh);
        assert_eq!(record.seq(), 4);
        assert_eq!(record.timestamp(), ts(2023, 1, 3, 21, 20, 56));
        record.set_timestamp(ts(2030, 1, 1, 0, 0, 0));
        assert_eq!(record.timestamp_iso(), "2030-01-01T00:00:00");
        record.msg_mut().push('!');
        assert!(record.msg().ends_with("10.0.0.5!"));
    }

    #[test]
    fn record_serializes_with_format_tag() {
        let record = sample_openssh();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["format"], "openssh");
        assert_eq!(json["timestamp"], "2023-01-03T21:20:56");
        assert_eq!(json["pid"], 1234);
        assert_eq!(json["user"], "admin");
    }

    #[test]
    fn hadoop_record_serializes_micros() {
        let record = LogRecord::Hadoop(HadoopRecord {
            seq: 0,
            timestamp: NaiveDate::from_ymd_opt(2015, 10, 18)
                .unwrap()
                .and_hms_milli_opt(18, 1, 47, 978)
                .unwrap(),
            severity: "INFO".to_owned(),
            thread: "main".to_owned(),
            source: "org.apache.hadoop.mapreduce.v2.app.MRAppMaster".to_owned(),
            msg: "Created MRAppMaster".to_owned(),
            logline: String::new(),
        });
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"timestamp\":\"2015-10-18T18:01:47.978000\""));
        let back: LogRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn record_display() {
        let display = sample_openssh().to_string();
        assert!(display.contains("#4"));
        assert!(display.contains("[openssh]"));
        assert!(display.contains("Invalid user admin"));
    }
}
