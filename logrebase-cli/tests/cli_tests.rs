//! End-to-end tests for the `logrebase` binary and command bodies.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::process::Command;

use chrono::NaiveDate;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use serial_test::serial;

use logrebase_cli::cli::ProcessArgs;
use logrebase_cli::commands;
use logrebase_cli::commands::process::process_file;
use logrebase_core::config::RebaseConfig;
use logrebase_core::types::LogFormat;

const LINUX_SAMPLE: &str = "\
Dec 31 23:59:50 combo syslogd 1.4.1: restart.
Jan  1 00:00:10 combo ftpd[24085]: connection from 24.54.76.216 at Sat Jan  1 00:00:10 2005
this is not a syslog line
Jan  1 00:00:20 combo sshd(pam_unix)[19939]: check pass; user unknown
";

fn logrebase() -> Command {
    Command::new(env!("CARGO_BIN_EXE_logrebase"))
}

fn write_gz(path: &Path, content: &str) {
    let mut encoder = GzEncoder::new(File::create(path).expect("create"), Compression::default());
    encoder.write_all(content.as_bytes()).expect("write");
    encoder.finish().expect("finish");
}

fn read_gz(path: &Path) -> String {
    let mut out = String::new();
    GzDecoder::new(File::open(path).expect("open"))
        .read_to_string(&mut out)
        .expect("decode");
    out
}

fn rows(content: &str) -> Vec<serde_json::Value> {
    content
        .lines()
        .map(|l| serde_json::from_str(l).expect("valid json line"))
        .collect()
}

#[test]
fn test_process_gzip_linux_with_rollover() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Linux.log.gz");
    let output = dir.path().join("linux.jsonl.gz");
    write_gz(&input, LINUX_SAMPLE);

    let status = logrebase()
        .args(["-c", "absent.toml", "--log-level", "error", "process", "linux"])
        .arg(&input)
        .arg(&output)
        .args(["--year", "2004", "--now", "2030-01-01T00:00:20"])
        .current_dir(dir.path())
        .status()
        .expect("run binary");
    assert!(status.success());

    let records = rows(&read_gz(&output));
    assert_eq!(records.len(), 3);
    assert_eq!(records[0]["timestamp"], "2029-12-31T23:59:50");
    assert_eq!(records[1]["timestamp"], "2030-01-01T00:00:10");
    assert_eq!(records[2]["timestamp"], "2030-01-01T00:00:20");
    assert_eq!(records[2]["seq"], 3);
    assert_eq!(
        records[1]["logline"],
        "Jan  1 00:00:10 combo ftpd[24085]: connection from 24.54.76.216 at Tue Jan  1 00:00:10 2030"
    );
}

#[test]
fn test_parse_reports_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Linux.log");
    let output = dir.path().join("linux.jsonl");
    std::fs::write(&input, LINUX_SAMPLE).expect("write input");

    let out = logrebase()
        .args(["--output", "json", "--log-level", "error", "parse", "linux"])
        .arg(&input)
        .arg(&output)
        .current_dir(dir.path())
        .output()
        .expect("run binary");
    assert!(out.status.success());

    let report: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("stdout should be a JSON report");
    assert_eq!(report["format"], "linux");
    assert_eq!(report["written"], 3);
    assert_eq!(report["stats"]["malformed"], 1);
    assert_eq!(report["stats"]["rollovers"], 1);
    assert_eq!(report["final_year"], 2006);
    assert_eq!(report["malformed"][0]["seq"], 2);

    let records = rows(&std::fs::read_to_string(&output).expect("read output"));
    assert_eq!(records[0]["timestamp"], "2005-12-31T23:59:50");
    assert_eq!(records[1]["timestamp"], "2006-01-01T00:00:10");
    assert_eq!(records[2]["source"], "sshd");
    assert_eq!(records[2]["pid"], 19939);
}

#[test]
fn test_empty_batch_exit_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Apache.log");
    std::fs::write(&input, "nothing here\n").expect("write input");

    let status = logrebase()
        .args(["--log-level", "error", "process", "apache"])
        .arg(&input)
        .arg(dir.path().join("out.jsonl"))
        .current_dir(dir.path())
        .status()
        .expect("run binary");
    assert_eq!(status.code(), Some(3));
}

#[test]
fn test_missing_input_exit_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let status = logrebase()
        .args(["--log-level", "error", "parse", "hadoop", "missing.log", "out.jsonl"])
        .current_dir(dir.path())
        .status()
        .expect("run binary");
    assert_eq!(status.code(), Some(10));
}

#[test]
fn test_invalid_config_exit_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join("logrebase.toml"), "[general]\nlog_level = \"loud\"\n")
        .expect("write config");

    let status = logrebase()
        .args(["config", "validate"])
        .current_dir(dir.path())
        .status()
        .expect("run binary");
    assert_eq!(status.code(), Some(2));

    let status = logrebase()
        .args(["parse", "linux", "in.log", "out.jsonl"])
        .current_dir(dir.path())
        .status()
        .expect("run binary");
    assert_eq!(status.code(), Some(2));
}

#[test]
fn test_config_file_start_year_applies() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(
        dir.path().join("logrebase.toml"),
        "[general]\nlog_level = \"error\"\n\n[batch]\nstart_year = 2017\n",
    )
    .expect("write config");
    let input = dir.path().join("OpenSSH.log");
    std::fs::write(
        &input,
        "Dec 10 06:55:46 LabSZ sshd[24200]: Invalid user webmaster from 173.234.31.186\n",
    )
    .expect("write input");
    let output = dir.path().join("openssh.jsonl");

    let status = logrebase()
        .args(["parse", "openssh"])
        .arg(&input)
        .arg(&output)
        .current_dir(dir.path())
        .status()
        .expect("run binary");
    assert!(status.success());

    let records = rows(&std::fs::read_to_string(&output).expect("read output"));
    assert_eq!(records[0]["timestamp"], "2017-12-10T06:55:46");
    assert_eq!(records[0]["user"], "webmaster");
    assert_eq!(records[0]["ip"], "173.234.31.186");
}

#[tokio::test]
#[serial]
async fn test_env_override_sets_reference_now() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Hadoop.log");
    std::fs::write(
        &input,
        "2015-10-18 18:01:47,978 INFO [main] org.apache.hadoop.X: Created MRAppMaster\n",
    )
    .expect("write input");

    // SAFETY: serialized with other env-mutating tests via #[serial]
    unsafe {
        std::env::set_var("LOGREBASE_BATCH_NOW", "2030-06-01T08:00:00.123456");
    }
    let config = commands::load_config(&dir.path().join("absent.toml")).await;
    // SAFETY: serialized with other env-mutating tests via #[serial]
    unsafe {
        std::env::remove_var("LOGREBASE_BATCH_NOW");
    }
    let config = config.expect("defaults with env override");

    let args = ProcessArgs {
        format: LogFormat::Hadoop,
        input,
        output: dir.path().join("hadoop.jsonl"),
        year: None,
        now: None,
    };
    let report = process_file(&args, &config).expect("process");
    let expected = NaiveDate::from_ymd_opt(2030, 6, 1)
        .unwrap()
        .and_hms_milli_opt(8, 0, 0, 123)
        .unwrap();
    assert_eq!(report.shift.now, expected);
}

#[test]
#[serial]
fn test_flag_now_beats_config_now() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("Apache.log");
    std::fs::write(
        &input,
        "[Sun Dec 04 04:47:44 2005] [notice] workerEnv.init() ok /etc/httpd/conf/workers2.properties\n",
    )
    .expect("write input");

    let mut config = RebaseConfig::default();
    config.batch.now = NaiveDate::from_ymd_opt(2020, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0));
    let flag_now = NaiveDate::from_ymd_opt(2031, 3, 4)
        .unwrap()
        .and_hms_opt(5, 6, 7)
        .unwrap();
    let args = ProcessArgs {
        format: LogFormat::Apache,
        input,
        output: dir.path().join("apache.jsonl"),
        year: None,
        now: Some(flag_now),
    };
    let report = process_file(&args, &config).expect("process");
    assert_eq!(report.shift.now, flag_now);
}
