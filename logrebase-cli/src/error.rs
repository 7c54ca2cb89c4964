//! CLI-specific error types and exit code mapping

use logrebase_core::error::{BatchError, RebaseError};
use logrebase_core::types::LogFormat;
use logrebase_pipeline::LogPipelineError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to process exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The input produced no parseable records.
    #[error("empty {format} batch: no parseable lines ({malformed} malformed)")]
    EmptyBatch { format: LogFormat, malformed: usize },

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from logrebase-core.
    #[error("{0}")]
    Core(RebaseError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                       |
    /// |------|-------------------------------|
    /// | 0    | Success                       |
    /// | 1    | General / command error       |
    /// | 2    | Configuration error           |
    /// | 3    | Empty batch                   |
    /// | 10   | IO error                      |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::EmptyBatch { .. } => 3,
            Self::Io(_) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<RebaseError> for CliError {
    fn from(err: RebaseError) -> Self {
        match err {
            RebaseError::Config(e) => Self::Config(e.to_string()),
            RebaseError::Batch(BatchError::EmptyBatch { format, malformed }) => {
                Self::EmptyBatch { format, malformed }
            }
            RebaseError::Io(e) => Self::Io(e),
            other => Self::Core(other),
        }
    }
}

impl From<LogPipelineError> for CliError {
    fn from(err: LogPipelineError) -> Self {
        RebaseError::from(err).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logrebase_core::error::{ConfigError, ParseError};

    #[test]
    fn test_exit_code_config_error() {
        let err = CliError::Config("test error".to_owned());
        assert_eq!(err.exit_code(), 2, "config error should return exit code 2");
    }

    #[test]
    fn test_exit_code_empty_batch() {
        let err = CliError::EmptyBatch {
            format: LogFormat::Apache,
            malformed: 4,
        };
        assert_eq!(err.exit_code(), 3, "empty batch should return exit code 3");
        assert_eq!(
            err.to_string(),
            "empty apache batch: no parseable lines (4 malformed)"
        );
    }

    #[test]
    fn test_exit_code_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = CliError::Io(io_err);
        assert_eq!(err.exit_code(), 10, "io error should return exit code 10");
    }

    #[test]
    fn test_exit_code_command_error() {
        let err = CliError::Command("test error".to_owned());
        assert_eq!(err.exit_code(), 1);
        assert_eq!(err.to_string(), "test error");
    }

    #[test]
    fn test_exit_code_json_serialize_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid json")
            .expect_err("should fail parsing");
        let err = CliError::JsonSerialize(json_err);
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn test_from_rebase_config_error() {
        let core_err = RebaseError::Config(ConfigError::FileNotFound {
            path: "test.toml".to_owned(),
        });
        let cli_err: CliError = core_err.into();
        assert!(matches!(cli_err, CliError::Config(_)));
        assert_eq!(cli_err.exit_code(), 2);
        assert!(cli_err.to_string().contains("test.toml"));
    }

    #[test]
    fn test_from_rebase_parse_error_is_core() {
        let core_err = RebaseError::Parse(ParseError::TooLarge { size: 10, max: 5 });
        let cli_err: CliError = core_err.into();
        assert!(matches!(cli_err, CliError::Core(_)));
        assert_eq!(cli_err.exit_code(), 1);
    }

    #[test]
    fn test_from_pipeline_empty_batch() {
        let err = LogPipelineError::EmptyBatch {
            format: LogFormat::OpenSsh,
            malformed: 2,
        };
        let cli_err: CliError = err.into();
        assert!(matches!(
            cli_err,
            CliError::EmptyBatch {
                format: LogFormat::OpenSsh,
                malformed: 2
            }
        ));
    }

    #[test]
    fn test_from_pipeline_config_error() {
        let err = LogPipelineError::Config {
            field: "start_year".to_owned(),
            reason: "must be 1-9999, got 0".to_owned(),
        };
        let cli_err: CliError = err.into();
        assert_eq!(cli_err.exit_code(), 2);
        assert!(cli_err.to_string().contains("start_year"));
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let cli_err: CliError = io_err.into();
        match cli_err {
            CliError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::PermissionDenied),
            _ => panic!("expected Io error variant"),
        }
    }
}
