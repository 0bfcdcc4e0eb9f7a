#![forbid(unsafe_code)]

pub mod classify;
pub mod error_log;
pub mod reference;
pub mod reporter;
pub mod run_log;
pub mod similarity;
pub mod tester;

use core::fmt;
use fbl_status::StatusCode;
use std::path::PathBuf;

pub use classify::{
    FailureRecord, Outcome, PassKind, SkipReason, classify_by_count, classify_by_status,
};
pub use error_log::{AggregateState, SessionState};
pub use reference::{HostReference, ReferenceEngine, ReferenceSession};
pub use reporter::{Reporter, Symbol};
pub use similarity::{count_mismatches, similar, similar_real};
pub use tester::{GroupSummary, RunSummary, Tester};

pub const RESULTS_PER_LINE_ENV: &str = "FBL_RESULTS_PER_LINE";
pub const NO_COLOR_ENV: &str = "FBL_NO_COLOR";

pub const DEFAULT_RESULTS_PER_LINE: usize = 64;
pub const DEFAULT_MARGIN: f64 = 1.0e-2;

#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    /// Progress symbols per line before wrapping.
    pub results_per_line: usize,
    /// Relative tolerance used by [`Tester::test_similarity`] and buffer checks.
    pub margin: f64,
    pub colored: bool,
    /// JSONL run log. Falls back to `FBL_CORRECTNESS_LOG_PATH` when unset.
    pub log_path: Option<PathBuf>,
}

impl HarnessConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(per_line) = std::env::var(RESULTS_PER_LINE_ENV)
            .ok()
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|&per_line| per_line > 0)
        {
            config.results_per_line = per_line;
        }
        if std::env::var_os(NO_COLOR_ENV).is_some_and(|raw| !raw.is_empty()) {
            config.colored = false;
        }
        config
    }

    #[must_use]
    pub fn plain() -> Self {
        Self {
            colored: false,
            ..Self::default()
        }
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            results_per_line: DEFAULT_RESULTS_PER_LINE,
            margin: DEFAULT_MARGIN,
            colored: console::colors_enabled(),
            log_path: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    ReferenceSetup { engine: String, status: StatusCode },
    Output(String),
    RunLog(String),
}

impl HarnessError {
    #[must_use]
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::ReferenceSetup { .. } => "correctness_reference_setup_failed",
            Self::Output(_) => "correctness_output_failed",
            Self::RunLog(_) => "correctness_run_log_failed",
        }
    }
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReferenceSetup { engine, status } => {
                write!(f, "reference engine '{engine}' setup error: {status}")
            }
            Self::Output(detail) => write!(f, "console output failed: {detail}"),
            Self::RunLog(detail) => write!(f, "run log failed: {detail}"),
        }
    }
}

impl std::error::Error for HarnessError {}

impl From<std::io::Error> for HarnessError {
    fn from(err: std::io::Error) -> Self {
        Self::Output(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_MARGIN, DEFAULT_RESULTS_PER_LINE, HarnessConfig, HarnessError};
    use fbl_status::StatusCode;

    #[test]
    fn plain_config_keeps_defaults() {
        let config = HarnessConfig::plain();
        assert_eq!(config.results_per_line, DEFAULT_RESULTS_PER_LINE);
        assert_eq!(config.margin, DEFAULT_MARGIN);
        assert!(!config.colored);
        assert!(config.log_path.is_none());
    }

    #[test]
    fn errors_carry_reason_codes() {
        let err = HarnessError::ReferenceSetup {
            engine: "clblas".to_string(),
            status: StatusCode::OutOfResources,
        };
        assert_eq!(err.reason_code(), "correctness_reference_setup_failed");
        assert_eq!(
            err.to_string(),
            "reference engine 'clblas' setup error: -5"
        );

        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        let err = HarnessError::from(io);
        assert_eq!(err.reason_code(), "correctness_output_failed");
        assert!(err.to_string().contains("closed"));
    }
}
