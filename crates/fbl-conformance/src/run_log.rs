#![forbid(unsafe_code)]

use crate::HarnessError;
use crate::classify::FailureRecord;
use crate::error_log::SessionState;
use fbl_args::Arguments;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

pub const RUN_LOG_PATH_ENV: &str = "FBL_CORRECTNESS_LOG_PATH";

#[derive(Debug, Clone, Serialize)]
pub struct FailureLogEntry {
    pub ts_unix_ms: u128,
    pub routine: String,
    pub precision: String,
    pub group: String,
    pub configuration: String,
    pub reason_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_expected: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_found: Option<i32>,
    pub args: Arguments,
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupLogEntry {
    pub ts_unix_ms: u128,
    pub routine: String,
    pub precision: String,
    pub group: String,
    pub configuration: String,
    pub reason_code: String,
    pub passed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub pass_rate: f64,
}

/// Identifies the group a log line belongs to.
#[derive(Debug, Clone, Default)]
pub struct GroupContext {
    pub routine: String,
    pub precision: String,
    pub group: String,
    pub configuration: String,
}

impl GroupContext {
    #[must_use]
    pub fn failure_entry(&self, record: &FailureRecord) -> FailureLogEntry {
        let (error_percentage, status_expected, status_found) = match record {
            FailureRecord::DataMismatch { percentage, .. } => (Some(*percentage), None, None),
            FailureRecord::StatusMismatch {
                expected, found, ..
            } => (None, Some(expected.code()), Some(found.code())),
        };
        FailureLogEntry {
            ts_unix_ms: now_unix_ms(),
            routine: self.routine.clone(),
            precision: self.precision.clone(),
            group: self.group.clone(),
            configuration: self.configuration.clone(),
            reason_code: record.reason_code().to_string(),
            error_percentage,
            status_expected,
            status_found,
            args: *record.args(),
        }
    }

    #[must_use]
    pub fn group_entry(&self, session: &SessionState) -> GroupLogEntry {
        let reason_code = if session.group_passed() {
            "correctness_group_passed"
        } else {
            "correctness_group_failed"
        };
        GroupLogEntry {
            ts_unix_ms: now_unix_ms(),
            routine: self.routine.clone(),
            precision: self.precision.clone(),
            group: self.group.clone(),
            configuration: self.configuration.clone(),
            reason_code: reason_code.to_string(),
            passed: session.passed(),
            skipped: session.skipped(),
            failed: session.failed(),
            pass_rate: session.pass_rate(),
        }
    }
}

/// Append-only JSONL log of failures and group verdicts.
#[derive(Debug, Clone)]
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Uses the configured path, falling back to `FBL_CORRECTNESS_LOG_PATH`. No path, no log.
    #[must_use]
    pub fn resolve(configured: Option<&Path>) -> Option<Self> {
        configured
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(RUN_LOG_PATH_ENV).map(PathBuf::from))
            .map(Self::new)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append<T: Serialize>(&self, entry: &T) -> Result<(), HarnessError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| {
                HarnessError::RunLog(format!("failed creating {}: {err}", parent.display()))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| {
                HarnessError::RunLog(format!("failed opening {}: {err}", self.path.display()))
            })?;
        let line = serde_json::to_string(entry).map_err(|err| {
            HarnessError::RunLog(format!("failed serializing run log entry: {err}"))
        })?;
        let mut payload = line.into_bytes();
        payload.push(b'\n');
        file.write_all(&payload).map_err(|err| {
            HarnessError::RunLog(format!(
                "failed appending run log {}: {err}",
                self.path.display()
            ))
        })
    }

    /// Writes one line per failure record followed by the group verdict.
    pub fn append_group(
        &self,
        context: &GroupContext,
        session: &SessionState,
    ) -> Result<(), HarnessError> {
        for record in session.error_log() {
            self.append(&context.failure_entry(record))?;
        }
        self.append(&context.group_entry(session))
    }
}

fn now_unix_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis())
}
