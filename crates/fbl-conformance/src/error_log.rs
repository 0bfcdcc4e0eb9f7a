#![forbid(unsafe_code)]

use crate::classify::{FailureRecord, Outcome};
use serde::Serialize;

/// Counters and failure log of the test group currently running.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    passed: usize,
    skipped: usize,
    failed: usize,
    error_log: Vec<FailureRecord>,
}

impl SessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.passed = 0;
        self.skipped = 0;
        self.failed = 0;
        self.error_log.clear();
    }

    pub fn report_pass(&mut self) {
        self.passed += 1;
    }

    pub fn report_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn report_error(&mut self, record: FailureRecord) {
        self.error_log.push(record);
        self.failed += 1;
    }

    /// Routes a classified sub-case to exactly one of the three reporters.
    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Pass(_) => self.report_pass(),
            Outcome::Skip(_) => self.report_skipped(),
            Outcome::Fail(record) => self.report_error(record),
        }
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.passed
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    #[must_use]
    pub fn error_log(&self) -> &[FailureRecord] {
        &self.error_log
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.passed + self.skipped + self.failed
    }

    /// The group verdict. Only the error log decides it.
    #[must_use]
    pub fn group_passed(&self) -> bool {
        self.error_log.is_empty()
    }

    /// Percentage of sub-cases that passed. A group without sub-cases reports 100.
    #[must_use]
    pub fn pass_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 100.0;
        }
        100.0 * self.passed as f64 / total as f64
    }
}

/// Group verdicts accumulated over the lifetime of one tester.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AggregateState {
    pub groups_passed: usize,
    pub groups_failed: usize,
}

impl AggregateState {
    pub fn record_group(&mut self, session: &SessionState) {
        if session.group_passed() {
            self.groups_passed += 1;
        } else {
            self.groups_failed += 1;
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.groups_failed == 0
    }
}
