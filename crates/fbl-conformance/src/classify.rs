#![forbid(unsafe_code)]

use crate::reporter::Symbol;
use fbl_args::Arguments;
use fbl_status::StatusCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassKind {
    Data,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnsupportedPrecision,
    Compilation,
}

impl SkipReason {
    #[must_use]
    pub fn reason_code(self) -> &'static str {
        match self {
            Self::UnsupportedPrecision => "correctness_skip_unsupported_precision",
            Self::Compilation => "correctness_skip_compilation",
        }
    }
}

/// A failed sub-case together with the shape parameters it ran with.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureRecord {
    DataMismatch {
        percentage: f64,
        args: Arguments,
    },
    StatusMismatch {
        expected: StatusCode,
        found: StatusCode,
        args: Arguments,
    },
}

impl FailureRecord {
    #[must_use]
    pub fn args(&self) -> &Arguments {
        match self {
            Self::DataMismatch { args, .. } | Self::StatusMismatch { args, .. } => args,
        }
    }

    #[must_use]
    pub fn reason_code(&self) -> &'static str {
        match self {
            Self::DataMismatch { .. } => "correctness_data_mismatch",
            Self::StatusMismatch { .. } => "correctness_status_mismatch",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Pass(PassKind),
    Skip(SkipReason),
    Fail(FailureRecord),
}

impl Outcome {
    #[must_use]
    pub fn symbol(&self) -> Symbol {
        match self {
            Self::Pass(PassKind::Data) => Symbol::GoodData,
            Self::Pass(PassKind::Status) => Symbol::GoodStatus,
            Self::Skip(SkipReason::Compilation) => Symbol::SkippedCompilation,
            Self::Skip(SkipReason::UnsupportedPrecision) => Symbol::UnsupportedPrecision,
            Self::Fail(FailureRecord::DataMismatch { .. }) => Symbol::BadData,
            Self::Fail(FailureRecord::StatusMismatch { .. }) => Symbol::BadStatus,
        }
    }

    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

/// Verdict for a data comparison that found `mismatches` bad elements out of `total`. The
/// reported rate never exceeds 100%.
#[must_use]
pub fn classify_by_count(mismatches: usize, total: usize, args: &Arguments) -> Outcome {
    if mismatches == 0 {
        return Outcome::Pass(PassKind::Data);
    }
    let percentage = if total == 0 {
        100.0
    } else {
        (100.0 * mismatches as f64 / total as f64).min(100.0)
    };
    Outcome::Fail(FailureRecord::DataMismatch {
        percentage,
        args: *args,
    })
}

/// Verdict for a pair of status codes. Unsupported precisions and kernels that failed to build
/// (or are not implemented) are skips, never failures.
#[must_use]
pub fn classify_by_status(
    reference: StatusCode,
    under_test: StatusCode,
    args: &Arguments,
) -> Outcome {
    if reference == under_test {
        Outcome::Pass(PassKind::Status)
    } else if under_test.is_unsupported_precision() {
        Outcome::Skip(SkipReason::UnsupportedPrecision)
    } else if under_test.is_compilation_skip() {
        Outcome::Skip(SkipReason::Compilation)
    } else {
        Outcome::Fail(FailureRecord::StatusMismatch {
            expected: reference,
            found: under_test,
            args: *args,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{
        FailureRecord, Outcome, PassKind, SkipReason, classify_by_count, classify_by_status,
    };
    use crate::reporter::Symbol;
    use fbl_args::Arguments;
    use fbl_status::StatusCode;

    fn args() -> Arguments {
        Arguments {
            m: 8,
            n: 4,
            ..Arguments::default()
        }
    }

    #[test]
    fn zero_mismatches_pass_for_any_size() {
        for total in [1, 8, 1_000_000] {
            assert_eq!(
                classify_by_count(0, total, &args()),
                Outcome::Pass(PassKind::Data)
            );
        }
    }

    #[test]
    fn mismatches_report_percentage() {
        let outcome = classify_by_count(1, 8, &args());
        assert_eq!(
            outcome,
            Outcome::Fail(FailureRecord::DataMismatch {
                percentage: 12.5,
                args: args(),
            })
        );
        assert_eq!(outcome.symbol(), Symbol::BadData);

        let Outcome::Fail(FailureRecord::DataMismatch { percentage, .. }) =
            classify_by_count(3, 3, &args())
        else {
            panic!("expected a data mismatch");
        };
        assert_eq!(percentage, 100.0);
    }

    #[test]
    fn mismatches_against_empty_output_report_full_rate() {
        let Outcome::Fail(FailureRecord::DataMismatch { percentage, .. }) =
            classify_by_count(2, 0, &args())
        else {
            panic!("expected a data mismatch");
        };
        assert_eq!(percentage, 100.0);
    }

    #[test]
    fn more_mismatches_than_elements_cap_at_full_rate() {
        let Outcome::Fail(FailureRecord::DataMismatch { percentage, .. }) =
            classify_by_count(12, 8, &args())
        else {
            panic!("expected a data mismatch");
        };
        assert_eq!(percentage, 100.0);
    }

    #[test]
    fn identical_status_codes_pass() {
        for status in [
            StatusCode::Success,
            StatusCode::InvalidDimension,
            StatusCode::NoDoublePrecision,
            StatusCode::BuildProgramFailure,
            StatusCode::Other(-77),
        ] {
            let outcome = classify_by_status(status, status, &args());
            assert_eq!(outcome, Outcome::Pass(PassKind::Status));
            assert_eq!(outcome.symbol(), Symbol::GoodStatus);
        }
    }

    #[test]
    fn unsupported_precision_is_skipped_regardless_of_reference() {
        for reference in [StatusCode::Success, StatusCode::InvalidLeadDimA] {
            for under_test in [StatusCode::NoDoublePrecision, StatusCode::NoHalfPrecision] {
                let outcome = classify_by_status(reference, under_test, &args());
                assert_eq!(outcome, Outcome::Skip(SkipReason::UnsupportedPrecision));
                assert_eq!(outcome.symbol(), Symbol::UnsupportedPrecision);
            }
        }
    }

    #[test]
    fn build_failure_and_not_implemented_are_skipped() {
        for reference in [StatusCode::Success, StatusCode::InvalidValue] {
            for under_test in [StatusCode::BuildProgramFailure, StatusCode::NotImplemented] {
                let outcome = classify_by_status(reference, under_test, &args());
                assert_eq!(outcome, Outcome::Skip(SkipReason::Compilation));
                assert_eq!(outcome.symbol(), Symbol::SkippedCompilation);
                assert!(!outcome.is_failure());
            }
        }
    }

    #[test]
    fn other_differences_fail_with_both_codes() {
        let outcome = classify_by_status(
            StatusCode::Success,
            StatusCode::InvalidIncrementX,
            &args(),
        );
        assert_eq!(
            outcome,
            Outcome::Fail(FailureRecord::StatusMismatch {
                expected: StatusCode::Success,
                found: StatusCode::InvalidIncrementX,
                args: args(),
            })
        );
        assert_eq!(outcome.symbol(), Symbol::BadStatus);
        assert!(outcome.is_failure());
    }

    #[test]
    fn reference_skip_code_does_not_turn_into_a_skip() {
        let outcome = classify_by_status(StatusCode::NotImplemented, StatusCode::Success, &args());
        assert!(outcome.is_failure());
    }

    #[test]
    fn failure_record_exposes_reason_and_args() {
        let record = FailureRecord::StatusMismatch {
            expected: StatusCode::Success,
            found: StatusCode::InvalidValue,
            args: args(),
        };
        assert_eq!(record.reason_code(), "correctness_status_mismatch");
        assert_eq!(record.args().m, 8);
        assert_eq!(
            SkipReason::Compilation.reason_code(),
            "correctness_skip_compilation"
        );
    }
}
