#![forbid(unsafe_code)]

use crate::classify::{FailureRecord, Outcome, classify_by_count, classify_by_status};
use crate::error_log::{AggregateState, SessionState};
use crate::reference::{ReferenceEngine, ReferenceSession};
use crate::reporter::{Reporter, failure_line};
use crate::run_log::{GroupContext, RunLog};
use crate::similarity::{count_mismatches, similar};
use crate::{HarnessConfig, HarnessError};
use fbl_args::{ArgField, Arguments, Layout, Transpose};
use fbl_dtype::Scalar;
use fbl_status::StatusCode;
use serde::Serialize;
use std::io::{self, Stdout, Write};
use std::marker::PhantomData;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub name: String,
    pub configuration: String,
    pub passed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub pass_rate: f64,
    pub failures: Vec<String>,
}

impl GroupSummary {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failures.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub routine: String,
    pub precision: String,
    pub device: String,
    pub reference: String,
    pub groups_passed: usize,
    pub groups_failed: usize,
    pub groups: Vec<GroupSummary>,
}

impl RunSummary {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.groups_failed == 0
    }
}

/// Correctness tester for one routine at one precision.
///
/// Construction prints the legend and sets up the reference engine; [`Tester::finish`] prints the
/// run results and releases it. Groups are bracketed by [`Tester::test_start`] and
/// [`Tester::test_end`], and every sub-case in between is reported exactly once.
pub struct Tester<T: Scalar, W: Write = Stdout> {
    reporter: Reporter<W>,
    session: SessionState,
    aggregate: AggregateState,
    fields: Vec<ArgField>,
    margin: f64,
    run_log: Option<RunLog>,
    context: GroupContext,
    device: String,
    groups: Vec<GroupSummary>,
    finished: bool,
    reference: ReferenceSession,
    _scalar: PhantomData<T>,
}

impl<T: Scalar> Tester<T, Stdout> {
    pub fn new(
        config: &HarnessConfig,
        device: &str,
        routine: &str,
        fields: &[ArgField],
        engine: Box<dyn ReferenceEngine>,
    ) -> Result<Self, HarnessError> {
        Self::with_writer(io::stdout(), config, device, routine, fields, engine)
    }
}

impl<T: Scalar, W: Write> Tester<T, W> {
    pub fn with_writer(
        out: W,
        config: &HarnessConfig,
        device: &str,
        routine: &str,
        fields: &[ArgField],
        engine: Box<dyn ReferenceEngine>,
    ) -> Result<Self, HarnessError> {
        let mut reporter = Reporter::new(out, config.results_per_line, config.colored);
        reporter.run_start(device, routine)?;
        let reference = ReferenceSession::acquire(engine)?;

        Ok(Self {
            reporter,
            session: SessionState::new(),
            aggregate: AggregateState::default(),
            fields: fields.to_vec(),
            margin: config.margin,
            run_log: RunLog::resolve(config.log_path.as_deref()),
            context: GroupContext {
                routine: routine.to_string(),
                precision: T::PRECISION.name().to_string(),
                ..GroupContext::default()
            },
            device: device.to_string(),
            groups: Vec::new(),
            finished: false,
            reference,
            _scalar: PhantomData,
        })
    }

    #[must_use]
    pub fn example_scalars() -> [T; 3] {
        T::EXAMPLE_SCALARS
    }

    #[must_use]
    pub fn layouts() -> &'static [Layout] {
        T::LAYOUTS
    }

    #[must_use]
    pub fn transposes() -> &'static [Transpose] {
        T::TRANSPOSES
    }

    #[must_use]
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub fn aggregate(&self) -> &AggregateState {
        &self.aggregate
    }

    /// Resets the group state, then prints the group header. State is reset even if printing
    /// fails.
    pub fn test_start(&mut self, name: &str, configuration: &str) -> Result<(), HarnessError> {
        self.session.reset();
        self.context.group = name.to_string();
        self.context.configuration = configuration.to_string();
        self.reporter.group_start(name, configuration)?;
        Ok(())
    }

    /// Records the verdict of the current group, then prints its failures and pass rate.
    ///
    /// The summary and run log entries are kept even when console output fails; the output error
    /// is returned afterwards.
    pub fn test_end(&mut self) -> Result<GroupSummary, HarnessError> {
        self.aggregate.record_group(&self.session);
        let printed = self.reporter.group_end(&self.session, &self.fields);

        let summary = GroupSummary {
            name: self.context.group.clone(),
            configuration: self.context.configuration.clone(),
            passed: self.session.passed(),
            skipped: self.session.skipped(),
            failed: self.session.failed(),
            pass_rate: self.session.pass_rate(),
            failures: self
                .session
                .error_log()
                .iter()
                .map(|record| failure_line(record, &self.fields))
                .collect(),
        };
        self.groups.push(summary.clone());

        if let Some(log) = &self.run_log {
            log.append_group(&self.context, &self.session)?;
        }
        printed?;
        Ok(summary)
    }

    #[must_use]
    pub fn test_similarity(&self, lhs: T, rhs: T) -> bool {
        similar(lhs, rhs, self.margin)
    }

    pub fn test_error_count(
        &mut self,
        errors: usize,
        size: usize,
        args: &Arguments,
    ) -> Result<(), HarnessError> {
        self.test_outcome(classify_by_count(errors, size, args))
    }

    pub fn test_error_codes(
        &mut self,
        reference: StatusCode,
        under_test: StatusCode,
        args: &Arguments,
    ) -> Result<(), HarnessError> {
        self.test_outcome(classify_by_status(reference, under_test, args))
    }

    /// Compares two output buffers element by element and reports the result as one sub-case.
    pub fn test_buffers(
        &mut self,
        reference: &[T],
        under_test: &[T],
        args: &Arguments,
    ) -> Result<(), HarnessError> {
        let errors = count_mismatches(reference, under_test, self.margin);
        let size = reference.len().max(under_test.len());
        self.test_error_count(errors, size, args)
    }

    /// Records `outcome` in the current group and prints its symbol.
    pub fn test_outcome(&mut self, outcome: Outcome) -> Result<(), HarnessError> {
        let symbol = outcome.symbol();
        self.session.record(outcome);
        self.reporter.emit_symbol(symbol)?;
        Ok(())
    }

    pub fn report_pass(&mut self) {
        self.session.report_pass();
    }

    pub fn report_skipped(&mut self) {
        self.session.report_skipped();
    }

    pub fn report_error(&mut self, record: FailureRecord) {
        self.session.report_error(record);
    }

    /// Prints the run results and releases the reference engine.
    pub fn finish(mut self) -> Result<RunSummary, HarnessError> {
        self.finished = true;
        self.reporter.run_end(&self.aggregate)?;
        Ok(RunSummary {
            routine: self.context.routine.clone(),
            precision: self.context.precision.clone(),
            device: self.device.clone(),
            reference: self.reference.engine_name().to_string(),
            groups_passed: self.aggregate.groups_passed,
            groups_failed: self.aggregate.groups_failed,
            groups: std::mem::take(&mut self.groups),
        })
    }
}

impl<T: Scalar, W: Write> Drop for Tester<T, W> {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.reporter.run_end(&self.aggregate);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Tester;
    use crate::reference::{HostReference, ReferenceEngine};
    use crate::{HarnessConfig, HarnessError};
    use fbl_args::{ArgField, Arguments, Transpose};
    use fbl_status::StatusCode;
    use num_complex::Complex32;
    use std::cell::Cell;
    use std::io::{self, Sink, Write};
    use std::rc::Rc;

    struct Unavailable;

    impl ReferenceEngine for Unavailable {
        fn name(&self) -> &str {
            "unavailable"
        }

        fn setup(&mut self) -> Result<(), StatusCode> {
            Err(StatusCode::CompilerNotAvailable)
        }

        fn teardown(&mut self) {
            panic!("teardown without setup");
        }
    }

    #[test]
    fn failed_reference_setup_aborts_construction() {
        let mut out = Vec::new();
        let result = Tester::<f64, _>::with_writer(
            &mut out,
            &HarnessConfig::plain(),
            "host",
            "axpy",
            &[],
            Box::new(Unavailable),
        );
        let Err(err) = result else {
            panic!("construction should fail");
        };
        assert_eq!(
            err,
            HarnessError::ReferenceSetup {
                engine: "unavailable".to_string(),
                status: StatusCode::CompilerNotAvailable,
            }
        );
    }

    #[test]
    fn type_constants_come_from_scalar() {
        assert_eq!(
            Tester::<f32, Sink>::transposes(),
            &[Transpose::No, Transpose::Yes]
        );
        assert_eq!(Tester::<Complex32, Sink>::transposes().len(), 3);
        assert_eq!(Tester::<f64, Sink>::layouts().len(), 2);
        assert_eq!(Tester::<f64, Sink>::example_scalars()[1], 1.0);
    }

    #[test]
    fn buffers_with_one_bad_element_fail_with_rate() {
        let mut out = Vec::new();
        let mut tester = Tester::<f32, _>::with_writer(
            &mut out,
            &HarnessConfig::plain(),
            "host",
            "copy",
            &[ArgField::N],
            Box::new(HostReference),
        )
        .expect("tester");
        let args = Arguments {
            n: 4,
            ..Arguments::default()
        };
        tester.test_start("buffers", "default").expect("start");
        tester
            .test_buffers(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.0, 4.0], &args)
            .expect("pass");
        tester
            .test_buffers(&[1.0, 2.0, 3.0, 4.0], &[1.0, 2.0, 3.5, 4.0], &args)
            .expect("fail");
        let group = tester.test_end().expect("end");
        assert_eq!(group.passed, 1);
        assert_eq!(group.failed, 1);
        assert_eq!(group.failures, vec!["Error rate 25.0%: n=4".to_string()]);
        let summary = tester.finish().expect("finish");
        assert_eq!(summary.groups_failed, 1);
        assert_eq!(summary.reference, "host");
        assert!(!summary.all_passed());

        let out = String::from_utf8(out).expect("utf8");
        assert!(out.contains("   [:][X]\n   Error rate 25.0%: n=4\n"));
    }

    #[test]
    fn dropping_unfinished_tester_still_prints_results() {
        let mut out = Vec::new();
        {
            let mut tester = Tester::<f64, _>::with_writer(
                &mut out,
                &HarnessConfig::plain(),
                "host",
                "dot",
                &[],
                Box::new(HostReference),
            )
            .expect("tester");
            tester.test_start("g", "c").expect("start");
            tester.report_pass();
            tester.test_end().expect("end");
        }
        let out = String::from_utf8(out).expect("utf8");
        assert!(out.ends_with("   1 group(s) passed\n   0 group(s) failed\n\n"));
        assert_eq!(out.matches("* Completed all test-cases").count(), 1);
    }

    struct Switchable {
        closed: Rc<Cell<bool>>,
    }

    impl Write for Switchable {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.closed.get() {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            } else {
                Ok(buf.len())
            }
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn output_failures_do_not_lose_group_state() {
        let closed = Rc::new(Cell::new(false));
        let mut tester = Tester::<f32, _>::with_writer(
            Switchable {
                closed: Rc::clone(&closed),
            },
            &HarnessConfig::plain(),
            "host",
            "sscal",
            &[],
            Box::new(HostReference),
        )
        .expect("tester");
        let args = Arguments::default();

        tester.test_start("a", "default").expect("start");
        tester
            .test_error_codes(StatusCode::Success, StatusCode::InvalidVectorX, &args)
            .expect("fail");
        tester.test_end().expect("end");

        closed.set(true);
        assert!(matches!(
            tester.test_start("b", "default"),
            Err(HarnessError::Output(_))
        ));
        assert_eq!(tester.session().total(), 0);
        assert!(tester.session().error_log().is_empty());

        assert!(tester.test_error_codes(StatusCode::Success, StatusCode::Success, &args).is_err());
        assert_eq!(tester.session().passed(), 1);

        assert!(tester.test_end().is_err());
        assert_eq!(tester.aggregate().groups_passed, 1);
        assert_eq!(tester.aggregate().groups_failed, 1);

        closed.set(false);
        let summary = tester.finish().expect("finish");
        assert_eq!(summary.groups.len(), 2);
        assert_eq!(summary.groups[1].name, "b");
        assert!(summary.groups[1].all_passed());
    }
}
