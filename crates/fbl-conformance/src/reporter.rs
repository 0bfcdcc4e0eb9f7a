#![forbid(unsafe_code)]

use crate::classify::FailureRecord;
use crate::error_log::{AggregateState, SessionState};
use console::Style;
use fbl_args::ArgField;
use std::fmt::Display;
use std::io::{self, Write};

const INDENT: &str = "   ";

/// Progress marker printed after every sub-case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    GoodData,
    GoodStatus,
    BadData,
    BadStatus,
    SkippedCompilation,
    UnsupportedPrecision,
}

impl Symbol {
    pub const ALL: [Self; 6] = [
        Self::GoodData,
        Self::GoodStatus,
        Self::BadData,
        Self::BadStatus,
        Self::SkippedCompilation,
        Self::UnsupportedPrecision,
    ];

    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::GoodData => ':',
            Self::GoodStatus => '.',
            Self::BadData => 'X',
            Self::BadStatus => '/',
            Self::SkippedCompilation => '\\',
            Self::UnsupportedPrecision => 'o',
        }
    }

    #[must_use]
    pub const fn legend(self) -> &'static str {
        match self {
            Self::GoodData => "Test produced correct results",
            Self::GoodStatus => "Test returned the correct error code",
            Self::BadData => "Test produced incorrect results",
            Self::BadStatus => "Test returned an incorrect error code",
            Self::SkippedCompilation => {
                "Test not executed: kernel compilation error or not implemented"
            }
            Self::UnsupportedPrecision => "Test not executed: unsupported precision",
        }
    }

    fn style(self) -> Style {
        match self {
            Self::GoodData | Self::GoodStatus => Style::new().green(),
            Self::BadData | Self::BadStatus => Style::new().red(),
            Self::SkippedCompilation | Self::UnsupportedPrecision => Style::new().magenta(),
        }
    }
}

/// One failure detail: `Error rate P%:` or `Status code F (expected E):`, then `name=value` for
/// each selected field in [`ArgField`] order.
#[must_use]
pub fn failure_line(record: &FailureRecord, fields: &[ArgField]) -> String {
    let mut shown = fields.to_vec();
    shown.sort_unstable();
    shown.dedup();

    let mut line = match record {
        FailureRecord::DataMismatch { percentage, .. } => format!("Error rate {percentage:.1}%:"),
        FailureRecord::StatusMismatch {
            expected, found, ..
        } => format!("Status code {found} (expected {expected}):"),
    };
    for field in shown {
        line.push(' ');
        line.push_str(&record.args().render(field));
    }
    line
}

/// Console renderer for test runs. Output is written in call order and flushed after every
/// progress symbol.
pub struct Reporter<W: Write> {
    out: W,
    colored: bool,
    results_per_line: usize,
    print_count: usize,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, results_per_line: usize, colored: bool) -> Self {
        Self {
            out,
            colored,
            results_per_line: results_per_line.max(1),
            print_count: 0,
        }
    }

    pub fn into_writer(self) -> W {
        self.out
    }

    fn paint<D: Display>(&self, value: D, style: Style) -> String {
        style.force_styling(self.colored).apply_to(value).to_string()
    }

    fn message<D: Display>(&self, value: D) -> String {
        self.paint(value, Style::new().bold())
    }

    fn symbol_text(&self, symbol: Symbol) -> String {
        format!("[{}]", self.paint(symbol.glyph(), symbol.style()))
    }

    pub fn run_start(&mut self, device: &str, routine: &str) -> io::Result<()> {
        let routine = self.message(routine);
        writeln!(self.out, "* Running on device '{device}'.")?;
        writeln!(
            self.out,
            "* Starting tests for the '{routine}' routine. Legend:"
        )?;
        for symbol in Symbol::ALL {
            let text = self.symbol_text(symbol);
            writeln!(self.out, "{INDENT}{text} -> {}", symbol.legend())?;
        }
        self.out.flush()
    }

    pub fn group_start(&mut self, name: &str, configuration: &str) -> io::Result<()> {
        self.print_count = 0;
        let name = self.message(name);
        let configuration = self.message(configuration);
        writeln!(self.out, "* Testing '{name}' for '{configuration}':")?;
        write!(self.out, "{INDENT}")?;
        self.out.flush()
    }

    pub fn emit_symbol(&mut self, symbol: Symbol) -> io::Result<()> {
        if self.print_count == self.results_per_line {
            self.print_count = 0;
            write!(self.out, "\n{INDENT}")?;
        }
        let text = self.symbol_text(symbol);
        write!(self.out, "{text}")?;
        self.print_count += 1;
        self.out.flush()
    }

    /// Prints the failure details and summary line of a finished group.
    pub fn group_end(&mut self, session: &SessionState, fields: &[ArgField]) -> io::Result<()> {
        writeln!(self.out)?;

        for record in session.error_log() {
            writeln!(self.out, "{INDENT}{}", failure_line(record, fields))?;
        }

        let skipped = format!("{} skipped", session.skipped());
        let failed = format!("{} failed", session.failed());
        let skipped = if session.skipped() == 0 {
            skipped
        } else {
            self.paint(skipped, Style::new().magenta())
        };
        let failed = if session.failed() == 0 {
            failed
        } else {
            self.paint(failed, Style::new().red())
        };
        let pass_rate = self.message(format!("{:.1}%", session.pass_rate()));
        writeln!(
            self.out,
            "{INDENT}Pass rate {pass_rate}: {} passed / {skipped} / {failed}",
            session.passed()
        )?;
        self.out.flush()
    }

    pub fn run_end(&mut self, aggregate: &AggregateState) -> io::Result<()> {
        writeln!(
            self.out,
            "* Completed all test-cases for this routine. Results:"
        )?;
        writeln!(self.out, "{INDENT}{} group(s) passed", aggregate.groups_passed)?;
        let failed = format!("{} group(s) failed", aggregate.groups_failed);
        let failed = if aggregate.groups_failed == 0 {
            failed
        } else {
            self.paint(failed, Style::new().red())
        };
        writeln!(self.out, "{INDENT}{failed}")?;
        writeln!(self.out)?;
        self.out.flush()
    }
}
