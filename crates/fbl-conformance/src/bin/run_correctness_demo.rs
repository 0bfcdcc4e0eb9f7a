#![forbid(unsafe_code)]

use fbl_args::{ArgField, Arguments, Layout, Transpose};
use fbl_conformance::{HarnessConfig, HostReference, RunSummary, Tester};
use fbl_dtype::{Precision, Scalar};
use fbl_status::StatusCode;
use num_complex::{Complex32, Complex64};
use serde::Serialize;
use std::io::Stdout;
use std::ops::{Add, Mul};
use std::path::PathBuf;

#[derive(Debug, Serialize)]
struct DemoSummary {
    status: &'static str,
    run_log: Option<String>,
    runs: Vec<RunSummary>,
}

#[derive(Debug, Clone, Default)]
struct Options {
    no_double: bool,
    precision: Option<Precision>,
    /// Printed failure fields; each routine has its own default.
    fields: Option<Vec<ArgField>>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("run_correctness_demo failed: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut config = HarnessConfig::from_env();
    let mut options = Options::default();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--log-path" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--log-path requires a value".to_string())?;
                config.log_path = Some(PathBuf::from(value));
            }
            "--no-color" => config.colored = false,
            "--no-double" => options.no_double = true,
            "--precision" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--precision requires a value".to_string())?;
                let precision = Precision::parse(&value)
                    .ok_or_else(|| format!("unknown precision: {value}"))?;
                options.precision = Some(precision);
            }
            "--fields" => {
                let value = args
                    .next()
                    .ok_or_else(|| "--fields requires a value".to_string())?;
                let fields = ArgField::parse_list(value.split(',').map(str::trim))
                    .map_err(|err| err.to_string())?;
                options.fields = Some(fields);
            }
            "--help" | "-h" => {
                println!(
                    "Usage: cargo run -p fbl-conformance --bin run_correctness_demo -- [--log-path <path>] [--no-color] [--no-double] [--precision 32|64|3232|6464] [--fields n,incx,...]"
                );
                return Ok(());
            }
            unknown => return Err(format!("unknown argument: {unknown}")),
        }
    }

    let precisions = match options.precision {
        Some(precision) => vec![precision],
        None => vec![
            Precision::Single,
            Precision::Double,
            Precision::ComplexSingle,
            Precision::ComplexDouble,
        ],
    };
    let mut runs = Vec::new();
    for precision in precisions {
        let summaries = match precision {
            Precision::Single => run_precision::<f32>(&config, &options)?,
            Precision::Double => run_precision::<f64>(&config, &options)?,
            Precision::ComplexSingle => run_precision::<Complex32>(&config, &options)?,
            Precision::ComplexDouble => run_precision::<Complex64>(&config, &options)?,
        };
        runs.extend(summaries);
    }

    let status = if runs.iter().all(RunSummary::all_passed) {
        "pass"
    } else {
        "fail"
    };
    let summary = DemoSummary {
        status,
        run_log: config
            .log_path
            .as_ref()
            .map(|path| path.display().to_string()),
        runs,
    };
    let summary_json = serde_json::to_string_pretty(&summary)
        .map_err(|err| format!("failed serializing summary: {err}"))?;
    println!("{summary_json}");

    if status == "fail" {
        std::process::exit(2);
    }
    Ok(())
}

/// Arithmetic the host routines need on top of [`Scalar`].
trait HostScalar: Scalar + Add<Output = Self> + Mul<Output = Self> {
    const ZERO: Self;

    /// Deterministic test input derived from an element index.
    fn sample(index: usize) -> Self;

    fn conj(self) -> Self;
}

fn sample_real(index: usize) -> f64 {
    (index % 13) as f64 * 0.25 - 1.5
}

impl HostScalar for f32 {
    const ZERO: Self = 0.0;

    fn sample(index: usize) -> Self {
        sample_real(index) as f32
    }

    fn conj(self) -> Self {
        self
    }
}

impl HostScalar for f64 {
    const ZERO: Self = 0.0;

    fn sample(index: usize) -> Self {
        sample_real(index)
    }

    fn conj(self) -> Self {
        self
    }
}

impl HostScalar for Complex32 {
    const ZERO: Self = Complex32::new(0.0, 0.0);

    fn sample(index: usize) -> Self {
        Complex32::new(sample_real(index) as f32, sample_real(index + 5) as f32)
    }

    fn conj(self) -> Self {
        Complex32::conj(&self)
    }
}

impl HostScalar for Complex64 {
    const ZERO: Self = Complex64::new(0.0, 0.0);

    fn sample(index: usize) -> Self {
        Complex64::new(sample_real(index), sample_real(index + 5))
    }

    fn conj(self) -> Self {
        Complex64::conj(&self)
    }
}

fn buffer<T: HostScalar>(len: usize, seed: usize) -> Vec<T> {
    (0..len).map(|i| T::sample(i + seed)).collect()
}

fn vector_len(n: usize, inc: usize) -> usize {
    if n == 0 { 0 } else { 1 + (n - 1) * inc }
}

/// `y := alpha * x + y` on strided vectors.
fn host_axpy<T: HostScalar>(
    args: &Arguments,
    alpha: T,
    x: &[T],
    y: &[T],
) -> Result<Vec<T>, StatusCode> {
    if args.x_inc == 0 {
        return Err(StatusCode::InvalidIncrementX);
    }
    if args.y_inc == 0 {
        return Err(StatusCode::InvalidIncrementY);
    }
    if x.len() < args.x_offset + vector_len(args.n, args.x_inc) {
        return Err(StatusCode::InsufficientMemoryX);
    }
    if y.len() < args.y_offset + vector_len(args.n, args.y_inc) {
        return Err(StatusCode::InsufficientMemoryY);
    }

    let mut out = y.to_vec();
    for i in 0..args.n {
        let xi = x[args.x_offset + i * args.x_inc];
        let yi = &mut out[args.y_offset + i * args.y_inc];
        *yi = alpha * xi + *yi;
    }
    Ok(out)
}

/// `y := alpha * op(A) * x + beta * y` with unit increments.
fn host_gemv<T: HostScalar>(
    args: &Arguments,
    alpha: T,
    beta: T,
    a: &[T],
    x: &[T],
    y: &[T],
) -> Result<Vec<T>, StatusCode> {
    let (rows, cols) = (args.m, args.n);
    let min_ld = match args.layout {
        Layout::RowMajor => cols,
        Layout::ColMajor => rows,
    };
    if rows == 0 || cols == 0 {
        return Err(StatusCode::InvalidDimension);
    }
    if args.a_ld < min_ld {
        return Err(StatusCode::InvalidLeadDimA);
    }
    let major = match args.layout {
        Layout::RowMajor => rows,
        Layout::ColMajor => cols,
    };
    if a.len() < args.a_offset + (major - 1) * args.a_ld + min_ld {
        return Err(StatusCode::InsufficientMemoryA);
    }

    let (out_len, in_len) = match args.a_transpose {
        Transpose::No => (rows, cols),
        Transpose::Yes | Transpose::Conjugate => (cols, rows),
    };
    if x.len() < in_len {
        return Err(StatusCode::InsufficientMemoryX);
    }
    if y.len() < out_len {
        return Err(StatusCode::InsufficientMemoryY);
    }

    let element = |i: usize, j: usize| match args.layout {
        Layout::RowMajor => a[args.a_offset + i * args.a_ld + j],
        Layout::ColMajor => a[args.a_offset + j * args.a_ld + i],
    };
    let mut out = y.to_vec();
    for (r, slot) in out.iter_mut().take(out_len).enumerate() {
        let mut sum = T::ZERO;
        for (c, &xc) in x.iter().take(in_len).enumerate() {
            let value = match args.a_transpose {
                Transpose::No => element(r, c),
                Transpose::Yes => element(c, r),
                Transpose::Conjugate => element(c, r).conj(),
            };
            sum = sum + value * xc;
        }
        *slot = alpha * sum + beta * *slot;
    }
    Ok(out)
}

/// Host routines standing in for a device library; optionally without double precision.
struct HostDevice {
    no_double: bool,
}

impl HostDevice {
    fn check_precision<T: Scalar>(&self) -> Result<(), StatusCode> {
        let double = matches!(T::PRECISION, Precision::Double | Precision::ComplexDouble);
        if self.no_double && double {
            Err(StatusCode::NoDoublePrecision)
        } else {
            Ok(())
        }
    }

    fn axpy<T: HostScalar>(
        &self,
        args: &Arguments,
        alpha: T,
        x: &[T],
        y: &[T],
    ) -> Result<Vec<T>, StatusCode> {
        self.check_precision::<T>()?;
        host_axpy(args, alpha, x, y)
    }

    fn gemv<T: HostScalar>(
        &self,
        args: &Arguments,
        alpha: T,
        beta: T,
        a: &[T],
        x: &[T],
        y: &[T],
    ) -> Result<Vec<T>, StatusCode> {
        self.check_precision::<T>()?;
        host_gemv(args, alpha, beta, a, x, y)
    }
}

fn check<T: Scalar>(
    tester: &mut Tester<T>,
    reference: Result<Vec<T>, StatusCode>,
    under_test: Result<Vec<T>, StatusCode>,
    args: &Arguments,
) -> Result<(), String> {
    let result = match (reference, under_test) {
        (Ok(expected), Ok(found)) => tester.test_buffers(&expected, &found, args),
        (reference, under_test) => tester.test_error_codes(
            reference.err().unwrap_or(StatusCode::Success),
            under_test.err().unwrap_or(StatusCode::Success),
            args,
        ),
    };
    result.map_err(|err| err.to_string())
}

fn run_precision<T: HostScalar>(
    config: &HarnessConfig,
    options: &Options,
) -> Result<Vec<RunSummary>, String> {
    let device = HostDevice {
        no_double: options.no_double,
    };
    Ok(vec![
        run_axpy::<T>(config, &device, options.fields.as_deref())?,
        run_gemv::<T>(config, &device, options.fields.as_deref())?,
    ])
}

fn run_axpy<T: HostScalar>(
    config: &HarnessConfig,
    device: &HostDevice,
    fields: Option<&[ArgField]>,
) -> Result<RunSummary, String> {
    let routine = format!("{}axpy", T::PRECISION.prefix());
    let mut tester = Tester::<T>::new(
        config,
        "host",
        &routine,
        fields.unwrap_or(&[ArgField::N, ArgField::XInc, ArgField::YInc, ArgField::XOffset]),
        Box::new(HostReference),
    )
    .map_err(|err| err.to_string())?;

    tester
        .test_start("regular behaviour", "default")
        .map_err(|err| err.to_string())?;
    for n in [7, 64, 93] {
        for (x_inc, y_inc) in [(1, 1), (2, 1), (1, 3)] {
            for x_offset in [0, 10] {
                for alpha in Tester::<T, Stdout>::example_scalars() {
                    let args = Arguments {
                        n,
                        x_inc,
                        y_inc,
                        x_offset,
                        ..Arguments::default()
                    };
                    let x = buffer::<T>(x_offset + vector_len(n, x_inc), 0);
                    let y = buffer::<T>(vector_len(n, y_inc), 3);
                    let reference = host_axpy(&args, alpha, &x, &y);
                    let under_test = device.axpy(&args, alpha, &x, &y);
                    check(&mut tester, reference, under_test, &args)?;
                }
            }
        }
    }
    tester.test_end().map_err(|err| err.to_string())?;

    tester
        .test_start("invalid buffer sizes", "default")
        .map_err(|err| err.to_string())?;
    for (x_inc, y_inc, x_len) in [(0, 1, 16), (1, 0, 16), (1, 1, 4), (2, 1, 16)] {
        let args = Arguments {
            n: 16,
            x_inc,
            y_inc,
            ..Arguments::default()
        };
        let alpha = Tester::<T, Stdout>::example_scalars()[1];
        let x = buffer::<T>(x_len, 0);
        let y = buffer::<T>(16, 3);
        let reference = host_axpy(&args, alpha, &x, &y);
        let under_test = device.axpy(&args, alpha, &x, &y);
        check(&mut tester, reference, under_test, &args)?;
    }
    tester.test_end().map_err(|err| err.to_string())?;

    tester.finish().map_err(|err| err.to_string())
}

fn run_gemv<T: HostScalar>(
    config: &HarnessConfig,
    device: &HostDevice,
    fields: Option<&[ArgField]>,
) -> Result<RunSummary, String> {
    let routine = format!("{}gemv", T::PRECISION.prefix());
    let mut tester = Tester::<T>::new(
        config,
        "host",
        &routine,
        fields.unwrap_or(&[
            ArgField::M,
            ArgField::N,
            ArgField::Layout,
            ArgField::ATranspose,
            ArgField::ALeadDim,
        ]),
        Box::new(HostReference),
    )
    .map_err(|err| err.to_string())?;

    let scalars = Tester::<T, Stdout>::example_scalars();
    for &layout in Tester::<T, Stdout>::layouts() {
        for &a_transpose in Tester::<T, Stdout>::transposes() {
            let configuration = format!("layout={} transA={}", layout.code(), a_transpose.code());
            tester
                .test_start("regular behaviour", &configuration)
                .map_err(|err| err.to_string())?;
            for (m, n) in [(7, 7), (13, 5), (5, 33)] {
                let a_ld = match layout {
                    Layout::RowMajor => n,
                    Layout::ColMajor => m,
                } + 2;
                let major = match layout {
                    Layout::RowMajor => m,
                    Layout::ColMajor => n,
                };
                let args = Arguments {
                    m,
                    n,
                    layout,
                    a_transpose,
                    a_ld,
                    ..Arguments::default()
                };
                let a = buffer::<T>(major * a_ld, 1);
                let x = buffer::<T>(m.max(n), 4);
                let y = buffer::<T>(m.max(n), 9);
                for &alpha in &scalars {
                    for &beta in &scalars {
                        let reference = host_gemv(&args, alpha, beta, &a, &x, &y);
                        let under_test = device.gemv(&args, alpha, beta, &a, &x, &y);
                        check(&mut tester, reference, under_test, &args)?;
                    }
                }
            }
            tester.test_end().map_err(|err| err.to_string())?;
        }
    }

    tester.finish().map_err(|err| err.to_string())
}
