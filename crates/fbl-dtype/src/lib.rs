#![forbid(unsafe_code)]
// 3.14 is an arbitrary example value, not an approximation of pi.
#![allow(clippy::approx_constant)]

use core::fmt;
use core::ops::{Add, Div, Mul, Sub};
use fbl_args::{Layout, Transpose};
use num_complex::{Complex32, Complex64};

/// Precisions the harness is instantiated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    Single,
    Double,
    ComplexSingle,
    ComplexDouble,
}

impl Precision {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Single => "single",
            Self::Double => "double",
            Self::ComplexSingle => "complex-single",
            Self::ComplexDouble => "complex-double",
        }
    }

    /// BLAS routine-name prefix.
    #[must_use]
    pub const fn prefix(self) -> char {
        match self {
            Self::Single => 's',
            Self::Double => 'd',
            Self::ComplexSingle => 'c',
            Self::ComplexDouble => 'z',
        }
    }

    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "single" | "32" | "s" => Some(Self::Single),
            "double" | "64" | "d" => Some(Self::Double),
            "complex-single" | "3232" | "c" => Some(Self::ComplexSingle),
            "complex-double" | "6464" | "z" => Some(Self::ComplexDouble),
            _ => None,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub const LAYOUTS: [Layout; 2] = [Layout::RowMajor, Layout::ColMajor];
pub const REAL_TRANSPOSES: [Transpose; 2] = [Transpose::No, Transpose::Yes];
pub const COMPLEX_TRANSPOSES: [Transpose; 3] = [Transpose::No, Transpose::Yes, Transpose::Conjugate];

/// Real floating-point component type.
pub trait RealScalar:
    Copy
    + PartialEq
    + PartialOrd
    + fmt::Debug
    + fmt::Display
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
{
    const ZERO: Self;
    /// Smallest positive normal value.
    const EPS_MIN: Self;

    #[must_use]
    fn abs(self) -> Self;

    #[must_use]
    fn from_f64(value: f64) -> Self;
}

impl RealScalar for f32 {
    const ZERO: Self = 0.0;
    const EPS_MIN: Self = f32::MIN_POSITIVE;

    fn abs(self) -> Self {
        f32::abs(self)
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_f64(value: f64) -> Self {
        value as f32
    }
}

impl RealScalar for f64 {
    const ZERO: Self = 0.0;
    const EPS_MIN: Self = f64::MIN_POSITIVE;

    fn abs(self) -> Self {
        f64::abs(self)
    }

    fn from_f64(value: f64) -> Self {
        value
    }
}

/// Per-type capabilities of a scalar the harness can check.
///
/// Complex scalars decompose into two components of their `Real` type; real scalars only have a
/// real part.
pub trait Scalar: Copy + PartialEq + fmt::Debug {
    type Real: RealScalar;

    const PRECISION: Precision;
    const LAYOUTS: &'static [Layout] = &LAYOUTS;
    const TRANSPOSES: &'static [Transpose];
    /// Zero, unit, and one arbitrary value; fed to alpha/beta of the routines.
    const EXAMPLE_SCALARS: [Self; 3];

    fn real_part(self) -> Self::Real;

    fn imag_part(self) -> Option<Self::Real>;
}

impl Scalar for f32 {
    type Real = f32;

    const PRECISION: Precision = Precision::Single;
    const TRANSPOSES: &'static [Transpose] = &REAL_TRANSPOSES;
    const EXAMPLE_SCALARS: [Self; 3] = [0.0, 1.0, 3.14];

    fn real_part(self) -> f32 {
        self
    }

    fn imag_part(self) -> Option<f32> {
        None
    }
}

impl Scalar for f64 {
    type Real = f64;

    const PRECISION: Precision = Precision::Double;
    const TRANSPOSES: &'static [Transpose] = &REAL_TRANSPOSES;
    const EXAMPLE_SCALARS: [Self; 3] = [0.0, 1.0, 3.14];

    fn real_part(self) -> f64 {
        self
    }

    fn imag_part(self) -> Option<f64> {
        None
    }
}

impl Scalar for Complex32 {
    type Real = f32;

    const PRECISION: Precision = Precision::ComplexSingle;
    const TRANSPOSES: &'static [Transpose] = &COMPLEX_TRANSPOSES;
    const EXAMPLE_SCALARS: [Self; 3] = [
        Complex32::new(0.0, 0.0),
        Complex32::new(1.0, 1.3),
        Complex32::new(2.42, 3.14),
    ];

    fn real_part(self) -> f32 {
        self.re
    }

    fn imag_part(self) -> Option<f32> {
        Some(self.im)
    }
}

impl Scalar for Complex64 {
    type Real = f64;

    const PRECISION: Precision = Precision::ComplexDouble;
    const TRANSPOSES: &'static [Transpose] = &COMPLEX_TRANSPOSES;
    const EXAMPLE_SCALARS: [Self; 3] = [
        Complex64::new(0.0, 0.0),
        Complex64::new(1.0, 1.3),
        Complex64::new(2.42, 3.14),
    ];

    fn real_part(self) -> f64 {
        self.re
    }

    fn imag_part(self) -> Option<f64> {
        Some(self.im)
    }
}
