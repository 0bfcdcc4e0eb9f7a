#![forbid(unsafe_code)]

use fbl_dtype::{RealScalar, Scalar};

/// Tolerance check on a single real component.
///
/// Values at or near zero are compared in absolute terms against `margin * EPS_MIN`, everything
/// else by relative error.
#[must_use]
pub fn similar_real<R: RealScalar>(lhs: R, rhs: R, margin: f64) -> bool {
    if lhs == rhs {
        return true;
    }
    let margin = R::from_f64(margin);
    let difference = (lhs - rhs).abs();
    if lhs == R::ZERO || rhs == R::ZERO || difference < R::EPS_MIN {
        difference < margin * R::EPS_MIN
    } else {
        difference / (lhs.abs() + rhs.abs()) < margin
    }
}

/// Whether two scalars of any supported precision agree within `margin`.
///
/// Complex values agree iff both the real and the imaginary components agree.
#[must_use]
pub fn similar<T: Scalar>(lhs: T, rhs: T, margin: f64) -> bool {
    let real = similar_real(lhs.real_part(), rhs.real_part(), margin);
    match (lhs.imag_part(), rhs.imag_part()) {
        (Some(lhs_imag), Some(rhs_imag)) => real && similar_real(lhs_imag, rhs_imag, margin),
        _ => real,
    }
}

/// Number of element pairs that are not [`similar`]. Elements present in only one buffer count
/// as mismatches.
#[must_use]
pub fn count_mismatches<T: Scalar>(reference: &[T], under_test: &[T], margin: f64) -> usize {
    let unmatched = reference.len().abs_diff(under_test.len());
    reference
        .iter()
        .zip(under_test)
        .filter(|&(&expected, &actual)| !similar(expected, actual, margin))
        .count()
        + unmatched
}

#[cfg(test)]
mod tests {
    use super::{count_mismatches, similar, similar_real};
    use num_complex::{Complex32, Complex64};

    #[test]
    fn exact_matches_and_infinities_pass() {
        assert!(similar(1.25_f64, 1.25, 1e-6));
        assert!(similar(f64::INFINITY, f64::INFINITY, 1e-6));
        assert!(similar(f32::NEG_INFINITY, f32::NEG_INFINITY, 1e-6));
        assert!(!similar(f64::INFINITY, f64::NEG_INFINITY, 1e-6));
    }

    #[test]
    fn nan_never_matches() {
        assert!(!similar(f64::NAN, f64::NAN, 1.0));
        assert!(!similar(f64::NAN, 0.0, 1.0));
        assert!(!similar(1.0_f32, f32::NAN, 1.0));
    }

    #[test]
    fn relative_error_decides_away_from_zero() {
        // |a-b| / (|a|+|b|) = 0.001 / 2.001
        assert!(similar(1.0_f64, 1.001, 1e-3));
        assert!(!similar(1.0_f64, 1.001, 1e-4));
        assert!(similar(-1.0e6_f32, -1.0001e6, 1e-3));
        assert!(!similar(1.0_f64, -1.0, 0.5));
    }

    #[test]
    fn zero_operand_uses_absolute_threshold() {
        let tiny = f64::MIN_POSITIVE;
        assert!(similar(0.0_f64, tiny * 0.5, 1.0));
        assert!(!similar(0.0_f64, tiny * 2.0, 1.0));
        assert!(similar(0.0_f64, tiny * 2.0, 4.0));
        // Relative error against zero is always 1.0, which a margin of 2 would accept.
        assert!(!similar(0.0_f64, 1e-10, 2.0));
    }

    #[test]
    fn subnormal_difference_uses_absolute_threshold() {
        let a = f32::MIN_POSITIVE * 3.0;
        let b = a + f32::MIN_POSITIVE * 0.25;
        assert!(similar_real(a, b, 1.0));
        assert!(!similar_real(a, b, 0.1));
    }

    #[test]
    fn complex_values_need_both_components() {
        let a = Complex64::new(1.0, 2.0);
        assert!(similar(a, Complex64::new(1.0, 2.0), 1e-9));
        assert!(!similar(a, Complex64::new(1.0, 2.1), 1e-3));
        assert!(!similar(a, Complex64::new(1.1, 2.0), 1e-3));
        assert!(similar(
            Complex32::new(0.0, 3.0),
            Complex32::new(0.0, 3.0001),
            1e-3
        ));
    }

    #[test]
    fn mismatch_count_includes_length_difference() {
        let reference = [1.0_f64, 2.0, 3.0, 4.0];
        assert_eq!(count_mismatches(&reference, &reference, 1e-9), 0);
        assert_eq!(count_mismatches(&reference, &[1.0, 2.5, 3.0, 4.0], 1e-3), 1);
        assert_eq!(count_mismatches(&reference, &[1.0, 2.0], 1e-3), 2);
        assert_eq!(count_mismatches::<f64>(&[], &[], 1e-3), 0);
    }
}
