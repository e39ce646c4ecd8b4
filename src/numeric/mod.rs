// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! High-precision computation of c(lambda).
//!
//! c(lambda) = -ln(f / sqrt(n!)) / sqrt(n)
//!
//! n! is formed exactly, then every step from the square root onwards runs
//! at the caller's [`WorkingPrecision`] in base-10 floating point, and only
//! the final value is rounded to the stored fixed-point form.
//!
//! For the sizes of interest f and sqrt(n!) both carry hundreds to thousands
//! of decimal digits while their ratio is modest, so a fixed 53-bit
//! computation would lose every significant digit of the logarithm.
//!
//! # Examples
//!
//! ```
//! use dashu_int::UBig;
//! use partition_updater::config::WorkingPrecision;
//! use partition_updater::numeric;
//!
//! let c = numeric::compute(&UBig::from(3u8), 4, WorkingPrecision::default(), 20);
//! let value = c.value().unwrap().to_f64();
//! assert!((value - 0.2452073132529316).abs() < 1e-12);
//! ```

pub mod fixed;

use crate::config::WorkingPrecision;
use dashu_float::round::mode::HalfAway;
use dashu_float::FBig;
use dashu_int::ops::SquareRoot;
use dashu_int::UBig;
use fixed::{CLambda, FixedDecimal};
use tracing::warn;

/// Base-10 arbitrary-precision float used for every intermediate value.
pub type Real = FBig<HalfAway, 10>;

/// n! computed exactly.
pub fn factorial(n: u64) -> UBig {
    (2..=n).fold(UBig::ONE, |product, k| product * UBig::from(k))
}

fn to_real(value: UBig, precision: WorkingPrecision) -> Real {
    Real::from(value).with_precision(precision.get()).value()
}

/// c(lambda) at working precision, or `None` when it is undefined.
///
/// `None` is returned, with a diagnostic, when the ratio f/sqrt(n!) is not
/// positive at the given precision, and for `n == 0`.
pub fn c_lambda(dimension: &UBig, n: u64, precision: WorkingPrecision) -> Option<Real> {
    if n == 0 {
        warn!("c(lambda) is undefined for n=0");
        return None;
    }

    let sqrt_factorial = to_real(factorial(n), precision).sqrt();
    let dimension = to_real(dimension.clone(), precision);
    let ratio = dimension / sqrt_factorial;

    if ratio <= Real::ZERO {
        warn!(n, "Ratio <= 0, cannot compute logarithm; c(lambda) left undefined");
        return None;
    }

    let sqrt_n = to_real(UBig::from(n), precision).sqrt();
    Some(-(ratio.ln() / sqrt_n))
}

/// c(lambda) rounded to `scale` fractional digits for storage.
pub fn compute(dimension: &UBig, n: u64, precision: WorkingPrecision, scale: u32) -> CLambda {
    match c_lambda(dimension, n, precision) {
        Some(value) => CLambda::Value(FixedDecimal::round_from(&value, scale)),
        None => CLambda::Undefined,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(dimension: u64, n: u64) -> f64 {
        let ln_factorial: f64 = (2..=n).map(|k| (k as f64).ln()).sum();
        -((dimension as f64).ln() - 0.5 * ln_factorial) / (n as f64).sqrt()
    }

    fn computed(dimension: u64, n: u64) -> f64 {
        compute(&UBig::from(dimension), n, WorkingPrecision::default(), 20)
            .value()
            .expect("defined")
            .to_f64()
    }

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(0), UBig::ONE);
        assert_eq!(factorial(1), UBig::ONE);
        assert_eq!(factorial(4), UBig::from(24u8));
        assert_eq!(
            factorial(25).to_string(),
            "15511210043330985984000000"
        );
    }

    #[test]
    fn test_size_four_scenario() {
        let value = computed(3, 4);
        assert!((value - 0.2452073132529316).abs() < 1e-12, "got {}", value);
    }

    #[test]
    fn test_twenty_digits_are_exact() {
        let precision = WorkingPrecision::default();
        let c = compute(&UBig::from(3u8), 4, precision, 20);
        assert_eq!(c.to_string(), "0.24520731325293155921");
        let c = compute(&UBig::from(5u8), 4, precision, 20);
        assert_eq!(c.to_string(), "-0.01020549863006378239");
    }

    #[test]
    fn test_matches_double_precision_for_small_sizes() {
        // (n, f) pairs with f the largest dimension for n
        for &(n, dimension) in &[(3, 2), (5, 6), (6, 16), (7, 35), (8, 90), (10, 768)] {
            let expected = approx(dimension, n);
            let value = computed(dimension, n);
            assert!(
                (value - expected).abs() < 1e-10,
                "n={} f={}: {} vs {}",
                n,
                dimension,
                value,
                expected
            );
        }
    }

    #[test]
    fn test_trivial_representation_of_s1_is_zero() {
        let c = compute(&UBig::ONE, 1, WorkingPrecision::default(), 16);
        assert_eq!(c.to_string(), "0.0000000000000000");
    }

    #[test]
    fn test_larger_dimension_gives_smaller_statistic() {
        let n = 4;
        let smaller = compute(&UBig::from(2u8), n, WorkingPrecision::default(), 20);
        let larger = compute(&UBig::from(3u8), n, WorkingPrecision::default(), 20);
        let smaller = smaller.value().unwrap().scaled().clone();
        let larger = larger.value().unwrap().scaled().clone();
        assert!(larger < smaller);
    }

    #[test]
    fn test_zero_dimension_is_undefined() {
        let c = compute(&UBig::ZERO, 4, WorkingPrecision::default(), 20);
        assert!(c.is_undefined());
    }

    #[test]
    fn test_zero_size_is_undefined() {
        let c = compute(&UBig::ONE, 0, WorkingPrecision::default(), 20);
        assert!(c.is_undefined());
    }

    #[test]
    fn test_huge_dimension_keeps_digits() {
        // f = n! has 158 digits; c = -ln(n!) / (2 sqrt(n))
        let n = 100;
        let c = compute(&factorial(n), n, WorkingPrecision::default(), 20);
        let value = c.value().unwrap().to_f64();
        let ln_factorial: f64 = (2..=n).map(|k| (k as f64).ln()).sum();
        let expected = -0.5 * ln_factorial / (n as f64).sqrt();
        assert!((value - expected).abs() < 1e-9, "{} vs {}", value, expected);
    }

    #[test]
    fn test_adjacent_dimensions_are_distinguished() {
        let n = 20;
        let base = UBig::from(1_000_000_000u64);
        let next = &base + UBig::ONE;
        let low = compute(&base, n, WorkingPrecision::default(), 20);
        let high = compute(&next, n, WorkingPrecision::default(), 20);
        assert_ne!(low, high);
        assert!(high.value().unwrap().scaled() < low.value().unwrap().scaled());
    }
}
