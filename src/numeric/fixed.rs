// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Exact fixed-point decimals for the stored form of c(lambda).
//!
//! The store must reproduce every digit it read, so c(lambda) never passes
//! through binary floating point once computed. A [`FixedDecimal`] is an
//! integer count of `10^-scale` units; its rendering has exactly `scale`
//! fractional digits and parses back to the same value.
//!
//! # Examples
//!
//! ```
//! use partition_updater::numeric::fixed::FixedDecimal;
//!
//! let value = FixedDecimal::parse("-0.2500").unwrap();
//! assert_eq!(value.scale(), 4);
//! assert_eq!(value.to_string(), "-0.2500");
//! ```

use super::Real;
use dashu_int::IBig;
use std::fmt;

/// A decimal with a fixed number of fractional digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FixedDecimal {
    scaled: IBig,
    scale: u32,
}

impl FixedDecimal {
    /// The value `scaled * 10^-scale`.
    pub fn new(scaled: IBig, scale: u32) -> Self {
        Self { scaled, scale }
    }

    /// Round a high-precision value to `scale` fractional digits, half away from zero.
    pub fn round_from(value: &Real, scale: u32) -> Self {
        let repr = value.repr();
        let significand = repr.significand().clone();
        let shift = repr.exponent() + scale as isize;

        let scaled = if shift >= 0 {
            significand * ten_to(shift as usize)
        } else {
            let divisor = ten_to(shift.unsigned_abs());
            let remainder = &significand % &divisor;
            let mut quotient = &significand / &divisor;
            let twice = remainder * IBig::from(2u8);
            if twice >= divisor {
                quotient += IBig::ONE;
            } else if -twice >= divisor {
                quotient -= IBig::ONE;
            }
            quotient
        };
        Self { scaled, scale }
    }

    /// Parse `-?digits(.digits)?`, keeping the number of fractional digits as the scale.
    ///
    /// Exponents, signs other than a leading `-`, and empty digit runs are rejected.
    pub fn parse(text: &str) -> Option<Self> {
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text),
        };
        let (integer, fraction) = match body.split_once('.') {
            Some((integer, fraction)) if !fraction.is_empty() => (integer, fraction),
            Some(_) => return None,
            None => (body, ""),
        };
        if integer.is_empty()
            || !integer.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return None;
        }

        let magnitude: IBig = format!("{}{}", integer, fraction).parse().ok()?;
        let scaled = if negative { -magnitude } else { magnitude };
        Some(Self {
            scaled,
            scale: fraction.len() as u32,
        })
    }

    /// The integer number of `10^-scale` units.
    pub fn scaled(&self) -> &IBig {
        &self.scaled
    }

    /// Number of fractional digits.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Nearest `f64`, for display and approximate comparisons only.
    pub fn to_f64(&self) -> f64 {
        self.to_string().parse().unwrap_or(f64::NAN)
    }
}

fn ten_to(exponent: usize) -> IBig {
    IBig::from(10u8).pow(exponent)
}

impl fmt::Display for FixedDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.scaled.to_string();
        let (sign, digits) = match rendered.strip_prefix('-') {
            Some(digits) => ("-", digits),
            None => ("", rendered.as_str()),
        };
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(f, "{}{}", sign, digits);
        }
        // Left-pad so there is at least one integer digit.
        let padded = format!("{:0>width$}", digits, width = scale + 1);
        let (integer, fraction) = padded.split_at(padded.len() - scale);
        write!(f, "{}{}.{}", sign, integer, fraction)
    }
}

/// The derived statistic, or the sentinel for a non-positive ratio.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CLambda {
    /// The ratio f/sqrt(n!) was not positive at working precision.
    Undefined,
    /// c(lambda) rounded to a fixed number of fractional digits.
    Value(FixedDecimal),
}

impl CLambda {
    pub fn is_undefined(&self) -> bool {
        matches!(self, CLambda::Undefined)
    }

    pub fn value(&self) -> Option<&FixedDecimal> {
        match self {
            CLambda::Undefined => None,
            CLambda::Value(value) => Some(value),
        }
    }
}

impl fmt::Display for CLambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CLambda::Undefined => write!(f, "undefined"),
            CLambda::Value(value) => write!(f, "{}", value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real(text: &str) -> Real {
        text.parse().unwrap()
    }

    #[test]
    fn test_display_pads_small_values() {
        let value = FixedDecimal::new(IBig::from(5), 3);
        assert_eq!(value.to_string(), "0.005");
        let value = FixedDecimal::new(IBig::from(-5), 3);
        assert_eq!(value.to_string(), "-0.005");
    }

    #[test]
    fn test_display_zero() {
        assert_eq!(FixedDecimal::new(IBig::ZERO, 4).to_string(), "0.0000");
    }

    #[test]
    fn test_display_integer_scale() {
        assert_eq!(FixedDecimal::new(IBig::from(-42), 0).to_string(), "-42");
    }

    #[test]
    fn test_parse_rendering_round_trip() {
        for text in ["0.2452077862330734", "-1.50000000000000000000", "12.0", "7"] {
            let value = FixedDecimal::parse(text).unwrap();
            assert_eq!(value.to_string(), text);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for text in ["", "-", ".5", "1.", "1e5", "+1.0", "0x10", "1.2.3", "nan"] {
            assert!(FixedDecimal::parse(text).is_none(), "accepted {:?}", text);
        }
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(FixedDecimal::round_from(&real("0.125"), 2).to_string(), "0.13");
        assert_eq!(FixedDecimal::round_from(&real("-0.125"), 2).to_string(), "-0.13");
        assert_eq!(FixedDecimal::round_from(&real("0.1249"), 2).to_string(), "0.12");
    }

    #[test]
    fn test_round_extends_short_values() {
        assert_eq!(FixedDecimal::round_from(&real("2.5"), 4).to_string(), "2.5000");
        assert_eq!(FixedDecimal::round_from(&real("300"), 2).to_string(), "300.00");
    }

    #[test]
    fn test_clambda_display() {
        assert_eq!(CLambda::Undefined.to_string(), "undefined");
        let value = CLambda::Value(FixedDecimal::new(IBig::from(25), 2));
        assert_eq!(value.to_string(), "0.25");
        assert!(!value.is_undefined());
    }
}
