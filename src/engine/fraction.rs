//! Reduced integer fractions used for fractional (UK) odds.

use super::error::{InvalidOddsReason, OddsError};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Largest denominator used when a decimal price is approximated as a fraction.
/// Prices quoted to two or three decimal places resolve exactly (1.91 -> 91/100).
pub const MAX_DENOMINATOR: u64 = 1000;

/// 2^53: beyond this an f64 no longer holds every integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Positive fraction, always stored in lowest terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fraction {
    numerator: u64,
    denominator: u64,
}

impl Fraction {
    /// Build a fraction from positive parts, reducing by their GCD.
    pub fn new(numerator: u64, denominator: u64) -> Result<Self, OddsError> {
        if numerator == 0 || denominator == 0 {
            return Err(InvalidOddsReason::NonPositiveFraction(numerator, denominator).into());
        }
        let divisor = gcd(numerator, denominator);
        Ok(Self {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        })
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    pub fn to_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Best rational approximation of `value` whose denominator does not exceed
    /// `max_denominator`.
    ///
    /// Walks the continued-fraction expansion of `value` and stops once the
    /// next convergent would break the cap, then picks whichever of the last
    /// convergent and the largest admissible semiconvergent lies closer.
    /// Values too small to show under the cap become `1/max_denominator`.
    ///
    /// Returns `None` for non-finite or non-positive input, a zero cap, or
    /// values too large to hold exactly in a `u64` numerator.
    pub fn approximate(value: f64, max_denominator: u64) -> Option<Self> {
        if !value.is_finite() || value <= 0.0 || max_denominator == 0 {
            return None;
        }
        if value >= MAX_EXACT_INTEGER {
            return None;
        }

        let (mut p0, mut q0, mut p1, mut q1) = (0u64, 1u64, 1u64, 0u64);
        let mut x = value;
        loop {
            let a = x.floor() as u64;
            let q2 = a.checked_mul(q1)?.checked_add(q0)?;
            if q2 > max_denominator {
                break;
            }
            let p2 = a.checked_mul(p1)?.checked_add(p0)?;
            (p0, q0, p1, q1) = (p1, q1, p2, q2);

            let rest = x - x.floor();
            let converged = (p1 as f64 / q1 as f64 - value).abs() <= value * 1e-12;
            if rest <= 0.0 || converged {
                return Self::smallest_positive(p1, q1, max_denominator);
            }
            x = 1.0 / rest;
        }

        // q1 >= 1 here: the first pass always fits because q0 starts at 1.
        let k = (max_denominator - q0) / q1;
        let p_semi = k.checked_mul(p1)?.checked_add(p0)?;
        let q_semi = k * q1 + q0;

        let convergent_err = (p1 as f64 / q1 as f64 - value).abs();
        let semi_err = (p_semi as f64 / q_semi as f64 - value).abs();
        if convergent_err <= semi_err {
            Self::smallest_positive(p1, q1, max_denominator)
        } else {
            Self::smallest_positive(p_semi, q_semi, max_denominator)
        }
    }

    fn smallest_positive(numerator: u64, denominator: u64, max_denominator: u64) -> Option<Self> {
        if numerator == 0 {
            return Self::new(1, max_denominator).ok();
        }
        Self::new(numerator, denominator).ok()
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl FromStr for Fraction {
    type Err = OddsError;

    /// Accepts `"N/D"` (whitespace around either part is ignored) or a bare
    /// integer `"N"`, read as `N/1`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unparsable = || OddsError::from(InvalidOddsReason::UnparsableFraction(s.to_string()));
        let trimmed = s.trim();
        let (num, den) = match trimmed.split_once('/') {
            Some((n, d)) => (n.trim(), d.trim()),
            None => (trimmed, "1"),
        };
        let numerator = num.parse::<u64>().map_err(|_| unparsable())?;
        let denominator = den.parse::<u64>().map_err(|_| unparsable())?;
        Fraction::new(numerator, denominator)
    }
}

impl Serialize for Fraction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub(crate) fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}
