//! Conversions between American, decimal and fractional odds.
//!
//! American odds of `m`:
//!   - `m > 0`: underdog, profit per 100 staked. prob = 100 / (m + 100)
//!   - `m < 0`: favorite, stake needed to win 100. prob = -m / (-m + 100)
//!
//! Decimal odds `d` are total return per unit staked, so prob = 1 / d.
//! Fractional odds `n/d` are net profit per unit staked.
//!
//! Every function here returns the unrounded value. Rounding for display lives
//! on [`OddsQuote`].

use super::error::{InvalidOddsReason, OddsError};
use super::fraction::Fraction;
use serde::Serialize;
use std::fmt;

fn validate_american(moneyline: i32) -> Result<(), OddsError> {
    if moneyline == 0 {
        return Err(InvalidOddsReason::ZeroAmerican.into());
    }
    Ok(())
}

fn validate_decimal(decimal: f64) -> Result<(), OddsError> {
    if !decimal.is_finite() {
        return Err(InvalidOddsReason::NonFiniteDecimal.into());
    }
    if decimal <= 1.0 {
        return Err(InvalidOddsReason::DecimalNotAboveOne(decimal).into());
    }
    Ok(())
}

pub fn american_to_probability(moneyline: i32) -> Result<f64, OddsError> {
    validate_american(moneyline)?;
    let m = moneyline as f64;
    if moneyline > 0 {
        Ok(100.0 / (m + 100.0))
    } else {
        Ok(-m / (-m + 100.0))
    }
}

pub fn american_to_decimal(moneyline: i32) -> Result<f64, OddsError> {
    validate_american(moneyline)?;
    let m = moneyline as f64;
    if moneyline > 0 {
        Ok(m / 100.0 + 1.0)
    } else {
        Ok(100.0 / -m + 1.0)
    }
}

/// Exact GCD reduction: +150 -> 3/2, -110 -> 10/11.
pub fn american_to_fraction(moneyline: i32) -> Result<Fraction, OddsError> {
    validate_american(moneyline)?;
    let magnitude = moneyline.unsigned_abs() as u64;
    if moneyline > 0 {
        Fraction::new(magnitude, 100)
    } else {
        Fraction::new(100, magnitude)
    }
}

pub fn decimal_to_probability(decimal: f64) -> Result<f64, OddsError> {
    validate_decimal(decimal)?;
    Ok(1.0 / decimal)
}

/// Approximate `decimal - 1` as a fraction with denominator at most
/// `max_denominator` (see [`super::fraction::MAX_DENOMINATOR`]).
pub fn decimal_to_fraction(decimal: f64, max_denominator: u64) -> Result<Fraction, OddsError> {
    validate_decimal(decimal)?;
    Fraction::approximate(decimal - 1.0, max_denominator)
        .ok_or_else(|| InvalidOddsReason::OutOfRange(decimal).into())
}

/// `d >= 2` maps to positive odds `(d - 1) * 100`, `d < 2` to `-100 / (d - 1)`,
/// both rounded to the nearest integer.
pub fn decimal_to_american(decimal: f64) -> Result<i32, OddsError> {
    validate_decimal(decimal)?;
    let value = if decimal >= 2.0 {
        (decimal - 1.0) * 100.0
    } else {
        -100.0 / (decimal - 1.0)
    };
    rounded_american(value, decimal)
}

pub fn fraction_to_decimal(fraction: Fraction) -> f64 {
    1.0 + fraction.to_f64()
}

/// Probability straight from the integer parts: den / (num + den).
pub fn fraction_to_probability(fraction: Fraction) -> f64 {
    let n = fraction.numerator() as f64;
    let d = fraction.denominator() as f64;
    d / (n + d)
}

/// Same rounding rule as [`decimal_to_american`], computed from the integer
/// parts so 10/11 lands on exactly -110.
pub fn fraction_to_american(fraction: Fraction) -> Result<i32, OddsError> {
    let n = fraction.numerator() as f64;
    let d = fraction.denominator() as f64;
    let value = if n >= d { 100.0 * n / d } else { -100.0 * d / n };
    rounded_american(value, fraction_to_decimal(fraction))
}

fn rounded_american(value: f64, decimal: f64) -> Result<i32, OddsError> {
    let rounded = value.round();
    if !rounded.is_finite() || rounded > i32::MAX as f64 || rounded < i32::MIN as f64 {
        return Err(InvalidOddsReason::OutOfRange(decimal).into());
    }
    // Both branches sit at or beyond +/-100, so zero is unreachable.
    Ok(rounded as i32)
}

/// Which side of the line a price sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Favorite,
    Even,
    Underdog,
}

impl Side {
    /// Non-conventional prices with |m| < 100 are classified by the
    /// probability they imply: +50 is a favorite, -50 an underdog.
    pub fn from_american(moneyline: i32) -> Self {
        match moneyline {
            100 | -100 => Side::Even,
            m if m < -100 || (0 < m && m < 100) => Side::Favorite,
            _ => Side::Underdog,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Side::Favorite => "favorite",
            Side::Even => "even money",
            Side::Underdog => "underdog",
        };
        f.write_str(label)
    }
}

/// Odds as supplied by a caller, in whichever notation they arrived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum OddsInput {
    American(i32),
    Decimal(f64),
    Fractional(Fraction),
}

impl OddsInput {
    pub fn validate(&self) -> Result<(), OddsError> {
        match *self {
            OddsInput::American(m) => validate_american(m),
            OddsInput::Decimal(d) => validate_decimal(d),
            // Fraction::new already refuses non-positive parts.
            OddsInput::Fractional(_) => Ok(()),
        }
    }

    pub fn implied_probability(&self) -> Result<f64, OddsError> {
        match *self {
            OddsInput::American(m) => american_to_probability(m),
            OddsInput::Decimal(d) => decimal_to_probability(d),
            OddsInput::Fractional(f) => Ok(fraction_to_probability(f)),
        }
    }

    pub fn to_decimal(&self) -> Result<f64, OddsError> {
        match *self {
            OddsInput::American(m) => american_to_decimal(m),
            OddsInput::Decimal(d) => validate_decimal(d).map(|_| d),
            OddsInput::Fractional(f) => Ok(fraction_to_decimal(f)),
        }
    }

    /// Net profit for a stake of 1.
    pub fn profit_per_unit(&self) -> Result<f64, OddsError> {
        match *self {
            OddsInput::American(m) => {
                validate_american(m)?;
                let m = m as f64;
                Ok(if m > 0.0 { m / 100.0 } else { 100.0 / m.abs() })
            }
            OddsInput::Decimal(d) => validate_decimal(d).map(|_| d - 1.0),
            OddsInput::Fractional(f) => Ok(f.to_f64()),
        }
    }

    /// Derive every other notation from this one.
    ///
    /// American input keeps its exact integer and exact fraction. Decimal input
    /// goes through the capped fraction approximation. Fractional input keeps
    /// its own reduced fraction.
    pub fn quote(&self, max_denominator: u64) -> Result<OddsQuote, OddsError> {
        let (american, decimal, fraction) = match *self {
            OddsInput::American(m) => (m, american_to_decimal(m)?, american_to_fraction(m)?),
            OddsInput::Decimal(d) => (
                decimal_to_american(d)?,
                d,
                decimal_to_fraction(d, max_denominator)?,
            ),
            OddsInput::Fractional(f) => (fraction_to_american(f)?, fraction_to_decimal(f), f),
        };
        Ok(OddsQuote {
            american,
            decimal,
            fraction,
            implied_probability: self.implied_probability()?,
        })
    }
}

impl From<Fraction> for OddsInput {
    fn from(fraction: Fraction) -> Self {
        OddsInput::Fractional(fraction)
    }
}

impl fmt::Display for OddsInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OddsInput::American(m) => f.write_str(&format_american(*m)),
            OddsInput::Decimal(d) => write!(f, "{d}"),
            OddsInput::Fractional(fr) => write!(f, "{fr}"),
        }
    }
}

/// All notations of a single price, plus the probability it implies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OddsQuote {
    pub american: i32,
    pub decimal: f64,
    pub fraction: Fraction,
    pub implied_probability: f64,
}

impl OddsQuote {
    pub fn loss_probability(&self) -> f64 {
        1.0 - self.implied_probability
    }

    pub fn side(&self) -> Side {
        Side::from_american(self.american)
    }

    /// "52.4%"
    pub fn probability_display(&self) -> String {
        format_percent(self.implied_probability)
    }

    /// "1.91"
    pub fn decimal_display(&self) -> String {
        format!("{:.2}", self.decimal)
    }

    /// "+150" / "-110"
    pub fn american_display(&self) -> String {
        format_american(self.american)
    }
}

pub fn format_american(moneyline: i32) -> String {
    if moneyline > 0 {
        format!("+{moneyline}")
    } else {
        moneyline.to_string()
    }
}

/// Probability rendered as a percentage to one decimal place.
pub fn format_percent(probability: f64) -> String {
    format!("{:.1}%", probability * 100.0)
}
