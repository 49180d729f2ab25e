use thiserror::Error;

/// Everything the engine can reject. All of these are input-validation
/// failures raised before any arithmetic happens.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum OddsError {
    #[error("invalid odds: {0}")]
    InvalidOdds(InvalidOddsReason),
    #[error("invalid stake {0}: must be a finite, non-negative amount")]
    InvalidStake(f64),
    #[error("invalid probability {0}: must lie strictly between 0 and 1")]
    InvalidProbability(f64),
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum InvalidOddsReason {
    #[error("american odds cannot be zero")]
    ZeroAmerican,
    #[error("decimal odds must be greater than 1 (got {0})")]
    DecimalNotAboveOne(f64),
    #[error("decimal odds must be finite")]
    NonFiniteDecimal,
    #[error("odds of {0} are too long to represent")]
    OutOfRange(f64),
    #[error("fractional odds need a positive numerator and denominator ({0}/{1})")]
    NonPositiveFraction(u64, u64),
    #[error("cannot parse fractional odds from {0:?}")]
    UnparsableFraction(String),
    #[error("a market needs at least two outcomes (got {0})")]
    TooFewOutcomes(usize),
}

impl From<InvalidOddsReason> for OddsError {
    fn from(reason: InvalidOddsReason) -> Self {
        OddsError::InvalidOdds(reason)
    }
}
