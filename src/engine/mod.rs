pub mod error;
pub mod fraction;
pub mod odds;
pub mod vig;
pub mod wager;

pub use error::{InvalidOddsReason, OddsError};
pub use fraction::{Fraction, MAX_DENOMINATOR};
pub use odds::{OddsInput, OddsQuote, Side};
pub use wager::{evaluate, WagerOutcome, WagerRequest};
