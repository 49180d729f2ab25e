//! Bookmaker margin (vigorish) across the outcomes of one market.

use super::error::{InvalidOddsReason, OddsError};
use super::odds::OddsInput;

fn implied_probabilities(outcomes: &[OddsInput]) -> Result<Vec<f64>, OddsError> {
    if outcomes.len() < 2 {
        return Err(InvalidOddsReason::TooFewOutcomes(outcomes.len()).into());
    }
    outcomes.iter().map(OddsInput::implied_probability).collect()
}

/// Sum of implied probabilities minus one. A -110/-110 line carries
/// about 0.0476; a fair market carries 0.
pub fn overround(outcomes: &[OddsInput]) -> Result<f64, OddsError> {
    let total: f64 = implied_probabilities(outcomes)?.iter().sum();
    Ok(total - 1.0)
}

/// Strip the margin by normalising implied probabilities so they sum to one.
/// Returned in the same order as `outcomes`.
pub fn devig(outcomes: &[OddsInput]) -> Result<Vec<f64>, OddsError> {
    let implied = implied_probabilities(outcomes)?;
    let total: f64 = implied.iter().sum();
    Ok(implied.into_iter().map(|p| p / total).collect())
}

/// Two-way convenience. Returns (first_fair_prob, second_fair_prob).
pub fn devig_two_way(first: OddsInput, second: OddsInput) -> Result<(f64, f64), OddsError> {
    let fair = devig(&[first, second])?;
    Ok((fair[0], fair[1]))
}
