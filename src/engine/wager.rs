//! Payout, profit and expected value for a stake at given odds.

use super::error::OddsError;
use super::odds::OddsInput;
use serde::Serialize;

/// Everything needed to price one bet. Callers build this explicitly; the
/// engine keeps no notion of a "current" odds type or stake.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WagerRequest {
    pub odds: OddsInput,
    pub stake: f64,
    /// Caller's own win probability. When absent the implied probability of
    /// `odds` is used, which makes the bet exactly fair.
    pub estimated_probability: Option<f64>,
}

impl WagerRequest {
    pub fn new(odds: OddsInput, stake: f64) -> Self {
        Self {
            odds,
            stake,
            estimated_probability: None,
        }
    }

    pub fn with_estimate(mut self, probability: f64) -> Self {
        self.estimated_probability = Some(probability);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WagerOutcome {
    pub stake: f64,
    pub profit: f64,
    /// Stake plus profit.
    pub payout: f64,
    pub win_probability: f64,
    pub loss_probability: f64,
    pub expected_value: f64,
    /// Win probability minus the price's implied probability.
    pub edge: f64,
}

fn validate_stake(stake: f64) -> Result<(), OddsError> {
    if !stake.is_finite() || stake < 0.0 {
        return Err(OddsError::InvalidStake(stake));
    }
    Ok(())
}

fn validate_probability(probability: f64) -> Result<(), OddsError> {
    if !(probability > 0.0 && probability < 1.0) {
        return Err(OddsError::InvalidProbability(probability));
    }
    Ok(())
}

/// Net winnings if the bet lands.
///
/// American `m > 0`: `stake * m / 100`; `m < 0`: `stake * 100 / |m|`.
/// Decimal `d`: `stake * (d - 1)`. Fractional `n/d`: `stake * n / d`.
pub fn profit(stake: f64, odds: &OddsInput) -> Result<f64, OddsError> {
    let per_unit = odds.profit_per_unit()?;
    validate_stake(stake)?;
    Ok(stake * per_unit)
}

/// Total returned on a winning bet, stake included.
pub fn payout(stake: f64, odds: &OddsInput) -> Result<f64, OddsError> {
    Ok(stake + profit(stake, odds)?)
}

/// `profit * p_win - stake * (1 - p_win)`, using the full-precision implied
/// probability of `odds`.
pub fn expected_value(stake: f64, odds: &OddsInput) -> Result<f64, OddsError> {
    let p_win = odds.implied_probability()?;
    let profit = profit(stake, odds)?;
    Ok(ev(profit, stake, p_win))
}

fn ev(profit: f64, stake: f64, p_win: f64) -> f64 {
    let p_loss = 1.0 - p_win;
    profit * p_win - stake * p_loss
}

/// Price a whole request in one pass. Odds are validated before the stake,
/// the stake before the estimate.
pub fn evaluate(request: &WagerRequest) -> Result<WagerOutcome, OddsError> {
    let implied = request.odds.implied_probability()?;
    let profit = profit(request.stake, &request.odds)?;

    let win_probability = match request.estimated_probability {
        Some(p) => {
            validate_probability(p)?;
            p
        }
        None => implied,
    };

    Ok(WagerOutcome {
        stake: request.stake,
        profit,
        payout: request.stake + profit,
        win_probability,
        loss_probability: 1.0 - win_probability,
        expected_value: ev(profit, request.stake, win_probability),
        edge: win_probability - implied,
    })
}
