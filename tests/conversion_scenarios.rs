//! Worked examples and randomized properties for the odds engine.

use odds_converter::engine::odds::{
    american_to_decimal, american_to_fraction, american_to_probability, decimal_to_american,
    decimal_to_fraction, decimal_to_probability,
};
use odds_converter::engine::wager::{expected_value, payout, profit};
use odds_converter::engine::{
    evaluate, InvalidOddsReason, OddsError, OddsInput, WagerRequest, MAX_DENOMINATOR,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const SAMPLES: usize = 5_000;

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Conventional moneylines: |m| >= 100, with -100 folded into +100.
fn random_moneyline(rng: &mut StdRng) -> i32 {
    if rng.gen_bool(0.5) {
        rng.gen_range(100..=10_000)
    } else {
        rng.gen_range(-10_000..=-101)
    }
}

// ---- Worked examples ----

#[test]
fn test_minus_110() {
    let q = OddsInput::American(-110).quote(MAX_DENOMINATOR).unwrap();
    assert_eq!(q.probability_display(), "52.4%");
    assert_eq!(q.decimal_display(), "1.91");
    assert_eq!(q.fraction.to_string(), "10/11");
}

#[test]
fn test_plus_150() {
    let q = OddsInput::American(150).quote(MAX_DENOMINATOR).unwrap();
    assert_eq!(q.probability_display(), "40.0%");
    assert_eq!(q.decimal_display(), "2.50");
    assert_eq!(q.fraction.to_string(), "3/2");
}

#[test]
fn test_decimal_1_91() {
    let q = OddsInput::Decimal(1.91).quote(MAX_DENOMINATOR).unwrap();
    assert_eq!(q.american, -110);
    assert_eq!(q.probability_display(), "52.4%");
}

#[test]
fn test_stake_100_at_minus_110() {
    let odds = OddsInput::American(-110);
    assert!((profit(100.0, &odds).unwrap() - 90.91).abs() < 0.005);
    assert!((payout(100.0, &odds).unwrap() - 190.91).abs() < 0.005);
}

#[test]
fn test_stake_100_at_plus_150() {
    let odds = OddsInput::American(150);
    assert_eq!(profit(100.0, &odds).unwrap(), 150.0);
    assert_eq!(payout(100.0, &odds).unwrap(), 250.0);
}

#[test]
fn test_coin_flip_expected_value_is_zero() {
    assert_eq!(expected_value(10.0, &OddsInput::American(100)).unwrap(), 0.0);
}

// ---- Boundaries ----

#[test]
fn test_zero_american_is_invalid() {
    assert_eq!(
        american_to_probability(0),
        Err(OddsError::InvalidOdds(InvalidOddsReason::ZeroAmerican))
    );
    assert!(evaluate(&WagerRequest::new(OddsInput::American(0), 10.0)).is_err());
}

#[test]
fn test_decimal_one_is_invalid() {
    assert!(matches!(
        decimal_to_probability(1.0),
        Err(OddsError::InvalidOdds(InvalidOddsReason::DecimalNotAboveOne(_)))
    ));
    assert!(OddsInput::Decimal(1.0).quote(MAX_DENOMINATOR).is_err());
}

#[test]
fn test_negative_stake_is_invalid() {
    let request = WagerRequest::new(OddsInput::American(-110), -0.01);
    assert_eq!(evaluate(&request), Err(OddsError::InvalidStake(-0.01)));
}

#[test]
fn test_minus_100_and_plus_100_are_the_same_price() {
    assert_eq!(american_to_probability(-100), american_to_probability(100));
    assert_eq!(decimal_to_american(american_to_decimal(-100).unwrap()).unwrap(), 100);
}

// ---- Properties ----

#[test]
fn test_american_decimal_american_round_trip() {
    let mut rng = StdRng::seed_from_u64(0x0dd5);
    for _ in 0..SAMPLES {
        let m = random_moneyline(&mut rng);
        let back = decimal_to_american(american_to_decimal(m).unwrap()).unwrap();
        assert!((back - m).abs() <= 1, "m={m} back={back}");
    }
}

#[test]
fn test_round_trip_preserves_probability_for_any_nonzero_moneyline() {
    // Includes |m| < 100, which maps to the conventional equivalent price.
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..SAMPLES {
        let m: i32 = rng.gen_range(-10_000..=10_000);
        if m == 0 {
            continue;
        }
        let d = american_to_decimal(m).unwrap();
        let p = american_to_probability(m).unwrap();
        assert!((decimal_to_probability(d).unwrap() - p).abs() < 1e-12, "m={m}");

        let back = decimal_to_american(d).unwrap();
        let p_back = american_to_probability(back).unwrap();
        // half a unit of rounding near even money moves p by at most 0.00125
        assert!((p_back - p).abs() < 2e-3, "m={m} back={back}");
    }
}

#[test]
fn test_probability_complement() {
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..SAMPLES {
        let input = if rng.gen_bool(0.5) {
            OddsInput::American(random_moneyline(&mut rng))
        } else {
            OddsInput::Decimal(rng.gen_range(1.001..100.0))
        };
        let outcome = evaluate(&WagerRequest::new(input, 10.0)).unwrap();
        let sum = outcome.win_probability + outcome.loss_probability;
        assert!((sum - 1.0).abs() < 1e-12, "{input}: {sum}");
    }
}

#[test]
fn test_probability_monotone_in_american_odds() {
    // From long underdog through even money to heavy favorite.
    let ladder: Vec<i32> = (100..=5_000).rev().chain((-5_000..=-101).rev()).collect();
    let probs: Vec<f64> = ladder
        .iter()
        .map(|&m| american_to_probability(m).unwrap())
        .collect();
    for (w, pair) in probs.windows(2).zip(ladder.windows(2)) {
        assert!(w[1] > w[0], "p({}) <= p({})", pair[1], pair[0]);
    }
}

#[test]
fn test_probability_monotone_in_decimal_odds() {
    let mut prev = decimal_to_probability(1.001).unwrap();
    let mut d = 1.001;
    while d < 50.0 {
        d += 0.013;
        let p = decimal_to_probability(d).unwrap();
        assert!(p < prev, "d={d}");
        prev = p;
    }
}

#[test]
fn test_fractions_are_reduced() {
    let mut rng = StdRng::seed_from_u64(99);
    for _ in 0..SAMPLES {
        let m: i32 = rng.gen_range(-100_000..=100_000);
        if m == 0 {
            continue;
        }
        let f = american_to_fraction(m).unwrap();
        assert_eq!(gcd(f.numerator(), f.denominator()), 1, "m={m} f={f}");

        let d: f64 = rng.gen_range(1.0001..500.0);
        let f = decimal_to_fraction(d, MAX_DENOMINATOR).unwrap();
        assert_eq!(gcd(f.numerator(), f.denominator()), 1, "d={d} f={f}");
        assert!(f.denominator() <= MAX_DENOMINATOR, "d={d} f={f}");
    }
}

#[test]
fn test_fraction_approximation_is_close() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..SAMPLES {
        let d: f64 = rng.gen_range(1.01..20.0);
        let f = decimal_to_fraction(d, MAX_DENOMINATOR).unwrap();
        // neighbouring Farey fractions of order N are at most 2/(N+1) apart
        let err = (f.to_f64() - (d - 1.0)).abs();
        assert!(err <= 1.0 / (MAX_DENOMINATOR as f64 + 1.0) + 1e-12, "d={d} f={f}");
    }
}

#[test]
fn test_engine_is_shareable_across_threads() {
    let inputs: Vec<OddsInput> = (100..200).map(OddsInput::American).collect();
    let expected: Vec<_> = inputs.iter().map(|i| i.quote(MAX_DENOMINATOR).unwrap()).collect();

    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                let got: Vec<_> = inputs.iter().map(|i| i.quote(MAX_DENOMINATOR).unwrap()).collect();
                assert_eq!(got, expected);
            });
        }
    });
}
