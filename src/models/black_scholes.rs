//! Black-Scholes gamma
//!
//! Closed-form gamma used to re-price dealer exposure at hypothetical spot
//! levels. Only gamma is needed; pricing and implied-vol solving are left
//! to the vendor.

use std::f64::consts::PI;

use crate::core::OptionType;

/// Contract multiplier for index options
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

/// Standard normal PDF
pub fn norm_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * PI).sqrt()
}

/// Black-Scholes d1 parameter
pub fn d1(spot: f64, strike: f64, rate: f64, div: f64, vol: f64, time: f64) -> f64 {
    ((spot / strike).ln() + (rate - div + 0.5 * vol * vol) * time) / (vol * time.sqrt())
}

/// Black-Scholes d2 parameter
pub fn d2(spot: f64, strike: f64, rate: f64, div: f64, vol: f64, time: f64) -> f64 {
    d1(spot, strike, rate, div, vol, time) - vol * time.sqrt()
}

/// Per-unit gamma for one leg.
///
/// The put branch is written in terms of d2 and the discounted strike.
/// It is kept as its own expression rather than folded into the call
/// branch; the two only agree when `K·e^(-rT)·φ(d2) = S·e^(-qT)·φ(d1)`.
pub fn gamma(
    spot: f64,
    strike: f64,
    rate: f64,
    div: f64,
    vol: f64,
    time: f64,
    option_type: OptionType,
) -> f64 {
    if time == 0.0 || vol == 0.0 {
        return 0.0;
    }

    let sqrt_t = time.sqrt();
    let dp = d1(spot, strike, rate, div, vol, time);
    let dm = dp - vol * sqrt_t;

    match option_type {
        OptionType::Call => (-div * time).exp() * norm_pdf(dp) / (spot * vol * sqrt_t),
        OptionType::Put => {
            strike * (-rate * time).exp() * norm_pdf(dm) / (spot * spot * vol * sqrt_t)
        }
    }
}

/// Dollar gamma exposure of `open_interest` contracts per 1% move in spot.
///
/// Expired (`time == 0`) or zero-vol contracts contribute nothing.
#[allow(clippy::too_many_arguments)]
pub fn gamma_exposure(
    spot: f64,
    strike: f64,
    vol: f64,
    time: f64,
    rate: f64,
    div: f64,
    option_type: OptionType,
    open_interest: f64,
) -> f64 {
    if time == 0.0 || vol == 0.0 {
        return 0.0;
    }
    let g = gamma(spot, strike, rate, div, vol, time, option_type);
    open_interest * CONTRACT_MULTIPLIER * spot * spot * 0.01 * g
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_norm_pdf() {
        assert!((norm_pdf(0.0) - 0.398_942_280_401_432_7).abs() < 1e-12);
        assert!((norm_pdf(1.0) - norm_pdf(-1.0)).abs() < 1e-15);
    }

    #[test]
    fn test_degenerate_contracts_have_no_exposure() {
        for option_type in [OptionType::Call, OptionType::Put] {
            assert_eq!(
                gamma_exposure(5000.0, 5000.0, 0.0, 0.1, 0.0, 0.0, option_type, 1000.0),
                0.0
            );
            assert_eq!(
                gamma_exposure(5000.0, 5000.0, 0.2, 0.0, 0.0, 0.0, option_type, 1000.0),
                0.0
            );
        }
    }

    #[test]
    fn test_call_gamma_matches_textbook() {
        // ATM, 20% vol, 1 year, no carry: gamma = φ(0.1) / (S σ √T)
        let g = gamma(100.0, 100.0, 0.0, 0.0, 0.2, 1.0, OptionType::Call);
        let expected = norm_pdf(0.1) / (100.0 * 0.2);
        assert!((g - expected).abs() < 1e-12);
    }

    #[test]
    fn test_put_branch_formula() {
        let (s, k, vol, t) = (95.0, 100.0, 0.25, 0.5);
        let dm = d2(s, k, 0.0, 0.0, vol, t);
        let expected = k * norm_pdf(dm) / (s * s * vol * t.sqrt());
        let g = gamma(s, k, 0.0, 0.0, vol, t, OptionType::Put);
        assert!((g - expected).abs() < 1e-14);
    }

    #[test]
    fn test_exposure_scaling() {
        let (s, k, vol, t) = (5000.0, 5000.0, 0.15, 10.0 / 262.0);
        let g = gamma(s, k, 0.0, 0.0, vol, t, OptionType::Call);
        let ex = gamma_exposure(s, k, vol, t, 0.0, 0.0, OptionType::Call, 2500.0);
        assert!((ex - 2500.0 * 100.0 * s * s * 0.01 * g).abs() < 1e-6);
        assert!(ex > 0.0);

        // Linear in open interest
        let half = gamma_exposure(s, k, vol, t, 0.0, 0.0, OptionType::Call, 1250.0);
        assert!((ex - 2.0 * half).abs() < 1e-6);
    }
}
