//! Stage 2: Scenario Profile
//!
//! Re-prices every contract's gamma exposure at evenly spaced hypothetical
//! spot levels. Each level is a pure function of (contracts, level), so
//! levels are evaluated in parallel.

use chrono::NaiveDate;
use ndarray::{Array1, Zip};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::{is_third_friday, years_to_expiry, OptionType, StrikePair};
use crate::models::gamma_exposure;

use super::{GammaProfilePoint, ProfileConfig, BILLION};

/// Three exposure curves sampled over a range of spot levels
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GammaProfile {
    /// Actual spot the sweep is centred on
    pub spot: f64,
    /// Nearest expiration in the chain (excluded from the ex-next curve)
    pub next_expiry: Option<NaiveDate>,
    /// Nearest third-Friday expiration (excluded from the ex-monthly curve)
    pub next_monthly_expiry: Option<NaiveDate>,
    /// One point per level, ascending
    pub points: Vec<GammaProfilePoint>,
}

impl GammaProfile {
    pub fn levels(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.spot_level).collect()
    }

    pub fn all_expiries(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.total_gamma_all_expiries).collect()
    }

    pub fn ex_next_expiry(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.total_gamma_ex_next_expiry).collect()
    }

    pub fn ex_next_monthly(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.total_gamma_ex_next_monthly).collect()
    }

    /// Interpolated gamma flip on the all-expiries curve
    pub fn zero_gamma(&self) -> Option<f64> {
        super::zero_gamma_level(&self.levels(), &self.all_expiries())
    }
}

/// Column-oriented view of the paired chain
struct ProfileInputs {
    strikes: Array1<f64>,
    years: Array1<f64>,
    call_iv: Array1<f64>,
    put_iv: Array1<f64>,
    call_oi: Array1<f64>,
    put_oi: Array1<f64>,
    /// Row kept in the ex-next-expiry curve
    keep_ex_next: Vec<bool>,
    /// Row kept in the ex-next-monthly curve
    keep_ex_monthly: Vec<bool>,
}

/// Sweeps hypothetical spot levels and re-prices gamma exposure at each
pub struct ScenarioProfiler {
    config: ProfileConfig,
}

impl ScenarioProfiler {
    pub fn new() -> Self {
        Self {
            config: ProfileConfig::default(),
        }
    }

    pub fn with_config(config: ProfileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// Evenly spaced levels across `[lower·spot, upper·spot]`, both ends included
    pub fn levels(&self, spot: f64) -> Array1<f64> {
        Array1::linspace(
            self.config.lower_factor * spot,
            self.config.upper_factor * spot,
            self.config.levels,
        )
    }

    /// Build the three exposure curves.
    ///
    /// `as_of` is the analysis date used for business-day time to expiry.
    pub fn profile(&self, pairs: &[StrikePair], spot: f64, as_of: NaiveDate) -> GammaProfile {
        let next_expiry = pairs.iter().map(|p| p.expiration).min();
        let next_monthly_expiry = pairs
            .iter()
            .map(|p| p.expiration)
            .filter(|&d| is_third_friday(d))
            .min();

        let inputs = self.prepare(pairs, as_of, next_expiry, next_monthly_expiry);
        let levels = self.levels(spot);

        tracing::debug!(
            "Profiling {} pairs over {} levels ({:.0}..{:.0})",
            pairs.len(),
            levels.len(),
            levels.iter().next().copied().unwrap_or(f64::NAN),
            levels.iter().last().copied().unwrap_or(f64::NAN),
        );

        let points: Vec<GammaProfilePoint> = levels
            .to_vec()
            .into_par_iter()
            .map(|level| self.point_at(&inputs, level))
            .collect();

        GammaProfile {
            spot,
            next_expiry,
            next_monthly_expiry,
            points,
        }
    }

    fn prepare(
        &self,
        pairs: &[StrikePair],
        as_of: NaiveDate,
        next_expiry: Option<NaiveDate>,
        next_monthly: Option<NaiveDate>,
    ) -> ProfileInputs {
        let days_per_year = self.config.trading_days_per_year;
        let column = |f: &dyn Fn(&StrikePair) -> f64| pairs.iter().map(f).collect::<Array1<f64>>();

        ProfileInputs {
            strikes: column(&|p| p.strike),
            years: column(&|p| years_to_expiry(as_of, p.expiration, days_per_year)),
            call_iv: column(&|p| p.call.implied_vol),
            put_iv: column(&|p| p.put.implied_vol),
            call_oi: column(&|p| p.call.open_interest),
            put_oi: column(&|p| p.put.open_interest),
            keep_ex_next: pairs
                .iter()
                .map(|p| Some(p.expiration) != next_expiry)
                .collect(),
            keep_ex_monthly: pairs
                .iter()
                .map(|p| Some(p.expiration) != next_monthly)
                .collect(),
        }
    }

    fn leg_exposure(
        &self,
        inputs: &ProfileInputs,
        level: f64,
        iv: &Array1<f64>,
        oi: &Array1<f64>,
        option_type: OptionType,
    ) -> Array1<f64> {
        let (rate, div) = (self.config.risk_free_rate, self.config.dividend_yield);
        Zip::from(&inputs.strikes)
            .and(iv)
            .and(&inputs.years)
            .and(oi)
            .map_collect(|&strike, &vol, &time, &open_interest| {
                gamma_exposure(level, strike, vol, time, rate, div, option_type, open_interest)
            })
    }

    fn point_at(&self, inputs: &ProfileInputs, level: f64) -> GammaProfilePoint {
        let call_ex =
            self.leg_exposure(inputs, level, &inputs.call_iv, &inputs.call_oi, OptionType::Call);
        let put_ex =
            self.leg_exposure(inputs, level, &inputs.put_iv, &inputs.put_oi, OptionType::Put);

        let net = |keep: Option<&[bool]>| {
            (finite_sum(&call_ex, keep) - finite_sum(&put_ex, keep)) / BILLION
        };

        GammaProfilePoint {
            spot_level: level,
            total_gamma_all_expiries: net(None),
            total_gamma_ex_next_expiry: net(Some(&inputs.keep_ex_next)),
            total_gamma_ex_next_monthly: net(Some(&inputs.keep_ex_monthly)),
        }
    }
}

impl Default for ScenarioProfiler {
    fn default() -> Self {
        Self::new()
    }
}

/// Sum of finite values, optionally restricted to rows flagged in `keep`
fn finite_sum(values: &Array1<f64>, keep: Option<&[bool]>) -> f64 {
    values
        .iter()
        .enumerate()
        .filter(|(i, _)| keep.map_or(true, |k| k[*i]))
        .map(|(_, &v)| v)
        .filter(|v| v.is_finite())
        .sum()
}

/// Profile with default settings
pub fn gamma_profile(pairs: &[StrikePair], spot: f64, as_of: NaiveDate) -> GammaProfile {
    ScenarioProfiler::new().profile(pairs, spot, as_of)
}
