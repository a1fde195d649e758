//! Gamma Exposure (GEX) pipeline
//!
//! Estimates dealer gamma exposure from one option-chain snapshot and
//! derives the levels where dealer hedging pressure changes sign.
//!
//! Four stages:
//! 1. **Strike aggregation**: vendor gamma × open interest at the actual spot,
//!    summed per strike in two unit systems
//! 2. **Scenario profile**: Black-Scholes gamma re-priced at hypothetical spot
//!    levels, for all expiries / ex-next expiry / ex-next monthly
//! 3. **Zero-gamma crossing**: linear interpolation of the profile's sign change
//! 4. **Windowed analysis**: max/min net-GEX zone, cumulative GEX and
//!    high-open-interest strikes within ±width of spot

mod aggregation;
mod analyzer;
mod config;
mod flip;
mod profile;
mod window;

pub use aggregation::*;
pub use analyzer::*;
pub use config::*;
pub use flip::*;
pub use profile::*;
pub use window::*;

use serde::{Deserialize, Serialize};

/// Sum of one strike's exposure across every expiration.
///
/// `total_gamma_bn` is spot-scaled dollar gamma per 1% move in billions;
/// `call_gex`/`put_gex`/`net_gex` use a fixed 100×100 multiplier. The two
/// unit systems are independent and are not meant to be compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerStrikeAggregate {
    pub strike: f64,
    pub call_gex: f64,
    pub put_gex: f64,
    pub total_gamma_bn: f64,
    pub net_gex: f64,
    pub call_open_interest: f64,
    pub put_open_interest: f64,
    pub total_open_interest: f64,
}

/// Per-strike aggregates, ascending by strike
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrikeTable {
    pub spot: f64,
    pub rows: Vec<PerStrikeAggregate>,
}

impl StrikeTable {
    /// Headline dollar gamma per 1% move (billions), finite rows only
    pub fn total_gamma_bn(&self) -> f64 {
        self.rows
            .iter()
            .map(|r| r.total_gamma_bn)
            .filter(|v| v.is_finite())
            .sum()
    }

    pub fn strikes(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r.strike).collect()
    }

    pub fn row(&self, strike: f64) -> Option<&PerStrikeAggregate> {
        self.rows.iter().find(|r| (r.strike - strike).abs() < 1e-6)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Aggregate gamma exposure at one hypothetical spot level ($bn per 1% move)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GammaProfilePoint {
    pub spot_level: f64,
    pub total_gamma_all_expiries: f64,
    pub total_gamma_ex_next_expiry: f64,
    pub total_gamma_ex_next_monthly: f64,
}

/// Minimum/maximum net-GEX strikes bounding the consolidation zone.
///
/// `lower_strike` holds the minimum net GEX and `upper_strike` the maximum;
/// numerically the former may sit above the latter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GammaZone {
    /// Strike with the minimum net GEX
    pub lower_strike: f64,
    /// Strike with the maximum net GEX
    pub upper_strike: f64,
}

impl GammaZone {
    pub fn width(&self) -> f64 {
        (self.upper_strike - self.lower_strike).abs()
    }

    /// Spot lies in the band spanned by the two strikes, in either order
    pub fn contains(&self, spot: f64) -> bool {
        let (lo, hi) = if self.lower_strike <= self.upper_strike {
            (self.lower_strike, self.upper_strike)
        } else {
            (self.upper_strike, self.lower_strike)
        };
        lo <= spot && spot <= hi
    }

    pub fn status(&self, spot: f64) -> ZoneStatus {
        if self.contains(spot) {
            ZoneStatus::Inside
        } else {
            ZoneStatus::Outside
        }
    }
}

/// Spot position relative to the gamma zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneStatus {
    /// Between min and max net-GEX strikes; consolidation more likely
    Inside,
    /// Beyond the zone; sharp moves more likely
    Outside,
}

impl ZoneStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ZoneStatus::Inside => "inside gamma zone",
            ZoneStatus::Outside => "outside gamma zone",
        }
    }
}
