//! Stage 4: Windowed Net-GEX Analysis
//!
//! Restricts per-strike aggregates to `[spot − width, spot + width]` and
//! derives the gamma zone, cumulative net GEX and high-open-interest strikes.

use serde::{Deserialize, Serialize};

use crate::core::{GexError, GexResult};

use super::{GammaZone, PerStrikeAggregate, WindowConfig, ZoneStatus};

/// Result of the windowed analysis over a non-empty band
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowAnalysis {
    pub spot: f64,
    pub width: f64,
    /// Rows inside the band with finite strike and net GEX, ascending strike
    pub rows: Vec<PerStrikeAggregate>,
    /// Row with the largest net GEX (first on ties)
    pub max_gex: PerStrikeAggregate,
    /// Row with the smallest net GEX (first on ties)
    pub min_gex: PerStrikeAggregate,
    pub zone: GammaZone,
    pub status: ZoneStatus,
    /// Running total of net GEX, aligned with `rows`
    pub cumulative_gex: Vec<f64>,
    /// Open-interest percentile threshold; `None` if no row has finite OI
    pub oi_threshold: Option<f64>,
    /// Rows with total OI at or above `oi_threshold`
    pub high_oi: Vec<PerStrikeAggregate>,
    /// Percentile threshold computed within `high_oi`
    pub high_conviction_threshold: Option<f64>,
    /// Rows of `high_oi` at or above `high_conviction_threshold`
    pub high_conviction: Vec<PerStrikeAggregate>,
}

impl WindowAnalysis {
    pub fn zone_width(&self) -> f64 {
        self.zone.width()
    }

    pub fn is_inside_zone(&self) -> bool {
        self.status == ZoneStatus::Inside
    }

    /// Rows with positive net GEX
    pub fn positive_rows(&self) -> Vec<&PerStrikeAggregate> {
        self.rows.iter().filter(|r| r.net_gex > 0.0).collect()
    }

    /// Rows with negative net GEX
    pub fn negative_rows(&self) -> Vec<&PerStrikeAggregate> {
        self.rows.iter().filter(|r| r.net_gex < 0.0).collect()
    }

    pub fn high_conviction_strikes(&self) -> Vec<f64> {
        self.high_conviction.iter().map(|r| r.strike).collect()
    }
}

/// Percentile with linear interpolation between closest ranks.
///
/// Non-finite values are dropped first; `None` when nothing is left.
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64))
}

/// Running sum
pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |acc, &v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}

fn at_or_above(rows: &[PerStrikeAggregate], threshold: Option<f64>) -> Vec<PerStrikeAggregate> {
    match threshold {
        Some(t) => rows
            .iter()
            .filter(|r| r.total_open_interest >= t)
            .cloned()
            .collect(),
        None => Vec::new(),
    }
}

/// Windowed analyzer over per-strike aggregates
pub struct WindowAnalyzer {
    config: WindowConfig,
}

impl WindowAnalyzer {
    pub fn new() -> Self {
        Self {
            config: WindowConfig::default(),
        }
    }

    pub fn with_config(config: WindowConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// Run the analysis.
    ///
    /// Returns [`GexError::EmptyWindow`] when no finite row lies within the
    /// band, and [`GexError::InvalidInput`] for a non-positive width.
    pub fn analyze(&self, rows: &[PerStrikeAggregate], spot: f64) -> GexResult<WindowAnalysis> {
        self.config.validate()?;
        let width = self.config.width;
        let (lower, upper) = (spot - width, spot + width);

        let mut filtered: Vec<PerStrikeAggregate> = rows
            .iter()
            .filter(|r| r.strike.is_finite() && r.net_gex.is_finite())
            .filter(|r| r.strike >= lower && r.strike <= upper)
            .cloned()
            .collect();
        filtered.sort_by(|a, b| a.strike.total_cmp(&b.strike));

        let Some(first) = filtered.first() else {
            return Err(GexError::EmptyWindow { spot, width });
        };

        let mut max_gex = first;
        let mut min_gex = first;
        for row in &filtered[1..] {
            if row.net_gex > max_gex.net_gex {
                max_gex = row;
            }
            if row.net_gex < min_gex.net_gex {
                min_gex = row;
            }
        }
        let (max_gex, min_gex) = (max_gex.clone(), min_gex.clone());

        let zone = GammaZone {
            lower_strike: min_gex.strike,
            upper_strike: max_gex.strike,
        };

        let net: Vec<f64> = filtered.iter().map(|r| r.net_gex).collect();
        let cumulative_gex = cumulative_sum(&net);

        let total_oi: Vec<f64> = filtered.iter().map(|r| r.total_open_interest).collect();
        let oi_threshold = percentile(&total_oi, self.config.oi_percentile);
        let high_oi = at_or_above(&filtered, oi_threshold);

        let high_oi_values: Vec<f64> = high_oi.iter().map(|r| r.total_open_interest).collect();
        let high_conviction_threshold =
            percentile(&high_oi_values, self.config.high_conviction_percentile);
        let high_conviction = at_or_above(&high_oi, high_conviction_threshold);

        tracing::debug!(
            "Window {:.0}..{:.0}: {} strikes, zone {:.0}/{:.0}, {} high-OI",
            lower,
            upper,
            filtered.len(),
            zone.lower_strike,
            zone.upper_strike,
            high_oi.len()
        );

        Ok(WindowAnalysis {
            spot,
            width,
            status: zone.status(spot),
            zone,
            max_gex,
            min_gex,
            cumulative_gex,
            oi_threshold,
            high_oi,
            high_conviction_threshold,
            high_conviction,
            rows: filtered,
        })
    }
}

impl Default for WindowAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Windowed analysis with default percentiles
pub fn analyze_window(
    rows: &[PerStrikeAggregate],
    spot: f64,
    width: f64,
) -> GexResult<WindowAnalysis> {
    WindowAnalyzer::with_config(WindowConfig {
        width,
        ..Default::default()
    })
    .analyze(rows, spot)
}
