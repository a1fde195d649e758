//! GexAnalyzer - Main facade for the GEX pipeline
//!
//! Runs aggregation, scenario profile, zero-gamma search and windowed
//! analysis over one snapshot.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::core::{ChainSnapshot, GexResult};

use super::{
    aggregate_by_strike, GammaProfile, GexConfig, ScenarioProfiler, StrikeTable, WindowAnalysis,
    WindowAnalyzer,
};

/// Everything one analysis run produces, handed to the rendering layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GexReport {
    pub underlying: String,
    pub spot: f64,
    pub as_of: NaiveDate,
    /// Per-strike aggregates at the actual spot
    pub strikes: StrikeTable,
    /// Exposure curves over hypothetical spot levels
    pub profile: GammaProfile,
    /// Gamma flip on the all-expiries curve
    pub zero_gamma: Option<f64>,
    /// `None` when no strike fell inside the window
    pub window: Option<WindowAnalysis>,
    pub config: GexConfig,
}

impl GexReport {
    /// Headline dollar gamma per 1% move, billions
    pub fn total_gamma_bn(&self) -> f64 {
        self.strikes.total_gamma_bn()
    }

    /// Spot above the flip (positive-gamma regime)
    pub fn above_flip(&self) -> Option<bool> {
        self.zero_gamma.map(|flip| self.spot >= flip)
    }
}

/// Main analyzer that runs the full pipeline
pub struct GexAnalyzer {
    config: GexConfig,
}

impl GexAnalyzer {
    /// Create a new analyzer with default configuration
    pub fn new() -> Self {
        Self {
            config: GexConfig::default(),
        }
    }

    /// Create with custom configuration
    pub fn with_config(config: GexConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GexConfig {
        &self.config
    }

    /// Run the full pipeline.
    ///
    /// Fails on invalid configuration or a call/put mismatch; an empty
    /// window is reported as `window: None`.
    pub fn analyze(&self, snapshot: &ChainSnapshot) -> GexResult<GexReport> {
        self.config.validate()?;

        let pairs = snapshot.paired()?;
        tracing::info!(
            "Analyzing {} {} pairs across {} expirations, spot {:.2}",
            snapshot.underlying,
            pairs.len(),
            snapshot.expirations().len(),
            snapshot.spot
        );

        // Stage 1: actual-spot aggregation
        let strikes = aggregate_by_strike(&pairs, snapshot.spot);
        tracing::debug!("Aggregated {} strikes", strikes.len());

        // Stage 2: scenario profile
        let profiler = ScenarioProfiler::with_config(self.config.profile.clone());
        let profile = profiler.profile(&pairs, snapshot.spot, snapshot.as_of);

        // Stage 3: gamma flip
        let zero_gamma = profile.zero_gamma();
        match zero_gamma {
            Some(flip) => tracing::info!("Gamma flip at {:.2}", flip),
            None => tracing::info!("No gamma flip within the sampled range"),
        }

        // Stage 4: windowed analysis
        let analyzer = WindowAnalyzer::with_config(self.config.window.clone());
        let window = match analyzer.analyze(&strikes.rows, snapshot.spot) {
            Ok(analysis) => Some(analysis),
            Err(e) if e.is_empty_window() => {
                tracing::warn!("{}", e);
                None
            }
            Err(e) => return Err(e),
        };

        Ok(GexReport {
            underlying: snapshot.underlying.clone(),
            spot: snapshot.spot,
            as_of: snapshot.as_of,
            strikes,
            profile,
            zero_gamma,
            window,
            config: self.config.clone(),
        })
    }
}

impl Default for GexAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to analyze a snapshot with default settings
pub fn analyze_snapshot(snapshot: &ChainSnapshot) -> GexResult<GexReport> {
    GexAnalyzer::new().analyze(snapshot)
}

/// Convenience function with custom config
pub fn analyze_snapshot_with_config(
    snapshot: &ChainSnapshot,
    config: GexConfig,
) -> GexResult<GexReport> {
    GexAnalyzer::with_config(config).analyze(snapshot)
}
