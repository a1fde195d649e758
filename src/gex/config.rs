//! Configuration for the GEX pipeline

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{GexError, GexResult, TRADING_DAYS_PER_YEAR};

/// Configuration for a full analysis run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GexConfig {
    /// Scenario profile sweep
    pub profile: ProfileConfig,
    /// Windowed net-GEX analysis
    pub window: WindowConfig,
}

impl GexConfig {
    /// Tight band around spot, suited to intraday 0DTE reads
    pub fn narrow() -> Self {
        Self {
            window: WindowConfig {
                width: 75.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    /// Wide band and a denser profile sweep
    pub fn wide() -> Self {
        Self {
            profile: ProfileConfig {
                levels: 60,
                ..Default::default()
            },
            window: WindowConfig {
                width: 300.0,
                ..Default::default()
            },
        }
    }

    /// Same config with a different window half-width
    pub fn with_width(mut self, width: f64) -> Self {
        self.window.width = width;
        self
    }

    /// Load from a JSON file; absent keys keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> GexResult<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let config: GexConfig =
            serde_json::from_str(&json).map_err(|e| GexError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> GexResult<()> {
        self.profile.validate()?;
        self.window.validate()
    }
}

/// Scenario profile configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Number of evenly spaced spot levels (inclusive of both ends)
    /// Default: 30
    pub levels: usize,

    /// Lowest level as a fraction of spot
    /// Default: 0.8
    pub lower_factor: f64,

    /// Highest level as a fraction of spot
    /// Default: 1.2
    pub upper_factor: f64,

    /// Business days per year for time-to-expiry
    /// Default: 262
    pub trading_days_per_year: f64,

    /// Default: 0.0
    pub risk_free_rate: f64,

    /// Default: 0.0
    pub dividend_yield: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            levels: 30,
            lower_factor: 0.8,
            upper_factor: 1.2,
            trading_days_per_year: TRADING_DAYS_PER_YEAR,
            risk_free_rate: 0.0,
            dividend_yield: 0.0,
        }
    }
}

impl ProfileConfig {
    pub fn validate(&self) -> GexResult<()> {
        if self.levels < 2 {
            return Err(GexError::invalid_input("Profile needs at least 2 levels"));
        }
        if !(self.lower_factor > 0.0 && self.lower_factor < self.upper_factor) {
            return Err(GexError::invalid_input(format!(
                "Profile range [{}, {}] is empty",
                self.lower_factor, self.upper_factor
            )));
        }
        if !(self.trading_days_per_year > 0.0) {
            return Err(GexError::invalid_input("trading_days_per_year must be positive"));
        }
        Ok(())
    }
}

/// Windowed analysis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Half-width of the strike band around spot, in index points
    /// Default: 150
    pub width: f64,

    /// Percentile of total open interest marking high-OI strikes
    /// Default: 75
    pub oi_percentile: f64,

    /// Percentile, within the high-OI subset, marking high-conviction peaks
    /// Default: 90
    pub high_conviction_percentile: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 150.0,
            oi_percentile: 75.0,
            high_conviction_percentile: 90.0,
        }
    }
}

impl WindowConfig {
    pub fn validate(&self) -> GexResult<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err(GexError::invalid_input(format!(
                "Window width must be positive, got {}",
                self.width
            )));
        }
        for p in [self.oi_percentile, self.high_conviction_percentile] {
            if !(0.0..=100.0).contains(&p) {
                return Err(GexError::invalid_input(format!(
                    "Percentile {p} outside [0, 100]"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = GexConfig::default();
        assert_eq!(config.profile.levels, 30);
        assert_eq!(config.profile.trading_days_per_year, 262.0);
        assert_eq!(config.window.width, 150.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets_valid() {
        assert!(GexConfig::narrow().validate().is_ok());
        assert!(GexConfig::wide().validate().is_ok());
        assert!(GexConfig::narrow().window.width < GexConfig::wide().window.width);
    }

    #[test]
    fn test_invalid_width() {
        assert!(GexConfig::default().with_width(0.0).validate().is_err());
        assert!(GexConfig::default().with_width(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "window": {{ "width": 200 }} }}"#).unwrap();

        let config = GexConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.window.width, 200.0);
        assert_eq!(config.window.oi_percentile, 75.0);
        assert_eq!(config.profile.levels, 30);
    }
}
