//! # GEX Engine - Dealer Gamma Exposure
//!
//! Estimates the gamma exposure (GEX) that option dealers carry on an index
//! option chain, and the spot levels where their hedging flips direction.
//!
//! ## Overview
//!
//! Dealers are assumed long calls and short puts against customers. Their
//! aggregate gamma then decides whether hedging dampens moves (positive
//! gamma, above the flip) or amplifies them (negative gamma, below).
//!
//! ## Key Components
//!
//! - **Data Fetching**: CBOE delayed quotes, with an on-disk snapshot cache
//! - **Black-Scholes**: Gamma re-priced at hypothetical spot levels
//! - **Strike Aggregation**: Call/put/net GEX per strike at the actual spot
//! - **Scenario Profile**: Total gamma across spot levels, with the nearest
//!   and the nearest monthly expiration removed
//! - **Gamma Flip**: Interpolated zero crossing of the profile
//! - **Windowed Analysis**: Max/min GEX zone and high open interest near spot
//!
//! ## Usage
//!
//! ```rust,no_run
//! use gex_engine::prelude::*;
//!
//! // Fetch the SPX chain from CBOE
//! let snapshot = fetch_spx_chain().unwrap();
//!
//! // Run the full pipeline
//! let report = analyze_snapshot(&snapshot).unwrap();
//!
//! println!("Total gamma: ${:.2} Bn per 1% move", report.total_gamma_bn());
//! if let Some(flip) = report.zero_gamma {
//!     println!("Gamma flip: {:.0}", flip);
//! }
//! ```
//!
//! ## What This Does NOT Do
//!
//! - Know actual dealer positioning (the long-call/short-put split is assumed)
//! - Produce charts or trading signals
//! - Stream intraday updates

pub mod core;
pub mod data;
pub mod gex;
pub mod models;

/// Prelude with commonly used types
pub mod prelude {
    // Core types
    pub use crate::core::{
        business_days_between, is_third_friday, pair_contracts, parse_option_symbol,
        years_to_expiry, ChainSnapshot, GexError, GexResult, OptionContract, OptionType,
        ParsedSymbol, StrikePair, TRADING_DAYS_PER_YEAR,
    };

    // Data fetching
    pub use crate::data::{
        fetch_spx_chain, parse_chain_response, CacheConfig, CachedFetcher, CboeClient,
        SnapshotCache,
    };

    // Models
    pub use crate::models::{gamma as bs_gamma, gamma_exposure, norm_pdf, CONTRACT_MULTIPLIER};

    // GEX pipeline
    pub use crate::gex::{
        aggregate_by_strike,
        aggregate_snapshot,
        analyze_snapshot,
        analyze_snapshot_with_config,
        analyze_window,
        gamma_profile,
        zero_gamma_level,
        GammaProfile,
        GammaProfilePoint,
        GammaZone,
        // Facade
        GexAnalyzer,
        // Config
        GexConfig,
        GexReport,
        PerStrikeAggregate,
        ProfileConfig,
        ScenarioProfiler,
        StrikeTable,
        WindowAnalysis,
        WindowAnalyzer,
        WindowConfig,
        ZoneStatus,
    };
}

// Re-export main types at crate root
pub use crate::core::{GexError, GexResult};
pub use crate::gex::{GexAnalyzer, GexConfig, GexReport};
