//! Pricing models
//!
//! Black-Scholes gamma is the only model needed: the scenario profile
//! re-prices every contract's gamma at each hypothetical spot level.

pub mod black_scholes;

pub use black_scholes::*;
