//! Core data types for the GEX engine
//!
//! Defines fundamental types:
//! - OptionContract: one listed contract and its vendor fields
//! - ChainSnapshot / StrikePair: a full chain and its call/put pairing
//! - Calendar: business-day counts and monthly expiration rule
//! - GexError: error taxonomy

pub mod option;
pub mod chain;
pub mod calendar;
pub mod error;

pub use option::*;
pub use chain::*;
pub use calendar::*;
pub use error::*;
