//! Error types for the GEX engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GexError {
    /// Call/put legs could not be paired one-to-one by (expiration, strike)
    #[error("Put/call merge failed, options are mismatched: {0}")]
    InputMismatch(String),

    /// No strikes survived the ±width filter around spot
    #[error("No data in window: spot {spot:.2} ± {width:.2}")]
    EmptyWindow { spot: f64, width: f64 },

    #[error("Data error: {0}")]
    Data(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type GexResult<T> = Result<T, GexError>;

impl GexError {
    pub fn input_mismatch(msg: impl Into<String>) -> Self {
        Self::InputMismatch(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// True for the explicit "nothing in the window" outcome
    pub fn is_empty_window(&self) -> bool {
        matches!(self, Self::EmptyWindow { .. })
    }
}
