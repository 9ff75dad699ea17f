//! Common error types for the armory engine

use thiserror::Error;

/// Common result type for armory engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the engine.
///
/// The pure matching/filtering functions never return these; validation
/// problems there are structured result values. Errors are reserved for
/// precondition violations on allocation planning and for bad configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// Requested quantity is zero or negative
    #[error("Invalid quantity: {0} (must be positive)")]
    InvalidQuantity(i64),

    /// Requested quantity exceeds what the source records hold
    #[error("Insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    /// Transfer source and destination are the same division
    #[error("Source and destination division are both '{0}'")]
    SameDivision(String),

    /// Invalid engine configuration (empty rule table, blank family name, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
