//! Protocol error types for wire message decoding.

use thiserror::Error;

use crate::game::entities::{ParseCardError, ParseSuitError};

/// Errors raised while decoding a message whose kind was recognized.
/// These are never fatal: the receive loop logs the message and drops it.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ProtocolError {
    /// A known kind arrived with too few fields.
    #[error("{kind} is missing field {index}")]
    MissingField { kind: &'static str, index: usize },

    /// A field that must be numeric was not.
    #[error("{kind} has a non-numeric field: {value}")]
    InvalidNumber { kind: &'static str, value: String },

    /// A payload with special structure (e.g. a bracketed card list)
    /// did not have it.
    #[error("{kind} payload is malformed: {value}")]
    MalformedPayload { kind: &'static str, value: String },

    #[error(transparent)]
    Suit(#[from] ParseSuitError),

    #[error(transparent)]
    Card(#[from] ParseCardError),
}
