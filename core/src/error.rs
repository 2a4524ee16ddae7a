//! Error taxonomy for the food-log API client.
//!
//! # Design
//! The variants are closed and ordered by where in a call they are detected:
//! before sending, during transport, on receiving, on status inspection, on
//! decoding, and while serializing input. Every client operation surfaces
//! exactly one of them.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The URL or its parameters could not be constructed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request never completed (DNS, TLS, connection reset, timeout).
    #[error("network error: {0}")]
    TransportFailure(String),

    /// Something came back, but not a well-formed HTTP response.
    #[error("invalid response from server: {0}")]
    InvalidResponse(String),

    /// The server answered with a status other than 200.
    #[error("{message}")]
    ServerError { status: u16, message: String },

    /// Status 200, but the body does not match the expected shape.
    #[error("data decoding error: {0}")]
    DecodingFailure(String),

    /// Input could not be serialized before sending.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl ApiError {
    /// HTTP status carried by a `ServerError`.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::ServerError { status, .. } => Some(*status),
            _ => None,
        }
    }
}
