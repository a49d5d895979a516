//! Gateway error types: one variant per failure class of a completion call.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Connection, DNS, TLS or request-building failure.
    #[error("LLM request failed: {0}")]
    Transport(String),
    #[error("LLM request timed out after {0}s")]
    Timeout(u64),
    /// Provider answered with a non-success status.
    #[error("LLM provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to decode LLM response: {0}")]
    Malformed(String),
    #[error("No response from AI")]
    EmptyChoices,
    #[error("LLM gateway configuration error: {0}")]
    Config(String),
}
