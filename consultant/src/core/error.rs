//! Error types for the consultant.
//!
//! [`ConsultantError`] covers storage and gateway failures, the session domain errors
//! (already registered, user not found, invalid credentials) and the bot transport.

use llm_gateway::GatewayError;
use storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsultantError {
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("User already registered: {0}")]
    AlreadyRegistered(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Password hashing failed: {0}")]
    PasswordHash(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Product source error: {0}")]
    ProductSource(String),

    #[error("Bot error: {0}")]
    Bot(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for core operations; uses [`ConsultantError`].
pub type Result<T> = std::result::Result<T, ConsultantError>;
