//! # Core Error Types
//!
//! Centralized error definitions for the core-logic crate.
//! All errors implement `std::error::Error` and `std::fmt::Display`.

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid RPC URL format: '{url}'")]
    InvalidRpcUrl { url: String },

    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to load configuration from '{path}': {msg}")]
    LoadFailed { path: String, msg: String },
}

/// Network and RPC-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Rate limited by {endpoint}: {reason}")]
    RateLimited { endpoint: String, reason: String },

    #[error("RPC request timeout to {endpoint}")]
    Timeout { endpoint: String },

    #[error("HTTP error {status_code} from {endpoint}")]
    HttpError { status_code: u16, endpoint: String },

    #[error("RPC error from {endpoint}: {reason}")]
    Rpc { endpoint: String, reason: String },
}

impl NetworkError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, NetworkError::RateLimited { .. })
    }
}

/// Faucet funding errors.
///
/// `Rejected` deliberately carries no payload: the underlying failure is
/// logged where it happens and not forwarded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FundingError {
    #[error("Airdrop request failed.")]
    Rejected,

    #[error("Max retries reached. Airdrop request failed.")]
    MaxRetries { attempts: u32 },
}
