//! # Core Logic - Shared Utilities for Testnet Chains
//!
//! Chain-agnostic pieces used by the chain projects under `chains/`.
//!
//! ## Modules
//!
//! - [`config`] - Serde configuration structures shared by chain configs
//! - [`error`] - Typed error handling with thiserror
//! - `utils` - Logger setup and the countdown retry helper

pub mod config;
pub mod error;
pub(crate) mod utils;

pub use config::{ChainConfig, LogConfig, RetryConfig};
pub use error::{ConfigError, FundingError, NetworkError};

pub use utils::{
    is_rate_limited, setup_logger, with_countdown_retry, RetryError, RESULT_TARGET,
};
