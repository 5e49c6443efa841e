use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Countdown retry policy.
///
/// The delay before the next attempt is `remaining * step_delay_ms`, taken
/// before the counter is decremented, so waits shrink as attempts are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub step_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            step_delay_ms: 4000,
        }
    }
}

impl RetryConfig {
    pub fn new(max_attempts: u32, step_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            step_delay_ms,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Directory for the rolling log files
    pub dir: String,
    /// File name prefix inside `dir`
    pub file_prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
            file_prefix: "app".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub rpc_endpoint: String,
}

impl ChainConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rpc_endpoint.starts_with("http://") || self.rpc_endpoint.starts_with("https://"))
        {
            return Err(ConfigError::InvalidRpcUrl {
                url: self.rpc_endpoint.clone(),
            });
        }
        Ok(())
    }
}
