use core_logic::config::{ChainConfig, LogConfig, RetryConfig};
use core_logic::{ConfigError, FundingError, NetworkError};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_config_defaults() {
        let config = RetryConfig::default();

        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.step_delay_ms, 4000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_config_partial_toml() {
        let config: RetryConfig = toml::from_str("max_attempts = 2").unwrap();

        assert_eq!(config.max_attempts, 2);
        assert_eq!(config.step_delay_ms, 4000);
    }

    #[test]
    fn test_retry_config_rejects_zero_attempts() {
        let err = RetryConfig::new(0, 4000).validate().unwrap_err();

        match err {
            ConfigError::InvalidValue { field, .. } => assert_eq!(field, "max_attempts"),
            other => panic!("Expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_log_config_defaults() {
        let config = LogConfig::default();

        assert_eq!(config.dir, "logs");
        assert_eq!(config.file_prefix, "app");
    }

    #[test]
    fn test_chain_config_url_validation() {
        let devnet = ChainConfig {
            rpc_endpoint: "https://api.devnet.solana.com".to_string(),
        };
        assert!(devnet.validate().is_ok());

        let bad = ChainConfig {
            rpc_endpoint: "api.devnet.solana.com".to_string(),
        };
        assert_eq!(
            bad.validate(),
            Err(ConfigError::InvalidRpcUrl {
                url: "api.devnet.solana.com".to_string()
            })
        );
    }

    #[test]
    fn test_funding_error_messages() {
        assert_eq!(FundingError::Rejected.to_string(), "Airdrop request failed.");
        assert!(FundingError::MaxRetries { attempts: 5 }
            .to_string()
            .starts_with("Max retries reached."));
    }

    #[test]
    fn test_rate_limited_network_error() {
        let err = NetworkError::RateLimited {
            endpoint: "https://api.devnet.solana.com".to_string(),
            reason: "429 Too Many Requests".to_string(),
        };

        assert!(err.is_rate_limited());
        assert!(err.to_string().starts_with("Rate limited by"));
        assert!(!NetworkError::Timeout {
            endpoint: "https://api.devnet.solana.com".to_string(),
        }
        .is_rate_limited());
    }
}
