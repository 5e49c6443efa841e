use crate::airdrop::AirdropConfig;
use crate::flow::{FlowConfig, TokenConfig};
use anyhow::Result;
use config::{Config, Environment, File};
use core_logic::{ChainConfig, ConfigError, LogConfig};
use serde::Deserialize;
use solana_sdk::commitment_config::{CommitmentConfig, CommitmentLevel};
use std::str::FromStr;
use std::time::Duration;

pub const DEVNET_URL: &str = "https://api.devnet.solana.com";

fn default_rpc_url() -> String {
    DEVNET_URL.to_string()
}

fn default_commitment() -> String {
    "confirmed".to_string()
}

fn default_rpc_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct SolanaConfig {
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    #[serde(default = "default_commitment")]
    pub commitment: String,
    #[serde(default = "default_rpc_timeout_secs")]
    pub rpc_timeout_secs: u64,
    #[serde(default)]
    pub airdrop: AirdropConfig,
    #[serde(default)]
    pub token: TokenConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Default for SolanaConfig {
    fn default() -> Self {
        Self {
            rpc_url: default_rpc_url(),
            commitment: default_commitment(),
            rpc_timeout_secs: default_rpc_timeout_secs(),
            airdrop: AirdropConfig::default(),
            token: TokenConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// `SOLANA_` prefix, `__` between nested keys.
fn env_source() -> Environment {
    Environment::with_prefix("SOLANA")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl SolanaConfig {
    /// Load from `path` (optional) with `SOLANA_*` environment overrides,
    /// e.g. `SOLANA_RPC_URL` or `SOLANA_AIRDROP__MAX_ATTEMPTS`.
    pub fn load(path: &str) -> Result<Self> {
        Self::load_with_env(path, env_source())
    }

    fn load_with_env(path: &str, env: Environment) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(env)
            .build()?;

        let config: SolanaConfig = settings.try_deserialize().map_err(|e| {
            ConfigError::LoadFailed {
                path: path.to_string(),
                msg: e.to_string(),
            }
        })?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.chain().validate()?;
        self.airdrop.retry.validate()?;
        self.commitment_config()?;
        Ok(())
    }

    pub fn chain(&self) -> ChainConfig {
        ChainConfig {
            rpc_endpoint: self.rpc_url.clone(),
        }
    }

    pub fn commitment_config(&self) -> Result<CommitmentConfig, ConfigError> {
        let commitment =
            CommitmentLevel::from_str(&self.commitment).map_err(|_| ConfigError::InvalidValue {
                field: "commitment".to_string(),
                reason: format!("unknown commitment level '{}'", self.commitment),
            })?;
        Ok(CommitmentConfig { commitment })
    }

    pub fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_secs)
    }

    pub fn to_flow_config(&self) -> FlowConfig {
        FlowConfig {
            airdrop: self.airdrop,
            token: self.token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_missing_file_uses_devnet_defaults() {
        let config = SolanaConfig::load_with_env("does/not/exist.toml", env_vars(&[])).unwrap();

        assert_eq!(config.rpc_url, DEVNET_URL);
        assert_eq!(config.commitment_config().unwrap(), CommitmentConfig::confirmed());
        assert_eq!(config.airdrop.retry.max_attempts, 5);
        assert_eq!(config.airdrop.retry.step_delay_ms, 4000);
        assert_eq!(config.token.decimals, 9);
        assert_eq!(config.token.amount, 1_000_000_000);
    }

    #[test]
    fn test_file_overrides_sections() {
        let file = write_config(
            r#"
rpc_url = "http://127.0.0.1:8899"
commitment = "finalized"

[airdrop]
max_attempts = 2
lamports = 500

[token]
decimals = 6
"#,
        );

        let config = SolanaConfig::load(file.path().to_str().unwrap()).unwrap();

        assert_eq!(config.rpc_url, "http://127.0.0.1:8899");
        assert_eq!(config.commitment_config().unwrap(), CommitmentConfig::finalized());
        assert_eq!(config.airdrop.retry.max_attempts, 2);
        assert_eq!(config.airdrop.retry.step_delay_ms, 4000);
        assert_eq!(config.airdrop.lamports, 500);
        assert_eq!(config.token.decimals, 6);
        assert_eq!(config.token.amount, 1_000_000_000);
    }

    #[test]
    fn test_unknown_commitment_is_rejected() {
        let config = SolanaConfig {
            commitment: "eventually".to_string(),
            ..SolanaConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "commitment"
        ));
    }

    fn env_vars(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        env_source().source(Some(map))
    }

    #[test]
    fn test_env_overrides_file_and_defaults() {
        let file = write_config(
            r#"
rpc_url = "https://api.devnet.solana.com"

[airdrop]
max_attempts = 4
"#,
        );
        let env = env_vars(&[
            ("SOLANA_RPC_URL", "http://127.0.0.1:8899"),
            ("SOLANA_AIRDROP__MAX_ATTEMPTS", "2"),
            ("SOLANA_TOKEN__DECIMALS", "6"),
        ]);

        let config = SolanaConfig::load_with_env(file.path().to_str().unwrap(), env).unwrap();

        assert_eq!(config.rpc_url, "http://127.0.0.1:8899");
        assert_eq!(config.airdrop.retry.max_attempts, 2);
        assert_eq!(config.airdrop.retry.step_delay_ms, 4000);
        assert_eq!(config.token.decimals, 6);
    }

    #[test]
    fn test_env_without_prefix_is_ignored() {
        let env = env_vars(&[
            ("RPC_URL", "http://127.0.0.1:8899"),
            ("SOLANA__RPC_URL", "http://127.0.0.1:9999"),
        ]);

        let config = SolanaConfig::load_with_env("does/not/exist.toml", env).unwrap();

        assert_eq!(config.rpc_url, DEVNET_URL);
    }

    #[test]
    fn test_bad_rpc_url_is_rejected() {
        let file = write_config(r#"rpc_url = "devnet""#);

        assert!(SolanaConfig::load(file.path().to_str().unwrap()).is_err());
    }
}
