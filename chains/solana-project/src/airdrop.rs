//! Devnet faucet funding with countdown backoff.

use crate::ledger::{Ledger, LedgerError};
use core_logic::{with_countdown_retry, FundingError, RetryConfig, RetryError, RESULT_TARGET};
use serde::{Deserialize, Serialize};
use solana_sdk::{
    commitment_config::CommitmentConfig, native_token::LAMPORTS_PER_SOL, pubkey::Pubkey,
    signature::Signature,
};
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirdropConfig {
    pub lamports: u64,
    #[serde(flatten)]
    pub retry: RetryConfig,
}

impl Default for AirdropConfig {
    fn default() -> Self {
        Self {
            lamports: LAMPORTS_PER_SOL,
            retry: RetryConfig::default(),
        }
    }
}

/// Request faucet funds for `pubkey` and wait for `confirmed` commitment.
///
/// Rate-limited attempts are retried with the countdown schedule of
/// `config.retry`; any other failure aborts after a single attempt.
pub async fn request_funding<L>(
    ledger: &L,
    pubkey: &Pubkey,
    config: &AirdropConfig,
) -> Result<Signature, FundingError>
where
    L: Ledger + ?Sized,
{
    let result = with_countdown_retry(
        &config.retry,
        "airdrop request",
        || async {
            let signature = ledger.request_airdrop(pubkey, config.lamports).await?;
            ledger
                .confirm(&signature, CommitmentConfig::confirmed())
                .await?;
            Ok::<_, LedgerError>(signature)
        },
        LedgerError::is_rate_limited,
    )
    .await;

    match result {
        Ok(signature) => {
            info!(target: RESULT_TARGET, "Success [airdrop] {}", signature);
            Ok(signature)
        }
        Err(RetryError::Aborted(e)) => {
            error!("Airdrop for {} rejected: {}", pubkey, e);
            Err(FundingError::Rejected)
        }
        Err(RetryError::Exhausted { attempts, .. }) => Err(FundingError::MaxRetries { attempts }),
    }
}
