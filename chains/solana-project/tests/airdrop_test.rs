use core_logic::{FundingError, NetworkError, RetryConfig};
use solana_project::ledger::{AirdropOutcome, LedgerError, MemoryLedger};
use solana_project::{request_funding, AirdropConfig, Ledger};
use solana_sdk::{
    commitment_config::CommitmentConfig, native_token::LAMPORTS_PER_SOL, pubkey::Pubkey,
};
use tokio::time::Instant;

fn rate_limited() -> AirdropOutcome {
    AirdropOutcome::Reject(
        NetworkError::RateLimited {
            endpoint: "https://api.devnet.solana.com".to_string(),
            reason: "429 Too Many Requests".to_string(),
        }
        .into(),
    )
}

fn gaps_ms(times: &[Instant]) -> Vec<u128> {
    times
        .windows(2)
        .map(|w| (w[1] - w[0]).as_millis())
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_always_rate_limited_gives_up_after_five_attempts() {
    let ledger = MemoryLedger::new().with_airdrop_fallback(rate_limited());
    let target = Pubkey::new_unique();

    let result = request_funding(&ledger, &target, &AirdropConfig::default()).await;

    assert_eq!(result, Err(FundingError::MaxRetries { attempts: 5 }));
    assert_eq!(ledger.airdrop_calls().await, 5);
    assert_eq!(ledger.confirm_calls().await, 0);
    assert_eq!(ledger.lamports(&target).await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_first_try_success_confirms_once_without_delay() {
    let ledger = MemoryLedger::new();
    let target = Pubkey::new_unique();
    let start = Instant::now();

    let signature = request_funding(&ledger, &target, &AirdropConfig::default())
        .await
        .unwrap();

    assert_eq!(ledger.airdrop_calls().await, 1);
    assert_eq!(ledger.confirm_calls().await, 1);
    assert_eq!(start.elapsed().as_millis(), 0);
    assert_eq!(ledger.lamports(&target).await, LAMPORTS_PER_SOL);

    // the returned signature is the one the ledger confirmed
    assert!(ledger
        .confirm(&signature, CommitmentConfig::confirmed())
        .await
        .is_ok());
}

#[tokio::test(start_paused = true)]
async fn test_non_rate_limit_error_is_not_retried() {
    let ledger = MemoryLedger::new().with_airdrop_fallback(AirdropOutcome::Reject(
        NetworkError::Rpc {
            endpoint: "https://api.devnet.solana.com".to_string(),
            reason: "Invalid param: WrongSize".to_string(),
        }
        .into(),
    ));
    let start = Instant::now();

    let result = request_funding(&ledger, &Pubkey::new_unique(), &AirdropConfig::default()).await;

    assert_eq!(result, Err(FundingError::Rejected));
    assert_eq!(result.unwrap_err().to_string(), "Airdrop request failed.");
    assert_eq!(ledger.airdrop_calls().await, 1);
    assert_eq!(start.elapsed().as_millis(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_confirmation_failure_is_not_retried() {
    let ledger = MemoryLedger::with_airdrop_script([AirdropOutcome::FailConfirm(
        LedgerError::Instruction("blockhash not found".to_string()),
    )]);

    let result = request_funding(&ledger, &Pubkey::new_unique(), &AirdropConfig::default()).await;

    assert_eq!(result, Err(FundingError::Rejected));
    assert_eq!(ledger.airdrop_calls().await, 1);
    assert_eq!(ledger.confirm_calls().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_backoff_decreases_linearly() {
    let ledger = MemoryLedger::new().with_airdrop_fallback(rate_limited());
    let start = Instant::now();

    let _ = request_funding(&ledger, &Pubkey::new_unique(), &AirdropConfig::default()).await;

    let times = ledger.airdrop_times().await;
    assert_eq!(times.len(), 5);

    // wait after each attempt: gaps between attempts, then the trailing wait
    let mut waits = gaps_ms(&times);
    waits.push((start.elapsed() - (times[4] - start)).as_millis());

    assert_eq!(waits, vec![20_000, 16_000, 12_000, 8_000, 4_000]);
    assert_eq!(&waits[1..], &[16_000, 12_000, 8_000, 4_000]);
}

#[tokio::test(start_paused = true)]
async fn test_recovers_after_rate_limits() {
    let ledger = MemoryLedger::with_airdrop_script([rate_limited(), rate_limited()]);
    let target = Pubkey::new_unique();
    let start = Instant::now();

    let result = request_funding(&ledger, &target, &AirdropConfig::default()).await;

    assert!(result.is_ok());
    assert_eq!(ledger.airdrop_calls().await, 3);
    assert_eq!(gaps_ms(&ledger.airdrop_times().await), vec![20_000, 16_000]);
    assert_eq!(start.elapsed().as_millis(), 36_000);
    assert_eq!(ledger.lamports(&target).await, LAMPORTS_PER_SOL);
}

#[tokio::test(start_paused = true)]
async fn test_custom_attempts_and_step() {
    let ledger = MemoryLedger::new().with_airdrop_fallback(rate_limited());
    let config = AirdropConfig {
        lamports: 1,
        retry: RetryConfig::new(3, 100),
    };
    let start = Instant::now();

    let result = request_funding(&ledger, &Pubkey::new_unique(), &config).await;

    assert_eq!(result, Err(FundingError::MaxRetries { attempts: 3 }));
    assert_eq!(gaps_ms(&ledger.airdrop_times().await), vec![300, 200]);
    assert_eq!(start.elapsed().as_millis(), 600);
}
