//! The token flow: fund a fresh sender, create a mint, mint into the
//! sender's token account and move everything to a fresh receiver.

use crate::airdrop::{request_funding, AirdropConfig};
use crate::ledger::{Ledger, LedgerError};
use core_logic::{FundingError, RESULT_TARGET};
use serde::{Deserialize, Serialize};
use solana_sdk::{
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenConfig {
    pub decimals: u8,
    /// Base units minted to the sender and then transferred in full
    pub amount: u64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            decimals: 9,
            amount: 1_000_000_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowConfig {
    pub airdrop: AirdropConfig,
    pub token: TokenConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    CreateMint,
    SenderAccount,
    MintTo,
    ReceiverAccount,
    Transfer,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Step::CreateMint => "create mint",
            Step::SenderAccount => "sender token account",
            Step::MintTo => "mint to",
            Step::ReceiverAccount => "receiver token account",
            Step::Transfer => "transfer",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum FlowError {
    #[error(transparent)]
    Funding(#[from] FundingError),

    #[error("{step} failed: {source}")]
    Step {
        step: Step,
        #[source]
        source: LedgerError,
    },
}

impl FlowError {
    fn at(step: Step) -> impl FnOnce(LedgerError) -> FlowError {
        move |source| FlowError::Step { step, source }
    }
}

/// Everything a finished run produced, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowReport {
    pub sender: Pubkey,
    pub receiver: Pubkey,
    pub mint: Pubkey,
    pub sender_account: Pubkey,
    pub receiver_account: Pubkey,
    pub airdrop_signature: Signature,
    pub mint_to_signature: Signature,
    pub transfer_signature: Signature,
}

impl FlowReport {
    /// Signatures the run reports, in order. Mint creation is not among them.
    pub fn signatures(&self) -> [Signature; 3] {
        [
            self.airdrop_signature,
            self.mint_to_signature,
            self.transfer_signature,
        ]
    }
}

/// Run the flow once against `ledger` with freshly generated keypairs.
///
/// Steps run strictly in order. Only the airdrop is retried; the first
/// failing step ends the run and nothing already created is rolled back.
pub async fn run_token_flow<L>(ledger: &L, config: &FlowConfig) -> Result<FlowReport, FlowError>
where
    L: Ledger + ?Sized,
{
    let sender = Keypair::new();
    let receiver = Keypair::new();

    info!(target: RESULT_TARGET, "Requesting airdrop for {}", sender.pubkey());
    let airdrop_signature = request_funding(ledger, &sender.pubkey(), &config.airdrop).await?;

    let mint = ledger
        .create_mint(&sender, &sender.pubkey(), None, config.token.decimals)
        .await
        .map_err(FlowError::at(Step::CreateMint))?;
    info!(target: RESULT_TARGET, "Created mint {} ({} decimals)", mint, config.token.decimals);

    let sender_account = ledger
        .get_or_create_holding_account(&sender, &mint, &sender.pubkey())
        .await
        .map_err(FlowError::at(Step::SenderAccount))?;

    let mint_to_signature = ledger
        .mint_to(
            &sender,
            &mint,
            &sender_account,
            &sender,
            config.token.amount,
        )
        .await
        .map_err(FlowError::at(Step::MintTo))?;
    info!(target: RESULT_TARGET, "Success [mint] {}", mint_to_signature);

    let receiver_account = ledger
        .get_or_create_holding_account(&sender, &mint, &receiver.pubkey())
        .await
        .map_err(FlowError::at(Step::ReceiverAccount))?;

    let transfer_signature = ledger
        .transfer(
            &sender,
            &sender_account,
            &receiver_account,
            &sender,
            config.token.amount,
        )
        .await
        .map_err(FlowError::at(Step::Transfer))?;
    info!(target: RESULT_TARGET, "Success [transfer] {}", transfer_signature);

    Ok(FlowReport {
        sender: sender.pubkey(),
        receiver: receiver.pubkey(),
        mint,
        sender_account,
        receiver_account,
        airdrop_signature,
        mint_to_signature,
        transfer_signature,
    })
}
