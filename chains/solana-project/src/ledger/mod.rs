//! Ledger collaborator: the token and faucet operations the flow consumes.
//!
//! Two implementations live here. [`RpcLedger`] talks to a real cluster via
//! `solana-client`; [`MemoryLedger`] keeps balances in process for offline
//! runs and tests.

use async_trait::async_trait;
use core_logic::NetworkError;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
};
use thiserror::Error;

pub mod memory;
pub mod rpc;

pub use memory::{AirdropOutcome, MemoryLedger};
pub use rpc::RpcLedger;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error("Transaction {signature} not confirmed at {commitment} commitment")]
    Unconfirmed {
        signature: Signature,
        commitment: String,
    },

    #[error("Account {0} not found")]
    AccountNotFound(Pubkey),

    #[error("Payer {0} has no lamports to cover rent")]
    Unfunded(Pubkey),

    #[error("{signer} is not the authority of {account}")]
    InvalidAuthority { account: Pubkey, signer: Pubkey },

    #[error("Token account {account} does not belong to mint {mint}")]
    MintMismatch { account: Pubkey, mint: Pubkey },

    #[error("Insufficient funds in {account}: balance {balance}, requested {amount}")]
    InsufficientFunds {
        account: Pubkey,
        balance: u64,
        amount: u64,
    },

    #[error("Amount overflow on {0}")]
    Overflow(Pubkey),

    #[error("Instruction build failed: {0}")]
    Instruction(String),
}

impl LedgerError {
    /// Faucet rejections that are worth waiting out.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LedgerError::Network(e) if e.is_rate_limited())
    }
}

/// Operations the token flow needs from a cluster.
///
/// Signing, transaction encoding and submission all happen behind this
/// trait; callers only pass keys and amounts and get handles back.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Ask the faucet to credit `to` with `lamports`.
    async fn request_airdrop(&self, to: &Pubkey, lamports: u64) -> Result<Signature, LedgerError>;

    /// Wait for `signature` to reach `commitment`.
    async fn confirm(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<(), LedgerError>;

    /// Create a new mint paid for by `payer` and return its address.
    async fn create_mint(
        &self,
        payer: &Keypair,
        mint_authority: &Pubkey,
        freeze_authority: Option<&Pubkey>,
        decimals: u8,
    ) -> Result<Pubkey, LedgerError>;

    /// Return the associated token account of `owner` for `mint`, creating
    /// it first when it does not exist yet.
    async fn get_or_create_holding_account(
        &self,
        payer: &Keypair,
        mint: &Pubkey,
        owner: &Pubkey,
    ) -> Result<Pubkey, LedgerError>;

    async fn mint_to(
        &self,
        payer: &Keypair,
        mint: &Pubkey,
        destination: &Pubkey,
        authority: &Keypair,
        amount: u64,
    ) -> Result<Signature, LedgerError>;

    async fn transfer(
        &self,
        payer: &Keypair,
        source: &Pubkey,
        destination: &Pubkey,
        authority: &Keypair,
        amount: u64,
    ) -> Result<Signature, LedgerError>;

    /// Raw token amount held by a token account.
    async fn token_balance(&self, account: &Pubkey) -> Result<u64, LedgerError>;
}
