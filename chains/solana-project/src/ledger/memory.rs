//! In-process ledger.
//!
//! Applies the same checks the token program runs for mint-to and transfer
//! (authority, mint match, balance) and charges rent and fees in lamports so
//! an unfunded payer fails the way it would on a cluster.

use super::{Ledger, LedgerError};
use async_trait::async_trait;
use solana_sdk::{
    commitment_config::CommitmentConfig,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use spl_associated_token_account::get_associated_token_address;
use std::collections::{HashMap, HashSet, VecDeque};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

pub const SIGNATURE_FEE: u64 = 5_000;
pub const MINT_RENT: u64 = 1_461_600;
pub const TOKEN_ACCOUNT_RENT: u64 = 2_039_280;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MintState {
    pub mint_authority: Pubkey,
    pub freeze_authority: Option<Pubkey>,
    pub decimals: u8,
    pub supply: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenAccountState {
    pub mint: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
}

/// What the fake faucet does on one `request_airdrop` call.
#[derive(Debug, Clone)]
pub enum AirdropOutcome {
    /// Credit the account and confirm the signature.
    Succeed,
    /// Fail the request itself.
    Reject(LedgerError),
    /// Hand out a signature whose confirmation fails.
    FailConfirm(LedgerError),
}

#[derive(Debug, Default)]
struct State {
    lamports: HashMap<Pubkey, u64>,
    confirmed: HashSet<Signature>,
    failing_confirms: HashMap<Signature, LedgerError>,
    mints: HashMap<Pubkey, MintState>,
    token_accounts: HashMap<Pubkey, TokenAccountState>,
    airdrop_script: VecDeque<AirdropOutcome>,
    airdrop_fallback: Option<AirdropOutcome>,
    airdrop_times: Vec<Instant>,
    confirm_calls: usize,
}

impl State {
    fn charge(&mut self, payer: &Pubkey, lamports: u64) -> Result<(), LedgerError> {
        let balance = self.lamports.entry(*payer).or_default();
        if *balance < lamports {
            return Err(LedgerError::Unfunded(*payer));
        }
        *balance -= lamports;
        Ok(())
    }

    fn settle(&mut self) -> Signature {
        let signature = Signature::new_unique();
        self.confirmed.insert(signature);
        signature
    }
}

#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<State>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue airdrop outcomes, consumed one per `request_airdrop` call.
    /// Once the queue is empty airdrops succeed unless a fallback is set.
    pub fn with_airdrop_script(outcomes: impl IntoIterator<Item = AirdropOutcome>) -> Self {
        let state = State {
            airdrop_script: outcomes.into_iter().collect(),
            ..State::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Outcome used for every airdrop after the script runs out.
    pub fn with_airdrop_fallback(self, outcome: AirdropOutcome) -> Self {
        let mut state = self.state.into_inner();
        state.airdrop_fallback = Some(outcome);
        Self {
            state: Mutex::new(state),
        }
    }

    pub async fn airdrop_calls(&self) -> usize {
        self.state.lock().await.airdrop_times.len()
    }

    /// When each airdrop request arrived, on the tokio clock.
    pub async fn airdrop_times(&self) -> Vec<Instant> {
        self.state.lock().await.airdrop_times.clone()
    }

    pub async fn confirm_calls(&self) -> usize {
        self.state.lock().await.confirm_calls
    }

    pub async fn lamports(&self, account: &Pubkey) -> u64 {
        self.state
            .lock()
            .await
            .lamports
            .get(account)
            .copied()
            .unwrap_or(0)
    }

    pub async fn mint(&self, mint: &Pubkey) -> Option<MintState> {
        self.state.lock().await.mints.get(mint).copied()
    }

    pub async fn token_account(&self, account: &Pubkey) -> Option<TokenAccountState> {
        self.state.lock().await.token_accounts.get(account).copied()
    }

    pub async fn token_account_count(&self) -> usize {
        self.state.lock().await.token_accounts.len()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn request_airdrop(&self, to: &Pubkey, lamports: u64) -> Result<Signature, LedgerError> {
        let mut state = self.state.lock().await;
        state.airdrop_times.push(Instant::now());

        let outcome = match state.airdrop_script.pop_front() {
            Some(outcome) => outcome,
            None => state
                .airdrop_fallback
                .clone()
                .unwrap_or(AirdropOutcome::Succeed),
        };

        match outcome {
            AirdropOutcome::Succeed => {
                *state.lamports.entry(*to).or_default() += lamports;
                Ok(state.settle())
            }
            AirdropOutcome::Reject(e) => Err(e),
            AirdropOutcome::FailConfirm(e) => {
                let signature = Signature::new_unique();
                state.failing_confirms.insert(signature, e);
                Ok(signature)
            }
        }
    }

    async fn confirm(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.lock().await;
        state.confirm_calls += 1;

        if let Some(e) = state.failing_confirms.get(signature) {
            return Err(e.clone());
        }
        if state.confirmed.contains(signature) {
            return Ok(());
        }
        Err(LedgerError::Unconfirmed {
            signature: *signature,
            commitment: format!("{:?}", commitment.commitment),
        })
    }

    async fn create_mint(
        &self,
        payer: &Keypair,
        mint_authority: &Pubkey,
        freeze_authority: Option<&Pubkey>,
        decimals: u8,
    ) -> Result<Pubkey, LedgerError> {
        let mut state = self.state.lock().await;
        state.charge(&payer.pubkey(), MINT_RENT + 2 * SIGNATURE_FEE)?;

        let mint = Pubkey::new_unique();
        state.mints.insert(
            mint,
            MintState {
                mint_authority: *mint_authority,
                freeze_authority: freeze_authority.copied(),
                decimals,
                supply: 0,
            },
        );
        let signature = state.settle();
        debug!("Created mint {} in {}", mint, signature);
        Ok(mint)
    }

    async fn get_or_create_holding_account(
        &self,
        payer: &Keypair,
        mint: &Pubkey,
        owner: &Pubkey,
    ) -> Result<Pubkey, LedgerError> {
        let mut state = self.state.lock().await;
        if !state.mints.contains_key(mint) {
            return Err(LedgerError::AccountNotFound(*mint));
        }

        let address = get_associated_token_address(owner, mint);
        if state.token_accounts.contains_key(&address) {
            return Ok(address);
        }

        state.charge(&payer.pubkey(), TOKEN_ACCOUNT_RENT + SIGNATURE_FEE)?;
        state.token_accounts.insert(
            address,
            TokenAccountState {
                mint: *mint,
                owner: *owner,
                amount: 0,
            },
        );
        state.settle();
        Ok(address)
    }

    async fn mint_to(
        &self,
        payer: &Keypair,
        mint: &Pubkey,
        destination: &Pubkey,
        authority: &Keypair,
        amount: u64,
    ) -> Result<Signature, LedgerError> {
        let mut state = self.state.lock().await;

        let mint_state = *state
            .mints
            .get(mint)
            .ok_or(LedgerError::AccountNotFound(*mint))?;
        if mint_state.mint_authority != authority.pubkey() {
            return Err(LedgerError::InvalidAuthority {
                account: *mint,
                signer: authority.pubkey(),
            });
        }

        let dest = *state
            .token_accounts
            .get(destination)
            .ok_or(LedgerError::AccountNotFound(*destination))?;
        if dest.mint != *mint {
            return Err(LedgerError::MintMismatch {
                account: *destination,
                mint: *mint,
            });
        }

        let supply = mint_state
            .supply
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(*mint))?;
        let balance = dest
            .amount
            .checked_add(amount)
            .ok_or(LedgerError::Overflow(*destination))?;

        state.charge(&payer.pubkey(), SIGNATURE_FEE)?;
        if let Some(m) = state.mints.get_mut(mint) {
            m.supply = supply;
        }
        if let Some(a) = state.token_accounts.get_mut(destination) {
            a.amount = balance;
        }
        Ok(state.settle())
    }

    async fn transfer(
        &self,
        payer: &Keypair,
        source: &Pubkey,
        destination: &Pubkey,
        authority: &Keypair,
        amount: u64,
    ) -> Result<Signature, LedgerError> {
        let mut state = self.state.lock().await;

        let src = *state
            .token_accounts
            .get(source)
            .ok_or(LedgerError::AccountNotFound(*source))?;
        let dest = *state
            .token_accounts
            .get(destination)
            .ok_or(LedgerError::AccountNotFound(*destination))?;

        if src.owner != authority.pubkey() {
            return Err(LedgerError::InvalidAuthority {
                account: *source,
                signer: authority.pubkey(),
            });
        }
        if src.mint != dest.mint {
            return Err(LedgerError::MintMismatch {
                account: *destination,
                mint: src.mint,
            });
        }
        if src.amount < amount {
            return Err(LedgerError::InsufficientFunds {
                account: *source,
                balance: src.amount,
                amount,
            });
        }

        // Self-transfer leaves balances untouched
        let credited = if source != destination {
            Some(
                dest.amount
                    .checked_add(amount)
                    .ok_or(LedgerError::Overflow(*destination))?,
            )
        } else {
            None
        };

        state.charge(&payer.pubkey(), SIGNATURE_FEE)?;
        if let Some(credited) = credited {
            if let Some(a) = state.token_accounts.get_mut(source) {
                a.amount -= amount;
            }
            if let Some(a) = state.token_accounts.get_mut(destination) {
                a.amount = credited;
            }
        }
        Ok(state.settle())
    }

    async fn token_balance(&self, account: &Pubkey) -> Result<u64, LedgerError> {
        self.state
            .lock()
            .await
            .token_accounts
            .get(account)
            .map(|a| a.amount)
            .ok_or(LedgerError::AccountNotFound(*account))
    }
}
