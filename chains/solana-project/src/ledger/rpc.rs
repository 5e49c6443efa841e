use super::{Ledger, LedgerError};
use async_trait::async_trait;
use core_logic::{is_rate_limited, NetworkError};
use solana_client::{
    client_error::{ClientError, ClientErrorKind},
    nonblocking::rpc_client::RpcClient,
};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    program_pack::Pack,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
    system_instruction,
    transaction::Transaction,
};
use spl_associated_token_account::{
    get_associated_token_address, instruction::create_associated_token_account_idempotent,
};
use std::time::Duration;
use tracing::debug;

/// Ledger backed by a JSON-RPC node.
pub struct RpcLedger {
    client: RpcClient,
    endpoint: String,
}

impl RpcLedger {
    /// Connect to `rpc_url`. Every call is bounded by `timeout`; `commitment`
    /// applies to reads and to `send_and_confirm_transaction`.
    pub fn connect(rpc_url: &str, commitment: CommitmentConfig, timeout: Duration) -> Self {
        let client =
            RpcClient::new_with_timeout_and_commitment(rpc_url.to_string(), timeout, commitment);

        Self {
            client,
            endpoint: rpc_url.to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn classify(&self, err: ClientError) -> LedgerError {
        classify_client_error(&self.endpoint, err)
    }

    async fn send(
        &self,
        instructions: &[Instruction],
        payer: &Keypair,
        signers: &[&Keypair],
    ) -> Result<Signature, LedgerError> {
        let blockhash = self
            .client
            .get_latest_blockhash()
            .await
            .map_err(|e| self.classify(e))?;

        // payer and authority are often the same keypair
        let mut unique: Vec<&Keypair> = Vec::with_capacity(signers.len());
        for &signer in signers {
            if !unique.iter().any(|s| s.pubkey() == signer.pubkey()) {
                unique.push(signer);
            }
        }

        let tx = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer.pubkey()),
            unique.as_slice(),
            blockhash,
        );

        self.client
            .send_and_confirm_transaction(&tx)
            .await
            .map_err(|e| self.classify(e))
    }
}

/// Map a client error onto the typed ledger error.
///
/// A 429 status from the HTTP layer and any message the shared
/// [`is_rate_limited`] check accepts both become `RateLimited`.
pub fn classify_client_error(endpoint: &str, err: ClientError) -> LedgerError {
    let reason = err.to_string();

    let too_many_requests = matches!(
        err.kind(),
        ClientErrorKind::Reqwest(e) if e.status() == Some(reqwest::StatusCode::TOO_MANY_REQUESTS)
    );
    if too_many_requests || is_rate_limited(&reason) {
        return NetworkError::RateLimited {
            endpoint: endpoint.to_string(),
            reason,
        }
        .into();
    }

    match err.kind() {
        ClientErrorKind::Reqwest(e) if e.is_timeout() => NetworkError::Timeout {
            endpoint: endpoint.to_string(),
        }
        .into(),
        ClientErrorKind::Reqwest(e) if e.status().is_some() => NetworkError::HttpError {
            status_code: e.status().map(|s| s.as_u16()).unwrap_or_default(),
            endpoint: endpoint.to_string(),
        }
        .into(),
        _ => NetworkError::Rpc {
            endpoint: endpoint.to_string(),
            reason,
        }
        .into(),
    }
}

#[async_trait]
impl Ledger for RpcLedger {
    async fn request_airdrop(&self, to: &Pubkey, lamports: u64) -> Result<Signature, LedgerError> {
        self.client
            .request_airdrop(to, lamports)
            .await
            .map_err(|e| self.classify(e))
    }

    async fn confirm(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<(), LedgerError> {
        self.client
            .poll_for_signature_with_commitment(signature, commitment)
            .await
            .map_err(|e| self.classify(e))
    }

    async fn create_mint(
        &self,
        payer: &Keypair,
        mint_authority: &Pubkey,
        freeze_authority: Option<&Pubkey>,
        decimals: u8,
    ) -> Result<Pubkey, LedgerError> {
        let mint = Keypair::new();
        let space = spl_token::state::Mint::LEN;

        let rent = self
            .client
            .get_minimum_balance_for_rent_exemption(space)
            .await
            .map_err(|e| self.classify(e))?;

        let instructions = [
            system_instruction::create_account(
                &payer.pubkey(),
                &mint.pubkey(),
                rent,
                space as u64,
                &spl_token::id(),
            ),
            spl_token::instruction::initialize_mint(
                &spl_token::id(),
                &mint.pubkey(),
                mint_authority,
                freeze_authority,
                decimals,
            )
            .map_err(|e| LedgerError::Instruction(e.to_string()))?,
        ];

        let signature = self.send(&instructions, payer, &[payer, &mint]).await?;
        debug!("Created mint {} in {}", mint.pubkey(), signature);

        Ok(mint.pubkey())
    }

    async fn get_or_create_holding_account(
        &self,
        payer: &Keypair,
        mint: &Pubkey,
        owner: &Pubkey,
    ) -> Result<Pubkey, LedgerError> {
        let address = get_associated_token_address(owner, mint);

        let existing = self
            .client
            .get_account_with_commitment(&address, self.client.commitment())
            .await
            .map_err(|e| self.classify(e))?
            .value;
        if existing.is_some() {
            debug!("Token account {} already exists", address);
            return Ok(address);
        }

        let instruction =
            create_associated_token_account_idempotent(&payer.pubkey(), owner, mint, &spl_token::id());
        let signature = self.send(&[instruction], payer, &[payer]).await?;
        debug!("Created token account {} in {}", address, signature);

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
        let instruction = spl_token::instruction::mint_to(
            &spl_token::id(),
            mint,
            destination,
            &authority.pubkey(),
            &[],
            amount,
        )
        .map_err(|e| LedgerError::Instruction(e.to_string()))?;

        self.send(&[instruction], payer, &[payer, authority]).await
    }

    async fn transfer(
        &self,
        payer: &Keypair,
        source: &Pubkey,
        destination: &Pubkey,
        authority: &Keypair,
        amount: u64,
    ) -> Result<Signature, LedgerError> {
        #[allow(deprecated)]
        let instruction = spl_token::instruction::transfer(
            &spl_token::id(),
            source,
            destination,
            &authority.pubkey(),
            &[],
            amount,
        )
        .map_err(|e| LedgerError::Instruction(e.to_string()))?;

        self.send(&[instruction], payer, &[payer, authority]).await
    }

    async fn token_balance(&self, account: &Pubkey) -> Result<u64, LedgerError> {
        let ui_amount = self
            .client
            .get_token_account_balance(account)
            .await
            .map_err(|e| self.classify(e))?;

        ui_amount
            .amount
            .parse::<u64>()
            .map_err(|e| LedgerError::Instruction(format!("bad token amount: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_client::rpc_request::RpcError;

    #[test]
    fn test_rate_limit_message_is_classified() {
        let err = ClientError::from(RpcError::ForUser(
            "airdrop request failed. This can happen when the rate limit is reached. 429"
                .to_string(),
        ));

        let classified = classify_client_error("https://api.devnet.solana.com", err);
        assert!(classified.is_rate_limited());
    }

    #[test]
    fn test_other_rpc_errors_are_not_rate_limited() {
        let err = ClientError::from(RpcError::ForUser("Invalid param: WrongSize".to_string()));

        let classified = classify_client_error("https://api.devnet.solana.com", err);
        assert!(!classified.is_rate_limited());
        assert!(matches!(
            classified,
            LedgerError::Network(NetworkError::Rpc { .. })
        ));
    }

    #[test]
    fn test_connect_keeps_endpoint() {
        let ledger = RpcLedger::connect(
            "https://api.devnet.solana.com",
            CommitmentConfig::confirmed(),
            Duration::from_secs(30),
        );
        assert_eq!(ledger.endpoint(), "https://api.devnet.solana.com");
    }
}
