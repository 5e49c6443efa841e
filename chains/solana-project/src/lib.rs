//! Solana devnet token flow: airdrop, mint creation, mint-to and transfer.

pub mod airdrop;
pub mod config;
pub mod flow;
pub mod ledger;

pub use airdrop::{request_funding, AirdropConfig};
pub use flow::{run_token_flow, FlowConfig, FlowError, FlowReport, TokenConfig};
pub use ledger::{Ledger, LedgerError, MemoryLedger, RpcLedger};
