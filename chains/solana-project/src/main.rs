use anyhow::Result;
use clap::Parser;
use core_logic::{setup_logger, RESULT_TARGET};
use dotenv::dotenv;
use solana_project::config::SolanaConfig;
use solana_project::{run_token_flow, FlowReport, Ledger, MemoryLedger, RpcLedger};
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "chains/solana-project/config.toml")]
    config: String,
    /// Run against an in-process ledger instead of the configured cluster
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    let args = Args::parse();

    let config = match SolanaConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {:#}", args.config, e);
            return ExitCode::FAILURE;
        }
    };

    // Keep guard alive for file logging
    let _log_guard = setup_logger(&config.log);

    match run(&args, &config).await {
        Ok(report) => {
            info!(
                target: RESULT_TARGET,
                "Transferred {} base units of {} to {}",
                config.token.amount, report.mint, report.receiver
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args, config: &SolanaConfig) -> Result<FlowReport> {
    let ledger: Box<dyn Ledger> = if args.offline {
        info!("Running offline against the in-memory ledger");
        Box::new(MemoryLedger::new())
    } else {
        info!("Connecting to {} ({})", config.rpc_url, config.commitment);
        Box::new(RpcLedger::connect(
            &config.rpc_url,
            config.commitment_config()?,
            config.rpc_timeout(),
        ))
    };

    let report = run_token_flow(ledger.as_ref(), &config.to_flow_config()).await?;
    Ok(report)
}
