//! # wa-audit
//!
//! Command line entry point. Configuration is read from `.env`, then the
//! environment, then flags; see `audit_runtime::config`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use audit_runtime::commands::{self, LogSummary};
use audit_runtime::{AuditConfig, CliOverrides, JsonRpcEventSource};
use wa_04_reconciliation::AuditSummary;

/// Audit consensus-layer withdrawals against the claim token.
#[derive(Parser, Debug)]
#[command(name = "wa-audit")]
#[command(about = "Reconcile withdrawals against claim transfers and index token holders")]
struct Cli {
    #[command(flatten)]
    overrides: GlobalArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct GlobalArgs {
    /// JSON-RPC endpoint (overrides PROVIDER_URL)
    #[arg(long, global = true)]
    provider_url: Option<String>,

    /// Directory holding the cache documents (overrides WA_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Blocks fetched per ledger chunk
    #[arg(long, global = true)]
    chunk_size: Option<u64>,

    /// Blocks per balance-scan batch
    #[arg(long, global = true)]
    batch_size: Option<u64>,

    /// Balance-scan workers per batch
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// First block scanned on a cold start
    #[arg(long, global = true)]
    activation_block: Option<u64>,

    /// Ignore claims emitted before this block
    #[arg(long, global = true)]
    claims_start_block: Option<u64>,
}

impl From<GlobalArgs> for CliOverrides {
    fn from(args: GlobalArgs) -> Self {
        CliOverrides {
            provider_url: args.provider_url,
            data_dir: args.data_dir,
            chunk_size: args.chunk_size,
            batch_size: args.batch_size,
            worker_count: args.workers,
            activation_block: args.activation_block,
            claims_start_block: args.claims_start_block,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bring the withdrawal ledger up to the chain head
    SyncWithdrawals,
    /// Download every transfer event of the claim token
    FetchTransfers,
    /// Extend the token-holder balance index
    ScanBalances,
    /// Reconcile claims against withdrawals
    Check,
    /// Print totals of the reconciliation log
    Summarize,
}

fn load_config(overrides: GlobalArgs) -> Result<AuditConfig> {
    // A missing .env is fine.
    dotenv::dotenv().ok();

    let mut config = AuditConfig::from_env().context("invalid configuration")?;
    config
        .apply_cli(&overrides.into())
        .context("invalid command line")?;
    Ok(config)
}

fn connect(config: &AuditConfig) -> Result<Arc<JsonRpcEventSource>> {
    let url = config.require_provider()?;
    let token = config.require_token()?;
    let source = JsonRpcEventSource::new(url, token, config.rpc_timeout)
        .context("failed to build JSON-RPC client")?;
    Ok(Arc::new(source))
}

fn print_audit(summary: &AuditSummary) {
    for report in &summary.reports {
        let status = if report.is_clean() { "ok" } else { "MISMATCH" };
        println!(
            "{} {}: claimed {}, accumulated {}, {} interval(s)",
            status,
            report.address,
            report.total_claimed,
            report.total_accumulated,
            report.intervals.len()
        );
    }
    for skipped in &summary.skipped {
        println!("skipped: {skipped}");
    }
    println!(
        "{} address(es), {} interval(s), {} discrepancy(ies)",
        summary.reports.len(),
        summary.interval_count(),
        summary.discrepancy_count()
    );
}

fn print_log(summary: &LogSummary) {
    println!("entries: {}", summary.entries);
    println!("total claimed: {}", summary.totals.claimed);
    println!("total accumulated: {}", summary.totals.accumulated);
    if let Some(excess) = summary.totals.unclaimed() {
        println!("unclaimed: {excess}");
    }
    if let Some(excess) = summary.totals.overclaimed() {
        println!("overclaimed: {excess}");
    }
    if let Some(count) = summary.estimated_missing {
        println!("estimated entries skipped: {count}");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.overrides)?;
    audit_runtime::telemetry::init_tracing(&config.log_level, config.json_logs)?;

    info!("[audit] data dir {}", config.data_dir.display());

    match cli.command {
        Command::SyncWithdrawals => {
            let report = commands::sync_withdrawals(&config, connect(&config)?).await?;
            println!(
                "synced to block {} ({} blocks fetched, {} withdrawals recorded)",
                report.last_block, report.blocks_fetched, report.withdrawals_recorded
            );
        }
        Command::FetchTransfers => {
            let count = commands::fetch_transfers(&config, connect(&config)?).await?;
            println!("stored {count} transfer events");
        }
        Command::ScanBalances => {
            let report = commands::scan_balances(&config, connect(&config)?).await?;
            match report.last_block_synced {
                Some(block) => println!(
                    "scanned to block {block}: {} holders, {} batch(es)",
                    report.holders, report.batches
                ),
                None => println!("nothing to scan yet"),
            }
        }
        Command::Check => print_audit(&commands::check(&config)?),
        Command::Summarize => print_log(&commands::summarize(&config)?),
    }

    Ok(())
}
