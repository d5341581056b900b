use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use colored::Colorize;
use txl_ledger::{Ledger, LedgerReader, LedgerWriter};
use txl_server::{ServerConfig, TxlServer};
use txl_store::{FileRecordLog, LogConfig, SyncMode};
use txl_types::TransactionRecord;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    let sync = cli.sync;
    let data_dir = cli.data_dir;

    match cli.command {
        Command::Append(args) => {
            let ledger = open_ledger(&resolve_data_dir(data_dir), sync)?;
            cmd_append(&ledger, args.into(), format)
        }
        Command::List(args) => {
            let ledger = open_ledger(&resolve_data_dir(data_dir), sync)?;
            cmd_list(&ledger, args, format)
        }
        Command::Find(args) => {
            let ledger = open_ledger(&resolve_data_dir(data_dir), sync)?;
            cmd_find(&ledger, args, format)
        }
        Command::Count(_) => {
            let ledger = open_ledger(&resolve_data_dir(data_dir), sync)?;
            cmd_count(&ledger, format)
        }
        Command::Serve(args) => cmd_serve(args, data_dir, sync),
    }
}

fn resolve_data_dir(data_dir: Option<PathBuf>) -> PathBuf {
    data_dir.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

fn open_ledger(data_dir: &Path, sync: bool) -> anyhow::Result<Ledger> {
    let config = if sync { LogConfig::durable() } else { LogConfig::default() };
    let log = FileRecordLog::open_in(data_dir, config)
        .with_context(|| format!("opening ledger in {}", data_dir.display()))?;
    Ok(Ledger::open(Arc::new(log))?)
}

fn cmd_append(ledger: &Ledger, record: TransactionRecord, format: OutputFormat) -> anyhow::Result<()> {
    let reference = record.reference.clone();
    ledger.append(record)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "status": "appended" })),
        OutputFormat::Text => println!("{} Appended {}", "✓".green().bold(), reference.yellow()),
    }
    Ok(())
}

fn cmd_list(ledger: &Ledger, args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let records = match &args.user {
        Some(user) => ledger.list_by_user(user)?,
        None => ledger.list_all()?,
    };
    println!("{}", render_records(&records, format)?);
    Ok(())
}

fn cmd_find(ledger: &Ledger, args: FindArgs, format: OutputFormat) -> anyhow::Result<()> {
    let found = ledger.find_by_reference(&args.reference)?;
    match (format, found) {
        (OutputFormat::Json, found) => println!("{}", serde_json::to_string_pretty(&found)?),
        (OutputFormat::Text, Some(record)) => println!("{}", render_record(&record)),
        (OutputFormat::Text, None) => {
            println!("No transaction with reference {}", args.reference.yellow())
        }
    }
    Ok(())
}

fn cmd_count(ledger: &Ledger, format: OutputFormat) -> anyhow::Result<()> {
    let count = ledger.count()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "count": count })),
        OutputFormat::Text => println!("{} transaction(s)", count.to_string().bold()),
    }
    Ok(())
}

fn cmd_serve(args: ServeArgs, data_dir: Option<PathBuf>, sync: bool) -> anyhow::Result<()> {
    let config = serve_config(&args, data_dir, sync)?;
    let server = TxlServer::open(config).context("opening ledger for server")?;
    println!(
        "TXL server on {} (data: {})",
        server.config().bind_addr.to_string().bold(),
        server.config().data_dir.display()
    );

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

/// Config file values, overridden by explicit command-line flags.
fn serve_config(
    args: &ServeArgs,
    data_dir: Option<PathBuf>,
    sync: bool,
) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = data_dir {
        config.data_dir = dir;
    }
    if sync {
        config.sync_mode = SyncMode::EveryWrite;
    }
    Ok(config)
}

pub fn render_records(records: &[TransactionRecord], format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string_pretty(records)?,
        OutputFormat::Text if records.is_empty() => "No transactions.".to_string(),
        OutputFormat::Text => records
            .iter()
            .map(render_record)
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

fn render_record(record: &TransactionRecord) -> String {
    format!(
        "{}  {} {} {}  {} -> {}  [{}]  {}",
        record.reference.yellow().bold(),
        record.txn_type.cyan(),
        record.amount,
        record.user.bold(),
        record.balance_before,
        record.balance_after,
        record.status.green(),
        record.created_at.dimmed(),
    )
}
