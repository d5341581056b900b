use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use txl_types::TransactionRecord;

/// Data directory used when `--data-dir` is not given.
pub const DEFAULT_DATA_DIR: &str = ".txl";

#[derive(Parser)]
#[command(
    name = "txl",
    about = "TXL -- append-only transaction ledger",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Directory holding the TRANSACTIONS collection
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// fsync the log after every append
    #[arg(long, global = true)]
    pub sync: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Append a transaction record
    Append(AppendArgs),
    /// List all transactions, or one user's transactions
    List(ListArgs),
    /// Find the first transaction with a reference
    Find(FindArgs),
    /// Show the number of recorded transactions
    Count(CountArgs),
    /// Start the TXL HTTP server
    Serve(ServeArgs),
}

#[derive(Args)]
pub struct AppendArgs {
    #[arg(long)]
    pub txn_type: String,
    #[arg(long)]
    pub purpose: String,
    #[arg(long)]
    pub amount: u64,
    #[arg(long)]
    pub user: String,
    #[arg(long)]
    pub reference: String,
    #[arg(long)]
    pub balance_before: u64,
    #[arg(long)]
    pub balance_after: u64,
    #[arg(long)]
    pub status: String,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub created_at: String,
    #[arg(long)]
    pub updated_at: String,
}

impl From<AppendArgs> for TransactionRecord {
    fn from(args: AppendArgs) -> Self {
        Self {
            txn_type: args.txn_type,
            purpose: args.purpose,
            amount: args.amount,
            user: args.user,
            reference: args.reference,
            balance_before: args.balance_before,
            balance_after: args.balance_after,
            status: args.status,
            description: args.description,
            created_at: args.created_at,
            updated_at: args.updated_at,
        }
    }
}

#[derive(Args)]
pub struct ListArgs {
    /// Only show this user's transactions (exact match)
    #[arg(long)]
    pub user: Option<String>,
}

#[derive(Args)]
pub struct FindArgs {
    pub reference: String,
}

#[derive(Args)]
pub struct CountArgs {}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
}

#[cfg(test)]
mod tests {
    use super::*;

    const APPEND: [&str; 24] = [
        "txl",
        "append",
        "--txn-type",
        "payment",
        "--purpose",
        "repayment",
        "--amount",
        "20000",
        "--user",
        "Bala",
        "--reference",
        "value2",
        "--balance-before",
        "50000",
        "--balance-after",
        "30000",
        "--status",
        "Done",
        "--description",
        "",
        "--created-at",
        "2023-01-01",
        "--updated-at",
        "2023-01-01",
    ];

    #[test]
    fn parse_append() {
        let cli = Cli::try_parse_from(APPEND).unwrap();
        if let Command::Append(args) = cli.command {
            let record = TransactionRecord::from(args);
            assert_eq!(record.amount, 20_000);
            assert_eq!(record.user, "Bala");
            assert_eq!(record.reference, "value2");
            assert_eq!(record.balance_after, 30_000);
            assert!(record.description.is_empty());
            assert_eq!(record.created_at, "2023-01-01");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn append_requires_every_field() {
        let missing_status: Vec<_> = APPEND
            .iter()
            .copied()
            .filter(|a| *a != "--status" && *a != "Done")
            .collect();
        assert!(Cli::try_parse_from(missing_status).is_err());
    }

    #[test]
    fn parse_list() {
        let cli = Cli::try_parse_from(["txl", "list"]).unwrap();
        if let Command::List(args) = cli.command {
            assert!(args.user.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_list_by_user() {
        let cli = Cli::try_parse_from(["txl", "list", "--user", "Ada"]).unwrap();
        if let Command::List(args) = cli.command {
            assert_eq!(args.user, Some("Ada".into()));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_find() {
        let cli = Cli::try_parse_from(["txl", "find", "value2"]).unwrap();
        if let Command::Find(args) = cli.command {
            assert_eq!(args.reference, "value2");
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_serve() {
        let cli = Cli::try_parse_from(["txl", "serve", "--bind", "0.0.0.0:8080"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.bind, Some("0.0.0.0:8080".parse().unwrap()));
            assert!(args.config.is_none());
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_flags() {
        let cli = Cli::try_parse_from([
            "txl", "count", "--data-dir", "/tmp/ledger", "--sync", "--format", "json", "-v",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Count(_)));
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/ledger")));
        assert!(cli.sync);
        assert!(cli.verbose);
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
