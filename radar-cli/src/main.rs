use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use radar_core::Transaction;
use radar_finance::{
    InboxPoller, InboxSource, JsonFileInbox, JsonFileStore, SpendingSummary,
    TickOutcome, TransactionStore, confirm, parse_pasted,
};
use radar_ingest::TransactionExtractor;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing_subscriber::EnvFilter;

mod config;
mod llm;
mod state;

use config::Config;
use llm::Backend;

#[derive(Parser, Debug)]
#[command(name = "radar", version, about = "RupeeRadar: turn bank SMS into transactions")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse one pasted SMS and print the transaction as JSON
    Parse {
        /// Message text (reads stdin when omitted)
        text: Option<String>,

        /// Save the parsed transaction
        #[arg(long)]
        save: bool,
    },

    /// Poll an exported inbox for new bank messages
    Watch {
        /// JSON array of {id, address, body, timestamp}
        #[arg(long)]
        inbox: PathBuf,

        /// Seconds between polls (overrides config)
        #[arg(long)]
        interval: Option<u64>,

        /// Run a single poll and exit
        #[arg(long)]
        once: bool,
    },

    /// Show stored transactions, newest first
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Totals by type and category
    Summary,

    /// Delete all stored transactions
    Clear,

    /// Bulk-load transactions from a JSON array
    Seed { file: PathBuf },

    /// Config file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write ~/.rupeeradar/config.toml with defaults
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    // "radar" also matches the radar_* library targets
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("radar=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config()?;
    let open_store = || -> Result<JsonFileStore> { Ok(JsonFileStore::new(cfg.store_path()?)) };

    match cli.command {
        Command::Parse { text, save } => parse_cmd(&cfg, &open_store()?, text, save).await?,
        Command::Watch {
            inbox,
            interval,
            once,
        } => watch_cmd(&cfg, open_store()?, inbox, interval, once).await?,
        Command::List { limit } => {
            let txns = open_store()?.load_all()?;
            if txns.is_empty() {
                println!("No transactions yet.");
            }
            for t in txns.iter().rev().take(limit) {
                print_line(t);
            }
        }
        Command::Summary => {
            let txns = open_store()?.load_all()?;
            print_summary(&SpendingSummary::from_transactions(&txns));
        }
        Command::Clear => {
            let store = open_store()?;
            store.clear()?;
            println!("Cleared {}", store.path().display());
        }
        Command::Seed { file } => {
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("read {}", file.display()))?;
            let txns: Vec<Transaction> = serde_json::from_str(&raw)
                .with_context(|| format!("parse {}", file.display()))?;
            let total = txns.len();
            let added = open_store()?.seed(txns)?;
            println!("Seeded {added} of {total} transactions");
        }
        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config()?,
        },
    }

    Ok(())
}

async fn parse_cmd(cfg: &Config, store: &JsonFileStore, text: Option<String>, save: bool) -> Result<()> {
    let text = match text {
        Some(t) => t,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read message from stdin")?;
            buf
        }
    };
    if text.trim().is_empty() {
        bail!("Nothing to parse: pass the message text or pipe it on stdin");
    }

    let extractor = TransactionExtractor::new()?;
    let classifier = Backend::from_config(&cfg.llm)?;

    let txn = parse_pasted(&extractor, &classifier, &text).await?;

    println!("{}", serde_json::to_string_pretty(&txn)?);
    if save {
        confirm(store, &txn)?;
        tracing::info!(path = %store.path().display(), "saved");
    }
    Ok(())
}

async fn watch_cmd(
    cfg: &Config,
    store: JsonFileStore,
    inbox_path: PathBuf,
    interval: Option<u64>,
    once: bool,
) -> Result<()> {
    let inbox = JsonFileInbox::new(&inbox_path);
    if !inbox.available() {
        bail!(
            "No SMS inbox available at {}. Paste messages instead: radar parse \"<sms text>\"",
            inbox_path.display()
        );
    }

    let mut poller_cfg = cfg.poller.to_poller_config();
    if let Some(secs) = interval {
        poller_cfg.interval = std::time::Duration::from_secs(secs.max(1));
    }

    let poller = Arc::new(InboxPoller::new(
        inbox,
        store,
        Backend::from_config(&cfg.llm)?,
        TransactionExtractor::new()?,
        poller_cfg,
    ));
    let mut events = poller.subscribe();

    if once {
        let outcome = poller.tick().await?;
        while let Ok(txn) = events.try_recv() {
            print_line(&txn);
        }
        match outcome {
            TickOutcome::Ran(r) => println!(
                "fetched={} candidates={} saved={} duplicates={} rejected={} unmatched={} failed={}",
                r.fetched,
                r.candidates,
                r.persisted,
                r.skipped_duplicates,
                r.rejected_by_check,
                r.no_match,
                r.failed
            ),
            TickOutcome::Skipped(reason) => println!("skipped: {reason:?}"),
        }
        return Ok(());
    }

    let printer = tokio::spawn(print_events(events));

    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = stop_tx.send(true);
            }
            Err(e) => {
                tracing::warn!("cannot listen for ctrl-c: {e}");
                std::future::pending::<()>().await;
            }
        }
    });

    println!("Watching {} (ctrl-c to stop)", inbox_path.display());
    Arc::clone(&poller).run(stop_rx).await;
    poller.wait_idle().await;
    printer.abort();
    Ok(())
}

async fn print_events(mut events: broadcast::Receiver<Transaction>) {
    loop {
        match events.recv().await {
            Ok(txn) => print_line(&txn),
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!("missed {n} transaction events");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

fn print_line(t: &Transaction) {
    let sign = if t.is_credit() { "+" } else { "-" };
    let category = t.category.map(|c| c.as_str()).unwrap_or("-");
    let bank = t.bank.as_deref().unwrap_or("-");
    println!(
        "{}  {sign}₹{:.2}  {:<30}  {category:<13} {bank}",
        t.date, t.amount, t.description
    );
}

fn print_summary(s: &SpendingSummary) {
    println!("Transactions: {}", s.count);
    println!("Spent:        ₹{:.2}", s.total_debit);
    println!("Received:     ₹{:.2}", s.total_credit);
    println!("Net:          ₹{:.2}", s.net());
    if s.by_category.is_empty() {
        return;
    }
    println!("\nBy category:");
    for c in &s.by_category {
        println!("  {:<13} ₹{:>12.2}  ({})", c.category.as_str(), c.total, c.count);
    }
}
