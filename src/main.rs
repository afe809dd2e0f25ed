//! Saldo main entry point

use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use saldo_client::{ClientState, FinanceApp, NotificationLevel};
use saldo_config::{Config, CurrencyConfig};
use saldo_core::{BalanceSign, TransactionType};
use saldo_utils::format_currency;
use std::path::PathBuf;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "saldo")]
#[command(version = "0.1.0")]
#[command(about = "A small personal finance tracker", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the store service (default)
    Serve,
    /// Print a default configuration file
    InitConfig,
    /// Show the history, newest first
    List {
        /// Start of the date range (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// End of the date range (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<String>,
    },
    /// Show totals and the current balance
    Summary,
    /// Record an income or expense dated today
    Add {
        kind: TransactionType,
        amount: String,
        #[arg(default_value = "")]
        description: String,
    },
    /// Change amount and description of a record
    Edit {
        id: String,
        #[arg(long)]
        amount: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Delete one record
    Delete { id: String },
    /// Delete every record
    Clear,
    /// Export records to CSV
    Export {
        /// Target directory
        #[arg(long, default_value = ".")]
        dir: PathBuf,
        #[arg(long, requires = "to")]
        from: Option<String>,
        #[arg(long, requires = "from")]
        to: Option<String>,
    },
    /// Toggle the dark-mode preference
    DarkMode,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = Config::load_or_default(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level))
        .init();

    let command = args.command.unwrap_or(Command::Serve);
    if let Command::InitConfig = command {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let rt = Runtime::new()?;
    rt.block_on(run(command, config))
}

async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    if let Command::Serve = command {
        let store = saldo_store::open_store(&config.store.uri).await?;
        return saldo_api::start_server(config, store).await;
    }

    log::debug!("using store service at {}", config.client.server_url);
    let mut app = FinanceApp::from_config(&config)?;
    let mut ok = app.refresh().await;

    if ok {
        ok = match command {
            Command::List { from, to } => {
                let applied = match (from, to) {
                    (Some(from), Some(to)) => app.apply_filter(&from, &to),
                    _ => true,
                };
                if applied {
                    print_history(app.state(), &config.currency);
                }
                applied
            }
            Command::Summary => {
                print_summary(app.state(), &config.currency);
                true
            }
            Command::Add {
                kind,
                amount,
                description,
            } => app.submit(kind, &amount, &description).await,
            Command::Edit {
                id,
                amount,
                description,
            } => edit(&mut app, &id, amount, description).await,
            Command::Delete { id } => app.delete(&id).await,
            Command::Clear => app.clear_history().await,
            Command::Export { dir, from, to } => {
                let written = match (from, to) {
                    (Some(from), Some(to)) => app.export_range(&from, &to, &dir),
                    _ => app.export_all(&dir, Local::now().date_naive()),
                };
                written.is_some()
            }
            Command::DarkMode => {
                let on = app.toggle_dark_mode();
                println!("dark mode {}", if on { "on" } else { "off" });
                true
            }
            Command::Serve | Command::InitConfig => true,
        };
    }

    let mut failed = !ok;
    for notification in app.state_mut().drain_notifications() {
        failed |= notification.level == NotificationLevel::Error;
        eprintln!("[{}] {}", notification.level, notification.message);
    }
    if failed {
        anyhow::bail!("command did not complete");
    }
    Ok(())
}

async fn edit(
    app: &mut FinanceApp,
    id: &str,
    amount: Option<String>,
    description: Option<String>,
) -> bool {
    if !app.begin_edit(id) {
        return false;
    }
    let Some(target) = app.state().edit.target().cloned() else {
        return false;
    };

    let amount = amount.unwrap_or_else(|| target.amount.normalize().to_string());
    let description = description.unwrap_or(target.description);
    app.fill_form(target.kind, &amount, &description);
    app.submit_form(target.kind, Local::now().date_naive()).await
}

fn print_history(state: &ClientState, currency: &CurrencyConfig) {
    if let Some(range) = state.filter {
        println!("History {}", range.description());
    }
    for tx in state.history() {
        let amount = format_currency(tx.signed_amount(), currency);
        let balance = format_currency(tx.balance.unwrap_or_default(), currency);
        println!(
            "{:<36}  {:<10}  {:<7}  {:>16}  {:>16}  {}",
            tx.id,
            tx.date,
            tx.kind.to_string(),
            amount,
            balance,
            tx.description
        );
    }
}

fn print_summary(state: &ClientState, currency: &CurrencyConfig) {
    let summary = state.summary();
    let status = match summary.sign() {
        BalanceSign::Positive => "surplus",
        BalanceSign::Negative => "deficit",
        BalanceSign::Zero => "even",
    };
    println!("Records:  {}", summary.count);
    println!("Income:   {}", format_currency(summary.total_income, currency));
    println!("Expense:  {}", format_currency(summary.total_expense, currency));
    println!("Balance:  {} ({})", format_currency(summary.final_balance, currency), status);
}
