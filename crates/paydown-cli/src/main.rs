//! Paydown CLI - Loan and EMI tracker
//!
//! Usage:
//!   paydown init                  Initialize database
//!   paydown loans list            List loans
//!   paydown summary               Dashboard summary
//!   paydown serve --port 3000     Start web server

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
        } => commands::cmd_serve(&cli.db, &host, port, no_auth, cli.no_encrypt).await,
        Commands::Loans { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(LoansAction::List) => commands::cmd_loans_list(&db),
                Some(LoansAction::Show { id }) => commands::cmd_loans_show(&db, id),
                Some(LoansAction::Pay {
                    installment_id,
                    amount,
                    date,
                    no_transaction,
                    no_balance,
                }) => commands::cmd_loans_pay(
                    &db,
                    installment_id,
                    &amount,
                    date.as_deref(),
                    no_transaction,
                    no_balance,
                ),
                Some(LoansAction::Regenerate { id }) => commands::cmd_loans_regenerate(&db, id),
                Some(LoansAction::Delete { id, yes }) => commands::cmd_loans_delete(&db, id, yes),
            }
        }
        Commands::Summary { cycle } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_summary(&db, cycle)
        }
        Commands::Paydays { count } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_paydays(&db, count)
        }
        Commands::Accounts => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_accounts(&db)
        }
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
    }
}
