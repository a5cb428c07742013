//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Paydown - Track loan EMIs against your salary cycle
#[derive(Parser)]
#[command(name = "paydown")]
#[command(about = "Self-hosted loan and EMI tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "paydown.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set PAYDOWN_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires a bearer API key (PAYDOWN_API_KEYS).
        #[arg(long)]
        no_auth: bool,
    },

    /// Manage loans
    Loans {
        #[command(subcommand)]
        action: Option<LoansAction>,
    },

    /// Show the cross-loan dashboard summary
    Summary {
        /// Bucket EMIs by salary cycle instead of calendar month
        #[arg(long)]
        cycle: bool,
    },

    /// Show upcoming paydays
    Paydays {
        /// How many paydays to show
        #[arg(short, long, default_value = "6")]
        count: u32,
    },

    /// List accounts
    Accounts,

    /// Show database status (encryption, size, etc.)
    Status,
}

#[derive(Subcommand)]
pub enum LoansAction {
    /// List all loans
    List,

    /// Show one loan with its full installment schedule
    Show {
        /// Loan id
        id: i64,
    },

    /// Mark an installment as paid
    Pay {
        /// Installment id
        installment_id: i64,

        /// Amount actually paid
        #[arg(short, long)]
        amount: String,

        /// Payment date (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        date: Option<String>,

        /// Skip the ledger transaction on the linked account
        #[arg(long)]
        no_transaction: bool,

        /// Skip the balance debit on the linked account
        #[arg(long)]
        no_balance: bool,
    },

    /// Rebuild the pending schedule against the current outstanding balance
    Regenerate {
        /// Loan id
        id: i64,
    },

    /// Delete a loan and its installments
    Delete {
        /// Loan id
        id: i64,

        /// Skip confirmation
        #[arg(short, long)]
        yes: bool,
    },
}
