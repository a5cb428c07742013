//! Status-related command implementations (status, summary, paydays, accounts)

use std::path::Path;

use anyhow::Result;
use chrono::Utc;

use paydown_core::db::Database;
use paydown_core::payday;

use super::open_db;

pub fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    use paydown_core::db::DB_KEY_ENV;
    use std::fs;

    println!();
    println!("📊 Paydown Status");
    println!("   ─────────────────────────────────────────────────────────────");

    // Database path
    println!("   Database: {}", db_path.display());

    // Check if database file exists and get size
    if db_path.exists() {
        if let Ok(metadata) = fs::metadata(db_path) {
            let size_kb = metadata.len() as f64 / 1024.0;
            if size_kb < 1024.0 {
                println!("   Size: {:.1} KB", size_kb);
            } else {
                println!("   Size: {:.1} MB", size_kb / 1024.0);
            }
        }
    } else {
        println!("   Size: (database not initialized)");
    }

    // Check encryption status
    let has_key = std::env::var(DB_KEY_ENV).is_ok();
    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else if has_key {
        println!("   🔒 Encryption: ENABLED ({}=***)", DB_KEY_ENV);
    } else {
        println!("   ❌ Encryption: REQUIRED but {} not set", DB_KEY_ENV);
    }

    // Try to open the database and show stats
    if db_path.exists() {
        match open_db(db_path, no_encrypt) {
            Ok(db) => {
                let today = Utc::now().date_naive();
                if let Ok(summary) = db.loan_summary(today, None) {
                    println!();
                    println!("   Active loans: {}", summary.total_loans);
                    println!("   Outstanding:  {}", summary.total_outstanding);
                }
            }
            Err(e) => {
                println!();
                println!("   ❌ Error opening database: {}", e);
                if !no_encrypt && !has_key {
                    println!("      Set {} or use --no-encrypt", DB_KEY_ENV);
                } else if has_key {
                    println!("      (Check if {} is correct)", DB_KEY_ENV);
                }
            }
        }
    }

    println!();
    Ok(())
}

pub fn cmd_summary(db: &Database, cycle: bool) -> Result<()> {
    let today = Utc::now().date_naive();

    let bounds = if cycle {
        db.get_salary_profile()?
            .map(|profile| payday::current_cycle(&profile, today))
    } else {
        None
    };
    let cycle_label = match bounds {
        Some((from, to)) => format!("salary cycle {} to {}", from, to),
        None => "this calendar month".to_string(),
    };

    let summary = db.loan_summary(today, bounds)?;

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│          💰 Paydown Summary             │");
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!("  Active loans:     {}", summary.total_loans);
    println!("  Outstanding:      {}", summary.total_outstanding);
    println!(
        "  EMIs due ({}): {}",
        cycle_label, summary.total_emi_this_month
    );
    println!();

    match &summary.next_emi_due {
        Some(next) => {
            println!(
                "  📅 Next EMI: {} #{} for {} due {}",
                next.loan_name, next.installment_number, next.emi_amount, next.due_date
            );
        }
        None => println!("  📅 No pending EMIs."),
    }
    println!();

    Ok(())
}

pub fn cmd_paydays(db: &Database, count: u32) -> Result<()> {
    let profile = match db.get_salary_profile()? {
        Some(p) => p,
        None => {
            println!("No salary profile configured. Set one up through the web UI:");
            println!("  paydown serve");
            return Ok(());
        }
    };

    let today = Utc::now().date_naive();
    let paydays = payday::next_paydays(&profile, count, today)?;

    println!();
    println!("📅 Upcoming paydays ({})", profile.payday_rule);
    println!("   ─────────────────────────────");
    for day in paydays {
        println!("   {}", day.format("%Y-%m-%d (%a)"));
    }
    println!();

    Ok(())
}

pub fn cmd_accounts(db: &Database) -> Result<()> {
    let accounts = db.list_accounts()?;

    if accounts.is_empty() {
        println!("No accounts found. Add one through the web UI:");
        println!("  paydown serve");
        return Ok(());
    }

    println!();
    println!("📁 Accounts");
    println!("   ─────────────────────────────");

    for account in accounts {
        let type_label = account
            .account_type
            .map(|t| t.as_str())
            .unwrap_or("unspecified");
        println!(
            "   {:<4} {:<24} {:<12} {:>12}",
            account.id,
            super::truncate(&account.name, 24),
            type_label,
            account.balance
        );
    }
    println!();

    Ok(())
}
