//! Loan command implementations (list, show, pay, regenerate, delete)

use std::io::{self, Write};

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use paydown_core::db::Database;

use super::truncate;

pub fn cmd_loans_list(db: &Database) -> Result<()> {
    let today = Utc::now().date_naive();
    let loans = db.list_loans(today)?;

    if loans.is_empty() {
        println!("No loans found. Add one through the web UI:");
        println!("  paydown serve");
        return Ok(());
    }

    println!();
    println!("💳 Loans");
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:<4} {:<24} {:<10} {:>12} {:>12} {:>6}",
        "ID", "Name", "Status", "Outstanding", "EMI", "Due"
    );

    for loan in &loans {
        let pending = loan
            .installments
            .iter()
            .filter(|i| !i.status.is_paid())
            .count();
        println!(
            "   {:<4} {:<24} {:<10} {:>12} {:>12} {:>6}",
            loan.id,
            truncate(&loan.name, 24),
            loan.status.as_str(),
            loan.outstanding_amount,
            loan.emi_amount,
            pending
        );
    }

    println!();
    Ok(())
}

pub fn cmd_loans_show(db: &Database, id: i64) -> Result<()> {
    let today = Utc::now().date_naive();
    let loan = db
        .get_loan(id, today)?
        .with_context(|| format!("Loan {} not found", id))?;

    println!();
    println!("💳 {} ({})", loan.name, loan.loan_type);
    if let Some(lender) = &loan.lender {
        println!("   Lender: {}", lender);
    }
    println!("   Principal:   {}", loan.principal_amount);
    println!("   Outstanding: {}", loan.outstanding_amount);
    println!(
        "   Terms: {}% over {} months, EMI {} due on day {}",
        loan.interest_rate, loan.tenure_months, loan.emi_amount, loan.emi_due_day
    );
    println!("   Status: {}", loan.status);
    println!();
    println!(
        "   {:<4} {:<12} {:>12} {:>12} {:>12} {:<8}",
        "#", "Due", "EMI", "Principal", "Interest", "Status"
    );

    for inst in &loan.installments {
        println!(
            "   {:<4} {:<12} {:>12} {:>12} {:>12} {:<8}",
            inst.installment_number,
            inst.due_date,
            inst.emi_amount,
            inst.principal_component,
            inst.interest_component,
            inst.status.as_str()
        );
    }

    println!();
    Ok(())
}

pub fn cmd_loans_pay(
    db: &Database,
    installment_id: i64,
    amount: &str,
    date: Option<&str>,
    no_transaction: bool,
    no_balance: bool,
) -> Result<()> {
    let amount: Decimal = amount
        .parse()
        .with_context(|| format!("Invalid amount: {}", amount))?;
    let paid_date = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .context("Invalid --date format (use YYYY-MM-DD)")?,
        None => Utc::now().date_naive(),
    };

    let installment =
        db.mark_installment_paid(installment_id, paid_date, amount, !no_transaction, !no_balance)?;

    println!(
        "✅ Installment #{} marked paid ({} on {})",
        installment.installment_number, amount, paid_date
    );
    Ok(())
}

pub fn cmd_loans_regenerate(db: &Database, id: i64) -> Result<()> {
    let today = Utc::now().date_naive();
    let installments = db.regenerate_installments(id, today)?;

    println!(
        "✅ Rebuilt {} pending installment(s) for loan {}",
        installments.len(),
        id
    );
    if let Some(first) = installments.first() {
        println!(
            "   Next: #{} due {} for {}",
            first.installment_number, first.due_date, first.emi_amount
        );
    }
    Ok(())
}

pub fn cmd_loans_delete(db: &Database, id: i64, yes: bool) -> Result<()> {
    if !yes {
        print!("⚠️  This will delete the loan and all its installments.\n\n");
        print!("Are you sure? [y/N] ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    db.delete_loan(id)?;
    println!("✅ Loan {} deleted.", id);
    Ok(())
}
