//! Month-end closing walkthrough: commercial events in, statements out
//!
//! Run with `RUST_LOG=accounting_engine=debug` to see the engine's logs.

use accounting_engine::{
    DateRange, EntryFilter, EntryHeader, EntryStatus, Journal, JournalLine, Ledger, MemoryStorage,
    PaymentEvent, PaymentMethod, PurchaseInvoiceEvent, ReportFilter, SaleInvoiceEvent,
    StockLineItem, StockMovementEvent,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

fn day(d: u32) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    NaiveDate::from_ymd_opt(2024, 3, d).ok_or_else(|| "invalid date".into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("🧾 Accounting Engine - Month-End Example\n");

    let ledger = Ledger::new(MemoryStorage::new());

    // 1. Seed the chart of accounts
    let accounts = ledger.initialize_chart().await?;
    println!("📊 Seeded {} accounts\n", accounts.len());

    // 2. Opening capital, entered by hand
    let capital = ledger
        .create_manual_entry(
            EntryHeader::new(day(1)?, "Apport en capital", Journal::Banque).reference("STATUTS"),
            vec![
                JournalLine::debit("512000", "", BigDecimal::from(20000)),
                JournalLine::credit("101000", "", BigDecimal::from(20000)),
            ],
        )
        .await?;

    // 3. Commercial events
    let sale = ledger
        .generate_sale_invoice_entry(&SaleInvoiceEvent {
            id: "inv-1".to_string(),
            number: "F2024-0031".to_string(),
            date: day(5)?,
            subtotal: "2500.00".parse()?,
            tax_amount: "500.00".parse()?,
            total: "3000.00".parse()?,
            counterparty_id: "cust-17".to_string(),
            counterparty_name: "Boulangerie Martin".to_string(),
        })
        .await?;

    let purchase = ledger
        .generate_purchase_invoice_entry(&PurchaseInvoiceEvent {
            id: "pur-1".to_string(),
            number: "A2024-0012".to_string(),
            date: day(8)?,
            subtotal: "1200.00".parse()?,
            tax_amount: "240.00".parse()?,
            total: "1440.00".parse()?,
            counterparty_id: "supp-3".to_string(),
            counterparty_name: "Minoterie du Centre".to_string(),
        })
        .await?;

    let received = ledger
        .generate_payment_received_entry(&PaymentEvent {
            invoice_or_purchase_id: "inv-1".to_string(),
            document_number: "F2024-0031".to_string(),
            amount: "3000.00".parse()?,
            method: PaymentMethod::Check,
            date: day(20)?,
            counterparty_id: Some("cust-17".to_string()),
            counterparty_name: Some("Boulangerie Martin".to_string()),
        })
        .await?;

    let delivered = ledger
        .generate_stock_movement_entry(&StockMovementEvent {
            order_id: "order-9".to_string(),
            order_number: "CMD-2024-0009".to_string(),
            line_items: vec![StockLineItem {
                cost_price: Some("4.20".parse()?),
                quantity: BigDecimal::from(150),
            }],
            delivered_at: Some(day(6)?),
        })
        .await?;

    let mut numbers = vec![capital.number, sale.number, purchase.number, received.number];
    numbers.extend(delivered.map(|entry| entry.number));

    // 4. Validate everything
    println!("✅ Validating entries...");
    for number in &numbers {
        let entry = ledger.validate_entry(number).await?;
        println!(
            "  {} [{}] {} - {}",
            entry.number,
            entry.journal_code,
            entry.label,
            entry.total_debit()
        );
    }
    println!();

    let drafts = ledger
        .list_entries(&EntryFilter::default().status(EntryStatus::Draft))
        .await?;
    println!("📝 Remaining drafts: {}\n", drafts.len());

    // 5. Reports
    let march = ReportFilter::new(DateRange::between(day(1)?, day(31)?));

    let trial = ledger.get_trial_balance(&march).await?;
    println!("⚖️  Trial Balance");
    for row in &trial.rows {
        println!(
            "  {} {:<40} {:>12} {:>12}",
            row.account.code, row.account.name, row.total_debit, row.total_credit
        );
    }
    println!("  Balanced: {}\n", trial.is_balanced);

    let income = ledger.get_income_statement(&march).await?;
    println!("📈 Income Statement");
    println!("  Revenue:    {}", income.total_revenue);
    println!("  Expense:    {}", income.total_expense);
    println!("  Net income: {}\n", income.net_income);

    let sheet = ledger.get_balance_sheet(&march).await?;
    println!("🏦 Balance Sheet");
    println!("  Assets:              {}", sheet.total_assets);
    println!("  Liabilities:         {}", sheet.total_liabilities);
    println!("  Equity:              {}", sheet.total_equity);
    println!("  Balanced: {}\n", sheet.is_balanced);

    let bank = ledger
        .get_general_ledger(&march.clone().account_prefix("512"))
        .await?;
    println!("📒 Bank Ledger");
    for account in &bank.accounts {
        for movement in &account.movements {
            println!(
                "  {} {:<14} {:<35} {:>10} {:>10} {:>10}",
                movement.date,
                movement.entry_number,
                movement.label,
                movement.debit,
                movement.credit,
                movement.balance
            );
        }
    }
    println!();

    let integrity = ledger.validate_integrity(&march).await?;
    println!("🔍 Ledger integrity: {}", if integrity.is_valid { "OK" } else { "FAILED" });
    for issue in &integrity.issues {
        println!("  ⚠️  {}", issue);
    }

    Ok(())
}
