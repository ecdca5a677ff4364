//! Integration tests for accounting-engine

use std::collections::HashSet;
use std::sync::Arc;

use accounting_engine::{
    utils::{EnhancedAccountValidator, EnhancedEntryValidator, MemoryStorage},
    AccountFilter, AccountType, DateRange, EntryFilter, EntryHeader, EntryStatus, EntryValidator,
    Journal, JournalLine, Ledger, LedgerConfig, LedgerError, LedgerResult, PaymentEvent,
    PaymentMethod,
    PurchaseInvoiceEvent, ReportFilter, SaleInvoiceEvent, StockLineItem, StockMovementEvent,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

fn date(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).unwrap()
}

async fn ledger() -> Ledger<MemoryStorage> {
    let ledger = Ledger::new(MemoryStorage::new());
    ledger.initialize_chart().await.unwrap();
    ledger
}

fn sale(number: &str, subtotal: i64, tax: i64) -> SaleInvoiceEvent {
    SaleInvoiceEvent {
        id: format!("inv-{}", number),
        number: number.to_string(),
        date: date(1, 15),
        subtotal: BigDecimal::from(subtotal),
        tax_amount: BigDecimal::from(tax),
        total: BigDecimal::from(subtotal + tax),
        counterparty_id: "cust-1".to_string(),
        counterparty_name: "Dupont SARL".to_string(),
    }
}

fn purchase(number: &str, subtotal: i64, tax: i64) -> PurchaseInvoiceEvent {
    PurchaseInvoiceEvent {
        id: format!("pur-{}", number),
        number: number.to_string(),
        date: date(1, 18),
        subtotal: BigDecimal::from(subtotal),
        tax_amount: BigDecimal::from(tax),
        total: BigDecimal::from(subtotal + tax),
        counterparty_id: "supp-1".to_string(),
        counterparty_name: "Grossiste SA".to_string(),
    }
}

fn payment(document: &str, amount: i64, method: PaymentMethod, day: u32) -> PaymentEvent {
    PaymentEvent {
        invoice_or_purchase_id: format!("doc-{}", document),
        document_number: document.to_string(),
        amount: BigDecimal::from(amount),
        method,
        date: date(1, day),
        counterparty_id: Some("cust-1".to_string()),
        counterparty_name: Some("Dupont SARL".to_string()),
    }
}

#[tokio::test]
async fn test_sale_invoice_creates_draft_entry() {
    let ledger = ledger().await;

    let entry = ledger
        .generate_sale_invoice_entry(&sale("F2024-001", 200, 17))
        .await
        .unwrap();

    assert_eq!(entry.status, EntryStatus::Draft);
    assert_eq!(entry.number, "VE-2024-000001");
    assert_eq!(entry.journal, Journal::Vente);
    assert_eq!(entry.lines.len(), 3);
    assert_eq!(entry.total_debit(), BigDecimal::from(217));
    assert_eq!(entry.total_credit(), BigDecimal::from(217));

    let lines: Vec<(&str, BigDecimal, BigDecimal)> = entry
        .lines
        .iter()
        .map(|l| (l.account_code.as_str(), l.debit.clone(), l.credit.clone()))
        .collect();
    assert!(lines.contains(&("411000", BigDecimal::from(217), BigDecimal::from(0))));
    assert!(lines.contains(&("707000", BigDecimal::from(0), BigDecimal::from(200))));
    assert!(lines.contains(&("445710", BigDecimal::from(0), BigDecimal::from(17))));

    // Drafts do not reach the reports
    let trial = ledger
        .get_trial_balance(&ReportFilter::new(DateRange::all()))
        .await
        .unwrap();
    assert!(trial.rows.is_empty());
}

#[tokio::test]
async fn test_validated_sale_in_trial_balance() {
    let ledger = ledger().await;
    let entry = ledger
        .generate_sale_invoice_entry(&sale("F2024-001", 200, 17))
        .await
        .unwrap();
    ledger.validate_entry(&entry.number).await.unwrap();

    let filter = ReportFilter::parse(Some("2024-01-01"), Some("2024-01-31"));
    let trial = ledger.get_trial_balance(&filter).await.unwrap();

    assert!(trial.is_balanced);
    assert_eq!(trial.row("411000").unwrap().balance, BigDecimal::from(217));
    assert_eq!(trial.row("707000").unwrap().balance, BigDecimal::from(-200));
    assert_eq!(trial.row("445710").unwrap().balance, BigDecimal::from(-17));

    // Reading twice gives the same report
    assert_eq!(ledger.get_trial_balance(&filter).await.unwrap(), trial);
}

#[tokio::test]
async fn test_missing_vat_account_rejects_sale() {
    let ledger = ledger().await;
    ledger.deactivate_account("445710").await.unwrap();

    let result = ledger
        .generate_sale_invoice_entry(&sale("F2024-001", 200, 17))
        .await;
    assert!(matches!(result, Err(LedgerError::MissingAccount(code)) if code == "445710"));

    let entries = ledger.list_entries(&EntryFilter::default()).await.unwrap();
    assert!(entries.is_empty());

    // No sequence was consumed by the rejected entry
    let number = ledger.allocate_entry_number("VE", 2024).await.unwrap();
    assert_eq!(number, "VE-2024-000001");
}

#[tokio::test]
async fn test_tax_free_sale_omits_vat_line() {
    let ledger = ledger().await;

    let entry = ledger
        .generate_sale_invoice_entry(&sale("F2024-002", 500, 0))
        .await
        .unwrap();
    assert_eq!(entry.lines.len(), 2);
    assert!(!entry.touches_account("445710"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_number_allocation_is_unique() {
    let ledger = Arc::new(ledger().await);

    let mut handles = Vec::new();
    for i in 0..20 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            ledger
                .create_manual_entry(
                    EntryHeader::new(date(2, 1), format!("Vente comptoir {}", i), Journal::Vente),
                    vec![
                        JournalLine::debit("530000", "", BigDecimal::from(10)),
                        JournalLine::credit("707000", "", BigDecimal::from(10)),
                    ],
                )
                .await
                .unwrap()
                .number
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        assert!(numbers.insert(handle.await.unwrap()));
    }
    assert_eq!(numbers.len(), 20);

    let expected: HashSet<String> = (1..=20).map(|n| format!("VE-2024-{:06}", n)).collect();
    assert_eq!(numbers, expected);
}

#[tokio::test]
async fn test_numbering_is_per_journal_and_year() {
    let ledger = ledger().await;

    let sale_entry = ledger
        .generate_sale_invoice_entry(&sale("F2024-001", 100, 20))
        .await
        .unwrap();
    let purchase_entry = ledger
        .generate_purchase_invoice_entry(&purchase("A2024-001", 100, 20))
        .await
        .unwrap();
    let next_year = ledger
        .create_manual_entry(
            EntryHeader::new(
                NaiveDate::from_ymd_opt(2025, 1, 2).unwrap(),
                "Vente",
                Journal::Vente,
            ),
            vec![
                JournalLine::debit("411000", "", BigDecimal::from(50)),
                JournalLine::credit("707000", "", BigDecimal::from(50)),
            ],
        )
        .await
        .unwrap();

    assert_eq!(sale_entry.number, "VE-2024-000001");
    assert_eq!(purchase_entry.number, "AC-2024-000001");
    assert_eq!(next_year.number, "VE-2025-000001");
}

#[tokio::test]
async fn test_manual_entry_round_trip() {
    let ledger = ledger().await;

    let created = ledger
        .create_manual_entry(
            EntryHeader::new(date(1, 31), "Loyer janvier", Journal::Banque)
                .reference("QUITTANCE-01")
                .third_party("bailleur", "SCI Les Tilleuls"),
            vec![
                JournalLine::debit("613000", "Loyer", "800.00".parse().unwrap()),
                JournalLine::credit("512000", "", "800.00".parse().unwrap()),
            ],
        )
        .await
        .unwrap();

    let listed = ledger.list_entries(&EntryFilter::default()).await.unwrap();
    assert_eq!(listed, vec![created.clone()]);

    let fetched = ledger.get_entry(&created.number).await.unwrap().unwrap();
    assert_eq!(fetched.reference.as_deref(), Some("QUITTANCE-01"));
    assert_eq!(fetched.third_party_label.as_deref(), Some("SCI Les Tilleuls"));
    assert_eq!(fetched.lines[0].label, "Loyer");
    assert_eq!(fetched.lines[1].label, "Loyer janvier");
    assert_eq!(fetched.journal_code, "BQ");
}

#[tokio::test]
async fn test_imbalanced_entry_rejected() {
    let ledger = ledger().await;

    let result = ledger
        .create_manual_entry(
            EntryHeader::new(date(1, 5), "Erreur de saisie", Journal::Od),
            vec![
                JournalLine::debit("607000", "", BigDecimal::from(100)),
                JournalLine::credit("401000", "", BigDecimal::from(90)),
            ],
        )
        .await;
    assert!(matches!(result, Err(LedgerError::ImbalancedEntry { .. })));

    // Within the default tolerance of 0.01
    let entry = ledger
        .create_manual_entry(
            EntryHeader::new(date(1, 5), "Arrondi", Journal::Od),
            vec![
                JournalLine::debit("607000", "", "100.00".parse().unwrap()),
                JournalLine::credit("401000", "", "99.99".parse().unwrap()),
            ],
        )
        .await
        .unwrap();
    assert_eq!(entry.number, "OD-2024-000001");
}

#[tokio::test]
async fn test_validation_lifecycle() {
    let ledger = ledger().await;
    let entry = ledger
        .generate_purchase_invoice_entry(&purchase("A2024-001", 600, 120))
        .await
        .unwrap();

    let validated = ledger.validate_entry(&entry.number).await.unwrap();
    assert_eq!(validated.status, EntryStatus::Validated);
    assert!(validated.validated_at.is_some());

    assert!(matches!(
        ledger.validate_entry(&entry.number).await,
        Err(LedgerError::AlreadyValidated(_))
    ));
    assert!(matches!(
        ledger.delete_draft_entry(&entry.number).await,
        Err(LedgerError::EntryLocked(_))
    ));
    assert!(matches!(
        ledger.validate_entry("AC-2024-999999").await,
        Err(LedgerError::EntryNotFound(_))
    ));

    let draft = ledger
        .generate_purchase_invoice_entry(&purchase("A2024-002", 100, 20))
        .await
        .unwrap();
    ledger.delete_draft_entry(&draft.number).await.unwrap();
    assert!(ledger.get_entry(&draft.number).await.unwrap().is_none());
}

#[tokio::test]
async fn test_payments_route_to_treasury_journals() {
    let ledger = ledger().await;

    let by_bank = ledger
        .generate_payment_received_entry(&payment("F2024-001", 217, PaymentMethod::Bank, 20))
        .await
        .unwrap();
    let by_cash = ledger
        .generate_payment_received_entry(&payment("F2024-002", 50, PaymentMethod::Cash, 21))
        .await
        .unwrap();
    let by_check = ledger
        .generate_payment_made_entry(&payment("A2024-001", 720, PaymentMethod::Check, 22))
        .await
        .unwrap();

    assert_eq!(by_bank.number, "BQ-2024-000001");
    assert!(by_bank.touches_account("512000") && by_bank.touches_account("411000"));
    assert_eq!(by_cash.number, "CA-2024-000001");
    assert!(by_cash.touches_account("530000"));
    assert_eq!(by_check.number, "BQ-2024-000002");
    assert!(by_check.touches_account("401000") && by_check.touches_account("512000"));

    let banque = ledger
        .list_entries(&EntryFilter::default().journal(Journal::Banque))
        .await
        .unwrap();
    assert_eq!(banque.len(), 2);
}

#[tokio::test]
async fn test_stock_movement_noop_and_posting() {
    let ledger = ledger().await;

    let mut order = StockMovementEvent {
        order_id: "order-1".to_string(),
        order_number: "CMD-2024-0042".to_string(),
        line_items: vec![
            StockLineItem {
                cost_price: Some(BigDecimal::from(12)),
                quantity: BigDecimal::from(10),
            },
            StockLineItem {
                cost_price: None,
                quantity: BigDecimal::from(3),
            },
        ],
        delivered_at: None,
    };

    // Undelivered orders post nothing
    assert!(ledger.generate_stock_movement_entry(&order).await.unwrap().is_none());

    order.delivered_at = Some(date(1, 25));
    let entry = ledger
        .generate_stock_movement_entry(&order)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(entry.journal, Journal::Od);
    assert_eq!(entry.total_debit(), BigDecimal::from(120));
    assert!(entry.touches_account("607000") && entry.touches_account("370000"));

    // No known cost, nothing to post
    order.line_items.retain(|item| item.cost_price.is_none());
    assert!(ledger.generate_stock_movement_entry(&order).await.unwrap().is_none());
    assert_eq!(ledger.list_entries(&EntryFilter::default()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_month_end_reports() {
    let ledger = ledger().await;

    let capital = ledger
        .create_manual_entry(
            EntryHeader::new(date(1, 2), "Apport en capital", Journal::Banque),
            vec![
                JournalLine::debit("512000", "", BigDecimal::from(10000)),
                JournalLine::credit("101000", "", BigDecimal::from(10000)),
            ],
        )
        .await
        .unwrap();
    let sale_entry = ledger
        .generate_sale_invoice_entry(&sale("F2024-001", 1000, 200))
        .await
        .unwrap();
    let purchase_entry = ledger
        .generate_purchase_invoice_entry(&purchase("A2024-001", 600, 120))
        .await
        .unwrap();
    let settlement = ledger
        .generate_payment_received_entry(&payment("F2024-001", 1200, PaymentMethod::Bank, 28))
        .await
        .unwrap();
    for entry in [&capital, &sale_entry, &purchase_entry, &settlement] {
        ledger.validate_entry(&entry.number).await.unwrap();
    }

    // A draft in the same month does not count
    ledger
        .generate_sale_invoice_entry(&sale("F2024-002", 5000, 1000))
        .await
        .unwrap();

    let filter = ReportFilter::parse(Some("2024-01-01"), Some("2024-01-31"));

    let income = ledger.get_income_statement(&filter).await.unwrap();
    assert_eq!(income.total_revenue, BigDecimal::from(1000));
    assert_eq!(income.total_expense, BigDecimal::from(600));
    assert_eq!(income.net_income, BigDecimal::from(400));

    let sheet = ledger.get_balance_sheet(&filter).await.unwrap();
    assert!(sheet.is_balanced);
    assert_eq!(sheet.total_assets, sheet.total_liabilities_and_equity);
    assert_eq!(sheet.total_assets, BigDecimal::from(11320));

    let general = ledger
        .get_general_ledger(&filter.clone().account_prefix("41"))
        .await
        .unwrap();
    assert_eq!(general.accounts.len(), 1);
    let receivable = &general.accounts[0];
    assert_eq!(receivable.account.code, "411000");
    assert_eq!(receivable.movements.len(), 2);
    assert_eq!(receivable.balance, BigDecimal::from(0));

    let stats = ledger.get_accounting_stats(&filter).await.unwrap();
    assert_eq!(stats.total_entries, 4);
    assert_eq!(stats.net_income, BigDecimal::from(400));
    assert_eq!(stats.entries_by_status.get(&EntryStatus::Draft), Some(&1));

    let integrity = ledger.validate_integrity(&filter).await.unwrap();
    assert!(integrity.is_valid);
    assert!(integrity.issues.is_empty());
}

#[tokio::test]
async fn test_empty_and_malformed_ranges() {
    let ledger = ledger().await;
    let entry = ledger
        .generate_sale_invoice_entry(&sale("F2024-001", 200, 17))
        .await
        .unwrap();
    ledger.validate_entry(&entry.number).await.unwrap();

    let reversed = ReportFilter::parse(Some("2024-12-31"), Some("2024-01-01"));
    let trial = ledger.get_trial_balance(&reversed).await.unwrap();
    assert!(trial.rows.is_empty());
    assert_eq!(trial.total_debit, BigDecimal::from(0));

    let malformed = ReportFilter::parse(Some("2024-13-01"), None);
    let income = ledger.get_income_statement(&malformed).await.unwrap();
    assert_eq!(income.net_income, BigDecimal::from(0));

    let sheet = ledger.get_balance_sheet(&malformed).await.unwrap();
    assert!(sheet.is_balanced);
    assert!(sheet.assets.is_empty());

    // A period without activity is all zeros, not an error
    let february = ReportFilter::new(DateRange::between(date(2, 1), date(2, 29)));
    let stats = ledger.get_accounting_stats(&february).await.unwrap();
    assert_eq!(stats.total_entries, 0);
    assert_eq!(stats.total_revenue, BigDecimal::from(0));
}

#[tokio::test]
async fn test_chart_initialization_and_listing() {
    let ledger = Ledger::new(MemoryStorage::new());
    let seeded = ledger.initialize_chart().await.unwrap();
    assert_eq!(seeded.len(), ledger.config().chart.len());

    assert!(matches!(
        ledger.initialize_chart().await,
        Err(LedgerError::AlreadyInitialized(_))
    ));

    let revenues = ledger
        .list_accounts(&AccountFilter::of_type(AccountType::Revenue))
        .await
        .unwrap();
    assert!(revenues.iter().all(|a| a.account_type == AccountType::Revenue));
    assert!(revenues.iter().any(|a| a.code == "707000"));

    let banks = ledger.list_accounts(&AccountFilter::search("banque")).await.unwrap();
    assert_eq!(banks.len(), 1);
    assert_eq!(banks[0].code, "512000");

    ledger.deactivate_account("512000").await.unwrap();
    let banks = ledger.list_accounts(&AccountFilter::search("512")).await.unwrap();
    assert!(banks.is_empty());
    let bank = ledger.find_account("512000").await.unwrap().unwrap();
    assert!(!bank.is_active);

    // Inactive accounts cannot be posted to
    let result = ledger
        .generate_payment_received_entry(&payment("F2024-001", 100, PaymentMethod::Bank, 20))
        .await;
    assert!(matches!(result, Err(LedgerError::MissingAccount(code)) if code == "512000"));
}

#[tokio::test]
async fn test_custom_config_and_validators() {
    let json = r#"{ "balance_tolerance": "0" }"#;
    let config = LedgerConfig::from_json_str(json).unwrap();

    let ledger = Ledger::with_validators(
        MemoryStorage::new(),
        config,
        Box::new(EnhancedAccountValidator),
        Box::new(EnhancedEntryValidator),
    )
    .unwrap();
    ledger.initialize_chart().await.unwrap();

    // Zero tolerance rejects a one-cent difference
    let result = ledger
        .create_manual_entry(
            EntryHeader::new(date(1, 5), "Arrondi", Journal::Od),
            vec![
                JournalLine::debit("607000", "", "100.00".parse().unwrap()),
                JournalLine::credit("401000", "", "99.99".parse().unwrap()),
            ],
        )
        .await;
    assert!(matches!(result, Err(LedgerError::ImbalancedEntry { .. })));

    // The enhanced validator refuses lines carrying both sides
    let result = ledger
        .create_manual_entry(
            EntryHeader::new(date(1, 5), "Ligne mixte", Journal::Od),
            vec![
                JournalLine::new("607000", "", BigDecimal::from(100), BigDecimal::from(50)),
                JournalLine::credit("401000", "", BigDecimal::from(50)),
            ],
        )
        .await;
    assert!(result.is_err());
}

struct AcceptAll;

impl EntryValidator for AcceptAll {
    fn validate_entry(
        &self,
        _header: &EntryHeader,
        _lines: &[JournalLine],
        _tolerance: &BigDecimal,
    ) -> LedgerResult<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_permissive_validator_still_enforces_balance() {
    let ledger = Ledger::with_validators(
        MemoryStorage::new(),
        LedgerConfig::default(),
        Box::new(EnhancedAccountValidator),
        Box::new(AcceptAll),
    )
    .unwrap();
    ledger.initialize_chart().await.unwrap();

    let result = ledger
        .create_manual_entry(
            EntryHeader::new(date(1, 5), "Achat", Journal::Od),
            vec![
                JournalLine::debit("607000", "", BigDecimal::from(100)),
                JournalLine::credit("401000", "", BigDecimal::from(1)),
            ],
        )
        .await;
    assert!(matches!(result, Err(LedgerError::ImbalancedEntry { .. })));
    assert!(ledger.list_entries(&EntryFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rounding_accepted_entry_keeps_reports_balanced() {
    let ledger = ledger().await;
    let entry = ledger
        .create_manual_entry(
            EntryHeader::new(date(1, 5), "Apport arrondi", Journal::Banque),
            vec![
                JournalLine::debit("512000", "", "100.00".parse().unwrap()),
                JournalLine::credit("101000", "", "99.99".parse().unwrap()),
            ],
        )
        .await
        .unwrap();
    ledger.validate_entry(&entry.number).await.unwrap();

    let filter = ReportFilter::new(DateRange::all());
    let trial = ledger.get_trial_balance(&filter).await.unwrap();
    assert!(trial.is_balanced);
    let sheet = ledger.get_balance_sheet(&filter).await.unwrap();
    assert!(sheet.is_balanced);

    let integrity = ledger.validate_integrity(&filter).await.unwrap();
    assert!(integrity.is_valid, "{:?}", integrity.issues);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_validation_succeeds_once() {
    let ledger = Arc::new(ledger().await);
    let entry = ledger
        .generate_sale_invoice_entry(&sale("F2024-001", 200, 17))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let ledger = Arc::clone(&ledger);
        let number = entry.number.clone();
        handles.push(tokio::spawn(async move { ledger.validate_entry(&number).await }));
    }

    let mut validated = Vec::new();
    let mut already = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(entry) => validated.push(entry),
            Err(LedgerError::AlreadyValidated(_)) => already += 1,
            Err(other) => panic!("unexpected error: {:?}", other),
        }
    }
    assert_eq!(validated.len(), 1);
    assert_eq!(already, 9);

    let stored = ledger.get_entry(&entry.number).await.unwrap().unwrap();
    assert_eq!(stored.status, EntryStatus::Validated);
    assert_eq!(stored.validated_at, validated[0].validated_at);
}

#[tokio::test]
async fn test_directly_allocated_number_leaves_gap() {
    let ledger = ledger().await;

    let reserved = ledger.allocate_entry_number("VE", 2024).await.unwrap();
    assert_eq!(reserved, "VE-2024-000001");

    let entry = ledger
        .generate_sale_invoice_entry(&sale("F2024-001", 200, 17))
        .await
        .unwrap();
    assert_eq!(entry.number, "VE-2024-000002");
    assert!(ledger.get_entry(&reserved).await.unwrap().is_none());
}
