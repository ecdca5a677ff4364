//! Auto-entry generators
//!
//! Each generator is a pure mapping from a business event to a balanced
//! [`EntryDraft`]. Every account is resolved through the [`ChartLookup`]
//! before any line is built, so a missing or inactive account fails the
//! whole mapping with [`LedgerError::MissingAccount`].
//!
//! | Event            | Debit                              | Credit                             |
//! |------------------|------------------------------------|------------------------------------|
//! | Sale invoice     | receivable (TTC)                   | sales (HT) + VAT collected (tax)   |
//! | Purchase invoice | purchases (HT) + VAT deductible    | supplier payable (TTC)             |
//! | Payment received | bank or cash                       | receivable                         |
//! | Payment made     | supplier payable                   | bank or cash                       |
//! | Stock movement   | cost of goods sold                 | inventory                          |

use bigdecimal::BigDecimal;

use crate::config::AccountMapping;
use crate::events::*;
use crate::ledger::journal::EntryBuilder;
use crate::traits::*;
use crate::types::*;

/// Everything a generator needs besides the event itself
pub struct PostingContext<'a> {
    pub accounts: &'a AccountMapping,
    pub chart: &'a dyn ChartLookup,
    pub tolerance: &'a BigDecimal,
}

impl PostingContext<'_> {
    fn require(&self, code: &str) -> LedgerResult<String> {
        self.chart.require(code).map(|account| account.code.clone())
    }

    /// Treasury account and journal for a payment method; checks go to the bank
    fn treasury(&self, method: PaymentMethod) -> (&str, Journal) {
        match method {
            PaymentMethod::Cash => (self.accounts.cash.as_str(), Journal::Caisse),
            PaymentMethod::Bank | PaymentMethod::Check => {
                (self.accounts.bank.as_str(), Journal::Banque)
            }
        }
    }
}

/// Sale invoice: debit receivable TTC, credit sales HT and VAT collected
pub fn sale_invoice(event: &SaleInvoiceEvent, ctx: &PostingContext<'_>) -> LedgerResult<EntryDraft> {
    let receivable = ctx.require(&ctx.accounts.customer_receivable)?;
    let sales = ctx.require(&ctx.accounts.sales_revenue)?;
    let vat = ctx.require(&ctx.accounts.vat_collected)?;

    EntryBuilder::new(
        event.date,
        format!("Facture de vente n°{} - {}", event.number, event.counterparty_name),
        Journal::Vente,
    )
    .reference(format!("FAC-{}", event.number))
    .third_party(&event.counterparty_id, &event.counterparty_name)
    .debit(&receivable, event.total.clone(), Some(format!("Facture {}", event.number)))
    .credit(&sales, event.subtotal.clone(), Some(format!("Vente {}", event.number)))
    .credit(&vat, event.tax_amount.clone(), Some(format!("TVA s/vente {}", event.number)))
    .skip_zero_lines()
    .build(ctx.tolerance)
}

/// Purchase invoice: debit purchases HT and VAT deductible, credit payable TTC
pub fn purchase_invoice(
    event: &PurchaseInvoiceEvent,
    ctx: &PostingContext<'_>,
) -> LedgerResult<EntryDraft> {
    let purchases = ctx.require(&ctx.accounts.purchases)?;
    let vat = ctx.require(&ctx.accounts.vat_deductible)?;
    let payable = ctx.require(&ctx.accounts.supplier_payable)?;

    EntryBuilder::new(
        event.date,
        format!("Facture d'achat n°{} - {}", event.number, event.counterparty_name),
        Journal::Achat,
    )
    .reference(format!("ACH-{}", event.number))
    .third_party(&event.counterparty_id, &event.counterparty_name)
    .debit(&purchases, event.subtotal.clone(), Some(format!("Achat {}", event.number)))
    .debit(&vat, event.tax_amount.clone(), Some(format!("TVA s/achat {}", event.number)))
    .credit(&payable, event.total.clone(), Some(format!("Facture {}", event.number)))
    .skip_zero_lines()
    .build(ctx.tolerance)
}

/// Customer payment: debit bank or cash, credit receivable
pub fn payment_received(event: &PaymentEvent, ctx: &PostingContext<'_>) -> LedgerResult<EntryDraft> {
    let (treasury, journal) = ctx.treasury(event.method);
    let treasury = ctx.require(treasury)?;
    let receivable = ctx.require(&ctx.accounts.customer_receivable)?;

    let line_label = format!("Règlement {}", event.document_number);
    let builder = EntryBuilder::new(
        event.date,
        payment_label("Règlement facture", event),
        journal,
    )
    .reference(format!("REG-{}", event.document_number));

    with_counterparty(builder, event)
        .debit(&treasury, event.amount.clone(), Some(line_label.clone()))
        .credit(&receivable, event.amount.clone(), Some(line_label))
        .build(ctx.tolerance)
}

/// Supplier payment: debit payable, credit bank or cash
pub fn payment_made(event: &PaymentEvent, ctx: &PostingContext<'_>) -> LedgerResult<EntryDraft> {
    let (treasury, journal) = ctx.treasury(event.method);
    let treasury = ctx.require(treasury)?;
    let payable = ctx.require(&ctx.accounts.supplier_payable)?;

    let line_label = format!("Paiement {}", event.document_number);
    let builder = EntryBuilder::new(
        event.date,
        payment_label("Paiement facture", event),
        journal,
    )
    .reference(format!("PAIE-{}", event.document_number));

    with_counterparty(builder, event)
        .debit(&payable, event.amount.clone(), Some(line_label.clone()))
        .credit(&treasury, event.amount.clone(), Some(line_label))
        .build(ctx.tolerance)
}

/// Delivered order: debit cost of goods sold, credit inventory.
///
/// Returns `Ok(None)` when the order is not delivered or carries no cost;
/// missing cost data is not an error.
pub fn stock_movement(
    event: &StockMovementEvent,
    ctx: &PostingContext<'_>,
) -> LedgerResult<Option<EntryDraft>> {
    let Some(delivered_at) = event.delivered_at else {
        return Ok(None);
    };

    let total_cost = event.total_cost();
    if total_cost <= BigDecimal::from(0) {
        return Ok(None);
    }

    let cogs = ctx.require(&ctx.accounts.cost_of_goods_sold)?;
    let inventory = ctx.require(&ctx.accounts.inventory)?;

    EntryBuilder::new(
        delivered_at,
        format!("Sortie stock - Commande {}", event.order_number),
        Journal::Od,
    )
    .reference(format!("CMD-{}", event.order_number))
    .debit(&cogs, total_cost.clone(), Some(format!("CMV commande {}", event.order_number)))
    .credit(&inventory, total_cost, Some(format!("Sortie stock {}", event.order_number)))
    .build(ctx.tolerance)
    .map(Some)
}

fn payment_label(prefix: &str, event: &PaymentEvent) -> String {
    match &event.counterparty_name {
        Some(name) => format!("{} {} - {}", prefix, event.document_number, name),
        None => format!("{} {}", prefix, event.document_number),
    }
}

fn with_counterparty(builder: EntryBuilder, event: &PaymentEvent) -> EntryBuilder {
    match &event.counterparty_id {
        Some(code) => {
            let label = event.counterparty_name.clone().unwrap_or_else(|| code.clone());
            builder.third_party(code, label)
        }
        None => builder,
    }
}
