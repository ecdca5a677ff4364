//! Business events consumed by the auto-entry generators
//!
//! These are raised by the invoicing, payment and delivery collaborators and
//! are read-only inputs to the engine.

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sale or purchase invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceEvent {
    pub id: String,
    /// Invoice number printed on the document
    pub number: String,
    pub date: NaiveDate,
    /// Pre-tax amount (HT)
    pub subtotal: BigDecimal,
    pub tax_amount: BigDecimal,
    /// Tax-inclusive amount (TTC)
    pub total: BigDecimal,
    pub counterparty_id: String,
    pub counterparty_name: String,
}

pub type SaleInvoiceEvent = InvoiceEvent;
pub type PurchaseInvoiceEvent = InvoiceEvent;

/// How a payment was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Bank,
    Cash,
    Check,
}

/// Payment received from a customer or made to a supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentEvent {
    /// Sale invoice (payment received) or purchase invoice (payment made) id
    pub invoice_or_purchase_id: String,
    /// Number of the settled document
    pub document_number: String,
    pub amount: BigDecimal,
    pub method: PaymentMethod,
    pub date: NaiveDate,
    pub counterparty_id: Option<String>,
    pub counterparty_name: Option<String>,
}

/// Delivered order line with its unit cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLineItem {
    /// Unit cost price; unknown costs are left out of the cost of goods sold
    pub cost_price: Option<BigDecimal>,
    pub quantity: BigDecimal,
}

/// Stock leaving the warehouse on order delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMovementEvent {
    pub order_id: String,
    pub order_number: String,
    pub line_items: Vec<StockLineItem>,
    /// Delivery date; `None` while the order is not delivered
    pub delivered_at: Option<NaiveDate>,
}

impl StockMovementEvent {
    /// Cost of goods sold, `Σ cost_price × quantity` over lines with a known cost
    pub fn total_cost(&self) -> BigDecimal {
        self.line_items
            .iter()
            .filter_map(|item| item.cost_price.as_ref().map(|cost| cost * &item.quantity))
            .sum()
    }
}
