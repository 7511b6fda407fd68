//! Order-to-sale mapping: a completed storefront order becomes a ledger sale.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::client::LedgerClient;
use crate::types::{PaymentType, SaleLine, SalePayload};

/// One order line as handed over by the storefront.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLine {
    /// Storefront line identity; used as the SKU fallback when no SKU is set.
    pub line_id: i64,
    pub sku: Option<String>,
    pub quantity: u32,
    /// Per-unit subtotal price, before order-level discounts.
    pub unit_price: Decimal,
}

/// A completed storefront order with the billing fields the ledger needs.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: i64,
    pub billing_first_name: String,
    pub billing_last_name: String,
    pub billing_phone: String,
    pub billing_email: String,
    /// National ID / tax document, when the checkout collected one.
    pub id_document: Option<String>,
    /// Storefront payment-gateway identifier, e.g. `"cod"` or `"stripe"`.
    pub payment_method: String,
    pub total: Decimal,
    pub lines: Vec<OrderLine>,
}

/// The HTTP outcome of a sale registration, phrased for attachment to the
/// order as a note. Registration never fails the order-completed handler;
/// the annotation is the whole result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderAnnotation {
    pub ok: bool,
    pub note: String,
}

/// Maps a storefront payment-gateway id to the ledger's payment code.
///
/// Card processors map to `T`; everything else (cash on delivery, bank
/// transfer, cheques, unknown gateways) is treated as cash `E`.
#[must_use]
pub fn payment_type_for(payment_method: &str) -> PaymentType {
    let method = payment_method.to_ascii_lowercase();
    if method.contains("card") || method.contains("stripe") || method.contains("tarjeta") {
        PaymentType::Card
    } else {
        PaymentType::Cash
    }
}

/// Builds the `createSale` payload from an order.
#[must_use]
pub fn build_sale_payload(order: &Order) -> SalePayload {
    let lines = order
        .lines
        .iter()
        .map(|line| SaleLine {
            sku: line
                .sku
                .clone()
                .unwrap_or_else(|| line.line_id.to_string()),
            unit_price: line.unit_price,
            quantity: line.quantity,
        })
        .collect();

    SalePayload {
        customer_name: format!("{} {}", order.billing_first_name, order.billing_last_name),
        phone: order.billing_phone.clone(),
        email: order.billing_email.clone(),
        id_document: order.id_document.clone(),
        lines,
        payment_type: payment_type_for(&order.payment_method),
        total_paid: order.total,
    }
}

/// Registers an order as a sale and returns the annotation to attach to it.
///
/// Never returns an error: connectivity failures, rejections, and successes
/// all become annotations, mirroring how the order history records the
/// outcome either way.
pub async fn register_sale(client: &LedgerClient, order: &Order) -> OrderAnnotation {
    let payload = build_sale_payload(order);

    match client.create_sale(&payload).await {
        Ok(body) => {
            tracing::info!(order_id = order.id, "sale registered in ledger");
            OrderAnnotation {
                ok: true,
                note: format!("Sale registered in Colibri. Response: {body}"),
            }
        }
        Err(e) => {
            tracing::error!(order_id = order.id, error = %e, "sale registration failed");
            OrderAnnotation {
                ok: false,
                note: format!("Failed to register sale in Colibri: {e}"),
            }
        }
    }
}
