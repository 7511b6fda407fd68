//! Wire types for the Colibri sales/voucher ledger.
//!
//! Field names follow the ledger's API contract verbatim (`nombre`,
//! `valCorrelativo`, …); the Rust-side names describe what they hold.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Payment type code the ledger expects on a sale: cash (`E`) or card (`T`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentType {
    #[serde(rename = "E")]
    Cash,
    #[serde(rename = "T")]
    Card,
}

/// One sold line item.
#[derive(Debug, Clone, Serialize)]
pub struct SaleLine {
    pub sku: String,
    #[serde(rename = "precio")]
    pub unit_price: Decimal,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
}

/// A completed storefront order, mapped for `POST /createSale`.
#[derive(Debug, Clone, Serialize)]
pub struct SalePayload {
    #[serde(rename = "nombre")]
    pub customer_name: String,
    #[serde(rename = "celular")]
    pub phone: String,
    #[serde(rename = "email1")]
    pub email: String,
    #[serde(rename = "carnet")]
    pub id_document: Option<String>,
    #[serde(rename = "productos")]
    pub lines: Vec<SaleLine>,
    #[serde(rename = "tipoPago")]
    pub payment_type: PaymentType,
    #[serde(rename = "montoPagado")]
    pub total_paid: Decimal,
}

/// Voucher lifecycle state: active (`A`) or inactive (`I`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoucherState {
    #[serde(rename = "A")]
    Active,
    #[serde(rename = "I")]
    Inactive,
}

/// Creation payload for `POST /api/vales`.
#[derive(Debug, Clone, Serialize)]
pub struct VoucherPayload {
    /// The storefront gift-card code doubles as the ledger correlative so
    /// both systems address the voucher by the same identifier.
    #[serde(rename = "valCorrelativo")]
    pub correlative: String,
    #[serde(rename = "monto")]
    pub amount: Decimal,
    #[serde(rename = "valEstado")]
    pub state: VoucherState,
    #[serde(rename = "valOrigen")]
    pub origin: String,
    #[serde(rename = "usuario")]
    pub user: String,
    #[serde(rename = "nombre")]
    pub first_name: String,
    #[serde(rename = "apellidos")]
    pub last_name: String,
    #[serde(rename = "whatsapp")]
    pub phone: String,
    #[serde(rename = "email")]
    pub email: String,
    #[serde(rename = "cedula")]
    pub id_document: Option<String>,
}

/// A voucher as returned by the ledger.
#[derive(Debug, Clone, Deserialize)]
pub struct Voucher {
    #[serde(rename = "valId", default)]
    pub id: Option<i64>,
    #[serde(rename = "valCorrelativo")]
    pub correlative: String,
    #[serde(rename = "valEstado")]
    pub state: VoucherState,
    #[serde(rename = "monto", default)]
    pub amount: Option<Decimal>,
}

impl Voucher {
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == VoucherState::Active
    }
}

/// Update payload for `PUT /api/vales/{correlativo}/status`.
#[derive(Debug, Clone, Serialize)]
pub struct VoucherStatusUpdate {
    #[serde(rename = "nuevoEstado")]
    pub new_state: VoucherState,
    #[serde(rename = "motivo")]
    pub reason: String,
    #[serde(rename = "usuario")]
    pub user: String,
}
