pub mod checkout;
pub mod client;
pub mod error;
pub mod giftcard;
pub mod orders;
pub mod types;

pub use checkout::{verify_cart_stock, CartLine, StockShortage};
pub use client::LedgerClient;
pub use error::LedgerError;
pub use giftcard::{voucher_class_for_amount, CustomerInfo, GiftCard, GiftCardLedger};
pub use orders::{build_sale_payload, register_sale, Order, OrderAnnotation, OrderLine};
pub use types::{
    PaymentType, SaleLine, SalePayload, Voucher, VoucherPayload, VoucherState,
};
