//! Gift-card (voucher) lifecycle against the ledger.
//!
//! Storefront gift cards and ledger vouchers share one identifier: the
//! card's code is stored as the voucher correlative at creation time, so
//! every later state change can address the ledger directly.

use rust_decimal::Decimal;

use crate::client::LedgerClient;
use crate::error::LedgerError;
use crate::types::{Voucher, VoucherPayload, VoucherState};

/// Ledger-side voucher class for a gift-card amount.
///
/// The ledger models gift cards as pre-defined voucher classes per
/// denomination; unknown amounts land in the generic class 1.
#[must_use]
pub fn voucher_class_for_amount(amount: Decimal) -> i32 {
    if amount == Decimal::from(500) {
        9
    } else if amount == Decimal::from(1000) {
        10
    } else if amount == Decimal::from(2000) {
        12
    } else {
        1
    }
}

/// A storefront gift card, as handed over by the host commerce system.
#[derive(Debug, Clone)]
pub struct GiftCard {
    pub id: i64,
    /// The card code shown to the customer; becomes the voucher correlative.
    pub code: String,
    pub amount: Decimal,
    pub balance: Decimal,
}

/// Billing identity of the purchasing customer.
#[derive(Debug, Clone, Default)]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub id_document: Option<String>,
}

/// Gift-card operations over a [`LedgerClient`].
pub struct GiftCardLedger<'a> {
    client: &'a LedgerClient,
    /// Ledger audit user recorded on every mutation.
    user: String,
}

impl<'a> GiftCardLedger<'a> {
    pub fn new(client: &'a LedgerClient, user: impl Into<String>) -> Self {
        Self {
            client,
            user: user.into(),
        }
    }

    /// Creates the ledger voucher for a freshly generated gift card.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the ledger rejects or cannot be reached.
    pub async fn create_for_purchase(
        &self,
        card: &GiftCard,
        customer: &CustomerInfo,
    ) -> Result<Voucher, LedgerError> {
        let payload = VoucherPayload {
            correlative: card.code.clone(),
            amount: card.amount,
            state: VoucherState::Active,
            origin: "WEB".to_owned(),
            user: self.user.clone(),
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            phone: customer.phone.clone(),
            email: customer.email.clone(),
            id_document: customer.id_document.clone(),
        };

        tracing::info!(
            card_id = card.id,
            correlative = %card.code,
            class = voucher_class_for_amount(card.amount),
            "creating ledger voucher for gift card"
        );
        self.client.create_voucher(&payload).await
    }

    /// Whether the voucher behind a gift-card code is active.
    ///
    /// A voucher the ledger does not know, or a ledger that cannot be
    /// reached, counts as inactive — an unverifiable card must not be
    /// redeemable.
    pub async fn is_active(&self, code: &str) -> bool {
        match self.client.get_voucher(code).await {
            Ok(Some(voucher)) => voucher.is_active(),
            Ok(None) => {
                tracing::warn!(correlative = %code, "voucher not found in ledger");
                false
            }
            Err(e) => {
                tracing::error!(correlative = %code, error = %e, "voucher lookup failed");
                false
            }
        }
    }

    /// Marks a voucher inactive with an audit reason.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the update fails.
    pub async fn mark_inactive(&self, code: &str, reason: &str) -> Result<(), LedgerError> {
        self.client
            .update_voucher_status(code, VoucherState::Inactive, reason, &self.user)
            .await
    }

    /// Pushes a gift card's balance-derived state to the ledger: active
    /// while a balance remains, inactive once spent.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError`] when the update fails.
    pub async fn sync_balance(
        &self,
        code: &str,
        balance: Decimal,
    ) -> Result<VoucherState, LedgerError> {
        let state = if balance > Decimal::ZERO {
            VoucherState::Active
        } else {
            VoucherState::Inactive
        };
        self.client
            .update_voucher_status(code, state, "Balance synchronization", &self.user)
            .await?;
        Ok(state)
    }

    /// Marks every gift card redeemed in an order inactive, referencing the
    /// order in the audit reason. Per-card failures are logged and skipped so
    /// one unreachable voucher does not block the rest.
    pub async fn redeem_for_order(&self, order_id: i64, codes: &[String]) {
        for code in codes {
            let reason = format!("Redeemed in order #{order_id}");
            if let Err(e) = self.mark_inactive(code, &reason).await {
                tracing::error!(
                    order_id,
                    correlative = %code,
                    error = %e,
                    "failed to deactivate redeemed voucher"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voucher_class_covers_known_denominations() {
        assert_eq!(voucher_class_for_amount(Decimal::from(500)), 9);
        assert_eq!(voucher_class_for_amount(Decimal::from(1000)), 10);
        assert_eq!(voucher_class_for_amount(Decimal::from(2000)), 12);
        assert_eq!(voucher_class_for_amount(Decimal::from(750)), 1);
        assert_eq!(voucher_class_for_amount(Decimal::ZERO), 1);
    }
}
