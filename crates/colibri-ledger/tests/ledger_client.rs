//! Integration tests for `LedgerClient` and the flows built on it.
//!
//! Uses `wiremock` to stand up a local HTTP server per test.

use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use colibri_ledger::{
    register_sale, verify_cart_stock, CartLine, CustomerInfo, GiftCard, GiftCardLedger,
    LedgerClient, LedgerError, Order, OrderLine, VoucherState,
};

fn test_client(base: &str) -> LedgerClient {
    LedgerClient::new(base, 5).expect("failed to build test LedgerClient")
}

fn test_order() -> Order {
    Order {
        id: 42,
        billing_first_name: "Ana".to_owned(),
        billing_last_name: "Rojas".to_owned(),
        billing_phone: "70000000".to_owned(),
        billing_email: "ana@example.com".to_owned(),
        id_document: None,
        payment_method: "stripe".to_owned(),
        total: Decimal::from(60),
        lines: vec![OrderLine {
            line_id: 1,
            sku: Some("A1".to_owned()),
            quantity: 2,
            unit_price: Decimal::from(30),
        }],
    }
}

// ---------------------------------------------------------------------------
// create_sale / register_sale
// ---------------------------------------------------------------------------

#[tokio::test]
async fn register_sale_posts_mapped_payload_and_annotates_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/createSale"))
        .and(body_partial_json(json!({
            "nombre": "Ana Rojas",
            "tipoPago": "T",
            "productos": [{ "sku": "A1", "cantidad": 2 }]
        })))
        .respond_with(ResponseTemplate::new(201).set_body_string(r#"{"saleId":9}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let annotation = register_sale(&client, &test_order()).await;

    assert!(annotation.ok);
    assert!(
        annotation.note.contains("saleId"),
        "annotation must carry the ledger response, got: {}",
        annotation.note
    );
}

#[tokio::test]
async fn register_sale_annotates_failure_without_erroring() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/createSale"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let annotation = register_sale(&client, &test_order()).await;

    assert!(!annotation.ok);
    assert!(annotation.note.contains("500"));
}

// ---------------------------------------------------------------------------
// check_stock / verify_cart_stock
// ---------------------------------------------------------------------------

#[tokio::test]
async fn check_stock_reads_the_stock_field() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checkStock"))
        .and(query_param("sku", "A1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({ "stock": 7 })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    assert_eq!(client.check_stock("A1").await.unwrap(), 7);
}

#[tokio::test]
async fn cart_verification_reports_shortages_and_treats_errors_as_zero() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/checkStock"))
        .and(query_param("sku", "OK"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({ "stock": 5 })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/checkStock"))
        .and(query_param("sku", "LOW"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({ "stock": 1 })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/checkStock"))
        .and(query_param("sku", "ERR"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let lines = vec![
        CartLine {
            sku: "OK".to_owned(),
            name: "In stock".to_owned(),
            quantity: 2,
        },
        CartLine {
            sku: "LOW".to_owned(),
            name: "Scarce".to_owned(),
            quantity: 3,
        },
        CartLine {
            sku: "ERR".to_owned(),
            name: "Unverifiable".to_owned(),
            quantity: 1,
        },
    ];

    let shortages = verify_cart_stock(&client, &lines).await;

    assert_eq!(shortages.len(), 2);
    assert_eq!(shortages[0].sku, "LOW");
    assert_eq!(shortages[0].available, 1);
    assert_eq!(shortages[1].sku, "ERR");
    assert_eq!(shortages[1].available, 0, "lookup failure counts as no stock");
}

// ---------------------------------------------------------------------------
// voucher lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn gift_card_purchase_creates_an_active_voucher() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/vales"))
        .and(body_partial_json(json!({
            "valCorrelativo": "WEB-GC-500-7",
            "valEstado": "A",
            "valOrigen": "WEB"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(&json!({
            "valId": 123,
            "valCorrelativo": "WEB-GC-500-7",
            "valEstado": "A"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ledger = GiftCardLedger::new(&client, "web-plugin");
    let card = GiftCard {
        id: 7,
        code: "WEB-GC-500-7".to_owned(),
        amount: Decimal::from(500),
        balance: Decimal::from(500),
    };

    let voucher = ledger
        .create_for_purchase(&card, &CustomerInfo::default())
        .await
        .unwrap();

    assert_eq!(voucher.id, Some(123));
    assert!(voucher.is_active());
}

#[tokio::test]
async fn voucher_create_rejection_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/vales"))
        .respond_with(ResponseTemplate::new(409).set_body_string("duplicate"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ledger = GiftCardLedger::new(&client, "web-plugin");
    let card = GiftCard {
        id: 7,
        code: "WEB-GC-500-7".to_owned(),
        amount: Decimal::from(500),
        balance: Decimal::from(500),
    };

    let err = ledger
        .create_for_purchase(&card, &CustomerInfo::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::UnexpectedStatus { status: 409, .. }));
}

#[tokio::test]
async fn unknown_or_unreachable_voucher_is_not_active() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/vales/MISSING"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ledger = GiftCardLedger::new(&client, "web-plugin");

    assert!(!ledger.is_active("MISSING").await);

    // Entirely unreachable ledger: also not active.
    let dead_client = LedgerClient::new("http://127.0.0.1:9", 1).unwrap();
    let dead_ledger = GiftCardLedger::new(&dead_client, "web-plugin");
    assert!(!dead_ledger.is_active("ANY").await);
}

#[tokio::test]
async fn active_voucher_validates_for_redemption() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/vales/WEB-GC-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "valCorrelativo": "WEB-GC-1",
            "valEstado": "A"
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ledger = GiftCardLedger::new(&client, "web-plugin");
    assert!(ledger.is_active("WEB-GC-1").await);
}

#[tokio::test]
async fn balance_sync_sends_the_derived_state() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/vales/WEB-GC-1/status"))
        .and(body_partial_json(json!({ "nuevoEstado": "I" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ledger = GiftCardLedger::new(&client, "web-plugin");

    let state = ledger
        .sync_balance("WEB-GC-1", Decimal::ZERO)
        .await
        .unwrap();
    assert_eq!(state, VoucherState::Inactive);
}

#[tokio::test]
async fn order_redemption_deactivates_every_voucher_despite_failures() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/api/vales/GOOD/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/api/vales/BAD/status"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let ledger = GiftCardLedger::new(&client, "web-plugin");

    // BAD fails first; GOOD must still be attempted.
    ledger
        .redeem_for_order(42, &["BAD".to_owned(), "GOOD".to_owned()])
        .await;
}
