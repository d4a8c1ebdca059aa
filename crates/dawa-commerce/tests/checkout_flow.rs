use async_trait::async_trait;
use dawa_commerce::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Order service that records every call and answers with a canned result.
struct ScriptedOrders {
    calls: AtomicUsize,
    requests: Mutex<Vec<CreateOrderRequest>>,
    result: Result<OrderReceipt, OrderFailure>,
    delay: Duration,
}

impl ScriptedOrders {
    fn accepting() -> Self {
        Self::with_result(Ok(OrderReceipt {
            id: OrderId::new("ord_42"),
            order_number: "MP-2024-0042".into(),
            status: OrderStatus::Pending,
            total: Money::kes(2900),
            created_at: "2024-05-01T10:00:00Z".into(),
            estimated_delivery: Some("2024-05-03".into()),
        }))
    }

    fn failing(code: &str) -> Self {
        Self::with_result(Err(OrderFailure::from_server(Some(code), Some("rejected"))))
    }

    fn with_result(result: Result<OrderReceipt, OrderFailure>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            result,
            delay: Duration::from_millis(5),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OrderService for ScriptedOrders {
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderReceipt, OrderFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.delay).await;
        self.result.clone()
    }
}

fn two_line_cart() -> CartStore {
    let mut cart = CartStore::in_memory();
    cart.add_item(ProductId::new("p1"), "Amoxicillin 250mg", Money::kes(850), 2, None)
        .unwrap();
    cart.add_item(ProductId::new("p2"), "Blood pressure monitor", Money::kes(1200), 1, None)
        .unwrap();
    cart
}

fn shipping() -> ShippingForm {
    ShippingForm {
        full_name: "Amina Hassan".into(),
        email: "amina@example.co.ke".into(),
        phone: "0722 000 111".into(),
        address: "Nyerere Road 14".into(),
        city: "Mombasa".into(),
        postal_code: "80100".into(),
        notes: Some("Leave with the guard".into()),
    }
}

fn confirmed(cart: &CartStore) -> Mutex<CheckoutSequencer> {
    let mut seq = CheckoutSequencer::start(&cart.snapshot()).unwrap();
    seq.submit_shipping(shipping()).unwrap();
    seq.submit_payment(PaymentForm::new(PaymentMethod::CashOnDelivery))
        .unwrap();
    Mutex::new(seq)
}

#[tokio::test]
async fn test_two_line_cart_places_order_and_clears_on_view_orders() {
    let mut cart = two_line_cart();
    let snapshot = cart.snapshot();
    assert_eq!(snapshot.subtotal, Money::kes(2900));
    assert!(delivery_fee(snapshot.subtotal).is_zero());
    assert_eq!(grand_total(snapshot.subtotal), Money::kes(2900));

    let orders = ScriptedOrders::accepting();
    let seq = confirmed(&cart);

    let outcome = place_order(&seq, true, &snapshot, &orders, None).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Placed(_)));

    let mut seq = seq.into_inner().unwrap();
    assert_eq!(seq.step(), CheckoutStep::Placed);
    assert_eq!(seq.order_number(), Some("MP-2024-0042"));
    // Cart is kept until the shopper navigates away.
    assert_eq!(cart.len(), 2);

    seq.finish(Navigation::ViewOrders, &mut cart).unwrap();
    assert!(cart.is_empty());

    let sent = orders.requests.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].items.len(), 2);
    assert_eq!(sent[0].total, Money::kes(2900));
}

#[tokio::test]
async fn test_double_submit_calls_service_once() {
    let cart = two_line_cart();
    let snapshot = cart.snapshot();
    let orders = ScriptedOrders::accepting();
    let seq = confirmed(&cart);

    let (first, second) = futures::join!(
        place_order(&seq, true, &snapshot, &orders, None),
        place_order(&seq, true, &snapshot, &orders, None),
    );

    assert_eq!(orders.calls(), 1);
    assert!(matches!(first.unwrap(), SubmitOutcome::Placed(_)));
    assert_eq!(second.unwrap(), SubmitOutcome::AlreadySubmitting);
}

#[tokio::test]
async fn test_product_not_found_keeps_confirmation() {
    let cart = two_line_cart();
    let snapshot = cart.snapshot();
    let orders = ScriptedOrders::failing("PRODUCT_NOT_FOUND");
    let seq = confirmed(&cart);

    let outcome = place_order(&seq, true, &snapshot, &orders, None).await.unwrap();
    match outcome {
        SubmitOutcome::Failed(failure) => {
            assert_eq!(failure.code, OrderErrorCode::ProductNotFound);
            assert!(failure.user_message().contains("no longer available"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }

    let seq = seq.lock().unwrap();
    assert_eq!(seq.step(), CheckoutStep::Confirmation);
    assert!(!seq.is_submitting());
    assert_eq!(cart.snapshot(), snapshot);
}

#[tokio::test]
async fn test_retry_after_failure_needs_no_reentry() {
    let cart = two_line_cart();
    let snapshot = cart.snapshot();
    let seq = confirmed(&cart);

    let failing = ScriptedOrders::failing("INTERNAL");
    let outcome = place_order(&seq, true, &snapshot, &failing, None).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Failed(ref f) if f.is_retryable()));

    let accepting = ScriptedOrders::accepting();
    let outcome = place_order(&seq, true, &snapshot, &accepting, None).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Placed(_)));
}

#[tokio::test]
async fn test_timeout_is_unclassified_failure() {
    let cart = two_line_cart();
    let snapshot = cart.snapshot();
    let seq = confirmed(&cart);
    let mut slow = ScriptedOrders::accepting();
    slow.delay = Duration::from_secs(5);

    let outcome = place_order(&seq, true, &snapshot, &slow, Some(Duration::from_millis(20)))
        .await
        .unwrap();
    match outcome {
        SubmitOutcome::Failed(failure) => {
            assert_eq!(failure.code, OrderErrorCode::Unclassified);
            assert!(failure.detail.contains("timed out"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(seq.lock().unwrap().step(), CheckoutStep::Confirmation);
}

/// Order service whose call never completes.
struct HangingOrders;

#[async_trait]
impl OrderService for HangingOrders {
    async fn create_order(&self, _request: &CreateOrderRequest) -> Result<OrderReceipt, OrderFailure> {
        futures::future::pending().await
    }
}

#[tokio::test]
async fn test_cancelled_submission_releases_slot() {
    let cart = two_line_cart();
    let snapshot = cart.snapshot();
    let seq = confirmed(&cart);

    let cancelled = tokio::time::timeout(
        Duration::from_millis(10),
        place_order(&seq, true, &snapshot, &HangingOrders, None),
    )
    .await;
    assert!(cancelled.is_err());
    assert!(!seq.lock().unwrap().is_submitting());

    let orders = ScriptedOrders::accepting();
    let outcome = place_order(&seq, true, &snapshot, &orders, None).await.unwrap();
    assert!(matches!(outcome, SubmitOutcome::Placed(_)));
    assert_eq!(orders.calls(), 1);
}

#[tokio::test]
async fn test_cancelled_submission_allows_back_navigation() {
    let cart = two_line_cart();
    let snapshot = cart.snapshot();
    let seq = confirmed(&cart);

    let _ = tokio::time::timeout(
        Duration::from_millis(10),
        place_order(&seq, true, &snapshot, &HangingOrders, None),
    )
    .await;
    assert_eq!(seq.lock().unwrap().back(), Ok(CheckoutStep::Payment));
}

#[tokio::test]
async fn test_terms_must_be_accepted() {
    let cart = two_line_cart();
    let snapshot = cart.snapshot();
    let orders = ScriptedOrders::accepting();
    let seq = confirmed(&cart);

    let result = place_order(&seq, false, &snapshot, &orders, None).await;
    assert_eq!(result.unwrap_err(), CheckoutError::TermsNotAccepted);
    assert_eq!(orders.calls(), 0);
}

#[test]
fn test_request_wire_format() {
    let cart = two_line_cart();
    let snapshot = cart.snapshot();
    let mut seq = CheckoutSequencer::start(&snapshot).unwrap();
    seq.submit_shipping(shipping()).unwrap();
    seq.submit_payment(PaymentForm {
        method: PaymentMethod::Mpesa,
        phone: "0712345678".into(),
        card_token: String::new(),
    })
    .unwrap();
    let ticket = seq.begin_submission(true, &snapshot).unwrap();

    let json = serde_json::to_value(&ticket.request).unwrap();
    assert_eq!(json["items"][0]["productId"], "p1");
    assert_eq!(json["items"][0]["quantity"], 2);
    assert_eq!(json["items"][0]["price"].as_f64(), Some(850.0));
    assert_eq!(json["payment"], serde_json::json!({"method": "mpesa", "phone": "0712345678"}));
    assert_eq!(json["shipping"]["fullName"], "Amina Hassan");
    assert_eq!(json["total"].as_f64(), Some(2900.0));
}
