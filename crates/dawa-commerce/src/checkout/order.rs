//! Order types and the order-service seams.

use super::payment::PaymentInfo;
use super::shipping::ShippingInfo;
use crate::cart::{CartLine, CartSnapshot};
use crate::ids::{OrderId, ProductId, UserId};
use crate::money::{major_units, Money};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OrderStatus {
    /// Order placed, awaiting processing.
    #[default]
    #[serde(rename = "PENDING", alias = "pending")]
    Pending,
    /// Order confirmed by the pharmacy.
    #[serde(rename = "CONFIRMED", alias = "confirmed")]
    Confirmed,
    /// Order being prepared.
    #[serde(rename = "PROCESSING", alias = "processing")]
    Processing,
    /// Order shipped.
    #[serde(rename = "SHIPPED", alias = "shipped")]
    Shipped,
    /// Order delivered.
    #[serde(rename = "DELIVERED", alias = "delivered")]
    Delivered,
    /// Order cancelled.
    #[serde(rename = "CANCELLED", alias = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Check if order can be cancelled.
    pub fn can_cancel(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One order line as the API sends and receives it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    #[serde(alias = "id")]
    pub product_id: ProductId,
    #[serde(default)]
    pub name: String,
    pub quantity: i64,
    /// Unit price.
    #[serde(with = "major_units")]
    pub price: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<&CartLine> for OrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            price: line.unit_price,
            image_url: line.image_ref.clone(),
        }
    }
}

/// Body of `POST /orders`.
///
/// `total` is the products subtotal; the delivery fee is settled on
/// delivery and is not part of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<OrderLine>,
    pub shipping: ShippingInfo,
    pub payment: PaymentInfo,
    #[serde(with = "major_units")]
    pub total: Money,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "user_id_wire"
    )]
    pub user_id: Option<UserId>,
}

/// The orders API keys users by their numeric account id.
fn user_id_wire<S: serde::Serializer>(id: &Option<UserId>, serializer: S) -> Result<S::Ok, S::Error> {
    match id.as_ref().map(|id| (id, id.as_str().parse::<u64>())) {
        Some((_, Ok(numeric))) => serializer.serialize_u64(numeric),
        Some((id, Err(_))) => serializer.serialize_str(id.as_str()),
        None => serializer.serialize_none(),
    }
}

impl CreateOrderRequest {
    pub fn new(snapshot: &CartSnapshot, shipping: ShippingInfo, payment: PaymentInfo) -> Self {
        Self {
            items: snapshot.lines.iter().map(OrderLine::from).collect(),
            shipping,
            payment,
            total: snapshot.subtotal,
            user_id: None,
        }
    }

    pub fn with_user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }
}

/// Successful order-creation response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub id: OrderId,
    pub order_number: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(with = "major_units")]
    pub total: Money,
    pub created_at: String,
    #[serde(default)]
    pub estimated_delivery: Option<String>,
}

/// A row of the order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_number: String,
    pub status: OrderStatus,
    #[serde(with = "major_units")]
    pub total: Money,
    pub created_at: String,
    #[serde(default)]
    pub estimated_delivery: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
}

impl From<OrderReceipt> for OrderSummary {
    fn from(receipt: OrderReceipt) -> Self {
        Self {
            id: receipt.id,
            order_number: receipt.order_number,
            status: receipt.status,
            total: receipt.total,
            created_at: receipt.created_at,
            estimated_delivery: receipt.estimated_delivery,
            items: Vec::new(),
        }
    }
}

/// Pagination block of a history page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default, alias = "limit")]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub total_pages: u32,
}

fn first_page() -> u32 {
    1
}

impl Pagination {
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// One page of order history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPage {
    pub orders: Vec<OrderSummary>,
    pub pagination: Pagination,
}

/// Machine-readable order failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderErrorCode {
    PriceMismatch,
    ProductNotFound,
    InvalidPayment,
    InvalidShipping,
    /// The session could not be refreshed; the shopper must sign in again.
    LoginRequired,
    /// Anything else, including transport failures and timeouts.
    Unclassified,
}

impl OrderErrorCode {
    /// Classify a server-provided code. Unknown or missing codes are unclassified.
    pub fn from_code(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("PRICE_MISMATCH") => OrderErrorCode::PriceMismatch,
            Some("PRODUCT_NOT_FOUND") => OrderErrorCode::ProductNotFound,
            Some("INVALID_PAYMENT") => OrderErrorCode::InvalidPayment,
            Some("INVALID_SHIPPING") => OrderErrorCode::InvalidShipping,
            _ => OrderErrorCode::Unclassified,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderErrorCode::PriceMismatch => "PRICE_MISMATCH",
            OrderErrorCode::ProductNotFound => "PRODUCT_NOT_FOUND",
            OrderErrorCode::InvalidPayment => "INVALID_PAYMENT",
            OrderErrorCode::InvalidShipping => "INVALID_SHIPPING",
            OrderErrorCode::LoginRequired => "LOGIN_REQUIRED",
            OrderErrorCode::Unclassified => "UNCLASSIFIED",
        }
    }

    /// Message shown to the shopper.
    pub fn user_message(&self) -> &'static str {
        match self {
            OrderErrorCode::PriceMismatch => {
                "Prices for some items in your cart have changed. Please review your cart and try again."
            }
            OrderErrorCode::ProductNotFound => {
                "Some items in your cart are no longer available. Please review your cart and try again."
            }
            OrderErrorCode::InvalidPayment => {
                "Payment processing failed. Please check your payment details and try again."
            }
            OrderErrorCode::InvalidShipping => {
                "Your shipping details could not be verified. Please check your address and try again."
            }
            OrderErrorCode::LoginRequired => "Your session has expired. Please log in again.",
            OrderErrorCode::Unclassified => "Order failed. Please try again.",
        }
    }
}

/// A failed order call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} ({}): {detail}", .code.user_message(), .code.as_str())]
pub struct OrderFailure {
    pub code: OrderErrorCode,
    /// Server message or transport error, for logs.
    pub detail: String,
}

impl OrderFailure {
    pub fn new(code: OrderErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    /// Build from an error envelope's `code` and `message`.
    pub fn from_server(code: Option<&str>, message: Option<&str>) -> Self {
        Self::new(
            OrderErrorCode::from_code(code),
            message.unwrap_or("Request failed"),
        )
    }

    pub fn unclassified(detail: impl Into<String>) -> Self {
        Self::new(OrderErrorCode::Unclassified, detail)
    }

    pub fn timed_out(after: std::time::Duration) -> Self {
        Self::unclassified(format!("order request timed out after {}ms", after.as_millis()))
    }

    pub fn user_message(&self) -> &'static str {
        self.code.user_message()
    }

    /// Whether resubmitting the same order unchanged may succeed.
    pub fn is_retryable(&self) -> bool {
        self.code == OrderErrorCode::Unclassified
    }
}

/// Creates orders.
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderReceipt, OrderFailure>;
}

/// Reads the signed-in shopper's past orders.
#[async_trait]
pub trait OrderHistory: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch one page (1-indexed).
    async fn list_orders(&self, page: u32, per_page: u32) -> Result<OrderPage, Self::Error>;

    async fn get_order(&self, id: &OrderId) -> Result<OrderSummary, Self::Error>;

    async fn cancel_order(&self, id: &OrderId) -> Result<(), Self::Error>;

    async fn track_order(&self, order_number: &str) -> Result<OrderSummary, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accepts_both_cases() {
        let upper: OrderStatus = serde_json::from_str(r#""SHIPPED""#).unwrap();
        let lower: OrderStatus = serde_json::from_str(r#""shipped""#).unwrap();
        assert_eq!(upper, OrderStatus::Shipped);
        assert_eq!(lower, OrderStatus::Shipped);
        assert_eq!(serde_json::to_string(&upper).unwrap(), r#""SHIPPED""#);
    }

    #[test]
    fn test_status_transitions() {
        assert!(OrderStatus::Pending.can_cancel());
        assert!(!OrderStatus::Shipped.can_cancel());
        assert!(OrderStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_error_code_classification() {
        assert_eq!(
            OrderErrorCode::from_code(Some("PRODUCT_NOT_FOUND")),
            OrderErrorCode::ProductNotFound
        );
        assert_eq!(OrderErrorCode::from_code(Some("SOMETHING_ELSE")), OrderErrorCode::Unclassified);
        assert_eq!(OrderErrorCode::from_code(None), OrderErrorCode::Unclassified);
    }

    #[test]
    fn test_failure_messages() {
        let failure = OrderFailure::from_server(Some("PRODUCT_NOT_FOUND"), Some("sku 42 missing"));
        assert!(failure.user_message().contains("no longer available"));
        assert!(!failure.is_retryable());
        assert!(failure.to_string().contains("sku 42 missing"));
    }

    #[test]
    fn test_receipt_parsing() {
        let receipt: OrderReceipt = serde_json::from_str(
            r#"{
                "id": "ord_1",
                "orderNumber": "MP-20240001",
                "status": "pending",
                "total": 2900,
                "createdAt": "2024-05-01T10:00:00Z",
                "estimatedDelivery": "2024-05-03"
            }"#,
        )
        .unwrap();
        assert_eq!(receipt.order_number, "MP-20240001");
        assert_eq!(receipt.total, Money::kes(2900));
    }

    #[test]
    fn test_pagination_defaults() {
        let page: OrderPage =
            serde_json::from_str(r#"{"orders": [], "pagination": {"page": 2, "limit": 10, "totalPages": 3}}"#)
                .unwrap();
        assert_eq!(page.pagination.per_page, 10);
        assert!(page.pagination.has_next());
        assert!(page.pagination.has_previous());
    }
}
