//! Order endpoints.

use crate::{ApiClient, FetchError};
use async_trait::async_trait;
use dawa_commerce::checkout::{
    CreateOrderRequest, OrderErrorCode, OrderFailure, OrderHistory, OrderPage, OrderReceipt,
    OrderService, OrderSummary,
};
use dawa_commerce::OrderId;

fn segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// The storefront's `/orders` resource.
#[derive(Debug, Clone)]
pub struct OrdersApi {
    client: ApiClient,
}

impl OrdersApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }
}

impl From<FetchError> for OrderFailure {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Api { code, message, .. } => {
                OrderFailure::from_server(code.as_deref(), Some(&message))
            }
            FetchError::LoginRequired { path } => OrderFailure::new(
                OrderErrorCode::LoginRequired,
                format!("session expired while calling {path}"),
            ),
            other => OrderFailure::unclassified(other.to_string()),
        }
    }
}

#[async_trait]
impl OrderService for OrdersApi {
    async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderReceipt, OrderFailure> {
        tracing::debug!(
            lines = request.items.len(),
            total = %request.total,
            "creating order"
        );
        let receipt: OrderReceipt = self.client.post("/orders", request).await.map_err(|e| {
            tracing::warn!(error = %e, "order creation failed");
            OrderFailure::from(e)
        })?;
        tracing::info!(order_number = %receipt.order_number, "order created");
        Ok(receipt)
    }
}

#[async_trait]
impl OrderHistory for OrdersApi {
    type Error = FetchError;

    async fn list_orders(&self, page: u32, per_page: u32) -> Result<OrderPage, FetchError> {
        let page = page.max(1);
        self.client
            .get(&format!("/orders?page={page}&limit={per_page}"))
            .await
    }

    async fn get_order(&self, id: &OrderId) -> Result<OrderSummary, FetchError> {
        self.client
            .get(&format!("/orders/{}", segment(id.as_str())))
            .await
    }

    async fn cancel_order(&self, id: &OrderId) -> Result<(), FetchError> {
        let _: serde_json::Value = self
            .client
            .patch(&format!("/orders/{}/cancel", segment(id.as_str())))
            .await?;
        tracing::info!(order_id = %id, "order cancelled");
        Ok(())
    }

    async fn track_order(&self, order_number: &str) -> Result<OrderSummary, FetchError> {
        self.client
            .get(&format!("/orders/track/{}", segment(order_number)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_keeps_server_code() {
        let failure = OrderFailure::from(FetchError::Api {
            status: 409,
            code: Some("PRICE_MISMATCH".into()),
            message: "Price changed".into(),
        });
        assert_eq!(failure.code, OrderErrorCode::PriceMismatch);
        assert_eq!(failure.detail, "Price changed");
    }

    #[test]
    fn test_login_required_maps_to_login_code() {
        let failure = OrderFailure::from(FetchError::LoginRequired {
            path: "/orders".into(),
        });
        assert_eq!(failure.code, OrderErrorCode::LoginRequired);
        assert!(!failure.is_retryable());
    }

    #[test]
    fn test_transport_errors_are_unclassified() {
        let failure = OrderFailure::from(FetchError::Timeout);
        assert_eq!(failure.code, OrderErrorCode::Unclassified);
        assert!(failure.is_retryable());
    }

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("MP-2024/001"), "MP-2024%2F001");
        assert_eq!(segment("abc"), "abc");
    }
}
