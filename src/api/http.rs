//! HTTP implementation of the API traits
//!
//! JSON over HTTPS with a cookie-held session. Every backend answer is wrapped
//! in an [`ApiResponse`] envelope.

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AdminApi, ClientError, ClientResult, StorefrontApi};
use crate::config::ClientConfig;
use crate::domain::aggregates::{
    ApplicationDraft, ApplicationStatus, Brand, CartItem, Category, CheckoutReceipt, DashboardMetrics,
    DistributorApplication, NewOrder, Order, OrderStatus, PaymentCapture, Product, ProductDraft, Review,
    ReviewDraft, TaxonomyDraft,
};
use crate::domain::value_objects::Quantity;

/// Response envelope used by every backend endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct CartPayload {
    #[serde(default)]
    items: Vec<CartItem>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CartLine<'a> {
    user_id: &'a str,
    product_id: &'a str,
    quantity: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderStatusUpdate {
    order_status: OrderStatus,
}

#[derive(Serialize)]
struct ApplicationStatusUpdate {
    status: ApplicationStatus,
}

/// reqwest-backed client for the storefront backend.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// Builds a client with a cookie store so the session credential rides along on every call.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .cookie_store(true)
            .build()?;
        Ok(Self { client, base_url: config.base_url.trim_end_matches('/').to_string() })
    }

    pub fn base_url(&self) -> &str { &self.base_url }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request_id = Uuid::new_v4();
        tracing::debug!(%method, path, %request_id, "api request");
        self.client.request(method, self.url(path)).header("x-request-id", request_id.to_string())
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        Self::data(self.send(self.request(Method::GET, path)).await?)
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(&self, path: &str, body: &B) -> ClientResult<T> {
        Self::data(self.send(self.request(Method::POST, path).json(body)).await?)
    }

    async fn put<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(&self, path: &str, body: &B) -> ClientResult<T> {
        Self::data(self.send(self.request(Method::PUT, path).json(body)).await?)
    }

    async fn put_empty(&self, path: &str) -> ClientResult<()> {
        self.send::<IgnoredAny>(self.request(Method::PUT, path)).await.map(|_| ())
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        Self::data(self.send(self.request(Method::DELETE, path)).await?)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<ApiResponse<T>> {
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    /// Maps HTTP status and the envelope's `success` flag onto [`ClientError`].
    async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<ApiResponse<T>> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiResponse<IgnoredAny>>(&text)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or(text);
            tracing::debug!(%status, %message, "api request failed");
            return Err(match status {
                StatusCode::UNAUTHORIZED => ClientError::Unauthorized,
                StatusCode::FORBIDDEN => ClientError::Forbidden(message),
                StatusCode::NOT_FOUND => ClientError::NotFound(message),
                StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ClientError::Validation(message),
                _ => ClientError::Internal(message),
            });
        }

        let envelope: ApiResponse<T> = serde_json::from_str(&text)?;
        if !envelope.success {
            return Err(ClientError::Rejected(envelope.message.unwrap_or_default()));
        }
        Ok(envelope)
    }

    fn data<T>(envelope: ApiResponse<T>) -> ClientResult<T> {
        envelope.data.ok_or_else(|| ClientError::InvalidResponse("Missing response data".to_string()))
    }

    async fn cart_call(&self, method: Method, path: &str, body: Option<&CartLine<'_>>) -> ClientResult<Vec<CartItem>> {
        let mut request = self.request(method, path);
        if let Some(body) = body {
            request = request.json(body);
        }
        let payload: CartPayload = Self::data(self.send(request).await?)?;
        Ok(payload.items)
    }
}

#[async_trait]
impl StorefrontApi for HttpApi {
    async fn list_products(&self) -> ClientResult<Vec<Product>> {
        self.get("/api/shop/products/get").await
    }

    async fn get_product(&self, product_id: &str) -> ClientResult<Product> {
        self.get(&format!("/api/shop/products/get/{}", product_id)).await
    }

    async fn list_brands(&self) -> ClientResult<Vec<Brand>> {
        self.get("/api/common/brands").await
    }

    async fn list_categories(&self) -> ClientResult<Vec<Category>> {
        self.get("/api/common/categories").await
    }

    async fn fetch_cart(&self, user_id: &str) -> ClientResult<Vec<CartItem>> {
        self.cart_call(Method::GET, &format!("/api/shop/cart/get/{}", user_id), None).await
    }

    async fn add_to_cart(&self, user_id: &str, product_id: &str, quantity: Quantity) -> ClientResult<Vec<CartItem>> {
        let line = CartLine { user_id, product_id, quantity: quantity.value() };
        self.cart_call(Method::POST, "/api/shop/cart/add", Some(&line)).await
    }

    async fn update_cart_quantity(&self, user_id: &str, product_id: &str, quantity: Quantity) -> ClientResult<Vec<CartItem>> {
        let line = CartLine { user_id, product_id, quantity: quantity.value() };
        self.cart_call(Method::PUT, "/api/shop/cart/update-cart", Some(&line)).await
    }

    async fn remove_from_cart(&self, user_id: &str, product_id: &str) -> ClientResult<Vec<CartItem>> {
        self.cart_call(Method::DELETE, &format!("/api/shop/cart/{}/{}", user_id, product_id), None).await
    }

    async fn create_order(&self, order: &NewOrder) -> ClientResult<CheckoutReceipt> {
        self.post("/api/shop/order/create", order).await
    }

    async fn capture_payment(&self, capture: &PaymentCapture) -> ClientResult<Order> {
        self.post("/api/shop/order/capture", capture).await
    }

    async fn list_orders(&self, user_id: &str) -> ClientResult<Vec<Order>> {
        self.get(&format!("/api/shop/order/list/{}", user_id)).await
    }

    async fn get_order(&self, order_id: &str) -> ClientResult<Order> {
        self.get(&format!("/api/shop/order/details/{}", order_id)).await
    }

    async fn cancel_order(&self, order_id: &str) -> ClientResult<()> {
        self.put_empty(&format!("/api/shop/order/cancel/{}", order_id)).await
    }

    async fn return_order(&self, order_id: &str) -> ClientResult<()> {
        self.put_empty(&format!("/api/shop/order/return/{}", order_id)).await
    }

    async fn add_review(&self, review: &ReviewDraft) -> ClientResult<Review> {
        self.post("/api/shop/review/add", review).await
    }

    async fn list_reviews(&self, product_id: &str) -> ClientResult<Vec<Review>> {
        self.get(&format!("/api/shop/review/{}", product_id)).await
    }

    async fn submit_application(&self, draft: &ApplicationDraft) -> ClientResult<DistributorApplication> {
        self.post("/api/distributor/apply", draft).await
    }

    async fn application_for_user(&self, user_id: &str) -> ClientResult<Option<DistributorApplication>> {
        let envelope = self.send(self.request(Method::GET, &format!("/api/distributor/status/{}", user_id))).await?;
        Ok(envelope.data)
    }

    async fn withdraw_application(&self, application_id: &str) -> ClientResult<DistributorApplication> {
        self.put(&format!("/api/distributor/withdraw/{}", application_id), &serde_json::json!({})).await
    }
}

#[async_trait]
impl AdminApi for HttpApi {
    async fn list_all_orders(&self) -> ClientResult<Vec<Order>> {
        self.get("/api/admin/orders/get").await
    }

    async fn get_order_details(&self, order_id: &str) -> ClientResult<Order> {
        self.get(&format!("/api/admin/orders/details/{}", order_id)).await
    }

    async fn update_order_status(&self, order_id: &str, status: OrderStatus) -> ClientResult<()> {
        let body = OrderStatusUpdate { order_status: status };
        self.send::<IgnoredAny>(self.request(Method::PUT, &format!("/api/admin/orders/update/{}", order_id)).json(&body))
            .await
            .map(|_| ())
    }

    async fn mark_order_paid(&self, order_id: &str) -> ClientResult<()> {
        self.put_empty(&format!("/api/admin/orders/mark-paid/{}", order_id)).await
    }

    async fn create_product(&self, draft: &ProductDraft) -> ClientResult<Product> {
        self.post("/api/admin/products/add", draft).await
    }

    async fn update_product(&self, product_id: &str, draft: &ProductDraft) -> ClientResult<Product> {
        self.put(&format!("/api/admin/products/edit/{}", product_id), draft).await
    }

    async fn delete_product(&self, product_id: &str) -> ClientResult<()> {
        self.delete::<IgnoredAny>(&format!("/api/admin/products/delete/{}", product_id)).await.map(|_| ())
    }

    async fn create_brand(&self, draft: &TaxonomyDraft) -> ClientResult<Brand> {
        self.post("/api/admin/brands/add", draft).await
    }

    async fn delete_brand(&self, brand_id: &str) -> ClientResult<()> {
        self.delete::<IgnoredAny>(&format!("/api/admin/brands/delete/{}", brand_id)).await.map(|_| ())
    }

    async fn create_category(&self, draft: &TaxonomyDraft) -> ClientResult<Category> {
        self.post("/api/admin/categories/add", draft).await
    }

    async fn delete_category(&self, category_id: &str) -> ClientResult<()> {
        self.delete::<IgnoredAny>(&format!("/api/admin/categories/delete/{}", category_id)).await.map(|_| ())
    }

    async fn list_applications(&self) -> ClientResult<Vec<DistributorApplication>> {
        self.get("/api/admin/distributors").await
    }

    async fn set_application_status(&self, application_id: &str, status: ApplicationStatus) -> ClientResult<DistributorApplication> {
        let body = ApplicationStatusUpdate { status };
        self.put(&format!("/api/admin/distributors/{}/status", application_id), &body).await
    }

    async fn dashboard_metrics(&self) -> ClientResult<DashboardMetrics> {
        self.get("/api/admin/dashboard/metrics").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let api = HttpApi::new(&ClientConfig::new("http://localhost:5000/")).unwrap();
        assert_eq!(api.base_url(), "http://localhost:5000");
        assert_eq!(api.url("/api/shop/cart/add"), "http://localhost:5000/api/shop/cart/add");
        assert_eq!(api.url("api/x"), "http://localhost:5000/api/x");
    }

    #[test]
    fn test_envelope_without_data() {
        let r: ApiResponse<Vec<Product>> = serde_json::from_str(r#"{"success": true, "message": "ok"}"#).unwrap();
        assert!(r.data.is_none());
        assert!(matches!(HttpApi::data(r), Err(ClientError::InvalidResponse(_))));
    }

    #[test]
    fn test_status_update_body() {
        let body = OrderStatusUpdate { order_status: OrderStatus::InShipping };
        assert_eq!(serde_json::to_value(&body).unwrap(), serde_json::json!({"orderStatus": "inShipping"}));
    }
}
