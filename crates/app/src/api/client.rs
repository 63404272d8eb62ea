//! HTTP client for the storefront REST API.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, de::DeserializeOwned};
use wrapshop::{
    cart::{Cart, LineKey},
    checkout::CustomerDetails,
    orders::Order,
};

use crate::{api::ApiError, session::User, session::token::TokenStore};

/// Configuration for reaching the storefront backend.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API base URL including the path prefix, e.g. `"http://localhost:5000/api"`.
    pub base_url: String,
}

/// `POST /auth/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Opaque bearer token to persist.
    pub token: String,

    /// The authenticated user.
    pub user: User,
}

/// `POST /auth/register` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterResponse {
    /// Human-readable confirmation from the server.
    #[serde(default)]
    pub message: String,
}

/// `POST /orders/checkout` response.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutResponse {
    /// The created order; expected to be in `pending` status.
    pub order: Order,
}

/// `PATCH /orders/:id/cancel` response.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelResponse {
    /// Human-readable confirmation from the server.
    #[serde(default)]
    pub message: String,

    /// The refreshed, now-canceled order.
    pub order: Order,
}

/// `POST /payments/start` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStartResponse {
    /// Embeddable hosted-payment session URL. Deserialized leniently; an
    /// empty value is a backend contract violation the orchestrator detects.
    #[serde(default)]
    pub iframe_url: String,
}

/// Cart mutation endpoints wrap the cart in an envelope; `GET /cart`
/// returns the bare array.
#[derive(Debug, Deserialize)]
struct CartEnvelope {
    cart: Cart,
}

/// Error body shape used by the backend for rejections.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// The fixed set of backend endpoints the client consumes.
#[automock]
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Resolve the current user from the stored bearer token.
    async fn current_user(&self) -> Result<User, ApiError>;

    /// Exchange credentials for a token and user record.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// Create a customer account.
    async fn register(&self, username: &str, password: &str) -> Result<RegisterResponse, ApiError>;

    /// Fetch the authoritative cart.
    async fn fetch_cart(&self) -> Result<Cart, ApiError>;

    /// Add a product option to the cart; the server decides whether an
    /// existing line is incremented or a new one created.
    async fn add_to_cart(&self, key: &LineKey, quantity: u32) -> Result<Cart, ApiError>;

    /// Set the quantity of an existing line.
    async fn update_cart_item(&self, key: &LineKey, quantity: u32) -> Result<Cart, ApiError>;

    /// Remove a line from the cart.
    async fn remove_cart_item(&self, key: &LineKey) -> Result<Cart, ApiError>;

    /// Replace the free-text note on a line.
    async fn update_cart_note(&self, key: &LineKey, note: &str) -> Result<Cart, ApiError>;

    /// Empty the cart.
    async fn clear_cart(&self) -> Result<Cart, ApiError>;

    /// Submit the order; the backend snapshots the cart atomically.
    async fn checkout(&self, details: &CustomerDetails) -> Result<CheckoutResponse, ApiError>;

    /// List the caller's orders, newest first.
    async fn my_orders(&self) -> Result<Vec<Order>, ApiError>;

    /// Request cancellation of a pending order.
    async fn cancel_order(&self, order_id: &str) -> Result<CancelResponse, ApiError>;

    /// Open a hosted-payment session for an order.
    async fn start_payment(&self, order_id: &str) -> Result<PaymentStartResponse, ApiError>;
}

/// Reqwest-backed [`ApiClient`] with bearer authentication.
///
/// The token is read from the [`TokenStore`] on every outgoing request, so a
/// login or logout in the same process is picked up immediately.
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    config: ApiConfig,
    http: Client,
    tokens: Arc<TokenStore>,
}

impl HttpApiClient {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: ApiConfig, tokens: Arc<TokenStore>) -> Self {
        Self {
            config,
            http: Client::new(),
            tokens,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.tokens.get() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.message);

            return Err(ApiError::rejected(status, message));
        }

        Ok(response.json().await?)
    }

    async fn send_cart(&self, request: RequestBuilder) -> Result<Cart, ApiError> {
        let envelope: CartEnvelope = self.send(request).await?;

        Ok(envelope.cart)
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn current_user(&self) -> Result<User, ApiError> {
        self.send(self.http.get(self.url("/auth/me"))).await
    }

    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = serde_json::json!({ "username": username, "password": password });

        self.send(self.http.post(self.url("/auth/login")).json(&body))
            .await
    }

    async fn register(&self, username: &str, password: &str) -> Result<RegisterResponse, ApiError> {
        let body = serde_json::json!({
            "username": username,
            "password": password,
            "role": "customer",
        });

        self.send(self.http.post(self.url("/auth/register")).json(&body))
            .await
    }

    async fn fetch_cart(&self) -> Result<Cart, ApiError> {
        self.send(self.http.get(self.url("/cart"))).await
    }

    async fn add_to_cart(&self, key: &LineKey, quantity: u32) -> Result<Cart, ApiError> {
        let body = serde_json::json!({
            "productId": key.product_id,
            "optionIndex": key.option_index,
            "quantity": quantity,
        });

        self.send_cart(self.http.post(self.url("/cart/add")).json(&body))
            .await
    }

    async fn update_cart_item(&self, key: &LineKey, quantity: u32) -> Result<Cart, ApiError> {
        let body = serde_json::json!({
            "productId": key.product_id,
            "optionIndex": key.option_index,
            "quantity": quantity,
        });

        self.send_cart(self.http.patch(self.url("/cart/update")).json(&body))
            .await
    }

    async fn remove_cart_item(&self, key: &LineKey) -> Result<Cart, ApiError> {
        let body = serde_json::json!({
            "productId": key.product_id,
            "optionIndex": key.option_index,
        });

        self.send_cart(self.http.delete(self.url("/cart/item")).json(&body))
            .await
    }

    async fn update_cart_note(&self, key: &LineKey, note: &str) -> Result<Cart, ApiError> {
        let body = serde_json::json!({
            "productId": key.product_id,
            "optionIndex": key.option_index,
            "itemNote": note,
        });

        self.send_cart(self.http.patch(self.url("/cart/note")).json(&body))
            .await
    }

    async fn clear_cart(&self) -> Result<Cart, ApiError> {
        self.send_cart(self.http.delete(self.url("/cart/clear")))
            .await
    }

    async fn checkout(&self, details: &CustomerDetails) -> Result<CheckoutResponse, ApiError> {
        self.send(self.http.post(self.url("/orders/checkout")).json(details))
            .await
    }

    async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.send(self.http.get(self.url("/orders/my"))).await
    }

    async fn cancel_order(&self, order_id: &str) -> Result<CancelResponse, ApiError> {
        let url = self.url(&format!("/orders/{order_id}/cancel"));

        self.send(self.http.patch(url)).await
    }

    async fn start_payment(&self, order_id: &str) -> Result<PaymentStartResponse, ApiError> {
        let body = serde_json::json!({ "orderId": order_id });

        self.send(self.http.post(self.url("/payments/start")).json(&body))
            .await
    }
}
