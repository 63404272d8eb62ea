//! Application context
//!
//! Builds the API client and the stores over it, wires them together, and
//! owns the session-lifecycle choreography that spans stores: resuming a
//! persisted session at startup, and keeping the cart in step with logins
//! and logouts.

use std::{path::PathBuf, sync::Arc};

use thiserror::Error;
use tracing::warn;

use crate::{
    api::{ApiClient, ApiConfig, HttpApiClient},
    cart::CartStore,
    checkout::CheckoutService,
    orders::OrdersService,
    session::{SessionStore, TokenStore, TokenStoreError},
};

/// Startup configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API base URL including the path prefix.
    pub base_url: String,

    /// Where the session token is persisted between runs.
    pub token_path: PathBuf,
}

/// Errors raised while building the context.
#[derive(Debug, Error)]
pub enum AppInitError {
    /// The token file exists but could not be read.
    #[error("failed to open token storage")]
    TokenStore(#[from] TokenStoreError),
}

/// The wired-together stores and services of a running client.
pub struct AppContext {
    /// Shared API client.
    pub api: Arc<dyn ApiClient>,

    /// Authentication state.
    pub session: Arc<SessionStore>,

    /// Local cart copy.
    pub cart: Arc<CartStore>,

    /// Checkout orchestration.
    pub checkout: Arc<CheckoutService>,

    /// Order history and cancellation.
    pub orders: Arc<OrdersService>,
}

impl AppContext {
    /// Builds the context and resumes any persisted session.
    ///
    /// When a session resumes, the cart is loaded eagerly; a failed cart
    /// load is logged and tolerated since every later mutation reconciles
    /// against the server anyway.
    ///
    /// # Errors
    ///
    /// Returns an error when token storage cannot be opened.
    pub async fn init(config: AppConfig) -> Result<Self, AppInitError> {
        let tokens = Arc::new(TokenStore::open(config.token_path)?);
        let api: Arc<dyn ApiClient> = Arc::new(HttpApiClient::new(
            ApiConfig {
                base_url: config.base_url,
            },
            Arc::clone(&tokens),
        ));

        let session = Arc::new(SessionStore::new(Arc::clone(&api), tokens));
        let cart = Arc::new(CartStore::new(Arc::clone(&api), Arc::clone(&session)));
        let checkout = Arc::new(CheckoutService::new(
            Arc::clone(&api),
            Arc::clone(&session),
            Arc::clone(&cart),
        ));
        let orders = Arc::new(OrdersService::new(Arc::clone(&api), Arc::clone(&session)));

        session.resume().await;

        if session.is_authenticated() {
            if let Err(error) = cart.load().await {
                warn!(%error, "failed to load cart for resumed session");
            }
        }

        Ok(Self {
            api,
            session,
            cart,
            checkout,
            orders,
        })
    }

    /// Logs in and loads the new user's cart.
    ///
    /// Returns whether a session was established. A failed cart load after
    /// a successful login is logged and tolerated.
    pub async fn login(&self, username: &str, password: &str) -> bool {
        if !self.session.login(username, password).await {
            return false;
        }

        if let Err(error) = self.cart.load().await {
            warn!(%error, "failed to load cart after login");
        }

        true
    }

    /// Logs out and drops the local cart copy.
    pub fn logout(&self) {
        self.session.logout();
        self.cart.reset();
    }
}
