//! Order history and cancellation
//!
//! Thin service over the orders endpoints. The cancellation window rule is
//! evaluated locally first so an obviously ineligible order never produces
//! a network round trip; the server remains the final authority and may
//! still refuse.

use std::sync::Arc;

use jiff::Timestamp;
use thiserror::Error;
use tracing::{info, warn};
use wrapshop::orders::{self, CancelRefusal, Order};

use crate::{api::ApiClient, session::SessionStore};

/// Errors raised by order operations.
#[derive(Debug, Error)]
pub enum OrdersError {
    /// No authenticated session.
    #[error("you must be logged in to view your orders")]
    LoginRequired,

    /// Cancellation was refused locally; no request was made.
    #[error(transparent)]
    Refused(#[from] CancelRefusal),

    /// The server rejected the request or was unreachable.
    #[error(transparent)]
    Api(#[from] crate::api::ApiError),
}

/// Read and cancel access to the caller's order history.
pub struct OrdersService {
    api: Arc<dyn ApiClient>,
    session: Arc<SessionStore>,
}

impl OrdersService {
    /// Creates the service over the shared session.
    #[must_use]
    pub fn new(api: Arc<dyn ApiClient>, session: Arc<SessionStore>) -> Self {
        Self { api, session }
    }

    /// Fetches the caller's orders, newest first as the backend sorts them.
    ///
    /// # Errors
    ///
    /// Fails fast with [`OrdersError::LoginRequired`] when logged out, or
    /// with the underlying [`crate::api::ApiError`] on request failure.
    pub async fn my_orders(&self) -> Result<Vec<Order>, OrdersError> {
        self.require_login()?;

        Ok(self.api.my_orders().await?)
    }

    /// Requests cancellation of `order`.
    ///
    /// Eligibility is checked locally against the current wall clock before
    /// any request: only a pending order no older than
    /// [`wrapshop::orders::CANCELLATION_WINDOW`] proceeds to the server.
    ///
    /// # Errors
    ///
    /// Returns [`OrdersError::Refused`] with the specific local refusal, or
    /// the underlying [`crate::api::ApiError`] when the server refuses.
    pub async fn cancel_order(&self, order: &Order) -> Result<Order, OrdersError> {
        self.require_login()?;

        orders::cancellation_eligibility(order, Timestamp::now())?;

        let response = self.api.cancel_order(&order.id).await.map_err(|error| {
            warn!(%error, order_id = %order.id, "cancellation rejected by server");

            error
        })?;

        info!(order_id = %order.id, "order canceled");

        Ok(response.order)
    }

    fn require_login(&self) -> Result<(), OrdersError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(OrdersError::LoginRequired)
        }
    }
}
