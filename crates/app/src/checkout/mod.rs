//! Checkout orchestration
//!
//! Validates checkout preconditions, submits the order, opens the hosted
//! payment session, and hands the resulting payment handle to the caller.
//! From the caller's perspective the operation is atomic: either a usable
//! payment handle comes back, or an error does and no partial side effect
//! should be assumed complete.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use wrapshop::{
    cart::Cart,
    checkout::{self, CheckoutError, CheckoutTotals, CustomerDetails, DeliveryMethod, LineMeta},
    orders::Order,
};

use crate::{api::ApiClient, cart::CartStore, session::SessionStore};

/// A hosted-payment session handle.
///
/// The URL can be embedded in a frame or navigated to as a whole page;
/// both render the same session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    /// Embeddable session URL returned by the payment subsystem.
    pub url: String,
}

/// Successful checkout result.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    /// The created order, in `pending` status.
    pub order: Order,

    /// Payment handle for the presentation layer to render.
    pub payment: PaymentSession,
}

/// A classified checkout failure. Preconditions are reported before any
/// network call is made.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// No authenticated session.
    #[error("you must be logged in to place an order")]
    LoginRequired,

    /// The cart has no lines.
    #[error("the cart is empty")]
    EmptyCart,

    /// A checkout field rule was violated.
    #[error(transparent)]
    Validation(#[from] CheckoutError),

    /// The order was created but the response carried no order id; a
    /// backend contract violation, not a rejection.
    #[error("the server did not return an order id")]
    MissingOrderId,

    /// The payment call succeeded but carried no session URL; a backend
    /// contract violation, not a rejection.
    #[error("the server did not return a payment session")]
    MissingPaymentUrl,

    /// Order or payment-session creation failed; the message prefers the
    /// server's own wording.
    #[error(transparent)]
    Api(#[from] crate::api::ApiError),
}

/// Orchestrates the cart-to-payment sequence.
pub struct CheckoutService {
    api: Arc<dyn ApiClient>,
    session: Arc<SessionStore>,
    cart: Arc<CartStore>,
}

impl CheckoutService {
    /// Creates the orchestrator over the shared stores.
    #[must_use]
    pub fn new(api: Arc<dyn ApiClient>, session: Arc<SessionStore>, cart: Arc<CartStore>) -> Self {
        Self { api, session, cart }
    }

    /// Totals for the current cart under the given delivery method.
    #[must_use]
    pub fn totals(&self, delivery_method: DeliveryMethod) -> CheckoutTotals {
        CheckoutTotals::compute(self.cart.subtotal(), delivery_method)
    }

    /// Places an order and opens a payment session for it.
    ///
    /// Preconditions are checked in a fixed order, each short-circuiting
    /// with its own error and zero network calls: authentication, cart
    /// non-emptiness, then the field rules of
    /// [`wrapshop::checkout::validate`]. The submitted details are
    /// normalized first: the shipping fee is recomputed from the delivery
    /// method, address fields are blanked for pickup, and per-line metadata
    /// is completed from the cart lines' stored notes and images.
    ///
    /// # Errors
    ///
    /// Returns a [`PlaceOrderError`] classifying the failure. The local
    /// cart is only cleared once the payment session exists; on any failure
    /// it is left untouched.
    pub async fn place_order(&self, details: &CustomerDetails) -> Result<PlacedOrder, PlaceOrderError> {
        if !self.session.is_authenticated() {
            return Err(PlaceOrderError::LoginRequired);
        }

        let cart = self.cart.snapshot();

        if cart.is_empty() {
            return Err(PlaceOrderError::EmptyCart);
        }

        checkout::validate(details)?;

        let payload = normalize(details, &cart);

        let response = self.api.checkout(&payload).await.map_err(|error| {
            warn!(%error, "order creation failed");

            error
        })?;
        let order = response.order;

        if order.id.trim().is_empty() {
            warn!("checkout response carried no order id");

            return Err(PlaceOrderError::MissingOrderId);
        }

        let payment = self.api.start_payment(&order.id).await.map_err(|error| {
            warn!(%error, order_id = %order.id, "payment session creation failed");

            error
        })?;

        if payment.iframe_url.trim().is_empty() {
            warn!(order_id = %order.id, "payment response carried no session url");

            return Err(PlaceOrderError::MissingPaymentUrl);
        }

        // The backend snapshot-cleared the cart as part of checkout.
        self.cart.reset();

        info!(order_id = %order.id, "order placed, payment session ready");

        Ok(PlacedOrder {
            order,
            payment: PaymentSession {
                url: payment.iframe_url,
            },
        })
    }
}

/// Builds the submission payload from the caller's details and the cart.
fn normalize(details: &CustomerDetails, cart: &Cart) -> CustomerDetails {
    let mut payload = details.clone();

    payload.shipping_fee = payload.delivery_method.fee();

    if payload.delivery_method == DeliveryMethod::Pickup {
        payload.city.clear();
        payload.street.clear();
        payload.house_number.clear();
        payload.postal_code = None;
    }

    payload.items_meta = cart
        .iter()
        .map(|line| {
            let provided = details
                .items_meta
                .iter()
                .find(|meta| meta.product_id == line.product_id && meta.option_index == line.option_index);

            LineMeta {
                product_id: line.product_id.clone(),
                option_index: line.option_index,
                note: provided
                    .and_then(|meta| meta.note.clone())
                    .or_else(|| line.note.clone()),
                attached_image: provided
                    .and_then(|meta| meta.attached_image.clone())
                    .or_else(|| line.attached_image.clone()),
            }
        })
        .collect();

    payload
}
