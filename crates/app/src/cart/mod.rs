//! Cart store
//!
//! Owns the client copy of the server-authoritative cart. Mutations apply
//! optimistically for a responsive UI, then reconcile: on success the whole
//! local cart is replaced by the cart the server returned, on failure the
//! exact pre-mutation snapshot is restored. A per-line in-flight guard
//! rejects concurrent mutations of the same `(product, option)` line.

use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::{debug, warn};
use wrapshop::cart::{Cart, LineKey};

use crate::{api::ApiClient, session::SessionStore};

/// Errors raised by cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The operation requires an authenticated session.
    #[error("you must be logged in to use the cart")]
    LoginRequired,

    /// Another mutation for the same line is still in flight.
    #[error("this item is already being updated")]
    LineBusy,

    /// The server rejected the request or was unreachable; any optimistic
    /// change has been rolled back.
    #[error(transparent)]
    Api(#[from] crate::api::ApiError),
}

/// The process-wide cart store.
pub struct CartStore {
    api: Arc<dyn ApiClient>,
    session: Arc<SessionStore>,
    lines: RwLock<Cart>,
    in_flight: Mutex<FxHashSet<LineKey>>,
}

impl CartStore {
    /// Creates an empty cart store.
    #[must_use]
    pub fn new(api: Arc<dyn ApiClient>, session: Arc<SessionStore>) -> Self {
        Self {
            api,
            session,
            lines: RwLock::new(Cart::new()),
            in_flight: Mutex::new(FxHashSet::default()),
        }
    }

    /// Returns a full copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.lines_ref().clone()
    }

    /// Pre-tax total of the current cart.
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.lines_ref().subtotal()
    }

    /// Tax-inclusive total of the current cart.
    #[must_use]
    pub fn total_with_tax(&self) -> f64 {
        self.lines_ref().total_with_tax()
    }

    /// Whether a mutation for the given line is currently in flight.
    #[must_use]
    pub fn is_line_busy(&self, key: &LineKey) -> bool {
        self.in_flight_ref().contains(key)
    }

    /// Drops the local cart copy without touching the server.
    ///
    /// Used when the session identity changes: the cart is never carried
    /// across users.
    pub fn reset(&self) {
        self.lines_mut().clear();
    }

    /// Replaces the local cart with the server's.
    ///
    /// # Errors
    ///
    /// Fails fast with [`CartError::LoginRequired`] when logged out. On a
    /// request failure the prior local state is left untouched.
    pub async fn load(&self) -> Result<(), CartError> {
        self.require_login()?;

        let cart = self.api.fetch_cart().await?;
        self.replace(cart);

        Ok(())
    }

    /// Adds `quantity` of a product option to the cart.
    ///
    /// No optimistic merge is attempted: whether an existing line is
    /// incremented or a new one created is the server's decision, so the
    /// local cart is only updated from the response.
    ///
    /// # Errors
    ///
    /// Fails fast with [`CartError::LoginRequired`] when logged out, or
    /// with the underlying [`crate::api::ApiError`] on request failure.
    pub async fn add_item(&self, key: &LineKey, quantity: u32) -> Result<(), CartError> {
        self.require_login()?;

        let cart = self.api.add_to_cart(key, quantity).await?;
        self.replace(cart);

        Ok(())
    }

    /// Sets the quantity of an existing line; `quantity <= 0` removes it.
    ///
    /// # Errors
    ///
    /// Fails fast with [`CartError::LoginRequired`] when logged out or
    /// [`CartError::LineBusy`] when the line already has a mutation in
    /// flight. On request failure the pre-mutation snapshot is restored.
    pub async fn update_quantity(&self, key: &LineKey, quantity: i64) -> Result<(), CartError> {
        if quantity <= 0 {
            return self.remove_item(key).await;
        }

        self.require_login()?;
        let _guard = self.claim_line(key)?;

        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        let snapshot = self.snapshot();
        self.lines_mut().set_quantity(key, quantity);

        match self.api.update_cart_item(key, quantity).await {
            Ok(cart) => {
                self.replace(cart);

                Ok(())
            }
            Err(error) => {
                warn!(%error, ?key, "quantity update failed; rolling back");
                self.replace(snapshot);

                Err(error.into())
            }
        }
    }

    /// Removes a line from the cart.
    ///
    /// # Errors
    ///
    /// Fails fast with [`CartError::LoginRequired`] when logged out or
    /// [`CartError::LineBusy`] when the line already has a mutation in
    /// flight. On request failure the pre-mutation snapshot is restored.
    pub async fn remove_item(&self, key: &LineKey) -> Result<(), CartError> {
        self.require_login()?;
        let _guard = self.claim_line(key)?;

        let snapshot = self.snapshot();
        self.lines_mut().remove(key);

        match self.api.remove_cart_item(key).await {
            Ok(cart) => {
                self.replace(cart);

                Ok(())
            }
            Err(error) => {
                warn!(%error, ?key, "item removal failed; rolling back");
                self.replace(snapshot);

                Err(error.into())
            }
        }
    }

    /// Replaces the free-text note on a line.
    ///
    /// # Errors
    ///
    /// Fails fast with [`CartError::LoginRequired`] when logged out or
    /// [`CartError::LineBusy`] when the line already has a mutation in
    /// flight. On request failure the pre-mutation snapshot is restored.
    pub async fn update_item_note(&self, key: &LineKey, note: &str) -> Result<(), CartError> {
        self.require_login()?;
        let _guard = self.claim_line(key)?;

        let snapshot = self.snapshot();
        self.lines_mut().set_note(key, note);

        match self.api.update_cart_note(key, note).await {
            Ok(cart) => {
                self.replace(cart);

                Ok(())
            }
            Err(error) => {
                warn!(%error, ?key, "note update failed; rolling back");
                self.replace(snapshot);

                Err(error.into())
            }
        }
    }

    /// Empties the cart.
    ///
    /// # Errors
    ///
    /// Fails fast with [`CartError::LoginRequired`] when logged out. On
    /// request failure the pre-mutation snapshot is restored.
    pub async fn clear(&self) -> Result<(), CartError> {
        self.require_login()?;

        let snapshot = self.snapshot();
        self.lines_mut().clear();

        match self.api.clear_cart().await {
            Ok(cart) => {
                self.replace(cart);

                Ok(())
            }
            Err(error) => {
                warn!(%error, "cart clear failed; rolling back");
                self.replace(snapshot);

                Err(error.into())
            }
        }
    }

    fn require_login(&self) -> Result<(), CartError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(CartError::LoginRequired)
        }
    }

    fn replace(&self, cart: Cart) {
        debug!(lines = cart.len(), "cart replaced");
        *self.lines_mut() = cart;
    }

    /// Claims the line for a mutation; the claim is released when the
    /// returned guard drops, on the error path included.
    fn claim_line(&self, key: &LineKey) -> Result<LineGuard<'_>, CartError> {
        let mut in_flight = self.in_flight_mut();

        if !in_flight.insert(key.clone()) {
            return Err(CartError::LineBusy);
        }

        Ok(LineGuard {
            set: &self.in_flight,
            key: key.clone(),
        })
    }

    fn lines_ref(&self) -> RwLockReadGuard<'_, Cart> {
        self.lines.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn lines_mut(&self) -> RwLockWriteGuard<'_, Cart> {
        self.lines.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn in_flight_ref(&self) -> std::sync::MutexGuard<'_, FxHashSet<LineKey>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn in_flight_mut(&self) -> std::sync::MutexGuard<'_, FxHashSet<LineKey>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct LineGuard<'a> {
    set: &'a Mutex<FxHashSet<LineKey>>,
    key: LineKey,
}

impl Drop for LineGuard<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
