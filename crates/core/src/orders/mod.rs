//! Orders
//!
//! The order record as returned by the backend, the observed status
//! lifecycle, and the one lifecycle rule the client enforces itself: the
//! two-hour cancellation window.

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::CartLine,
    checkout::{CustomerDetails, DeliveryMethod},
};

/// How long after creation a pending order may still be canceled.
pub const CANCELLATION_WINDOW: SignedDuration = SignedDuration::from_hours(2);

/// Server-owned order status. The client only observes transitions; the one
/// mutation it may request is cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, payment not yet confirmed.
    Pending,

    /// Payment confirmed by the gateway.
    Paid,

    /// Handed to delivery.
    Shipped,

    /// Terminal: fulfilled.
    Completed,

    /// Terminal: payment failed.
    Failed,

    /// Terminal: canceled.
    Canceled,
}

/// An order as issued by the backend after checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Server-issued identifier. Deserialized leniently; an empty id on a
    /// fresh order is a backend contract violation the orchestrator detects.
    #[serde(default)]
    pub id: String,

    /// Creation timestamp.
    pub date: Timestamp,

    /// Snapshot of the cart lines at time of purchase.
    #[serde(default)]
    pub items: Vec<CartLine>,

    /// Pre-tax total at time of purchase.
    #[serde(rename = "totalWithoutMaam", default)]
    pub subtotal: f64,

    /// Tax-inclusive total at time of purchase.
    #[serde(rename = "totalWithMaam", default)]
    pub total: f64,

    /// Delivery method chosen at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_method: Option<DeliveryMethod>,

    /// Shipping fee charged at checkout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shipping_fee: Option<f64>,

    /// Current status.
    pub status: OrderStatus,

    /// Customer details snapshot, when the backend includes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_details: Option<CustomerDetails>,
}

impl Order {
    /// Age of the order at `now`.
    #[must_use]
    pub fn age(&self, now: Timestamp) -> SignedDuration {
        now.duration_since(self.date)
    }
}

/// Why a cancellation request is refused locally, before any network call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CancelRefusal {
    /// The order is already canceled.
    #[error("this order has already been canceled")]
    AlreadyCanceled,

    /// The order is still pending but older than the cancellation window.
    #[error("orders can no longer be canceled two hours after they were placed")]
    TooLate,

    /// The order is in a status that cannot be canceled (paid, shipped, ...).
    #[error("this order is not in a cancelable status")]
    NotCancelable,
}

/// Checks whether `order` may be canceled at `now`.
///
/// Status is checked before age, so a canceled order always reports
/// [`CancelRefusal::AlreadyCanceled`] rather than `TooLate`, and a paid
/// order is never cancelable regardless of age.
///
/// # Errors
///
/// Returns the applicable [`CancelRefusal`] when cancellation must be
/// refused without contacting the server.
pub fn cancellation_eligibility(order: &Order, now: Timestamp) -> Result<(), CancelRefusal> {
    match order.status {
        OrderStatus::Canceled => Err(CancelRefusal::AlreadyCanceled),
        OrderStatus::Pending => {
            if order.age(now) > CANCELLATION_WINDOW {
                Err(CancelRefusal::TooLate)
            } else {
                Ok(())
            }
        }
        _ => Err(CancelRefusal::NotCancelable),
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn order(status: OrderStatus, date: Timestamp) -> Order {
        Order {
            id: "o1".to_string(),
            date,
            items: Vec::new(),
            subtotal: 100.0,
            total: 117.0,
            delivery_method: None,
            shipping_fee: None,
            status,
            customer_details: None,
        }
    }

    #[test]
    fn pending_order_is_cancelable_within_window() -> TestResult {
        let created: Timestamp = "2026-08-01T10:00:00Z".parse()?;
        let now = created + SignedDuration::from_mins(119);

        let result = cancellation_eligibility(&order(OrderStatus::Pending, created), now);

        assert_eq!(result, Ok(()));
        Ok(())
    }

    #[test]
    fn pending_order_is_not_cancelable_after_window() -> TestResult {
        let created: Timestamp = "2026-08-01T10:00:00Z".parse()?;
        let now = created + SignedDuration::from_mins(121);

        let result = cancellation_eligibility(&order(OrderStatus::Pending, created), now);

        assert_eq!(result, Err(CancelRefusal::TooLate));
        Ok(())
    }

    #[test]
    fn paid_order_is_never_cancelable() -> TestResult {
        let created: Timestamp = "2026-08-01T10:00:00Z".parse()?;

        for minutes in [1, 119, 121, 600] {
            let now = created + SignedDuration::from_mins(minutes);
            let result = cancellation_eligibility(&order(OrderStatus::Paid, created), now);

            assert_eq!(result, Err(CancelRefusal::NotCancelable), "at {minutes} minutes");
        }

        Ok(())
    }

    #[test]
    fn canceled_beats_too_late() -> TestResult {
        let created: Timestamp = "2026-08-01T10:00:00Z".parse()?;
        let now = created + SignedDuration::from_hours(5);

        // Status is checked first, so an old canceled order reports
        // AlreadyCanceled rather than TooLate.
        let result = cancellation_eligibility(&order(OrderStatus::Canceled, created), now);

        assert_eq!(result, Err(CancelRefusal::AlreadyCanceled));
        Ok(())
    }

    #[test]
    fn shipped_and_completed_are_not_cancelable() -> TestResult {
        let created: Timestamp = "2026-08-01T10:00:00Z".parse()?;
        let now = created + SignedDuration::from_mins(10);

        for status in [OrderStatus::Shipped, OrderStatus::Completed, OrderStatus::Failed] {
            let result = cancellation_eligibility(&order(status, created), now);

            assert_eq!(result, Err(CancelRefusal::NotCancelable), "status {status:?}");
        }

        Ok(())
    }

    #[test]
    fn order_deserializes_with_missing_optional_fields() {
        let json = r#"{
            "id": "ord-1",
            "date": "2026-08-01T10:00:00Z",
            "items": [],
            "totalWithoutMaam": 150,
            "totalWithMaam": 175.5,
            "status": "pending"
        }"#;

        let parsed: Order = serde_json::from_str(json).expect("order should deserialize");

        assert_eq!(parsed.status, OrderStatus::Pending);
        assert!(parsed.delivery_method.is_none(), "no delivery method sent");
        assert!((parsed.total - 175.5).abs() < 1e-9, "total mismatch");
    }

    #[test]
    fn missing_id_defaults_to_empty() {
        let json = r#"{
            "date": "2026-08-01T10:00:00Z",
            "status": "pending"
        }"#;

        let parsed: Order = serde_json::from_str(json).expect("order should deserialize");

        assert!(parsed.id.is_empty(), "absent id must surface as empty");
    }
}
