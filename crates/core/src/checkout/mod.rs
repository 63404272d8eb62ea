//! Checkout
//!
//! Delivery methods, customer details, checkout totals, and the client-side
//! validation applied before an order is submitted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cart::AttachedImage;

mod validate;

pub use validate::{is_valid_email, is_valid_phone};

/// Flat fee charged for courier delivery, in currency units. Not taxed.
pub const SHIPPING_FEE: f64 = 40.0;

/// How the order reaches the customer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    /// Collected from the store; no fee, no address required.
    #[default]
    Pickup,

    /// Courier delivery; flat fee, address required.
    Shipping,
}

impl DeliveryMethod {
    /// Fee charged for this delivery method.
    #[must_use]
    pub fn fee(self) -> f64 {
        match self {
            Self::Pickup => 0.0,
            Self::Shipping => SHIPPING_FEE,
        }
    }
}

/// Per-line metadata submitted with the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineMeta {
    /// Product the metadata belongs to.
    pub product_id: String,

    /// Option position the metadata belongs to.
    pub option_index: u32,

    /// Free-text note for the line.
    #[serde(rename = "itemNote", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Uploaded personalisation image for the line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_image: Option<AttachedImage>,
}

/// Checkout-time input collected from the customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    /// Customer's full name.
    pub full_name: String,

    /// Mobile phone number, local (`05...`) or international (`972 5...`).
    pub phone: String,

    /// Optional contact email.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Delivery city; required only for shipping.
    #[serde(default)]
    pub city: String,

    /// Delivery street; required only for shipping.
    #[serde(default)]
    pub street: String,

    /// Delivery house number; required only for shipping.
    #[serde(default)]
    pub house_number: String,

    /// Optional postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    /// Free-text notes for the whole order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Selected delivery method.
    #[serde(default)]
    pub delivery_method: DeliveryMethod,

    /// Fee for the selected delivery method. Recomputed by the orchestrator
    /// before submission; caller input is not trusted.
    #[serde(default)]
    pub shipping_fee: f64,

    /// Whether the customer accepted the terms of service.
    #[serde(default)]
    pub accepted_terms: bool,

    /// Per-line notes and attached images.
    #[serde(default)]
    pub items_meta: Vec<LineMeta>,
}

/// Totals presented to the customer for a checkout attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutTotals {
    /// Pre-tax sum of the cart lines.
    pub subtotal: f64,

    /// Fee for the selected delivery method.
    pub shipping_fee: f64,

    /// Amount due: subtotal plus shipping fee.
    pub total_to_pay: f64,
}

impl CheckoutTotals {
    /// Computes totals for the given cart subtotal and delivery method.
    ///
    /// The shipping fee is a flat add-on; it is not taxed.
    #[must_use]
    pub fn compute(subtotal: f64, delivery_method: DeliveryMethod) -> Self {
        let shipping_fee = delivery_method.fee();

        Self {
            subtotal,
            shipping_fee,
            total_to_pay: subtotal + shipping_fee,
        }
    }
}

/// A violated checkout rule. Each variant carries its own user-facing
/// message; validation never collapses into a generic "invalid form".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Full name or phone is blank.
    #[error("full name and phone number are required")]
    MissingContactDetails,

    /// Phone does not match an accepted mobile format.
    #[error("phone number is not a valid mobile number")]
    InvalidPhone,

    /// Email was provided but is malformed.
    #[error("email address is not valid")]
    InvalidEmail,

    /// Shipping was selected but the address is incomplete.
    #[error("city, street and house number are required for shipping")]
    IncompleteAddress,

    /// The customer has not accepted the terms of service.
    #[error("the terms of service must be accepted before ordering")]
    TermsNotAccepted,
}

/// Validates customer details ahead of order submission.
///
/// Rules are checked in a fixed order and short-circuit on the first
/// violation: contact fields, phone format, email format, address
/// completeness (shipping only), terms acceptance.
///
/// # Errors
///
/// Returns the first violated rule as a [`CheckoutError`].
pub fn validate(details: &CustomerDetails) -> Result<(), CheckoutError> {
    if details.full_name.trim().is_empty() || details.phone.trim().is_empty() {
        return Err(CheckoutError::MissingContactDetails);
    }

    if !is_valid_phone(&details.phone) {
        return Err(CheckoutError::InvalidPhone);
    }

    if let Some(email) = details.email.as_deref() {
        if !email.trim().is_empty() && !is_valid_email(email) {
            return Err(CheckoutError::InvalidEmail);
        }
    }

    if details.delivery_method == DeliveryMethod::Shipping {
        let address_complete = !details.city.trim().is_empty()
            && !details.street.trim().is_empty()
            && !details.house_number.trim().is_empty();

        if !address_complete {
            return Err(CheckoutError::IncompleteAddress);
        }
    }

    if !details.accepted_terms {
        return Err(CheckoutError::TermsNotAccepted);
    }

    Ok(())
}
