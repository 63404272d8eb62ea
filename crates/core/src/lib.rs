//! Wrapshop
//!
//! Wrapshop is the storefront domain engine for a personalised-gifts retailer:
//! the cart model and its derived totals, checkout validation, delivery
//! methods, and the order lifecycle rules the client enforces.

pub mod cart;
pub mod checkout;
pub mod orders;
