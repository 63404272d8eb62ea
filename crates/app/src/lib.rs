//! Client-side stores and services for the Wrapshop storefront backend.

pub mod api;
pub mod cart;
pub mod checkout;
pub mod context;
pub mod orders;
pub mod session;

#[cfg(test)]
mod test;
