//! Cart

use serde::{Deserialize, Serialize};

/// VAT rate applied to pre-tax prices.
pub const TAX_RATE: f64 = 0.17;

/// Identity of a cart line.
///
/// A product option is addressed by its position within the product's option
/// list, not by its display name; `(product_id, option_index)` is unique
/// within a cart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineKey {
    /// Opaque catalog key of the product.
    pub product_id: String,

    /// Position of the selected option within the product's option list.
    pub option_index: u32,
}

impl LineKey {
    /// Creates a key for the given product option.
    #[must_use]
    pub fn new(product_id: impl Into<String>, option_index: u32) -> Self {
        Self {
            product_id: product_id.into(),
            option_index,
        }
    }
}

/// Reference to an uploaded image attached to a cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachedImage {
    /// Public URL of the uploaded asset.
    pub url: String,

    /// Provider-side asset identifier.
    pub public_id: String,
}

/// One distinct `(product, option)` selection in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Opaque catalog key of the product.
    pub product_id: String,

    /// Display name of the product.
    pub product_name: String,

    /// Display name of the selected option.
    pub option_name: String,

    /// Position of the selected option within the product's option list.
    pub option_index: u32,

    /// Pre-tax unit price.
    #[serde(rename = "priceWithoutMaam")]
    pub unit_price: f64,

    /// Number of units; at least 1 for a line that exists.
    pub quantity: u32,

    /// Product image URL.
    #[serde(rename = "image", default)]
    pub image_url: String,

    /// Free-text note attached to the line.
    #[serde(rename = "itemNote", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Uploaded personalisation image, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attached_image: Option<AttachedImage>,
}

impl CartLine {
    /// Returns the identity key of this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(self.product_id.clone(), self.option_index)
    }

    /// Returns whether this line matches the given key.
    #[must_use]
    pub fn matches(&self, key: &LineKey) -> bool {
        self.product_id == key.product_id && self.option_index == key.option_index
    }

    /// Pre-tax total for this line.
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

/// The current user's cart: an ordered collection of lines, unique per
/// [`LineKey`].
///
/// The client-held cart is a cache of server truth; every mutation is
/// reconciled against the cart the server returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cart from the given lines.
    #[must_use]
    pub fn with_lines(lines: impl Into<Vec<CartLine>>) -> Self {
        Self {
            lines: lines.into(),
        }
    }

    /// Iterate over the lines in the cart.
    pub fn iter(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    /// Returns the lines in the cart.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Finds the line with the given key.
    #[must_use]
    pub fn find(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.matches(key))
    }

    /// Pre-tax sum over all lines of `unit_price * quantity`.
    #[must_use]
    pub fn subtotal(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Tax-inclusive total: `subtotal * (1 + TAX_RATE)`.
    #[must_use]
    pub fn total_with_tax(&self) -> f64 {
        self.subtotal() * (1.0 + TAX_RATE)
    }

    /// Sets the quantity of the line with the given key, if present.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: u32) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.matches(key)) {
            line.quantity = quantity;
        }
    }

    /// Sets the note of the line with the given key, if present.
    pub fn set_note(&mut self, key: &LineKey, note: impl Into<String>) {
        if let Some(line) = self.lines.iter_mut().find(|line| line.matches(key)) {
            line.note = Some(note.into());
        }
    }

    /// Removes the line with the given key, if present.
    pub fn remove(&mut self, key: &LineKey) {
        self.lines.retain(|line| !line.matches(key));
    }

    /// Removes all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: &str, option_index: u32, unit_price: f64, quantity: u32) -> CartLine {
        CartLine {
            product_id: product_id.to_string(),
            product_name: format!("Product {product_id}"),
            option_name: "Standard".to_string(),
            option_index,
            unit_price,
            quantity,
            image_url: String::new(),
            note: None,
            attached_image: None,
        }
    }

    #[test]
    fn subtotal_sums_unit_price_times_quantity() {
        let cart = Cart::with_lines([line("p1", 0, 100.0, 2), line("p2", 1, 25.5, 3)]);

        assert!((cart.subtotal() - 276.5).abs() < 1e-9, "got {}", cart.subtotal());
    }

    #[test]
    fn total_with_tax_applies_fixed_rate_once() {
        let cart = Cart::with_lines([line("p1", 0, 100.0, 2)]);

        assert!((cart.subtotal() - 200.0).abs() < 1e-9, "got {}", cart.subtotal());
        assert!(
            (cart.total_with_tax() - 234.0).abs() < 1e-9,
            "got {}",
            cart.total_with_tax()
        );
    }

    #[test]
    fn empty_cart_has_zero_totals() {
        let cart = Cart::new();

        assert!(cart.is_empty(), "expected empty cart");
        assert!((cart.subtotal() - 0.0).abs() < 1e-9, "expected zero subtotal");
        assert!(
            (cart.total_with_tax() - 0.0).abs() < 1e-9,
            "expected zero total"
        );
    }

    #[test]
    fn find_matches_on_product_and_option_index() {
        let cart = Cart::with_lines([line("p1", 0, 10.0, 1), line("p1", 1, 12.0, 1)]);

        let found = cart.find(&LineKey::new("p1", 1)).expect("line should exist");
        assert!((found.unit_price - 12.0).abs() < 1e-9, "wrong line matched");

        assert!(cart.find(&LineKey::new("p2", 0)).is_none(), "no such line");
    }

    #[test]
    fn set_quantity_only_touches_matching_line() {
        let mut cart = Cart::with_lines([line("p1", 0, 10.0, 1), line("p1", 1, 12.0, 1)]);

        cart.set_quantity(&LineKey::new("p1", 0), 5);

        let changed = cart.find(&LineKey::new("p1", 0)).expect("line should exist");
        let untouched = cart.find(&LineKey::new("p1", 1)).expect("line should exist");
        assert_eq!(changed.quantity, 5);
        assert_eq!(untouched.quantity, 1);
    }

    #[test]
    fn remove_filters_out_matching_line() {
        let mut cart = Cart::with_lines([line("p1", 0, 10.0, 1), line("p2", 0, 12.0, 1)]);

        cart.remove(&LineKey::new("p1", 0));

        assert_eq!(cart.len(), 1);
        assert!(cart.find(&LineKey::new("p1", 0)).is_none(), "line not removed");
    }

    #[test]
    fn set_note_updates_matching_line() {
        let mut cart = Cart::with_lines([line("p1", 0, 10.0, 1)]);

        cart.set_note(&LineKey::new("p1", 0), "gift wrap please");

        let found = cart.find(&LineKey::new("p1", 0)).expect("line should exist");
        assert_eq!(found.note.as_deref(), Some("gift wrap please"));
    }

    #[test]
    fn cart_deserializes_from_bare_array() {
        let json = r#"[{
            "productId": "p1",
            "productName": "Mug",
            "optionName": "Large",
            "optionIndex": 2,
            "priceWithoutMaam": 59.9,
            "quantity": 1,
            "image": "https://cdn.example/mug.jpg",
            "itemNote": "engrave: Dana"
        }]"#;

        let cart: Cart = serde_json::from_str(json).expect("cart should deserialize");

        assert_eq!(cart.len(), 1);
        let found = cart.find(&LineKey::new("p1", 2)).expect("line should exist");
        assert_eq!(found.note.as_deref(), Some("engrave: Dana"));
        assert!((found.unit_price - 59.9).abs() < 1e-9, "price mismatch");
    }
}
