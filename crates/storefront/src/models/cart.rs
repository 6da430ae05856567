//! The cart store.
//!
//! Holds selected items prior to checkout. Lines are unique by product ID:
//! re-adding a product increments its quantity instead of creating a
//! duplicate line. The cart lives in the session and is mutated only
//! through these operations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tech_gadgets_core::ProductId;

use crate::catalog::types::{CartItem, Product, ProductSummary};

/// Per-visitor cart contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Add a product to the cart.
    ///
    /// If the product is already present its quantity is incremented;
    /// otherwise a new line is appended with a snapshot of the product.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        let quantity = quantity.max(1);

        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            item.quantity += quantity;
        } else {
            self.items.push(CartItem {
                product: ProductSummary::from(product),
                quantity,
            });
        }
    }

    /// Set the quantity of a line. A quantity of zero removes the line.
    ///
    /// Returns `false` if no line exists for the product.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }

        match self.items.iter_mut().find(|i| i.product.id == product_id) {
            Some(item) => {
                item.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove a line from the cart.
    ///
    /// Returns `false` if no line exists for the product.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product.id != product_id);
        self.items.len() != before
    }

    /// Remove all lines. Called after an order is placed.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Snapshot the lines for checkout entry.
    #[must_use]
    pub fn snapshot(&self) -> Vec<CartItem> {
        self.items.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn widget(id: i32, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Widget {id}"),
            description: "A widget".to_string(),
            price: Decimal::from(price),
            image_url: format!("widget{id}.jpg"),
            quantity: 10,
        }
    }

    #[test]
    fn test_add_new_line() {
        let mut cart = Cart::default();
        cart.add(&widget(1, 500), 2);

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.count(), 2);
        assert_eq!(cart.subtotal(), Decimal::from(1000));
    }

    #[test]
    fn test_re_add_increments_quantity() {
        let mut cart = Cart::default();
        cart.add(&widget(1, 500), 1);
        cart.add(&widget(1, 500), 2);

        // Still one line - no duplicate entry for the same product
        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.count(), 3);
    }

    #[test]
    fn test_add_clamps_zero_quantity() {
        let mut cart = Cart::default();
        cart.add(&widget(1, 500), 0);
        assert_eq!(cart.count(), 1);
    }

    #[test]
    fn test_set_quantity() {
        let mut cart = Cart::default();
        cart.add(&widget(1, 500), 1);

        assert!(cart.set_quantity(ProductId::new(1), 5));
        assert_eq!(cart.count(), 5);

        // Zero removes the line
        assert!(cart.set_quantity(ProductId::new(1), 0));
        assert!(cart.is_empty());

        // Unknown product
        assert!(!cart.set_quantity(ProductId::new(9), 1));
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::default();
        cart.add(&widget(1, 500), 1);
        cart.add(&widget(2, 300), 1);

        assert!(cart.remove(ProductId::new(1)));
        assert!(!cart.remove(ProductId::new(1)));
        assert_eq!(cart.items().len(), 1);
    }

    #[test]
    fn test_subtotal_across_lines() {
        let mut cart = Cart::default();
        cart.add(&widget(1, 500), 2);
        cart.add(&widget(2, 250), 1);

        assert_eq!(cart.subtotal(), Decimal::from(1250));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut cart = Cart::default();
        cart.add(&widget(1, 500), 2);

        let snapshot = cart.snapshot();
        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.first().unwrap().quantity, 2);
    }
}
