//! The wishlist store.
//!
//! A saved-for-later set of product IDs, distinct from the cart. Kept in
//! the session so it survives reloads without a server round trip.
//! Membership is a set: duplicates never accumulate, and serialization is
//! order-independent.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use tech_gadgets_core::ProductId;

/// Per-visitor wishlist contents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wishlist {
    ids: BTreeSet<ProductId>,
}

impl Wishlist {
    /// Toggle membership of a product ID.
    ///
    /// Adds the ID if absent, removes it if present. Returns `true` if the
    /// ID is a member after the toggle.
    pub fn toggle(&mut self, product_id: ProductId) -> bool {
        if self.ids.remove(&product_id) {
            false
        } else {
            self.ids.insert(product_id);
            true
        }
    }

    /// Remove a product ID. Returns `false` if it was not a member.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        self.ids.remove(&product_id)
    }

    /// Whether a product ID is a member.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.ids.contains(&product_id)
    }

    /// Number of saved product IDs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the wishlist is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Iterate over the saved product IDs.
    pub fn iter(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.ids.iter().copied()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_adds_then_removes() {
        let mut wishlist = Wishlist::default();
        let id = ProductId::new(1);

        assert!(wishlist.toggle(id));
        assert!(wishlist.contains(id));

        assert!(!wishlist.toggle(id));
        assert!(!wishlist.contains(id));
    }

    #[test]
    fn test_double_toggle_restores_membership() {
        let mut wishlist = Wishlist::default();
        wishlist.toggle(ProductId::new(1));
        wishlist.toggle(ProductId::new(2));

        let before: Vec<_> = wishlist.iter().collect();
        wishlist.toggle(ProductId::new(3));
        wishlist.toggle(ProductId::new(3));
        let after: Vec<_> = wishlist.iter().collect();

        assert_eq!(before, after);
    }

    #[test]
    fn test_duplicates_never_accumulate() {
        let mut wishlist = Wishlist::default();
        let id = ProductId::new(7);

        wishlist.toggle(id);
        wishlist.toggle(id);
        wishlist.toggle(id);

        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_serde_roundtrip_is_order_independent() {
        let mut wishlist = Wishlist::default();
        wishlist.toggle(ProductId::new(3));
        wishlist.toggle(ProductId::new(1));
        wishlist.toggle(ProductId::new(2));

        let json = serde_json::to_string(&wishlist).unwrap();
        let restored: Wishlist = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.len(), 3);
        for id in [1, 2, 3] {
            assert!(restored.contains(ProductId::new(id)));
        }
    }

    #[test]
    fn test_remove() {
        let mut wishlist = Wishlist::default();
        wishlist.toggle(ProductId::new(1));

        assert!(wishlist.remove(ProductId::new(1)));
        assert!(!wishlist.remove(ProductId::new(1)));
        assert!(wishlist.is_empty());
    }
}
