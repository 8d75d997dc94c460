//! Cart
//!
//! An ordered list of line items with at most one line per reference. Lines
//! keep their insertion order; quantities are always at least one.

use serde::{Deserialize, Serialize};

use crate::items::{ItemSnapshot, LineItem};

pub mod store;

pub use store::{
    CartObserver, CartStorage, CartStore, CartStoreError, CheckoutError, CheckoutOutcome,
    JsonFileCartStorage, MemoryCartStorage,
};

/// The items a user intends to purchase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<LineItem>", into = "Vec<LineItem>")]
pub struct Cart {
    items: Vec<LineItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of an item.
    ///
    /// An existing line for the same reference gains one unit and keeps the
    /// snapshot it was first added with; otherwise a new line is appended.
    pub fn add_item(&mut self, snapshot: ItemSnapshot) {
        match self.line_mut(&snapshot.reference) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.items.push(snapshot.into_line_item(1)),
        }
    }

    /// Change the quantity of a line by `delta`.
    ///
    /// A resulting quantity below one removes the line. Unknown references are
    /// ignored. Quantities saturate at `u32::MAX`.
    ///
    /// Returns `true` if the cart changed.
    pub fn change_quantity(&mut self, reference: &str, delta: i64) -> bool {
        let Some(position) = self.position(reference) else {
            return false;
        };

        let Some(line) = self.items.get_mut(position) else {
            return false;
        };

        let updated = i64::from(line.quantity).saturating_add(delta);

        if updated < 1 {
            self.items.remove(position);
            return true;
        }

        let updated = u32::try_from(updated).unwrap_or(u32::MAX);
        let changed = updated != line.quantity;
        line.quantity = updated;

        changed
    }

    /// Remove the line for `reference`, if present.
    pub fn remove_item(&mut self, reference: &str) -> Option<LineItem> {
        self.position(reference).map(|position| self.items.remove(position))
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lines in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Consume the cart, returning its lines.
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Sum of quantities across all lines.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Whether the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    fn position(&self, reference: &str) -> Option<usize> {
        self.items.iter().position(|item| item.reference == reference)
    }

    fn line_mut(&mut self, reference: &str) -> Option<&mut LineItem> {
        self.items.iter_mut().find(|item| item.reference == reference)
    }
}

impl From<Vec<LineItem>> for Cart {
    /// Build a cart from stored lines, merging duplicate references into the
    /// first occurrence and dropping zero-quantity lines.
    fn from(items: Vec<LineItem>) -> Self {
        let mut cart = Self::new();

        for item in items.into_iter().filter(|item| item.quantity > 0) {
            match cart.line_mut(&item.reference) {
                Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
                None => cart.items.push(item),
            }
        }

        cart
    }
}

impl From<Cart> for Vec<LineItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

#[cfg(test)]
mod tests {
    use crate::items::ItemKind;

    use super::*;

    fn keyboard() -> ItemSnapshot {
        ItemSnapshot::new("p1", ItemKind::Product, "Keyboard", 100_00)
    }

    fn setup() -> ItemSnapshot {
        ItemSnapshot::new("s1", ItemKind::Service, "Setup", 50_00)
    }

    #[test]
    fn add_item_appends_new_lines_in_order() {
        let mut cart = Cart::new();

        cart.add_item(keyboard());
        cart.add_item(setup());

        let references: Vec<&str> = cart.items().iter().map(|item| item.reference.as_str()).collect();

        assert_eq!(references, ["p1", "s1"]);
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn add_item_increments_existing_line_and_keeps_first_snapshot() {
        let mut cart = Cart::new();

        cart.add_item(keyboard());
        cart.add_item(ItemSnapshot::new("p1", ItemKind::Product, "Keyboard v2", 120_00));

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items().first().map(|item| item.quantity), Some(2));
        assert_eq!(cart.items().first().map(|item| item.unit_price), Some(100_00));
        assert_eq!(
            cart.items().first().map(|item| item.title.as_str()),
            Some("Keyboard")
        );
    }

    #[test]
    fn change_quantity_adjusts_line() {
        let mut cart = Cart::new();
        cart.add_item(keyboard());

        assert!(cart.change_quantity("p1", 4), "expected cart to change");
        assert_eq!(cart.item_count(), 5);

        assert!(cart.change_quantity("p1", -2), "expected cart to change");
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn change_quantity_below_one_removes_line() {
        let mut cart = Cart::new();
        cart.add_item(keyboard());
        cart.add_item(setup());

        assert!(cart.change_quantity("p1", -1), "expected cart to change");
        assert_eq!(cart.len(), 1);
        assert!(cart.items().iter().all(|item| item.reference != "p1"), "p1 should be gone");
    }

    #[test]
    fn change_quantity_ignores_unknown_reference() {
        let mut cart = Cart::new();
        cart.add_item(keyboard());

        assert!(!cart.change_quantity("nope", 3), "unknown reference should be ignored");
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn change_quantity_saturates_at_max() {
        let mut cart = Cart::new();
        cart.add_item(keyboard());

        cart.change_quantity("p1", i64::MAX);

        assert_eq!(cart.item_count(), u64::from(u32::MAX));
    }

    #[test]
    fn remove_item_returns_removed_line() {
        let mut cart = Cart::new();
        cart.add_item(keyboard());

        let removed = cart.remove_item("p1");

        assert_eq!(removed.map(|item| item.reference), Some("p1".to_string()));
        assert!(cart.is_empty(), "cart should be empty");
        assert_eq!(cart.remove_item("p1"), None);
    }

    #[test]
    fn clear_empties_cart() {
        let mut cart = Cart::new();
        cart.add_item(keyboard());
        cart.add_item(setup());

        cart.clear();

        assert!(cart.is_empty(), "cart should be empty");
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn from_lines_merges_duplicates_and_drops_empty_lines() {
        let lines = vec![
            keyboard().into_line_item(1),
            setup().into_line_item(0),
            keyboard().into_line_item(2),
        ];

        let cart = Cart::from(lines);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.item_count(), 3);
    }
}
