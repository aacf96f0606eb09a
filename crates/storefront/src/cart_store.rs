//! Persisted cart store.
//!
//! `CartStore` owns the authoritative [`Cart`] for a session. Every mutation
//! runs through one scoped-mutation helper that:
//!
//! 1. discards the mutation if the store has not restored its snapshot yet,
//! 2. applies the change to the in-memory cart,
//! 3. writes the snapshot to the [`SnapshotStore`] before returning,
//! 4. publishes the new cart to subscribers.
//!
//! Write failures are logged and never surfaced to callers. A missing or
//! corrupt snapshot restores as an empty cart.

use powerlabs_core::{Cart, Money, Product, ProductId};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::persistence::{CART_STORAGE_KEY, SnapshotStore, decode_snapshot, encode_snapshot};

/// What happened to a requested mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The cart changed and the change was persisted.
    Applied,
    /// The request targeted a missing line item, or would have pushed the
    /// total out of range; nothing changed.
    Unchanged,
    /// The store was not restored yet, so the request was dropped.
    Discarded,
}

/// Single source of truth for cart contents.
pub struct CartStore {
    cart: Cart,
    store: Box<dyn SnapshotStore>,
    key: String,
    restored: bool,
    changes: watch::Sender<Cart>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &self.cart)
            .field("key", &self.key)
            .field("restored", &self.restored)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create a store that has not restored its snapshot yet.
    ///
    /// Mutations are discarded until [`Self::restore`] runs.
    #[must_use]
    pub fn detached(store: impl SnapshotStore + 'static) -> Self {
        let (changes, _) = watch::channel(Cart::new());
        Self {
            cart: Cart::new(),
            store: Box::new(store),
            key: CART_STORAGE_KEY.to_string(),
            restored: false,
            changes,
        }
    }

    /// Create a store and restore the last snapshot.
    #[must_use]
    pub fn open(store: impl SnapshotStore + 'static) -> Self {
        let mut cart_store = Self::detached(store);
        cart_store.restore();
        cart_store
    }

    /// Load the last written snapshot, falling back to an empty cart.
    ///
    /// Only the first call has any effect.
    pub fn restore(&mut self) {
        if self.restored {
            return;
        }

        self.cart = match self.store.load(&self.key) {
            Ok(Some(data)) => match decode_snapshot(&data) {
                Ok(cart) => {
                    info!(lines = cart.line_count(), "Restored cart snapshot");
                    cart
                }
                Err(e) => {
                    warn!(error = %e, "Discarding corrupt cart snapshot");
                    Cart::new()
                }
            },
            Ok(None) => {
                debug!("No cart snapshot found, starting empty");
                Cart::new()
            }
            Err(e) => {
                warn!(error = %e, "Cart snapshot unavailable, starting empty");
                Cart::new()
            }
        };

        self.restored = true;
        self.changes.send_replace(self.cart.clone());
    }

    /// Whether the snapshot has been restored.
    #[must_use]
    pub const fn is_restored(&self) -> bool {
        self.restored
    }

    /// Current cart contents.
    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Watch the cart. The receiver sees the cart after every applied
    /// mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.changes.subscribe()
    }

    /// Sum of `price * quantity` over all line items.
    #[must_use]
    pub fn get_total(&self) -> Money {
        self.cart.total()
    }

    /// Add one unit of `product`, merging with an existing line.
    pub fn add_to_cart(&mut self, product: &Product) -> MutationOutcome {
        self.mutate("add_to_cart", |cart| cart.add(product))
    }

    /// Remove the line item for `id`, if present.
    pub fn remove_from_cart(&mut self, id: ProductId) -> MutationOutcome {
        self.mutate("remove_from_cart", |cart| cart.remove(id))
    }

    /// Add one unit to the line item for `id`, if present.
    pub fn increase_quantity(&mut self, id: ProductId) -> MutationOutcome {
        self.mutate("increase_quantity", |cart| cart.increase(id))
    }

    /// Take one unit off the line item for `id`, removing it at quantity 1.
    pub fn decrease_quantity(&mut self, id: ProductId) -> MutationOutcome {
        self.mutate("decrease_quantity", |cart| cart.decrease(id))
    }

    /// Remove every line item with a single write.
    pub fn clear(&mut self) -> MutationOutcome {
        self.mutate("clear", |cart| {
            let had_items = !cart.is_empty();
            cart.clear();
            had_items
        })
    }

    fn mutate(
        &mut self,
        action: &'static str,
        op: impl FnOnce(&mut Cart) -> bool,
    ) -> MutationOutcome {
        if !self.restored {
            warn!(action, "Cart not restored yet, discarding mutation");
            return MutationOutcome::Discarded;
        }

        if !op(&mut self.cart) {
            debug!(action, "Cart unchanged");
            return MutationOutcome::Unchanged;
        }

        self.persist(action);
        self.changes.send_replace(self.cart.clone());
        debug!(
            action,
            lines = self.cart.line_count(),
            quantity = self.cart.total_quantity(),
            "Cart updated"
        );
        MutationOutcome::Applied
    }

    fn persist(&mut self, action: &'static str) {
        let data = match encode_snapshot(&self.cart) {
            Ok(data) => data,
            Err(e) => {
                error!(action, error = %e, "Failed to encode cart snapshot");
                return;
            }
        };
        if let Err(e) = self.store.save(&self.key, &data) {
            error!(action, error = %e, "Failed to persist cart snapshot");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::persistence::MemorySnapshotStore;

    fn product(id: i64, cents: i64) -> Product {
        Product::new(
            ProductId::new(id),
            format!("Product {id}"),
            Money::from_cents(cents),
            "",
        )
    }

    #[test]
    fn test_add_persists_before_returning() {
        let handle = MemorySnapshotStore::new();
        let mut store = CartStore::open(handle.clone());

        assert_eq!(store.add_to_cart(&product(1, 1000)), MutationOutcome::Applied);

        let written = decode_snapshot(&handle.get(CART_STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(&written, store.cart());
    }

    #[test]
    fn test_repeated_adds_merge() {
        let mut store = CartStore::open(MemorySnapshotStore::new());
        let lamp = product(1, 1000);

        for _ in 0..4 {
            store.add_to_cart(&lamp);
        }

        assert_eq!(store.cart().line_count(), 1);
        assert_eq!(store.cart().get(lamp.id).unwrap().quantity, 4);
        assert_eq!(store.get_total(), Money::from_cents(4000));
    }

    #[test]
    fn test_decrease_from_one_removes_line() {
        let mut store = CartStore::open(MemorySnapshotStore::new());
        let lamp = product(1, 1000);
        store.add_to_cart(&lamp);
        store.increase_quantity(lamp.id);

        assert_eq!(store.decrease_quantity(lamp.id), MutationOutcome::Applied);
        assert_eq!(store.cart().get(lamp.id).unwrap().quantity, 1);

        assert_eq!(store.decrease_quantity(lamp.id), MutationOutcome::Applied);
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_missing_ids_do_not_write() {
        let handle = MemorySnapshotStore::new();
        let mut store = CartStore::open(handle.clone());

        assert_eq!(
            store.remove_from_cart(ProductId::new(9)),
            MutationOutcome::Unchanged
        );
        assert_eq!(
            store.increase_quantity(ProductId::new(9)),
            MutationOutcome::Unchanged
        );
        assert_eq!(
            store.decrease_quantity(ProductId::new(9)),
            MutationOutcome::Unchanged
        );
        assert!(handle.get(CART_STORAGE_KEY).is_none());
    }

    #[test]
    fn test_mutations_before_restore_are_discarded() {
        let mut seeded = CartStore::open(MemorySnapshotStore::new());
        seeded.add_to_cart(&product(1, 1000));
        let snapshot = encode_snapshot(seeded.cart()).unwrap();

        let handle = MemorySnapshotStore::with_entry(CART_STORAGE_KEY, &snapshot);
        let mut store = CartStore::detached(handle.clone());

        assert_eq!(
            store.add_to_cart(&product(2, 500)),
            MutationOutcome::Discarded
        );
        assert_eq!(handle.get(CART_STORAGE_KEY).as_deref(), Some(snapshot.as_str()));

        store.restore();
        assert!(store.is_restored());
        assert_eq!(store.cart(), seeded.cart());
        assert!(store.cart().get(ProductId::new(2)).is_none());
    }

    #[test]
    fn test_corrupt_snapshot_restores_empty() {
        let store = CartStore::open(MemorySnapshotStore::with_entry(
            CART_STORAGE_KEY,
            "{\"state\":",
        ));

        assert!(store.is_restored());
        assert!(store.cart().is_empty());
    }

    #[test]
    fn test_out_of_range_snapshot_restores_empty() {
        let store = CartStore::open(MemorySnapshotStore::with_entry(
            CART_STORAGE_KEY,
            r#"{"state":{"cart":[{"id":1,"name":"Bar","price":50000000000000000000000000000,"imgUrl":"","quantity":2}]},"version":0}"#,
        ));

        assert!(store.cart().is_empty());
        assert_eq!(store.get_total(), Money::zero());
    }

    #[test]
    fn test_write_failure_keeps_cart_usable() {
        let handle = MemorySnapshotStore::new();
        let mut store = CartStore::open(handle.clone());
        handle.set_unavailable(true);

        assert_eq!(store.add_to_cart(&product(1, 1000)), MutationOutcome::Applied);
        assert_eq!(store.cart().line_count(), 1);
        assert!(handle.get(CART_STORAGE_KEY).is_none());
    }

    #[test]
    fn test_subscribers_see_every_change() {
        let mut store = CartStore::open(MemorySnapshotStore::new());
        let mut rx = store.subscribe();
        rx.mark_unchanged();

        store.add_to_cart(&product(1, 1000));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().line_count(), 1);

        store.remove_from_cart(ProductId::new(42));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_clear() {
        let handle = MemorySnapshotStore::new();
        let mut store = CartStore::open(handle.clone());
        store.add_to_cart(&product(1, 1000));
        store.add_to_cart(&product(2, 500));

        assert_eq!(store.clear(), MutationOutcome::Applied);
        assert!(store.cart().is_empty());
        let written = decode_snapshot(&handle.get(CART_STORAGE_KEY).unwrap()).unwrap();
        assert!(written.is_empty());

        assert_eq!(store.clear(), MutationOutcome::Unchanged);
    }
}
