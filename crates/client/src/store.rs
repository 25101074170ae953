//! Local copy of the inventory collection.

use std::collections::HashSet;

use stockview_core::{DomainError, DomainResult, Entity};
use stockview_inventory::{InventoryItem, SearchTerm};

/// Ordered collection keyed by entity id.
///
/// Iteration follows the order the service returned; `replace` and `remove`
/// work in place so the relative order of untouched records never changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemStore<T = InventoryItem> {
    items: Vec<T>,
}

impl<T> Default for ItemStore<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> ItemStore<T>
where
    T: Entity + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Full collection, unfiltered.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.get(id).is_some()
    }

    fn position(&self, id: &T::Id) -> DomainResult<usize> {
        self.items
            .iter()
            .position(|item| item.id() == id)
            .ok_or_else(|| DomainError::not_found(format!("{id:?}")))
    }

    /// Swap in a freshly loaded collection. Later duplicates of an id are
    /// dropped; returns how many were dropped.
    pub fn replace_all(&mut self, items: Vec<T>) -> usize {
        let mut seen = HashSet::with_capacity(items.len());
        let before = items.len();
        let unique: Vec<T> = items
            .into_iter()
            .filter(|item| {
                let fresh = seen.insert(item.id().clone());
                if !fresh {
                    tracing::warn!(id = ?item.id(), "dropping duplicate record from load");
                }
                fresh
            })
            .collect();

        let dropped = before - unique.len();
        self.items = unique;
        dropped
    }

    /// Replace the record with the same id, keeping its position.
    pub fn replace(&mut self, item: T) -> DomainResult<()> {
        let idx = self.position(item.id())?;
        self.items[idx] = item;
        Ok(())
    }

    /// Remove the record with this id, keeping the order of the rest.
    pub fn remove(&mut self, id: &T::Id) -> DomainResult<T> {
        let idx = self.position(id)?;
        Ok(self.items.remove(idx))
    }
}

impl ItemStore<InventoryItem> {
    /// Search view over the collection: the table and report source.
    pub fn filtered(&self, term: &SearchTerm) -> Vec<&InventoryItem> {
        term.apply(&self.items)
    }
}
