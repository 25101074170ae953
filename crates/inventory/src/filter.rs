//! Search over the item collection.

use crate::item::InventoryItem;

/// A user-entered search term, normalized once for case-insensitive matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerm {
    raw: String,
    needle: String,
}

impl SearchTerm {
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let needle = raw.to_lowercase();
        Self { raw, needle }
    }

    /// The term as typed.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// True when any present searchable field contains the term.
    ///
    /// The empty term matches every item that has at least one searchable
    /// field; an item with none of them never matches.
    pub fn matches(&self, item: &InventoryItem) -> bool {
        item.searchable_fields()
            .any(|field| field.to_lowercase().contains(&self.needle))
    }

    /// Matching items, in collection order.
    pub fn apply<'a>(&self, items: &'a [InventoryItem]) -> Vec<&'a InventoryItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

impl From<&str> for SearchTerm {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Filter `items` by `term` (case-insensitive substring over name, SKU,
/// category and supplier).
pub fn filter<'a>(items: &'a [InventoryItem], term: &str) -> Vec<&'a InventoryItem> {
    SearchTerm::new(term).apply(items)
}
