//! Headline figures for the dashboard.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::item::InventoryItem;

/// Totals over the full (unfiltered) collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub item_count: usize,
    pub total_quantity: u64,
    pub low_stock_count: usize,
    /// Sum of `price × quantity` over items where both are known.
    pub stock_value: Decimal,
}

impl InventorySummary {
    pub fn from_items(items: &[InventoryItem]) -> Self {
        items.iter().fold(Self::default(), |mut acc, item| {
            acc.item_count += 1;
            acc.total_quantity = acc.total_quantity.saturating_add(item.quantity.unwrap_or(0));
            if item.is_low_stock() {
                acc.low_stock_count += 1;
            }
            if let Some(value) = item.stock_value() {
                acc.stock_value += value;
            }
            acc
        })
    }
}
