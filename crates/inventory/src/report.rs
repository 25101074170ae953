//! Exportable stock report.
//!
//! Turns a (filtered) slice of items into a header, string rows and the
//! per-page footer stamps. Nothing here knows about PDF; the rendering
//! backend consumes this data and reports back how many pages it laid out.

use chrono::NaiveDateTime;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::item::InventoryItem;

/// Column headings, in rendering order.
pub const REPORT_COLUMNS: [&str; 8] = [
    "Item Name",
    "SKU",
    "Category",
    "Quantity",
    "Price",
    "Supplier",
    "Reorder Level",
    "Date Added",
];

const NOT_AVAILABLE: &str = "N/A";

/// Locale-dependent rendering choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFormat {
    pub currency_symbol: String,
    /// `chrono` pattern for `dateAdded` cells (date only).
    pub date_format: String,
    /// `chrono` pattern for the generation timestamp in the footer.
    pub timestamp_format: String,
}

impl Default for ReportFormat {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            date_format: "%-m/%-d/%Y".to_string(),
            timestamp_format: "%-m/%-d/%Y, %-I:%M:%S %p".to_string(),
        }
    }
}

impl ReportFormat {
    /// Currency text with exactly two decimals; absent prices render as zero.
    pub fn price(&self, price: Option<Decimal>) -> String {
        let mut amount = price
            .unwrap_or(Decimal::ZERO)
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(2);
        format!("{}{}", self.currency_symbol, amount)
    }

    /// One table row, columns as in [`REPORT_COLUMNS`].
    pub fn row(&self, item: &InventoryItem) -> Vec<String> {
        vec![
            item.display_name().to_string(),
            text_or_na(&item.sku),
            text_or_na(&item.category),
            number_or_na(item.quantity),
            self.price(item.price),
            text_or_na(&item.supplier),
            number_or_na(item.reorder_level),
            item.date_added
                .map(|dt| dt.date_naive().format(&self.date_format).to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        ]
    }
}

fn text_or_na(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn number_or_na(value: Option<u64>) -> String {
    value
        .map(|n| n.to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Footer text for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterStamp {
    /// 1-based page number.
    pub page: usize,
    /// Left-aligned generation timestamp (identical on every page).
    pub left: String,
    /// Right-aligned `Page X of N`.
    pub right: String,
}

/// A report snapshot: rows plus the single timestamp they were generated at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryReport {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    generated_at: NaiveDateTime,
    generated_label: String,
}

impl InventoryReport {
    /// Build from the filtered view. `generated_at` is the local wall-clock
    /// time, taken once by the caller.
    pub fn build(
        items: &[&InventoryItem],
        generated_at: NaiveDateTime,
        format: &ReportFormat,
    ) -> Self {
        let generated_label = format!(
            "Generated on: {}",
            generated_at.format(&format.timestamp_format)
        );
        Self {
            title: "Inventory Report".to_string(),
            header: REPORT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            rows: items.iter().map(|item| format.row(item)).collect(),
            generated_at,
            generated_label,
        }
    }

    pub fn generated_at(&self) -> NaiveDateTime {
        self.generated_at
    }

    /// `Inventory_Report_<YYYY-MM-DD>.pdf`; depends on the date alone.
    pub fn file_name(&self) -> String {
        format!(
            "Inventory_Report_{}.pdf",
            self.generated_at.date().format("%Y-%m-%d")
        )
    }

    /// Subtitle line under the title on the first page.
    pub fn summary_line(&self) -> String {
        match self.rows.len() {
            1 => "1 item".to_string(),
            n => format!("{n} items"),
        }
    }

    /// Footer stamps for every page, once the total page count is known.
    pub fn footers(&self, page_count: usize) -> Vec<FooterStamp> {
        (1..=page_count)
            .map(|page| FooterStamp {
                page,
                left: self.generated_label.clone(),
                right: format!("Page {page} of {page_count}"),
            })
            .collect()
    }
}
