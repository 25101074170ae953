//! Inventory view domain.
//!
//! This crate contains the derivations behind the dashboard, implemented
//! purely as deterministic logic over an in-memory collection (no IO, no
//! HTTP, no rendering):
//! - `item`: the stock record and its presence-aware accessors
//! - `filter`: case-insensitive search across the text fields
//! - `chart`: label/value series for the quantity bar chart
//! - `report`: tabular rows and page footers for the exported report
//! - `summary`: headline figures over the full collection

pub mod chart;
pub mod filter;
pub mod item;
pub mod report;
pub mod summary;

pub use chart::{ChartConfig, ChartSeries, to_series};
pub use filter::{SearchTerm, filter};
pub use item::{InventoryItem, ItemPatch, LOW_STOCK_THRESHOLD, UNNAMED_ITEM};
pub use report::{FooterStamp, InventoryReport, REPORT_COLUMNS, ReportFormat};
pub use summary::InventorySummary;
