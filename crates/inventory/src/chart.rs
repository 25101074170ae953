//! Quantity bar chart data.
//!
//! The chart always reflects total stock: callers pass the full collection,
//! never the search-filtered view.

use serde::Serialize;

use crate::item::InventoryItem;

/// Parallel label/value sequences, one entry per item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub values: Vec<u64>,
}

/// Build the series: display name (or fallback) and quantity (or `0`).
pub fn to_series(items: &[InventoryItem]) -> ChartSeries {
    let (labels, values) = items
        .iter()
        .map(|item| (item.display_name().to_string(), item.quantity.unwrap_or(0)))
        .unzip();
    ChartSeries { labels, values }
}

impl ChartSeries {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Bar chart document for the chart engine.
    pub fn to_config(&self) -> ChartConfig {
        ChartConfig {
            kind: "bar",
            data: ChartData {
                labels: self.labels.clone(),
                datasets: vec![Dataset {
                    label: "Quantity".to_string(),
                    data: self.values.clone(),
                    style: DatasetStyle::default(),
                }],
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartConfig {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub data: ChartData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<u64>,
    #[serde(flatten)]
    pub style: DatasetStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStyle {
    pub background_color: String,
    pub border_color: String,
    pub border_width: u32,
}

impl Default for DatasetStyle {
    fn default() -> Self {
        Self {
            background_color: "rgba(75, 192, 192, 0.6)".to_string(),
            border_color: "rgba(75, 192, 192, 1)".to_string(),
            border_width: 1,
        }
    }
}
