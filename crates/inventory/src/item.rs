use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use stockview_core::{DomainError, Entity, ItemId};

/// Label shown wherever an item has no name.
pub const UNNAMED_ITEM: &str = "Unnamed Item";

/// Items with a known quantity strictly below this are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: u64 = 4;

/// A single stock record as exchanged with the inventory service.
///
/// Every attribute except `id` may be missing on the wire. Absence is kept
/// explicit: a quantity of `Some(0)` is a real (empty) stock level, `None`
/// means the service never reported one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(alias = "_id")]
    pub id: ItemId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<u64>,
    #[serde(
        default,
        deserialize_with = "deserialize_price",
        serialize_with = "serialize_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub reorder_level: Option<u64>,
    #[serde(
        default,
        deserialize_with = "deserialize_date_added",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_added: Option<DateTime<Utc>>,
}

impl InventoryItem {
    /// A record carrying only its identifier.
    pub fn new(id: impl Into<ItemId>) -> Self {
        Self {
            id: id.into(),
            item_name: None,
            sku: None,
            category: None,
            quantity: None,
            price: None,
            supplier: None,
            reorder_level: None,
            date_added: None,
        }
    }

    /// Name for display, falling back to [`UNNAMED_ITEM`].
    pub fn display_name(&self) -> &str {
        self.item_name.as_deref().unwrap_or(UNNAMED_ITEM)
    }

    /// Low-stock flag. Derived on every call, never stored.
    pub fn is_low_stock(&self) -> bool {
        matches!(self.quantity, Some(q) if q < LOW_STOCK_THRESHOLD)
    }

    /// The text fields considered by search, skipping absent ones.
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        [&self.item_name, &self.sku, &self.category, &self.supplier]
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// `price × quantity`, when both are known.
    pub fn stock_value(&self) -> Option<Decimal> {
        match (self.price, self.quantity) {
            (Some(price), Some(qty)) => price.checked_mul(Decimal::from(qty)),
            _ => None,
        }
    }
}

impl Entity for InventoryItem {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A partial edit applied to a staged item before it is submitted.
///
/// `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPatch {
    pub item_name: Option<String>,
    pub sku: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<u64>,
    pub price: Option<Decimal>,
    pub supplier: Option<String>,
    pub reorder_level: Option<u64>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the patch in place. Rejects blank names and negative prices
    /// without touching the item.
    pub fn apply(&self, item: &mut InventoryItem) -> Result<(), DomainError> {
        if let Some(name) = &self.item_name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("item name cannot be blank"));
            }
        }
        if let Some(price) = self.price {
            if price.is_sign_negative() {
                return Err(DomainError::validation("price cannot be negative"));
            }
        }

        if let Some(name) = &self.item_name {
            item.item_name = Some(name.trim().to_string());
        }
        if let Some(sku) = &self.sku {
            item.sku = Some(sku.clone());
        }
        if let Some(category) = &self.category {
            item.category = Some(category.clone());
        }
        if let Some(quantity) = self.quantity {
            item.quantity = Some(quantity);
        }
        if let Some(price) = self.price {
            item.price = Some(price);
        }
        if let Some(supplier) = &self.supplier {
            item.supplier = Some(supplier.clone());
        }
        if let Some(level) = self.reorder_level {
            item.reorder_level = Some(level);
        }
        Ok(())
    }
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    raw.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Prices arrive as JSON numbers or numeric strings. Anything else,
/// including a negative amount, is treated as absent so one malformed
/// record cannot fail a whole load.
fn deserialize_price<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let parsed = match &raw {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        Some(Value::String(s)) => parse_decimal(s),
        Some(_) => None,
    }
    .filter(|price| *price >= Decimal::ZERO);
    if parsed.is_none() && !matches!(raw, None | Some(Value::Null)) {
        tracing::warn!(?raw, "ignoring invalid price");
    }
    Ok(parsed)
}

/// Stock counts: non-negative integers, as JSON numbers or numeric strings.
/// Fractions, negatives and anything else are treated as absent.
fn deserialize_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let parsed = match &raw {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_u64(),
        Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
        Some(_) => None,
    };
    if parsed.is_none() && !matches!(raw, None | Some(Value::Null)) {
        tracing::warn!(?raw, "ignoring invalid stock count");
    }
    Ok(parsed)
}

fn serialize_price<S>(value: &Option<Decimal>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value.as_ref().and_then(|d| d.to_f64()) {
        Some(price) => serializer.serialize_f64(price),
        None => serializer.serialize_none(),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Accepts RFC 3339 strings, bare `YYYY-MM-DD` dates and epoch milliseconds.
fn deserialize_date_added<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    let parsed = match &raw {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => parse_timestamp(s),
        Some(Value::Number(n)) => n.as_i64().and_then(DateTime::<Utc>::from_timestamp_millis),
        Some(_) => None,
    };
    if parsed.is_none() && !matches!(raw, None | Some(Value::Null)) {
        tracing::warn!(?raw, "ignoring unparseable dateAdded");
    }
    Ok(parsed)
}
