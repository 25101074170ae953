//! Strongly-typed identifiers used across the domain.

use core::fmt;
use core::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of an inventory item.
///
/// The remote service owns id allocation, so the value is opaque to the
/// client: it is compared and echoed back, never interpreted. Services that
/// number their records send integer ids; those are kept in string form and
/// serialized back as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wrap a raw identifier. Surrounding whitespace is trimmed; empty ids
    /// are rejected.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_id("ItemId: empty"));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

struct ItemIdVisitor;

impl Visitor<'_> for ItemIdVisitor {
    type Value = ItemId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-empty string or integer id")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<ItemId, E> {
        ItemId::parse(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<ItemId, E> {
        Ok(ItemId(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<ItemId, E> {
        Ok(ItemId(v.to_string()))
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ItemIdVisitor)
    }
}

impl From<&str> for ItemId {
    /// Unchecked conversion for literals and already-validated values. Use
    /// [`ItemId::parse`] for user input.
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}
