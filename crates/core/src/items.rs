//! Items

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when parsing an unknown item kind.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown item kind: {0}")]
pub struct UnknownItemKind(pub String);

/// The kind of catalog entity a line item refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// A physical or digital product.
    Product,

    /// A service offering.
    Service,
}

impl ItemKind {
    /// Storage and wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Service => "service",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = UnknownItemKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "product" => Ok(Self::Product),
            "service" => Ok(Self::Service),
            other => Err(UnknownItemKind(other.to_string())),
        }
    }
}

/// Catalog details captured when an item enters a cart.
///
/// The unit price is a snapshot: later catalog price changes never reach a
/// cart or an order built from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSnapshot {
    /// Opaque catalog identifier.
    pub reference: String,

    /// Product or service.
    pub kind: ItemKind,

    /// Display name at add-time.
    pub title: String,

    /// Unit price in minor units at add-time.
    pub unit_price: u64,

    /// Optional display image.
    pub image: Option<String>,
}

impl ItemSnapshot {
    /// Create a snapshot without an image.
    pub fn new(
        reference: impl Into<String>,
        kind: ItemKind,
        title: impl Into<String>,
        unit_price: u64,
    ) -> Self {
        Self {
            reference: reference.into(),
            kind,
            title: title.into(),
            unit_price,
            image: None,
        }
    }

    /// Attach a display image.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Turn the snapshot into a line item with the given quantity.
    #[must_use]
    pub fn into_line_item(self, quantity: u32) -> LineItem {
        LineItem {
            reference: self.reference,
            kind: self.kind,
            title: self.title,
            unit_price: self.unit_price,
            quantity,
            image: self.image,
        }
    }
}

/// One product or service entry with a quantity in a cart or order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Opaque catalog identifier.
    pub reference: String,

    /// Product or service.
    pub kind: ItemKind,

    /// Display name captured at add-time.
    pub title: String,

    /// Unit price snapshot in minor units.
    pub unit_price: u64,

    /// Number of units, always at least one inside a cart.
    pub quantity: u32,

    /// Optional display image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl LineItem {
    /// Price of the whole line in minor units, `None` on overflow.
    pub fn line_total(&self) -> Option<u64> {
        self.unit_price.checked_mul(u64::from(self.quantity))
    }
}
