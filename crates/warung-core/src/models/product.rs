//! Product model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ImagePath;
use crate::error::Error;

/// An opaque, stable identifier for a product.
///
/// New ids are UUID v7 strings; ids loaded from an existing snapshot are kept
/// verbatim whatever their shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new unique product ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A product in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier, never reassigned
    pub id: ProductId,
    /// Display name, never empty
    pub name: String,
    /// Non-negative price
    pub price: f64,
    /// Free-form category label
    pub category: String,
    /// Image reference
    pub img: ImagePath,
}

impl Product {
    /// Create a product with a freshly generated id
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        price: f64,
        category: impl Into<String>,
        img: ImagePath,
    ) -> Self {
        Self {
            id: ProductId::new(),
            name: name.into(),
            price,
            category: category.into(),
            img,
        }
    }

    /// Whether two products share the (name, category, price, img) tuple.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn same_identity(&self, name: &str, price: f64, category: &str, img: &ImagePath) -> bool {
        self.name == name && self.category == category && self.price == price && &self.img == img
    }

    /// Project into the published exchange shape (no id).
    #[must_use]
    pub fn to_published(&self) -> PublishedProduct {
        PublishedProduct {
            name: self.name.clone(),
            price: self.price,
            img: self.img.to_string(),
            category: self.category.clone(),
        }
    }
}

/// The canonical exchange shape of a product: no local identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishedProduct {
    pub name: String,
    pub price: f64,
    pub img: String,
    pub category: String,
}

/// A single editable product field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductField {
    Name,
    Price,
    Category,
    Img,
}

impl FromStr for ProductField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "price" => Ok(Self::Price),
            "category" => Ok(Self::Category),
            "img" | "image" => Ok(Self::Img),
            other => Err(Error::InvalidInput(format!(
                "Unknown product field '{other}' (expected name, price, category, or img)"
            ))),
        }
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Name => "name",
            Self::Price => "price",
            Self::Category => "category",
            Self::Img => "img",
        };
        f.write_str(label)
    }
}

/// Whether an upsert appended a record or replaced an existing one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted(ProductId),
    Replaced(ProductId),
}

impl UpsertOutcome {
    #[must_use]
    pub const fn id(&self) -> &ProductId {
        match self {
            Self::Inserted(id) | Self::Replaced(id) => id,
        }
    }

    #[must_use]
    pub const fn is_insert(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}
