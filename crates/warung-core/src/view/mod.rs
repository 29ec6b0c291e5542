//! Filtered and sorted read-only projections of the catalog.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::Error;
use crate::models::Product;

/// Ordering applied to a projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    /// Catalog insertion order
    #[default]
    None,
}

impl FromStr for SortKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name-asc" => Ok(Self::NameAsc),
            "name-desc" => Ok(Self::NameDesc),
            "price-asc" => Ok(Self::PriceAsc),
            "price-desc" => Ok(Self::PriceDesc),
            "" | "none" => Ok(Self::None),
            other => Err(Error::InvalidInput(format!("Unknown sort key '{other}'"))),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::None => "none",
        };
        f.write_str(label)
    }
}

/// Filter criteria for [`project`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewQuery {
    /// Exact category to keep; empty keeps all
    pub category: String,
    /// Case-insensitive substring of the name; empty keeps all
    pub search: String,
    pub sort: SortKey,
}

impl ViewQuery {
    #[must_use]
    pub fn new(category: Option<&str>, search: Option<&str>, sort: SortKey) -> Self {
        Self {
            category: category.map(str::trim).unwrap_or_default().to_string(),
            search: search.map(str::trim).unwrap_or_default().to_string(),
            sort,
        }
    }

    fn matches(&self, product: &Product, search_lower: &str) -> bool {
        (self.category.is_empty() || product.category == self.category)
            && (search_lower.is_empty() || product.name.to_lowercase().contains(search_lower))
    }
}

/// Derive the filtered, sorted view of `products`.
///
/// Sorting is stable: ties keep catalog order, so identical inputs always
/// yield the same sequence.
pub fn project<'a>(products: &'a [Product], query: &ViewQuery) -> Vec<&'a Product> {
    let search_lower = query.search.to_lowercase();
    let mut view: Vec<&Product> = products
        .iter()
        .filter(|product| query.matches(product, &search_lower))
        .collect();

    match query.sort {
        SortKey::NameAsc => view.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortKey::NameDesc => view.sort_by(|a, b| compare_names(&b.name, &a.name)),
        SortKey::PriceAsc => view.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortKey::PriceDesc => view.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortKey::None => {}
    }
    view
}

/// Compare display names the way a reader expects.
///
/// Primary order ignores accents and case (`Éclair` sorts among the `e`s);
/// accents, then case, only break ties.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| folded_case(a).cmp(folded_case(b)))
        .then_with(|| a.cmp(b))
}

fn base_letters(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
}

fn folded_case(name: &str) -> impl Iterator<Item = char> + '_ {
    name.nfd().flat_map(char::to_lowercase)
}

/// Distinct non-empty categories in first-seen order.
pub fn category_options(products: &[Product]) -> Vec<String> {
    let mut options: Vec<String> = Vec::new();
    for product in products {
        let category = product.category.trim();
        if !category.is_empty() && !options.iter().any(|known| known == category) {
            options.push(category.to_string());
        }
    }
    options
}
