//! Catalog store: the authoritative product list and its persistence.
//!
//! Every mutation builds the next list, persists the full snapshot, and only
//! then swaps it in, so a failed write leaves both memory and disk unchanged.

mod import;
mod snapshot;

use std::collections::HashSet;

use serde_json::Value;

pub use import::{
    parse_import_document, parse_price_text, validate_price, ImportReport, LooseProduct,
};
pub use snapshot::{FileSnapshot, MemorySnapshot, SnapshotStore};

use crate::error::{Error, Result};
use crate::models::{ImagePath, Product, ProductField, ProductId, UpsertOutcome};

/// Owns the in-memory product list and its durable snapshot.
#[derive(Debug)]
pub struct CatalogStore<S: SnapshotStore> {
    products: Vec<Product>,
    snapshot: S,
}

impl<S: SnapshotStore> CatalogStore<S> {
    /// Load the catalog from its snapshot.
    ///
    /// A missing, unreadable, or malformed snapshot yields an empty catalog.
    /// Records without an id, or repeating an earlier id, get a fresh one.
    pub fn load(snapshot: S) -> Self {
        let products = match snapshot.read() {
            Ok(Some(raw)) => parse_snapshot(&raw),
            Ok(None) => Vec::new(),
            Err(error) => {
                tracing::warn!("Failed to read catalog snapshot, starting empty: {}", error);
                Vec::new()
            }
        };
        tracing::debug!("Loaded {} products from snapshot", products.len());
        Self { products, snapshot }
    }

    /// Products in insertion order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn snapshot(&self) -> &S {
        &self.snapshot
    }

    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    /// Products whose id starts with `prefix`.
    pub fn find_by_id_prefix(&self, prefix: &str) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|product| product.id.as_str().starts_with(prefix))
            .collect()
    }

    /// Insert a product, or replace the record sharing its identity tuple.
    ///
    /// A replaced record keeps its id.
    pub fn upsert_by_identity(
        &mut self,
        name: &str,
        price: f64,
        category: &str,
        img: ImagePath,
    ) -> Result<UpsertOutcome> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Product name cannot be empty".to_string()));
        }
        validate_price(price)?;

        let mut next = self.products.clone();
        let outcome = upsert_into(&mut next, name, price, category.trim(), img);
        self.commit(next)?;

        match &outcome {
            UpsertOutcome::Inserted(id) => tracing::info!("Inserted product {}", id),
            UpsertOutcome::Replaced(id) => tracing::info!("Replaced product {}", id),
        }
        Ok(outcome)
    }

    /// Apply a single-field edit and persist it.
    ///
    /// Invalid input fails with [`Error::Validation`] and leaves the stored
    /// value untouched.
    pub fn update_field(
        &mut self,
        id: &ProductId,
        field: ProductField,
        raw_value: &str,
    ) -> Result<Product> {
        let index = self
            .products
            .iter()
            .position(|product| &product.id == id)
            .ok_or_else(|| Error::NotFound(format!("product {id}")))?;

        let mut updated = self.products[index].clone();
        let raw_value = raw_value.trim();
        match field {
            ProductField::Name => {
                if raw_value.is_empty() {
                    return Err(Error::Validation("Product name cannot be empty".to_string()));
                }
                updated.name = raw_value.to_string();
            }
            ProductField::Price => updated.price = parse_price_text(raw_value)?,
            ProductField::Category => updated.category = raw_value.to_string(),
            ProductField::Img => updated.img = updated.img.with_file_name(raw_value)?,
        }

        let mut next = self.products.clone();
        next[index] = updated.clone();
        self.commit(next)?;
        tracing::info!("Updated {} of product {}", field, id);
        Ok(updated)
    }

    /// Remove a product. Returns `false` when no product had that id.
    pub fn delete_by_id(&mut self, id: &ProductId) -> Result<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }

        let next = self
            .products
            .iter()
            .filter(|product| &product.id != id)
            .cloned()
            .collect();
        self.commit(next)?;
        tracing::info!("Deleted product {}", id);
        Ok(true)
    }

    /// Empty the catalog. Returns how many products were removed.
    pub fn clear(&mut self) -> Result<usize> {
        let removed = self.products.len();
        self.commit(Vec::new())?;
        tracing::info!("Cleared {} products", removed);
        Ok(removed)
    }

    /// Import a JSON document of products.
    pub fn bulk_import(&mut self, document: &str) -> Result<ImportReport> {
        let items = parse_import_document(document)?;
        self.bulk_import_values(&items)
    }

    /// Import already-parsed array elements.
    ///
    /// Elements without a name, with a zero price, or with an unusable image
    /// name are skipped individually; the rest go through the identity upsert.
    /// The catalog is persisted once, after all elements are applied.
    pub fn bulk_import_values(&mut self, items: &[Value]) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        let mut next = self.products.clone();

        for (index, item) in items.iter().enumerate() {
            let Some(candidate) = LooseProduct::from_value(item) else {
                tracing::warn!("Skipping import element {}: not an object", index);
                report.skipped += 1;
                continue;
            };
            if let Some(reason) = candidate.import_rejection() {
                tracing::warn!("Skipping import element {}: {}", index, reason);
                report.skipped += 1;
                continue;
            }

            let outcome = upsert_into(
                &mut next,
                &candidate.name,
                candidate.price,
                &candidate.category,
                candidate.img,
            );
            if outcome.is_insert() {
                report.inserted += 1;
            } else {
                report.updated += 1;
            }
        }

        if report.inserted + report.updated > 0 {
            self.commit(next)?;
        }
        tracing::info!(
            inserted = report.inserted,
            updated = report.updated,
            skipped = report.skipped,
            "Bulk import finished"
        );
        Ok(report)
    }

    /// Replace the whole catalog, e.g. with a fetched remote copy.
    pub fn replace_all(&mut self, products: Vec<Product>) -> Result<()> {
        let count = products.len();
        self.commit(products)?;
        tracing::info!("Replaced catalog with {} products", count);
        Ok(())
    }

    fn commit(&mut self, next: Vec<Product>) -> Result<()> {
        let serialized = serde_json::to_string_pretty(&next)?;
        self.snapshot.write(&serialized)?;
        self.products = next;
        Ok(())
    }
}

fn upsert_into(
    products: &mut Vec<Product>,
    name: &str,
    price: f64,
    category: &str,
    img: ImagePath,
) -> UpsertOutcome {
    if let Some(existing) = products
        .iter_mut()
        .find(|product| product.same_identity(name, price, category, &img))
    {
        existing.name = name.to_string();
        existing.price = price;
        existing.category = category.to_string();
        existing.img = img;
        return UpsertOutcome::Replaced(existing.id.clone());
    }

    let product = Product::new(name, price, category, img);
    let id = product.id.clone();
    products.push(product);
    UpsertOutcome::Inserted(id)
}

fn parse_snapshot(raw: &str) -> Vec<Product> {
    let items = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Array(items)) => items,
        Ok(_) => {
            tracing::warn!("Catalog snapshot is not an array, starting empty");
            return Vec::new();
        }
        Err(error) => {
            tracing::warn!("Catalog snapshot is malformed, starting empty: {}", error);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(LooseProduct::from_value)
        .map(|loose| {
            let id = match loose.id {
                Some(id) if !seen.contains(&id) => ProductId::from(id.as_str()),
                _ => ProductId::new(),
            };
            seen.insert(id.as_str().to_string());
            Product {
                id,
                name: loose.name,
                price: loose.price,
                category: loose.category,
                img: loose.img,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn empty_store() -> CatalogStore<MemorySnapshot> {
        CatalogStore::load(MemorySnapshot::new())
    }

    fn kopi(store: &mut CatalogStore<MemorySnapshot>) -> ProductId {
        store
            .upsert_by_identity("Kopi", 5000.0, "minuman", ImagePath::parse("kopi.jpg"))
            .unwrap()
            .id()
            .clone()
    }

    #[test]
    fn load_missing_snapshot_is_empty() {
        assert!(empty_store().is_empty());
    }

    #[test]
    fn load_malformed_snapshot_is_empty() {
        let store = CatalogStore::load(MemorySnapshot::with_contents("{not json"));
        assert!(store.is_empty());

        let store = CatalogStore::load(MemorySnapshot::with_contents(r#"{"name": "x"}"#));
        assert!(store.is_empty());
    }

    #[test]
    fn load_assigns_missing_and_duplicate_ids() {
        let raw = json!([
            {"id": "a1", "name": "Kopi", "price": 5000, "category": "minuman", "img": "images/kopi.jpg"},
            {"id": "a1", "name": "Teh", "price": 3000, "category": "minuman", "img": "images/teh.jpg"},
            {"name": "Gula", "price": 12000, "category": "dapur", "img": "images/gula.jpg"}
        ]);
        let store = CatalogStore::load(MemorySnapshot::with_contents(raw.to_string()));

        assert_eq!(store.len(), 3);
        assert_eq!(store.products()[0].id.as_str(), "a1");
        assert_ne!(store.products()[1].id.as_str(), "a1");
        let ids: HashSet<_> = store.products().iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn persisted_catalog_roundtrips_with_ids() {
        let snapshot = MemorySnapshot::new();
        let mut store = CatalogStore::load(snapshot.clone());
        kopi(&mut store);
        store
            .upsert_by_identity("Teh", 3000.0, "minuman", ImagePath::parse("teh.jpg"))
            .unwrap();

        let reloaded = CatalogStore::load(snapshot);
        assert_eq!(reloaded.products(), store.products());
    }

    #[test]
    fn upsert_same_tuple_replaces_and_keeps_id() {
        let mut store = empty_store();
        let first = kopi(&mut store);
        let outcome = store
            .upsert_by_identity("Kopi", 5000.0, "minuman", ImagePath::parse("kopi.jpg"))
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Replaced(first));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn upsert_different_tuple_inserts() {
        let mut store = empty_store();
        kopi(&mut store);
        let outcome = store
            .upsert_by_identity("Kopi", 6000.0, "minuman", ImagePath::parse("kopi.jpg"))
            .unwrap();
        assert!(outcome.is_insert());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn upsert_rejects_empty_name_and_negative_price() {
        let mut store = empty_store();
        assert!(matches!(
            store.upsert_by_identity(" ", 1.0, "x", ImagePath::empty()),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            store.upsert_by_identity("Kopi", -1.0, "x", ImagePath::empty()),
            Err(Error::Validation(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn repeated_upserts_never_duplicate_identity() {
        let mut store = empty_store();
        let names = ["Kopi", "Teh", "Kopi", "Gula", "Teh", "Kopi"];
        for name in names {
            store
                .upsert_by_identity(name, 1000.0, "umum", ImagePath::parse("x.jpg"))
                .unwrap();
        }

        assert_eq!(store.len(), 3);
        let products = store.products();
        for (i, a) in products.iter().enumerate() {
            for b in &products[i + 1..] {
                assert!(!a.same_identity(&b.name, b.price, &b.category, &b.img));
            }
        }
    }

    #[test]
    fn update_price_non_numeric_fails_and_keeps_value() {
        let mut store = empty_store();
        let id = kopi(&mut store);

        let error = store.update_field(&id, ProductField::Price, "abc").unwrap_err();
        assert!(matches!(error, Error::Validation(_)));
        assert_eq!(store.get(&id).unwrap().price, 5000.0);
    }

    #[test]
    fn update_price_strips_noise_and_persists() {
        let snapshot = MemorySnapshot::new();
        let mut store = CatalogStore::load(snapshot.clone());
        let id = kopi(&mut store);

        store.update_field(&id, ProductField::Price, "Rp 7500").unwrap();
        let reloaded = CatalogStore::load(snapshot);
        assert_eq!(reloaded.get(&id).unwrap().price, 7500.0);
    }

    #[test]
    fn update_img_keeps_base_dir_and_sanitizes() {
        let mut store = empty_store();
        let id = store
            .upsert_by_identity("Kopi", 5000.0, "minuman", ImagePath::parse("menu/kopi.jpg"))
            .unwrap()
            .id()
            .clone();

        let updated = store.update_field(&id, ProductField::Img, "kopi:hitam?.jpg").unwrap();
        assert_eq!(updated.img.to_string(), "menu/kopihitam.jpg");
    }

    #[test]
    fn update_img_rejects_empty() {
        let mut store = empty_store();
        let id = kopi(&mut store);
        assert!(matches!(
            store.update_field(&id, ProductField::Img, "  "),
            Err(Error::Validation(_))
        ));
        assert_eq!(store.get(&id).unwrap().img.to_string(), "images/kopi.jpg");
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut store = empty_store();
        let error = store
            .update_field(&ProductId::from("missing"), ProductField::Name, "x")
            .unwrap_err();
        assert!(error.is_not_found());
    }

    #[test]
    fn delete_absent_id_is_noop() {
        let mut store = empty_store();
        kopi(&mut store);
        assert!(!store.delete_by_id(&ProductId::from("missing")).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn delete_and_clear_persist() {
        let snapshot = MemorySnapshot::new();
        let mut store = CatalogStore::load(snapshot.clone());
        let id = kopi(&mut store);
        store
            .upsert_by_identity("Teh", 3000.0, "minuman", ImagePath::parse("teh.jpg"))
            .unwrap();

        assert!(store.delete_by_id(&id).unwrap());
        assert_eq!(CatalogStore::load(snapshot.clone()).len(), 1);

        assert_eq!(store.clear().unwrap(), 1);
        assert!(CatalogStore::load(snapshot).is_empty());
    }

    #[test]
    fn import_into_empty_catalog_then_reimport_updates() {
        let mut store = empty_store();
        let document = r#"[{"name":"Kopi","price":5000,"category":"minuman","img":"kopi.jpg"}]"#;

        let report = store.bulk_import(document).unwrap();
        assert_eq!(
            report,
            ImportReport {
                inserted: 1,
                updated: 0,
                skipped: 0
            }
        );
        assert_eq!(store.products()[0].img.to_string(), "images/kopi.jpg");

        let report = store.bulk_import(document).unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn import_skips_bad_elements_individually() {
        let mut store = empty_store();
        let document = json!([
            {"name": "Kopi", "price": 5000, "category": "minuman", "img": "kopi.jpg"},
            {"name": "", "price": 100},
            {"name": "Gratis", "price": 0},
            "not an object",
            {"name": "Teh", "price": "3000"}
        ]);

        let report = store.bulk_import(&document.to_string()).unwrap();
        assert_eq!(report.inserted, 2);
        assert_eq!(report.skipped, 3);
        assert_eq!(report.total(), 5);
    }

    #[test]
    fn import_non_array_fails_without_touching_catalog() {
        let snapshot = MemorySnapshot::new();
        let mut store = CatalogStore::load(snapshot.clone());
        kopi(&mut store);
        let before = snapshot.read().unwrap();

        let error = store.bulk_import(r#"{"name": "Kopi"}"#).unwrap_err();
        assert!(matches!(error, Error::Format(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(snapshot.read().unwrap(), before);
    }

    #[test]
    fn replace_all_overwrites_catalog() {
        let mut store = empty_store();
        kopi(&mut store);
        let replacement = vec![Product::new("Teh", 3000.0, "minuman", ImagePath::parse("teh.jpg"))];
        store.replace_all(replacement.clone()).unwrap();
        assert_eq!(store.products(), replacement.as_slice());
    }

    #[test]
    fn find_by_id_prefix_matches_start() {
        let mut store = empty_store();
        store
            .replace_all(vec![
                Product {
                    id: ProductId::from("abc-1"),
                    ..Product::new("Kopi", 1.0, "", ImagePath::empty())
                },
                Product {
                    id: ProductId::from("abd-2"),
                    ..Product::new("Teh", 1.0, "", ImagePath::empty())
                },
            ])
            .unwrap();

        assert_eq!(store.find_by_id_prefix("ab").len(), 2);
        assert_eq!(store.find_by_id_prefix("abc").len(), 1);
        assert!(store.find_by_id_prefix("x").is_empty());
    }
}
