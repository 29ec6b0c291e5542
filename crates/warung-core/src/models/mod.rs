//! Data models for Warung

mod image_path;
mod product;

pub use image_path::{ImagePath, DEFAULT_IMAGE_DIR};
pub use product::{Product, ProductField, ProductId, PublishedProduct, UpsertOutcome};
