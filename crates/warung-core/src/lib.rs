//! warung-core - Core library for Warung
//!
//! This crate contains the product catalog, its filtered views, the credential
//! vault, and the remote sync client used by the Warung CLI and API.

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod remote;
pub mod util;
pub mod vault;
pub mod view;

pub use catalog::{CatalogStore, FileSnapshot, MemorySnapshot, SnapshotStore};
pub use error::{Error, Result};
pub use models::{ImagePath, Product, ProductField, ProductId, UpsertOutcome};
