//! Catalog snapshot consumed by the storefront.
//!
//! The catalog store exports a JSON document with product snapshots and flat
//! category records. The storefront loads it once at startup. When the file
//! is missing or unreadable the storefront still serves carts, falling back
//! to the product copies cached inside each cart.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument, warn};

use marketsquare_core::{CategoryRecord, ProductId, ProductSnapshot};

/// Errors that can occur while loading the catalog snapshot.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// On-disk shape of the catalog snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub products: Vec<ProductSnapshot>,
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
}

/// In-memory catalog indexed for cart lookups.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: HashMap<ProductId, ProductSnapshot>,
    categories: Vec<CategoryRecord>,
}

impl Catalog {
    /// Load the catalog snapshot from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument]
    pub async fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CatalogError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        let snapshot: CatalogSnapshot =
            serde_json::from_str(&content).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let catalog = Self::from_snapshot(snapshot);
        info!(
            products = catalog.products.len(),
            categories = catalog.categories.len(),
            "Catalog snapshot loaded"
        );
        Ok(catalog)
    }

    /// Load the catalog, or start with an empty one if it is unavailable.
    pub async fn load_or_empty(path: &Path) -> Self {
        match Self::load(path).await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!(error = %e, "Catalog unavailable; carts will use cached product data");
                Self::default()
            }
        }
    }

    /// Index an already parsed snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        Self {
            products: snapshot
                .products
                .into_iter()
                .map(|product| (product.id.clone(), product))
                .collect(),
            categories: snapshot.categories,
        }
    }

    /// Current snapshot for a product.
    #[must_use]
    pub fn product(&self, id: &str) -> Option<&ProductSnapshot> {
        self.products.get(id)
    }

    /// Flat category records in catalog order.
    #[must_use]
    pub fn categories(&self) -> &[CategoryRecord] {
        &self.categories
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.categories.is_empty()
    }
}
