//! Product catalog.
//!
//! The catalog is a JSON array of products read once at startup by a
//! background task. Until the task finishes the catalog reports
//! [`CatalogState::Loading`]; a failed load degrades to an empty product
//! list with an error indicator.

use std::collections::HashSet;
use std::path::Path;

use powerlabs_core::{Product, ProductId};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, instrument};

/// Errors that can occur while loading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate product id {0} in catalog")]
    DuplicateProduct(ProductId),

    #[error("product {0} has a negative price")]
    NegativePrice(ProductId),
}

/// An immutable, validated list of products.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Validate and wrap a product list, keeping its order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if two products share an id or a price is
    /// negative.
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(products.len());
        for product in &products {
            if !seen.insert(product.id) {
                return Err(CatalogError::DuplicateProduct(product.id));
            }
            if product.price.is_negative() {
                return Err(CatalogError::NegativePrice(product.id));
            }
        }
        Ok(Self { products })
    }

    /// Parse a catalog from its JSON form.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` for malformed JSON or invalid products.
    pub fn from_json(data: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(data)?)
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by id.
    #[must_use]
    pub fn find(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Number of products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog has no products.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// Read and validate the catalog file at `path`.
///
/// # Errors
///
/// Returns `CatalogError` if the file cannot be read or is invalid.
#[instrument(skip(path), fields(path = %path.display()))]
pub async fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let data = tokio::fs::read_to_string(path).await?;
    let catalog = Catalog::from_json(&data)?;
    info!(products = catalog.len(), "Catalog loaded");
    Ok(catalog)
}

/// Load status of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CatalogState {
    #[default]
    Loading,
    Ready(Catalog),
    Failed(String),
}

/// Wire label for a [`CatalogState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogStatus {
    Loading,
    Ready,
    Failed,
}

impl CatalogState {
    /// Turn a load result into a state, logging failures.
    #[must_use]
    pub fn from_result(result: Result<Catalog, CatalogError>) -> Self {
        match result {
            Ok(catalog) => Self::Ready(catalog),
            Err(e) => {
                error!(error = %e, "Catalog load failed, serving an empty catalog");
                Self::Failed(e.to_string())
            }
        }
    }

    /// Wire label for this state.
    #[must_use]
    pub const fn status(&self) -> CatalogStatus {
        match self {
            Self::Loading => CatalogStatus::Loading,
            Self::Ready(_) => CatalogStatus::Ready,
            Self::Failed(_) => CatalogStatus::Failed,
        }
    }

    /// Products to show; empty unless the catalog is ready.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        match self {
            Self::Ready(catalog) => catalog.products(),
            Self::Loading | Self::Failed(_) => &[],
        }
    }

    /// The loaded catalog, if ready.
    #[must_use]
    pub const fn catalog(&self) -> Option<&Catalog> {
        match self {
            Self::Ready(catalog) => Some(catalog),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    /// Load failure message, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            Self::Loading | Self::Ready(_) => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use powerlabs_core::Money;

    use super::*;

    const SAMPLE: &str = r#"[
        {"id": 1, "name": "Desk Lamp", "price": 24.5, "imgUrl": "/images/lamp.jpg"},
        {"id": 2, "name": "Mug", "price": 8.75}
    ]"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = Catalog::from_json(SAMPLE).unwrap();

        assert_eq!(catalog.len(), 2);
        let mug = catalog.find(ProductId::new(2)).unwrap();
        assert_eq!(mug.price, Money::from_cents(875));
        assert_eq!(mug.display_image(), "/images/image.jpg");
        assert!(catalog.find(ProductId::new(3)).is_none());
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let data = r#"[{"id": 1, "name": "A", "price": 1}, {"id": 1, "name": "B", "price": 2}]"#;
        assert!(matches!(
            Catalog::from_json(data),
            Err(CatalogError::DuplicateProduct(id)) if id == ProductId::new(1)
        ));
    }

    #[test]
    fn test_rejects_negative_prices() {
        let data = r#"[{"id": 4, "name": "Refund", "price": -1}]"#;
        assert!(matches!(
            Catalog::from_json(data),
            Err(CatalogError::NegativePrice(_))
        ));
    }

    #[tokio::test]
    async fn test_load_catalog_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let catalog = load_catalog(file.path()).await.unwrap();
        assert_eq!(catalog.products()[0].name, "Desk Lamp");
    }

    #[tokio::test]
    async fn test_missing_file_degrades_to_failed() {
        let dir = tempfile::tempdir().unwrap();
        let state = CatalogState::from_result(load_catalog(&dir.path().join("nope.json")).await);

        assert_eq!(state.status(), CatalogStatus::Failed);
        assert!(state.products().is_empty());
        assert!(state.error().is_some());
    }

    #[test]
    fn test_loading_state_has_no_products() {
        let state = CatalogState::default();
        assert_eq!(state.status(), CatalogStatus::Loading);
        assert!(state.products().is_empty());
        assert!(state.catalog().is_none());
    }
}
