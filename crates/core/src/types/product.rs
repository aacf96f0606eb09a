//! Catalog product record.

use serde::{Deserialize, Serialize};

use super::{Money, ProductId};

/// An immutable catalog entry.
///
/// Field names follow the catalog file format:
///
/// ```json
/// { "id": 1, "name": "Desk Lamp", "price": 24.5, "imgUrl": "/images/lamp.jpg" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique catalog key.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price, never negative.
    pub price: Money,
    /// Image reference, may be empty.
    #[serde(default)]
    pub img_url: String,
}

impl Product {
    /// Image shown when a product has no image of its own.
    pub const FALLBACK_IMAGE: &'static str = "/images/image.jpg";

    /// Create a new product.
    #[must_use]
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        price: Money,
        img_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            img_url: img_url.into(),
        }
    }

    /// Image to display, falling back to [`Self::FALLBACK_IMAGE`].
    #[must_use]
    pub fn display_image(&self) -> &str {
        if self.img_url.trim().is_empty() {
            Self::FALLBACK_IMAGE
        } else {
            &self.img_url
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog_record() {
        let json = r#"{"id": 3, "name": "Mug", "price": 8.75, "imgUrl": "/images/mug.jpg"}"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.name, "Mug");
        assert_eq!(product.price, Money::from_cents(875));
        assert_eq!(product.img_url, "/images/mug.jpg");
    }

    #[test]
    fn test_missing_image_falls_back() {
        let json = r#"{"id": 4, "name": "Poster", "price": 12}"#;
        let product: Product = serde_json::from_str(json).unwrap();

        assert_eq!(product.display_image(), Product::FALLBACK_IMAGE);
    }

    #[test]
    fn test_serializes_camel_case() {
        let product = Product::new(ProductId::new(1), "Lamp", Money::from_cents(2450), "/lamp.jpg");
        let json = serde_json::to_value(&product).unwrap();

        assert_eq!(json["imgUrl"], "/lamp.jpg");
        assert!(json.get("img_url").is_none());
    }
}
