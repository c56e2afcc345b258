//! # Catalog Module
//!
//! ## Purpose
//! Product data model and the read-only catalog data source backing every
//! query operation. The catalog is loaded once at startup and never mutated
//! afterwards, so concurrent request handlers can share it freely.
//!
//! ## Input/Output Specification
//! - **Input**: Catalog JSON (embedded reference data or a configured file)
//! - **Output**: Validated, immutable `Product` records and category listings
//! - **Lifecycle**: Load once, read-only for the process lifetime
//!
//! ## Key Features
//! - Typed product/category model with camelCase wire names
//! - Injected `CatalogSource` trait so the engine is testable with fixtures
//! - Load-time validation (unique ids, rating bounds, discount invariant)

use crate::config::CatalogConfig;
use crate::errors::{CatalogError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Embedded reference catalog (10 products across five categories)
const DEFAULT_CATALOG_JSON: &str = include_str!("../data/catalog.json");

/// Product category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Clothing,
    Footwear,
    Accessories,
    Bags,
}

impl Category {
    /// All categories, in the order the storefront presents them
    pub const ALL: [Category; 5] = [
        Category::Electronics,
        Category::Clothing,
        Category::Footwear,
        Category::Accessories,
        Category::Bags,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Clothing => "clothing",
            Category::Footwear => "footwear",
            Category::Accessories => "accessories",
            Category::Bags => "bags",
        }
    }

    /// Parse a category id; `None` for anything outside the enumeration
    pub fn parse(s: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.as_str() == s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer review attached to a product. Display sample only; aggregate
/// ranking uses `Product::review_count`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: u32,
    pub user: String,
    /// Star rating, 1-5
    pub rating: u8,
    pub comment: String,
    pub date: NaiveDate,
    /// How many shoppers marked the review helpful
    pub helpful: u32,
}

/// A single catalog entry. Immutable within a process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique string identifier
    pub id: String,
    pub name: String,
    pub description: String,
    /// Price in the catalog's base currency unit (whole units)
    pub price: i64,
    /// Pre-discount price; if present, expected to be >= `price`
    pub original_price: Option<i64>,
    pub image: String,
    pub category: Category,
    pub in_stock: bool,
    pub stock: u32,
    /// Average rating in [0, 5]
    pub rating: f32,
    /// Authoritative review total; `reviews` below is a display sample
    pub review_count: u32,
    /// Lowercase tags, order irrelevant
    pub tags: Vec<String>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

impl Product {
    /// Whether the product can currently be purchased
    pub fn available(&self) -> bool {
        self.in_stock && self.stock > 0
    }

    /// Discount percentage relative to `original_price`, rounded half-up.
    /// Zero when no original price is set or the invariant is violated.
    pub fn discount_percent(&self) -> u32 {
        match self.original_price {
            Some(original) if original > self.price && original > 0 => {
                let saved = (original - self.price) as u64;
                ((saved * 100 + original as u64 / 2) / original as u64) as u32
            }
            _ => 0,
        }
    }

    /// Case-insensitive containment over name, description, and tags
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        self.name.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
            || self
                .tags
                .iter()
                .any(|tag| tag.to_lowercase().contains(needle_lower))
    }
}

/// Category listing entry served by the categories endpoints
#[derive(Debug, Clone, Serialize)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
}

/// Storefront category listing, including the `all` pseudo-category
pub const CATEGORY_LISTING: [CategoryInfo; 6] = [
    CategoryInfo {
        id: "all",
        name: "All Products",
        icon: "🛍️",
    },
    CategoryInfo {
        id: "electronics",
        name: "Electronics",
        icon: "📱",
    },
    CategoryInfo {
        id: "clothing",
        name: "Clothing",
        icon: "👕",
    },
    CategoryInfo {
        id: "footwear",
        name: "Footwear",
        icon: "👟",
    },
    CategoryInfo {
        id: "accessories",
        name: "Accessories",
        icon: "👜",
    },
    CategoryInfo {
        id: "bags",
        name: "Bags",
        icon: "🎒",
    },
];

/// Read-only catalog data source. The engine depends on this trait rather
/// than on a concrete collection so tests can inject fixture data.
pub trait CatalogSource: Send + Sync {
    /// All products, in stable catalog order
    fn all(&self) -> &[Product];
}

/// Catalog backed by a fixed in-memory product list
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    /// Load the catalog per configuration: a JSON file when `data_path` is
    /// set, otherwise the embedded reference data.
    pub fn load(config: &CatalogConfig) -> Result<Self> {
        match &config.data_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                let catalog = Self::from_json(&content, &path.display().to_string())?;
                tracing::info!(
                    "Loaded {} products from {:?}",
                    catalog.products.len(),
                    path
                );
                Ok(catalog)
            }
            None => {
                let catalog = Self::from_json(DEFAULT_CATALOG_JSON, "embedded catalog")?;
                tracing::info!(
                    "Loaded {} products from embedded reference data",
                    catalog.products.len()
                );
                Ok(catalog)
            }
        }
    }

    /// Parse and validate catalog JSON
    pub fn from_json(json: &str, source_name: &str) -> Result<Self> {
        let products: Vec<Product> =
            serde_json::from_str(json).map_err(|e| CatalogError::CatalogData {
                source_name: source_name.to_string(),
                details: e.to_string(),
            })?;

        Self::from_products(products)
    }

    /// Build a catalog from already-parsed products, enforcing load-time
    /// invariants.
    pub fn from_products(products: Vec<Product>) -> Result<Self> {
        let mut seen = HashSet::new();
        for product in &products {
            if !seen.insert(product.id.as_str()) {
                return Err(CatalogError::DuplicateProductId {
                    id: product.id.clone(),
                });
            }

            if !(0.0..=5.0).contains(&product.rating) {
                return Err(CatalogError::CatalogData {
                    source_name: product.id.clone(),
                    details: format!("rating {} outside [0, 5]", product.rating),
                });
            }

            // Tolerated, not fatal: discount math treats this as zero off
            if matches!(product.original_price, Some(original) if original < product.price) {
                tracing::warn!(
                    "Product {} has originalPrice below price; treating as no discount",
                    product.id
                );
            }
        }

        Ok(Self { products })
    }
}

impl CatalogSource for StaticCatalog {
    fn all(&self) -> &[Product] {
        &self.products
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product(id: &str) -> Product {
        Product {
            id: id.to_string(),
            name: "Test Product".to_string(),
            description: "A product for testing".to_string(),
            price: 1000,
            original_price: Some(1250),
            image: String::new(),
            category: Category::Electronics,
            in_stock: true,
            stock: 5,
            rating: 4.0,
            review_count: 10,
            tags: vec!["test".to_string()],
            reviews: Vec::new(),
        }
    }

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = StaticCatalog::from_json(DEFAULT_CATALOG_JSON, "embedded").unwrap();
        assert_eq!(catalog.all().len(), 10);

        // Every product honors the discount invariant in the reference data
        for product in catalog.all() {
            if let Some(original) = product.original_price {
                assert!(original >= product.price, "bad data for {}", product.id);
            }
            assert!((0.0..=5.0).contains(&product.rating));
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let products = vec![sample_product("p1"), sample_product("p1")];
        assert!(matches!(
            StaticCatalog::from_products(products),
            Err(CatalogError::DuplicateProductId { .. })
        ));
    }

    #[test]
    fn test_rating_bounds_rejected() {
        let mut product = sample_product("p1");
        product.rating = 5.5;
        assert!(StaticCatalog::from_products(vec![product]).is_err());
    }

    #[test]
    fn test_discount_percent_rounds_half_up() {
        let mut product = sample_product("p1");
        // 250 off 1250 = exactly 20%
        assert_eq!(product.discount_percent(), 20);

        // 500 off 3499: 14.29% -> 14
        product.price = 2999;
        product.original_price = Some(3499);
        assert_eq!(product.discount_percent(), 14);

        // 3000 off 11999: 25.002% -> 25; half-up boundary checked below
        product.price = 8999;
        product.original_price = Some(11999);
        assert_eq!(product.discount_percent(), 25);

        // 1 off 8 = 12.5% -> rounds up to 13
        product.price = 7;
        product.original_price = Some(8);
        assert_eq!(product.discount_percent(), 13);
    }

    #[test]
    fn test_discount_percent_tolerates_violated_invariant() {
        let mut product = sample_product("p1");
        product.original_price = Some(500); // below price
        assert_eq!(product.discount_percent(), 0);

        product.original_price = None;
        assert_eq!(product.discount_percent(), 0);
    }

    #[test]
    fn test_matches_text_covers_tags() {
        let product = sample_product("p1");
        assert!(product.matches_text("test"));
        assert!(product.matches_text("product"));
        assert!(!product.matches_text("gadget"));
    }

    #[test]
    fn test_category_parse() {
        assert_eq!(Category::parse("electronics"), Some(Category::Electronics));
        assert_eq!(Category::parse("bags"), Some(Category::Bags));
        assert_eq!(Category::parse("all"), None);
        assert_eq!(Category::parse("toys"), None);
    }
}
