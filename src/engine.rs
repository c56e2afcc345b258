//! # Catalog Query Engine Module
//!
//! ## Purpose
//! Deterministic query engine over the read-only product catalog: filtering,
//! stable sorting, pagination, and the fixed storefront listings (featured,
//! trending, related). Every operation is a pure function of the catalog and
//! the request-scoped query specification.
//!
//! ## Input/Output Specification
//! - **Input**: `QuerySpec` (filters, sort key, pagination) or route parameters
//! - **Output**: Ordered, paginated product pages with pagination metadata
//! - **Determinism**: Stable sorts; ties preserve catalog order
//!
//! ## Key Features
//! - Filter pipeline: category, free-text containment, price range, stock
//! - Stable sort by price, rating, review count, or name
//! - Out-of-range pages yield empty slices, never errors
//! - The single hard error: a zero page size is rejected before any
//!   pagination math runs

use crate::catalog::{Category, CatalogSource, Product};
use crate::errors::{CatalogError, Result};
use crate::ranking::{self, ScoredProduct, Suggestion};
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;

/// Featured/trending listings return at most this many products
const LISTING_LIMIT: usize = 6;

/// Related-products listings return at most this many products
const RELATED_LIMIT: usize = 4;

/// Featured products must be rated at least this highly
const FEATURED_MIN_RATING: f32 = 4.5;

/// Category selector for a `list` call. An unknown category string matches
/// nothing, mirroring the strict equality the filter applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// No category constraint (absent parameter or the `all` sentinel)
    #[default]
    Any,
    /// Only products in the given category
    Only(Category),
    /// A category outside the enumeration; matches no product
    Unmatched,
}

impl CategoryFilter {
    /// Build a filter from an optional request parameter
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            None => CategoryFilter::Any,
            Some("all") => CategoryFilter::Any,
            Some(s) => match Category::parse(s) {
                Some(category) => CategoryFilter::Only(category),
                None => CategoryFilter::Unmatched,
            },
        }
    }
}

/// Sort key for a `list` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Ascending price
    PriceLow,
    /// Descending price
    PriceHigh,
    /// Descending rating
    Rating,
    /// Descending review count
    Reviews,
    /// Ascending case-insensitive name (the default)
    #[default]
    Name,
}

impl SortKey {
    /// Parse a sort key parameter; unknown values fall back to name order
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("price_low") => SortKey::PriceLow,
            Some("price_high") => SortKey::PriceHigh,
            Some("rating") => SortKey::Rating,
            Some("reviews") => SortKey::Reviews,
            _ => SortKey::Name,
        }
    }
}

/// Normalized filter/sort/pagination parameters driving one `list` call.
/// Defaulting happens at the boundary; the engine assumes minimally-sane
/// values but never panics on the rest.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub category: CategoryFilter,
    /// Case-insensitive substring over name, description, and tags
    pub search: Option<String>,
    pub min_price: i64,
    pub max_price: i64,
    pub in_stock_only: bool,
    pub sort: SortKey,
    pub page: usize,
    pub page_size: usize,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self {
            category: CategoryFilter::Any,
            search: None,
            min_price: 0,
            max_price: i64::MAX,
            in_stock_only: false,
            sort: SortKey::Name,
            page: 1,
            page_size: 20,
        }
    }
}

/// Pagination metadata returned with every `list` result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
}

/// One page of filtered, sorted products
#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

/// Catalog query engine. Stateless beyond the injected read-only source;
/// safe to share across concurrent request handlers.
pub struct QueryEngine {
    catalog: Arc<dyn CatalogSource>,
}

impl QueryEngine {
    pub fn new(catalog: Arc<dyn CatalogSource>) -> Self {
        Self { catalog }
    }

    /// All products in stable catalog order
    pub fn products(&self) -> &[Product] {
        self.catalog.all()
    }

    /// Filter, sort, and paginate the catalog per the query specification.
    ///
    /// The source collection is never mutated; each call works on its own
    /// copy. A zero page size is the one rejected input.
    pub fn list(&self, spec: &QuerySpec) -> Result<ProductPage> {
        if spec.page_size == 0 {
            return Err(CatalogError::InvalidPageSize { page_size: 0 });
        }

        let mut result: Vec<Product> = self.catalog.all().to_vec();

        match spec.category {
            CategoryFilter::Any => {}
            CategoryFilter::Only(category) => result.retain(|p| p.category == category),
            CategoryFilter::Unmatched => result.clear(),
        }

        if let Some(term) = &spec.search {
            let needle = term.trim().to_lowercase();
            if !needle.is_empty() {
                result.retain(|p| p.matches_text(&needle));
            }
        }

        result.retain(|p| p.price >= spec.min_price && p.price <= spec.max_price);

        if spec.in_stock_only {
            result.retain(|p| p.available());
        }

        sort_products(&mut result, spec.sort);

        let total_items = result.len();
        let total_pages = (total_items + spec.page_size - 1) / spec.page_size;
        let page = spec.page.max(1);
        let start = (page - 1).saturating_mul(spec.page_size);
        let end = start.saturating_add(spec.page_size).min(total_items);

        let products = if start < total_items {
            result[start..end].to_vec()
        } else {
            Vec::new()
        };

        Ok(ProductPage {
            products,
            pagination: Pagination {
                current_page: page,
                total_pages,
                total_items,
                items_per_page: spec.page_size,
            },
        })
    }

    /// Direct lookup by product id
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.catalog.all().iter().find(|p| p.id == id)
    }

    /// Unranked containment search over name, description, and tags
    pub fn search(&self, term: &str) -> Vec<Product> {
        let needle = term.to_lowercase();
        self.catalog
            .all()
            .iter()
            .filter(|p| p.matches_text(&needle))
            .cloned()
            .collect()
    }

    /// Products in the given category; unknown categories yield nothing
    pub fn by_category(&self, category: &str) -> Vec<Product> {
        let Some(category) = Category::parse(category) else {
            return Vec::new();
        };
        self.catalog
            .all()
            .iter()
            .filter(|p| p.category == category)
            .cloned()
            .collect()
    }

    /// Highly-rated products (rating >= 4.5), best first, top 6
    pub fn featured(&self) -> Vec<Product> {
        let mut result: Vec<Product> = self
            .catalog
            .all()
            .iter()
            .filter(|p| p.rating >= FEATURED_MIN_RATING)
            .cloned()
            .collect();
        sort_products(&mut result, SortKey::Rating);
        result.truncate(LISTING_LIMIT);
        result
    }

    /// Most-reviewed products, top 6. Sorts a copy; the catalog itself is
    /// never reordered.
    pub fn trending(&self) -> Vec<Product> {
        let mut result: Vec<Product> = self.catalog.all().to_vec();
        sort_products(&mut result, SortKey::Reviews);
        result.truncate(LISTING_LIMIT);
        result
    }

    /// Other products in the same category as `id`, catalog order, top 4.
    /// Unlike `recommend`, an unresolvable id is an error here (the route
    /// answers 404).
    pub fn related(&self, id: &str) -> Result<Vec<Product>> {
        let anchor = self.get(id).ok_or_else(|| CatalogError::ProductNotFound {
            id: id.to_string(),
        })?;
        let category = anchor.category;

        Ok(self
            .catalog
            .all()
            .iter()
            .filter(|p| p.id != id && p.category == category)
            .take(RELATED_LIMIT)
            .cloned()
            .collect())
    }

    /// Heuristic relevance search ("smart search"); see [`ranking`]
    pub fn smart_search(&self, query: &str) -> Vec<ScoredProduct> {
        ranking::relevance_search(self.catalog.all(), query)
    }

    /// Recommendations anchored on an optional product id; see [`ranking`]
    pub fn recommend(&self, anchor_id: Option<&str>) -> Vec<Product> {
        ranking::recommend(self.catalog.all(), anchor_id)
    }

    /// Autocomplete-style suggestions; see [`ranking`]
    pub fn suggest(&self, prefix: &str) -> Vec<Suggestion> {
        ranking::suggest(self.catalog.all(), prefix)
    }
}

/// Stable sort by the requested key. Equal keys keep their relative order,
/// so results are deterministic for a fixed catalog.
fn sort_products(products: &mut [Product], key: SortKey) {
    match key {
        SortKey::PriceLow => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::Rating => products.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(Ordering::Equal)
        }),
        SortKey::Reviews => products.sort_by(|a, b| b.review_count.cmp(&a.review_count)),
        SortKey::Name => {
            products.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        }
    }
}
