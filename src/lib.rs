//! # Storefront Catalog Service
//!
//! ## Overview
//! This library implements the backend of a demo e-commerce storefront: a
//! fixed in-memory product catalog queried through a deterministic filter,
//! sort, pagination, and relevance-scoring engine, exposed over a REST API.
//!
//! ## Architecture
//! The system is composed of several key modules:
//! - `catalog`: Product data model and the read-only catalog data source
//! - `engine`: Catalog query engine (filtering, sorting, pagination)
//! - `ranking`: Heuristic relevance search, recommendations, suggestions
//! - `chat`: Canned-response shopping assistant
//! - `api`: REST API endpoints
//! - `config`: Configuration management and settings
//! - `errors`: Centralized error handling and types
//!
//! ## Input/Output Specification
//! - **Input**: Catalog JSON (loaded once at startup), HTTP query requests
//! - **Output**: Ordered, paginated product listings with metadata
//! - **Determinism**: Every operation is a pure function of the catalog and
//!   the request; stable sorts break ties by catalog order
//!
//! ## Usage
//! ```rust,no_run
//! use std::sync::Arc;
//! use storefront_catalog::catalog::StaticCatalog;
//! use storefront_catalog::engine::{QueryEngine, QuerySpec};
//! use storefront_catalog::config::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config.toml")?;
//!     let catalog = StaticCatalog::load(&config.catalog)?;
//!     let engine = QueryEngine::new(Arc::new(catalog));
//!     let page = engine.list(&QuerySpec::default())?;
//!     println!("Found {} products", page.pagination.total_items);
//!     Ok(())
//! }
//! ```

// Core modules
pub mod api;
pub mod catalog;
pub mod chat;
pub mod config;
pub mod engine;
pub mod errors;
pub mod ranking;

// Utilities
pub mod utils;

// Re-exports for convenience
pub use catalog::{CatalogSource, Category, Product, StaticCatalog};
pub use config::Config;
pub use engine::{ProductPage, QueryEngine, QuerySpec};
pub use errors::{CatalogError, Result};

use std::sync::Arc;

/// Application state shared across request handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub engine: Arc<engine::QueryEngine>,
}
