//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the storefront catalog service, providing
//! structured error types and conversion utilities for all system components.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from catalog loading, querying, and the API layer
//! - **Output**: Structured error types with context, mapped to HTTP status codes
//! - **Error Categories**: Catalog, Query, Configuration, API
//!
//! ## Key Features
//! - Typed errors with detailed context
//! - Automatic conversion from common library errors
//! - Category labels for structured logging
//! - Helper macros for common error patterns

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Error types for the storefront catalog service
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    /// Catalog data could not be loaded or parsed
    #[error("Catalog data error in {source_name}: {details}")]
    CatalogData {
        source_name: String,
        details: String,
    },

    /// Duplicate product id encountered while loading the catalog
    #[error("Duplicate product id '{id}' in catalog data")]
    DuplicateProductId { id: String },

    /// Product lookup by id failed
    #[error("Product not found: {id}")]
    ProductNotFound { id: String },

    /// Category lookup by id failed
    #[error("Category not found: {id}")]
    CategoryNotFound { id: String },

    /// Page size must be a positive integer before pagination math runs
    #[error("Invalid page size: {page_size}")]
    InvalidPageSize { page_size: usize },

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal { message: String },

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CatalogError {
    /// Whether the error maps to a missing-entity HTTP response (404)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CatalogError::ProductNotFound { .. } | CatalogError::CategoryNotFound { .. }
        )
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            CatalogError::Config { .. } | CatalogError::Toml(_) => "configuration",
            CatalogError::CatalogData { .. }
            | CatalogError::DuplicateProductId { .. }
            | CatalogError::Json(_) => "catalog",
            CatalogError::ProductNotFound { .. }
            | CatalogError::CategoryNotFound { .. }
            | CatalogError::InvalidPageSize { .. } => "query",
            CatalogError::ValidationFailed { .. }
            | CatalogError::Internal { .. }
            | CatalogError::Io(_) => "generic",
        }
    }
}

// Helper macros for common error patterns
#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::errors::CatalogError::Internal {
            message: $msg.to_string(),
        }
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::errors::CatalogError::Internal {
            message: format!($fmt, $($arg)*),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($field:expr, $reason:expr) => {
        $crate::errors::CatalogError::ValidationFailed {
            field: $field.to_string(),
            reason: $reason.to_string(),
        }
    };
}
