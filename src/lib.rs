//! Shelf-Harvest: a polite product listing harvester
//!
//! This crate searches an e-commerce site, harvests each matching product's
//! page and reviews under a shared concurrency bound and an adaptive request
//! rate, respects robots.txt, and stores the results as named collections.

pub mod config;
pub mod model;
pub mod output;
pub mod robots;
pub mod scraper;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Shelf-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::HarvestState,
        to: state::HarvestState,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Invariant violations on products and collections
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("price must be a finite, non-negative number, got {0}")]
    Price(f64),

    #[error("rating must be between 0 and 5, got {0}")]
    Rating(f64),

    #[error("invalid product URL: {0}")]
    Url(#[from] UrlError),

    #[error("review not found in product")]
    ReviewNotFound,

    #[error("product {0} not found in collection")]
    ProductNotFound(String),
}

/// URL-specific errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for Shelf-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

/// Result type alias for product and collection validation
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{Collection, Product, SearchCandidate};
pub use crate::scraper::{search_for_products, ScraperSession};
pub use state::HarvestState;
