//! Output module for search summaries and collection reports
//!
//! This module handles:
//! - Printing search outcomes and collection statistics
//! - Generating markdown reports of finished searches

mod markdown;
pub mod stats;
mod summary;

pub use markdown::{format_markdown_report, generate_markdown_report};
pub use stats::{print_products, print_statistics, CollectionStatistics};
pub use summary::print_search_report;

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
