//! Collection assembly from harvested products

use crate::model::{Collection, Product};

/// Wraps harvested products into a collection named after the search term
///
/// Returns `None` when there is nothing to keep. Product order is preserved.
pub fn assemble(term: &str, products: Vec<Product>) -> Option<Collection> {
    if products.is_empty() {
        tracing::info!(term, "no valid products; no collection produced");
        return None;
    }

    match Collection::new(term, products) {
        Ok(collection) => {
            tracing::info!(term, products = collection.len(), "collection assembled");
            Some(collection)
        }
        Err(e) => {
            tracing::warn!(term, error = %e, "collection could not be assembled");
            None
        }
    }
}
