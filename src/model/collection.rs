//! Named collections of products

use crate::model::Product;
use crate::{ValidationError, ValidationResult};
use std::fmt;

/// A named, ordered set of products produced by one search
///
/// Membership is typed: only validated `Product` values can be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    name: String,
    products: Vec<Product>,
}

impl Collection {
    /// Creates a collection; the name must be non-empty
    pub fn new(name: impl Into<String>, products: Vec<Product>) -> ValidationResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::Empty { field: "collection name" });
        }
        Ok(Self { name, products })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> ValidationResult<()> {
        let name = name.into();
        if name.is_empty() {
            return Err(ValidationError::Empty { field: "collection name" });
        }
        self.name = name;
        Ok(())
    }

    pub fn set_products(&mut self, products: Vec<Product>) {
        self.products = products;
    }

    pub fn add_product(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Removes the first product equal to `product`
    pub fn remove_product(&mut self, product: &Product) -> ValidationResult<Product> {
        let index = self
            .products
            .iter()
            .position(|p| p == product)
            .ok_or_else(|| ValidationError::ProductNotFound(product.product_id().to_string()))?;
        Ok(self.products.remove(index))
    }

    /// Consumes the collection, returning its products
    pub fn into_products(self) -> Vec<Product> {
        self.products
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} products)", self.name, self.products.len())
    }
}
