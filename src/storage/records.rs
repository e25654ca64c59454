//! On-disk record shapes shared by the CSV and JSON stores

use crate::model::{Collection, Product};
use crate::ValidationResult;
use serde::{Deserialize, Serialize};

/// Column order of a collection CSV file
pub const CSV_HEADER: [&str; 7] = [
    "productID",
    "name",
    "price",
    "url",
    "rating",
    "description",
    "reviews",
];

/// One product as stored in a JSON collection file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "productID")]
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub url: String,
    pub rating: f64,
    pub description: String,
    pub reviews: Vec<String>,
}

impl From<&Product> for ProductRecord {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.product_id().to_string(),
            name: product.name().to_string(),
            price: product.price(),
            url: product.url().to_string(),
            rating: product.rating(),
            description: product.description().to_string(),
            reviews: product.reviews().to_vec(),
        }
    }
}

impl ProductRecord {
    /// Rebuilds the product, re-checking every invariant
    pub fn into_product(self) -> ValidationResult<Product> {
        Product::new(
            self.product_id,
            self.name,
            self.price,
            self.url,
            self.rating,
            self.description,
            self.reviews,
        )
    }
}

/// A whole JSON collection file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionDocument {
    pub name: String,
    pub products: Vec<ProductRecord>,
}

impl From<&Collection> for CollectionDocument {
    fn from(collection: &Collection) -> Self {
        Self {
            name: collection.name().to_string(),
            products: collection.products().iter().map(ProductRecord::from).collect(),
        }
    }
}

/// One product as stored in a CSV row
///
/// CSV has no list type, so reviews are kept as a JSON array in one cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvRow {
    #[serde(rename = "productID")]
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub url: String,
    pub rating: f64,
    pub description: String,
    pub reviews: String,
}

impl CsvRow {
    pub fn from_product(product: &Product) -> serde_json::Result<Self> {
        Ok(Self {
            product_id: product.product_id().to_string(),
            name: product.name().to_string(),
            price: product.price(),
            url: product.url().to_string(),
            rating: product.rating(),
            description: product.description().to_string(),
            reviews: serde_json::to_string(product.reviews())?,
        })
    }

    /// Splits the review cell back into a list
    ///
    /// An empty cell means no reviews.
    pub fn into_record(self) -> serde_json::Result<ProductRecord> {
        let reviews = if self.reviews.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&self.reviews)?
        };

        Ok(ProductRecord {
            product_id: self.product_id,
            name: self.name,
            price: self.price,
            url: self.url,
            rating: self.rating,
            description: self.description,
            reviews,
        })
    }
}
