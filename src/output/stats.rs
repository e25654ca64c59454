//! Statistics over harvested collections
//!
//! This module provides functionality for summarizing and displaying
//! collection contents.

use crate::model::Collection;

/// Collection statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionStatistics {
    pub name: String,

    /// Number of products in the collection
    pub product_count: usize,

    /// Total number of reviews across all products
    pub total_reviews: usize,

    /// Lowest, highest and mean price; `None` for an empty collection
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub mean_price: Option<f64>,

    /// Mean rating; `None` for an empty collection
    pub mean_rating: Option<f64>,

    /// Products whose description could not be found
    pub missing_descriptions: usize,
}

impl CollectionStatistics {
    pub fn from_collection(collection: &Collection) -> Self {
        let products = collection.products();
        let count = products.len();

        let prices = products.iter().map(|p| p.price());
        let min_price = prices.clone().reduce(f64::min);
        let max_price = prices.clone().reduce(f64::max);
        let mean = |sum: f64| (count > 0).then(|| sum / count as f64);

        Self {
            name: collection.name().to_string(),
            product_count: count,
            total_reviews: products.iter().map(|p| p.reviews().len()).sum(),
            min_price,
            max_price,
            mean_price: mean(prices.sum()),
            mean_rating: mean(products.iter().map(|p| p.rating()).sum()),
            missing_descriptions: products
                .iter()
                .filter(|p| p.description() == crate::scraper::DESCRIPTION_NOT_FOUND)
                .count(),
        }
    }
}

fn format_price(price: Option<f64>) -> String {
    price
        .map(|p| format!("£{:.2}", p))
        .unwrap_or_else(|| "-".to_string())
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CollectionStatistics) {
    println!("=== Collection: {} ===\n", stats.name);

    println!("Overview:");
    println!("  Products: {}", stats.product_count);
    println!("  Reviews: {}", stats.total_reviews);
    if stats.missing_descriptions > 0 {
        println!("  Missing descriptions: {}", stats.missing_descriptions);
    }
    println!();

    println!("Prices:");
    println!("  Lowest: {}", format_price(stats.min_price));
    println!("  Highest: {}", format_price(stats.max_price));
    println!("  Mean: {}", format_price(stats.mean_price));
    println!();

    match stats.mean_rating {
        Some(rating) => println!("Mean Rating: {:.2} / 5", rating),
        None => println!("Mean Rating: -"),
    }
}

/// Prints one line per product
pub fn print_products(collection: &Collection) {
    for (position, product) in collection.products().iter().enumerate() {
        println!(
            "{:>3}. [{}] {} | £{:.2} | {:.1}/5 | {} reviews",
            position + 1,
            product.product_id(),
            product.name(),
            product.price(),
            product.rating(),
            product.reviews().len()
        );
    }
}
