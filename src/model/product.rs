//! Product value type
//!
//! A `Product` can only exist in a fully valid state: construction checks
//! every field and fails atomically, and every setter re-checks the same
//! constraint before replacing the field.

use crate::url::parse_http_url;
use crate::{ValidationError, ValidationResult};
use std::fmt;

/// A harvested product listing
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    product_id: String,
    name: String,
    price: f64,
    url: String,
    rating: f64,
    description: String,
    reviews: Vec<String>,
}

impl Product {
    /// Creates a validated product
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found; no product is created if
    /// any field is invalid.
    ///
    /// # Example
    ///
    /// ```
    /// use shelf_harvest::Product;
    ///
    /// let product = Product::new(
    ///     "8349024",
    ///     "Phone Case",
    ///     9.99,
    ///     "https://www.example.co.uk/product/8349024",
    ///     4.5,
    ///     "A sturdy case",
    ///     vec!["Fits well".to_string()],
    /// )
    /// .unwrap();
    /// assert_eq!(product.name(), "Phone Case");
    ///
    /// assert!(Product::new("1", "Case", -1.0, "https://example.com/", 4.0, "", vec![]).is_err());
    /// ```
    pub fn new(
        product_id: impl Into<String>,
        name: impl Into<String>,
        price: f64,
        url: impl Into<String>,
        rating: f64,
        description: impl Into<String>,
        reviews: Vec<String>,
    ) -> ValidationResult<Self> {
        let product_id = product_id.into();
        let name = name.into();
        let url = url.into();

        check_non_empty("product id", &product_id)?;
        check_non_empty("name", &name)?;
        check_price(price)?;
        check_url(&url)?;
        check_rating(rating)?;
        check_reviews(&reviews)?;

        Ok(Self {
            product_id,
            name,
            price,
            url,
            rating,
            description: description.into(),
            reviews,
        })
    }

    pub fn product_id(&self) -> &str {
        &self.product_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn reviews(&self) -> &[String] {
        &self.reviews
    }

    pub fn set_product_id(&mut self, product_id: impl Into<String>) -> ValidationResult<()> {
        let product_id = product_id.into();
        check_non_empty("product id", &product_id)?;
        self.product_id = product_id;
        Ok(())
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> ValidationResult<()> {
        let name = name.into();
        check_non_empty("name", &name)?;
        self.name = name;
        Ok(())
    }

    pub fn set_price(&mut self, price: f64) -> ValidationResult<()> {
        check_price(price)?;
        self.price = price;
        Ok(())
    }

    pub fn set_url(&mut self, url: impl Into<String>) -> ValidationResult<()> {
        let url = url.into();
        check_url(&url)?;
        self.url = url;
        Ok(())
    }

    pub fn set_rating(&mut self, rating: f64) -> ValidationResult<()> {
        check_rating(rating)?;
        self.rating = rating;
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_reviews(&mut self, reviews: Vec<String>) -> ValidationResult<()> {
        check_reviews(&reviews)?;
        self.reviews = reviews;
        Ok(())
    }

    /// Appends a review, keeping retrieval order
    pub fn add_review(&mut self, review: impl Into<String>) -> ValidationResult<()> {
        let review = review.into();
        check_non_empty("review", &review)?;
        self.reviews.push(review);
        Ok(())
    }

    /// Removes the first review equal to `review`
    pub fn remove_review(&mut self, review: &str) -> ValidationResult<()> {
        check_non_empty("review", review)?;
        let index = self
            .reviews
            .iter()
            .position(|r| r == review)
            .ok_or(ValidationError::ReviewNotFound)?;
        self.reviews.remove(index);
        Ok(())
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): £{:.2}, rated {:.1}, {} reviews, {}",
            self.name,
            self.product_id,
            self.price,
            self.rating,
            self.reviews.len(),
            self.url
        )
    }
}

fn check_non_empty(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.is_empty() {
        return Err(ValidationError::Empty { field });
    }
    Ok(())
}

fn check_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() || price < 0.0 {
        return Err(ValidationError::Price(price));
    }
    Ok(())
}

fn check_rating(rating: f64) -> ValidationResult<()> {
    if !(0.0..=5.0).contains(&rating) {
        return Err(ValidationError::Rating(rating));
    }
    Ok(())
}

fn check_url(url: &str) -> ValidationResult<()> {
    if url.is_empty() {
        return Err(ValidationError::Empty { field: "url" });
    }
    parse_http_url(url)?;
    Ok(())
}

fn check_reviews(reviews: &[String]) -> ValidationResult<()> {
    if reviews.iter().any(|r| r.is_empty()) {
        return Err(ValidationError::Empty { field: "review" });
    }
    Ok(())
}
