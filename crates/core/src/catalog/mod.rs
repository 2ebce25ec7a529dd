//! Catalog filtering: category and price filters driven by the compact filter string.
//!
//! Every function here is a pure transformation over a product snapshot. Results are
//! subsequences of the input in their original relative order; nothing is re-ranked.

mod category;
mod filter_string;
mod preview;
mod price;
mod sort;

use std::borrow::Borrow;

use tracing::debug;

use crate::domain::product::Product;

pub use category::{filter_by_category, CategorySelector};
pub use filter_string::FilterSpec;
pub use preview::{to_previews, ProductPreview};
pub use price::{filter_by_price, PriceBounds};
pub use sort::{sort_products, SortOrder};

/// Category filter followed by price filter.
pub fn apply_filter<P: Borrow<Product>>(products: Vec<P>, spec: &FilterSpec) -> Vec<P> {
    let input_count = products.len();
    let by_category = filter_by_category(products, &spec.category_string);
    let category_count = by_category.len();
    let result = filter_by_price(by_category, spec.price_bounds());

    debug!(
        event_name = "catalog.filter.applied",
        category_string = %spec.category_string,
        min_price = spec.min_price,
        max_price = spec.max_price,
        input_count,
        category_count,
        output_count = result.len(),
        "catalog filter applied"
    );

    result
}

/// Parses `filter` and applies it.
pub fn filter_products<P: Borrow<Product>>(products: Vec<P>, filter: &str) -> Vec<P> {
    apply_filter(products, &FilterSpec::parse(filter))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::borrow::Borrow;

    use crate::domain::product::{Product, ProductId, ProductReviews};

    pub fn product(id: &str, categories: &[&str], price: f64) -> Product {
        Product {
            id: ProductId::from(id),
            name: format!("Product {id}"),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            discounted_price: price,
            actual_price: price,
            discount_percentage: "0%".to_string(),
            rating: 0.0,
            rating_count: 0,
            about_product: String::new(),
            reviews: ProductReviews::default(),
            img_link: String::new(),
            product_link: String::new(),
        }
    }

    pub fn rated(id: &str, rating: f64, rating_count: u64) -> Product {
        product(id, &[], 10.0).with_rating(rating, rating_count)
    }

    pub trait ProductExt {
        fn named(self, name: &str) -> Self;
        fn with_rating(self, rating: f64, rating_count: u64) -> Self;
    }

    impl ProductExt for Product {
        fn named(mut self, name: &str) -> Self {
            self.name = name.to_string();
            self
        }

        fn with_rating(mut self, rating: f64, rating_count: u64) -> Self {
            self.rating = rating;
            self.rating_count = rating_count;
            self
        }
    }

    /// Four products spanning two categories and prices 100..=400.
    pub fn scenario_products() -> Vec<Product> {
        vec![
            product("1", &["cat1"], 100.0),
            product("2", &["cat2"], 200.0),
            product("3", &["cat1", "cat2"], 300.0),
            product("4", &["cat4"], 400.0),
        ]
    }

    pub fn ids<P: Borrow<Product>>(products: &[P]) -> Vec<&str> {
        products.iter().map(|product| product.borrow().id.as_str()).collect()
    }
}
