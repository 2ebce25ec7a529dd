use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use crate::domain::product::{Product, ProductId};

/// Listing-card projection of a product.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductPreview {
    pub product_id: ProductId,
    pub product_name: String,
    pub discounted_price: f64,
    pub rating: f64,
}

impl From<&Product> for ProductPreview {
    fn from(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            discounted_price: product.discounted_price,
            rating: product.rating,
        }
    }
}

pub fn to_previews<P: Borrow<Product>>(products: &[P]) -> Vec<ProductPreview> {
    products.iter().map(|product| ProductPreview::from(product.borrow())).collect()
}
