//! Price bound normalization and price filtering.
//!
//! A bound of `0` is the "unbounded" sentinel, not an inclusive bound at zero.

use std::borrow::Borrow;

use crate::domain::product::Product;

/// Normalized `(min, max)` price pair. Zero on either side means no bound on that side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PriceBounds {
    pub min: u64,
    pub max: u64,
}

impl PriceBounds {
    /// Clamps negatives to zero, then swaps the pair if both sides are set and inverted.
    ///
    /// Total over every integer pair.
    pub fn normalize(min_price: i64, max_price: i64) -> Self {
        let mut min = min_price.max(0).unsigned_abs();
        let mut max = max_price.max(0).unsigned_abs();

        if min != 0 && max != 0 && min > max {
            std::mem::swap(&mut min, &mut max);
        }

        Self { min, max }
    }

    pub fn is_unbounded(&self) -> bool {
        self.min == 0 && self.max == 0
    }

    pub fn contains(&self, price: f64) -> bool {
        let above_min = self.min == 0 || price >= self.min as f64;
        let below_max = self.max == 0 || price <= self.max as f64;
        above_min && below_max
    }
}

/// Keeps products whose discounted price falls inside `bounds`, preserving order.
///
/// `0..0` short-circuits and returns the input untouched.
pub fn filter_by_price<P: Borrow<Product>>(products: Vec<P>, bounds: PriceBounds) -> Vec<P> {
    if bounds.is_unbounded() {
        return products;
    }

    products
        .into_iter()
        .filter(|product| bounds.contains(product.borrow().discounted_price))
        .collect()
}
