use std::cmp::Ordering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::product::Product;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Name,
    PriceAsc,
    PriceDesc,
    RatingDesc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::RatingDesc => "rating_desc",
        }
    }

    /// `None` falls back to name ordering.
    pub fn from_query(value: Option<&str>) -> Result<Self, DomainError> {
        value.map(str::parse::<SortOrder>).transpose().map(Option::unwrap_or_default)
    }
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(Self::Name),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "rating_desc" => Ok(Self::RatingDesc),
            other => Err(DomainError::InvalidSortOrder(other.to_string())),
        }
    }
}

/// Stable sort; equal keys keep catalog order.
pub fn sort_products(products: &mut [Product], order: SortOrder) {
    match order {
        SortOrder::Name => {
            products.sort_by_cached_key(|product| product.name.to_lowercase());
        }
        SortOrder::PriceAsc => {
            products.sort_by(|a, b| total_cmp(a.discounted_price, b.discounted_price));
        }
        SortOrder::PriceDesc => {
            products.sort_by(|a, b| total_cmp(b.discounted_price, a.discounted_price));
        }
        SortOrder::RatingDesc => products.sort_by(|a, b| {
            total_cmp(b.rating, a.rating).then_with(|| b.rating_count.cmp(&a.rating_count))
        }),
    }
}

fn total_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
