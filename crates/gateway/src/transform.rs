//! Frontend schema and its mapping to and from backend records.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use storefront_core::catalog::ProductPreview;
use storefront_core::domain::product::{Product, ProductDraft, ProductId, ProductReviews};

const DEFAULT_DISCOUNT: &str = "0%";
const DEFAULT_CURRENCY: &str = "USD";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrontendPrice {
    pub current: f64,
    pub original: f64,
    pub discount: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrontendRating {
    pub score: f64,
    pub count: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrontendReviews {
    pub user_ids: Vec<String>,
    pub user_names: Vec<String>,
    pub review_ids: Vec<String>,
    pub titles: Vec<String>,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendProduct {
    pub id: ProductId,
    pub name: String,
    pub categories: Vec<String>,
    pub price: FrontendPrice,
    pub rating: FrontendRating,
    pub description: String,
    pub image: String,
    pub product_url: String,
    pub reviews: FrontendReviews,
}

impl From<Product> for FrontendProduct {
    fn from(product: Product) -> Self {
        Self {
            id: product.id,
            name: product.name,
            categories: product.categories,
            price: FrontendPrice {
                current: product.discounted_price,
                original: product.actual_price,
                discount: product.discount_percentage,
            },
            rating: FrontendRating { score: product.rating, count: product.rating_count },
            description: product.about_product,
            image: product.img_link,
            product_url: product.product_link,
            reviews: product.reviews.into(),
        }
    }
}

impl From<ProductReviews> for FrontendReviews {
    fn from(reviews: ProductReviews) -> Self {
        Self {
            user_ids: reviews.user_ids,
            user_names: reviews.user_names,
            review_ids: reviews.review_ids,
            titles: reviews.review_titles,
            content: reviews.content,
        }
    }
}

impl From<FrontendReviews> for ProductReviews {
    fn from(reviews: FrontendReviews) -> Self {
        Self {
            user_ids: reviews.user_ids,
            user_names: reviews.user_names,
            review_ids: reviews.review_ids,
            review_titles: reviews.titles,
            content: reviews.content,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PriceInput {
    pub current: f64,
    pub original: f64,
    pub discount: String,
}

impl Default for PriceInput {
    fn default() -> Self {
        Self { current: 0.0, original: 0.0, discount: DEFAULT_DISCOUNT.to_string() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RatingInput {
    pub score: f64,
    pub count: u64,
}

/// Write payload in the frontend shape. Every field is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FrontendProductInput {
    pub name: String,
    pub categories: Vec<String>,
    pub price: PriceInput,
    pub rating: RatingInput,
    pub description: String,
    pub image: String,
    pub product_url: String,
    pub reviews: FrontendReviews,
}

impl FrontendProductInput {
    pub fn into_draft(self) -> ProductDraft {
        ProductDraft {
            name: self.name,
            categories: self.categories,
            discounted_price: self.price.current,
            actual_price: self.price.original,
            discount_percentage: self.price.discount,
            rating: self.rating.score,
            rating_count: self.rating.count,
            about_product: self.description,
            reviews: self.reviews.into(),
            img_link: self.image,
            product_link: self.product_url,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrontendPreview {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub rating: f64,
    pub currency: String,
    pub in_stock: bool,
}

impl From<ProductPreview> for FrontendPreview {
    fn from(preview: ProductPreview) -> Self {
        Self {
            id: preview.product_id,
            name: preview.product_name,
            price: preview.discounted_price,
            rating: preview.rating,
            currency: DEFAULT_CURRENCY.to_string(),
            in_stock: true,
        }
    }
}

/// Builds a backend filter string such as `Mice*USBCables&min=100&max=700`.
pub fn filter_string(
    categories: Option<&str>,
    min_price: Option<f64>,
    max_price: Option<f64>,
) -> String {
    let categories = categories.map(str::trim).filter(|c| !c.is_empty()).unwrap_or("all");
    let mut parts = vec![categories.to_string()];
    if let Some(min) = min_price {
        parts.push(format!("min={min}"));
    }
    if let Some(max) = max_price {
        parts.push(format!("max={max}"));
    }
    parts.join("&")
}

/// Distinct non-blank categories across the catalog, sorted.
pub fn available_categories(products: &[Product]) -> Vec<String> {
    let categories: BTreeSet<&str> = products
        .iter()
        .flat_map(|product| product.categories.iter())
        .map(String::as_str)
        .filter(|category| !category.trim().is_empty())
        .collect();
    categories.into_iter().map(str::to_string).collect()
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl PriceRange {
    /// Span of discounted prices; zero on an empty catalog.
    pub fn of(products: &[Product]) -> Self {
        let mut prices = products.iter().map(|product| product.discounted_price);
        let Some(first) = prices.next() else {
            return Self::default();
        };
        prices.fold(Self { min: first, max: first }, |range, price| Self {
            min: range.min.min(price),
            max: range.max.max(price),
        })
    }
}

/// Top-rated previews first, ties kept in backend order.
pub fn featured(mut previews: Vec<ProductPreview>, limit: usize) -> Vec<FrontendPreview> {
    previews.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    previews.into_iter().take(limit).map(FrontendPreview::from).collect()
}

/// Case-insensitive name lookup over previews, capped at `limit`.
pub fn previews_named(
    previews: Vec<ProductPreview>,
    query: &str,
    limit: usize,
) -> Vec<FrontendPreview> {
    let needle = query.to_lowercase();
    previews
        .into_iter()
        .filter(|preview| preview.product_name.to_lowercase().contains(&needle))
        .take(limit)
        .map(FrontendPreview::from)
        .collect()
}

/// Structured product search; every criterion is optional and they combine with AND.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProductSearch {
    pub q: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
}

impl ProductSearch {
    pub fn matches(&self, product: &Product) -> bool {
        let text = self.q.as_deref().filter(|q| !q.is_empty()).map(str::to_lowercase);
        if let Some(text) = text {
            let in_name = product.name.to_lowercase().contains(&text);
            if !in_name && !product.about_product.to_lowercase().contains(&text) {
                return false;
            }
        }

        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            let category = category.to_lowercase();
            if !product.categories.iter().any(|c| c.to_lowercase() == category) {
                return false;
            }
        }

        self.min_price.map_or(true, |min| product.discounted_price >= min)
            && self.max_price.map_or(true, |max| product.discounted_price <= max)
            && self.min_rating.map_or(true, |min| product.rating >= min)
    }

    pub fn apply(&self, products: Vec<Product>) -> Vec<FrontendProduct> {
        products
            .into_iter()
            .filter(|product| self.matches(product))
            .map(FrontendProduct::from)
            .collect()
    }
}
