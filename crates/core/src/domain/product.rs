use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub String);

impl ProductId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review columns carried with a product record.
///
/// The catalog stores reviews as parallel lists; the core never looks inside them.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductReviews {
    #[serde(rename = "user_id", default)]
    pub user_ids: Vec<String>,
    #[serde(rename = "user_name", default)]
    pub user_names: Vec<String>,
    #[serde(rename = "review_id", default)]
    pub review_ids: Vec<String>,
    #[serde(rename = "review_title", default)]
    pub review_titles: Vec<String>,
    #[serde(rename = "review_content", default)]
    pub content: String,
}

/// A catalog entry in the flat record shape the catalog file uses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "product_id")]
    pub id: ProductId,
    #[serde(rename = "product_name")]
    pub name: String,
    #[serde(rename = "category", default)]
    pub categories: Vec<String>,
    pub discounted_price: f64,
    #[serde(default)]
    pub actual_price: f64,
    #[serde(default)]
    pub discount_percentage: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub rating_count: u64,
    #[serde(default)]
    pub about_product: String,
    #[serde(flatten)]
    pub reviews: ProductReviews,
    #[serde(default)]
    pub img_link: String,
    #[serde(default)]
    pub product_link: String,
}

impl Product {
    /// Popularity used by the recommendation fallback and by `rating_desc` ties.
    pub fn popularity(&self) -> f64 {
        self.rating * self.rating_count as f64
    }

    pub fn from_draft(id: ProductId, draft: ProductDraft) -> Self {
        let draft = draft.normalized();
        Self {
            id,
            name: draft.name,
            categories: draft.categories,
            discounted_price: draft.discounted_price,
            actual_price: draft.actual_price,
            discount_percentage: draft.discount_percentage,
            rating: draft.rating,
            rating_count: draft.rating_count,
            about_product: draft.about_product,
            reviews: draft.reviews,
            img_link: draft.img_link,
            product_link: draft.product_link,
        }
    }
}

/// Create/update payload: a product without its identifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(rename = "product_name")]
    pub name: String,
    #[serde(rename = "category", default)]
    pub categories: Vec<String>,
    pub discounted_price: f64,
    #[serde(default)]
    pub actual_price: f64,
    #[serde(default)]
    pub discount_percentage: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub rating_count: u64,
    #[serde(default)]
    pub about_product: String,
    #[serde(flatten)]
    pub reviews: ProductReviews,
    #[serde(default)]
    pub img_link: String,
    #[serde(default)]
    pub product_link: String,
}

impl ProductDraft {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::Validation("product_name must not be empty".to_string()));
        }
        if !self.discounted_price.is_finite() || self.discounted_price < 0.0 {
            return Err(DomainError::Validation(
                "discounted_price must be a non-negative number".to_string(),
            ));
        }
        if !self.actual_price.is_finite() || self.actual_price < 0.0 {
            return Err(DomainError::Validation(
                "actual_price must be a non-negative number".to_string(),
            ));
        }
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(DomainError::Validation("rating must be in range 0.0..=5.0".to_string()));
        }
        Ok(())
    }

    /// Trims the free-text fields the way the catalog has always stored them.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.discount_percentage = self.discount_percentage.trim().to_string();
        self.about_product = self.about_product.trim().to_string();
        self.reviews.content = self.reviews.content.trim().to_string();
        self.img_link = self.img_link.trim().to_string();
        self.product_link = self.product_link.trim().to_string();
        self
    }
}
