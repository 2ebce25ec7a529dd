//! Content-based product recommendations
//!
//! Scores unseen products against the profile of what a user has viewed: shared
//! categories, price proximity and rating proximity. Users without a usable
//! history get the global popularity ranking instead.

mod engine;
mod scoring;

pub use engine::{popular_products, RecommendationEngine};
pub use scoring::{ScoreCalculator, ScoringWeights, ViewedProfile};

use serde::Serialize;

use crate::domain::product::Product;

/// Default scoring weights
pub const DEFAULT_WEIGHTS: ScoringWeights = ScoringWeights {
    category: 0.40,
    price: 0.30,
    rating: 0.20,
    relevance_bonus: 0.10,
};

/// Relative price difference beyond which the price term is zero.
pub const PRICE_PROXIMITY_WINDOW: f64 = 0.30;

/// Absolute rating difference beyond which the rating term is zero.
pub const RATING_PROXIMITY_WINDOW: f64 = 1.0;

pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 8;

/// A candidate and its score. Computed per request, never stored.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecommendationScore<'a> {
    pub product: &'a Product,
    pub score: f64,
}
