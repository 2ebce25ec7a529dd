//! Scoring terms for recommendations

use std::collections::HashSet;

use super::{PRICE_PROXIMITY_WINDOW, RATING_PROXIMITY_WINDOW};
use crate::domain::product::Product;

/// Weights for scoring components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    /// Weight for category overlap (default: 0.40)
    pub category: f64,
    /// Weight for price proximity (default: 0.30)
    pub price: f64,
    /// Weight for rating proximity (default: 0.20)
    pub rating: f64,
    /// Flat bonus added to any candidate with a positive score (default: 0.10)
    pub relevance_bonus: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        super::DEFAULT_WEIGHTS
    }
}

/// Aggregates over the viewed products that resolved against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewedProfile {
    pub avg_price: f64,
    pub avg_rating: f64,
    /// Total category occurrences across viewed products, duplicates included.
    pub category_occurrences: usize,
    pub categories: HashSet<String>,
}

impl ViewedProfile {
    /// `None` when nothing was viewed.
    pub fn from_viewed(viewed: &[&Product]) -> Option<Self> {
        if viewed.is_empty() {
            return None;
        }

        let count = viewed.len() as f64;
        let avg_price = viewed.iter().map(|p| p.discounted_price).sum::<f64>() / count;
        let avg_rating = viewed.iter().map(|p| p.rating).sum::<f64>() / count;
        let category_occurrences = viewed.iter().map(|p| p.categories.len()).sum();
        let categories =
            viewed.iter().flat_map(|p| p.categories.iter().cloned()).collect::<HashSet<_>>();

        Some(Self { avg_price, avg_rating, category_occurrences, categories })
    }
}

/// Score calculator for recommendation candidates
#[derive(Debug, Clone, Default)]
pub struct ScoreCalculator {
    weights: ScoringWeights,
}

impl ScoreCalculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> ScoringWeights {
        self.weights
    }

    /// Sum of the three weighted terms, plus the flat bonus when that sum is positive.
    pub fn score(&self, candidate: &Product, profile: &ViewedProfile) -> f64 {
        let mut score = self.category_term(candidate, profile)
            + self.price_term(candidate, profile)
            + self.rating_term(candidate, profile);

        if score > 0.0 {
            score += self.weights.relevance_bonus;
        }

        score
    }

    pub fn category_term(&self, candidate: &Product, profile: &ViewedProfile) -> f64 {
        if candidate.categories.is_empty() || profile.category_occurrences == 0 {
            return 0.0;
        }

        let candidate_categories: HashSet<&String> = candidate.categories.iter().collect();
        let overlap =
            candidate_categories.iter().filter(|c| profile.categories.contains(**c)).count();
        if overlap == 0 {
            return 0.0;
        }

        let denominator = candidate_categories.len().max(profile.categories.len());
        self.weights.category * overlap as f64 / denominator as f64
    }

    pub fn price_term(&self, candidate: &Product, profile: &ViewedProfile) -> f64 {
        if profile.avg_price <= 0.0 {
            return 0.0;
        }

        let relative = (candidate.discounted_price - profile.avg_price).abs() / profile.avg_price;
        if relative < PRICE_PROXIMITY_WINDOW {
            self.weights.price * (1.0 - relative / PRICE_PROXIMITY_WINDOW)
        } else {
            0.0
        }
    }

    pub fn rating_term(&self, candidate: &Product, profile: &ViewedProfile) -> f64 {
        if profile.avg_rating <= 0.0 {
            return 0.0;
        }

        let diff = (candidate.rating - profile.avg_rating).abs();
        if diff < RATING_PROXIMITY_WINDOW {
            self.weights.rating * (1.0 - diff / RATING_PROXIMITY_WINDOW)
        } else {
            0.0
        }
    }
}
