use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;

use super::scoring::{ScoreCalculator, ScoringWeights, ViewedProfile};
use super::RecommendationScore;
use crate::domain::product::{Product, ProductId};
use crate::domain::user::ViewHistoryEntry;

/// Products ranked by `rating * rating_count`, highest first, skipping `excluded` ids.
pub fn popular_products<'a>(
    products: &'a [Product],
    excluded: &HashSet<&ProductId>,
    limit: usize,
) -> Vec<&'a Product> {
    let mut available: Vec<&Product> =
        products.iter().filter(|product| !excluded.contains(&product.id)).collect();
    available.sort_by(|a, b| descending(a.popularity(), b.popularity()));
    available.truncate(limit);
    available
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    calculator: ScoreCalculator,
}

impl RecommendationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_weights(weights: ScoringWeights) -> Self {
        Self { calculator: ScoreCalculator::with_weights(weights) }
    }

    /// Up to `limit` products for a user with the given history, best first, no duplicates.
    ///
    /// History entries that do not resolve to a catalog product are ignored. If none
    /// resolve, the popularity ranking is returned. Otherwise scored candidates come
    /// first and the popularity ranking backfills any remaining slots.
    pub fn recommend<'a>(
        &self,
        history: &[ViewHistoryEntry],
        products: &'a [Product],
        exclude: Option<&ProductId>,
        limit: usize,
    ) -> Vec<&'a Product> {
        let viewed_ids: HashSet<&ProductId> =
            history.iter().map(|entry| &entry.product_id).collect();
        let viewed: Vec<&Product> =
            products.iter().filter(|product| viewed_ids.contains(&product.id)).collect();

        let Some(profile) = ViewedProfile::from_viewed(&viewed) else {
            debug!(
                event_name = "recommendations.fallback.popular",
                history_len = history.len(),
                limit,
                "no resolvable view history; using popularity ranking"
            );
            let excluded: HashSet<&ProductId> = exclude.into_iter().collect();
            return popular_products(products, &excluded, limit);
        };

        let mut scored = self.score_candidates(products, &viewed_ids, exclude, &profile);
        scored.truncate(limit);
        let scored_count = scored.len();
        let mut chosen: Vec<&Product> = scored.into_iter().map(|entry| entry.product).collect();

        if chosen.len() < limit {
            let mut excluded = viewed_ids.clone();
            excluded.extend(chosen.iter().map(|product| &product.id));
            excluded.extend(exclude);
            chosen.extend(popular_products(products, &excluded, limit - chosen.len()));
        }

        debug!(
            event_name = "recommendations.computed",
            viewed_count = viewed.len(),
            scored_count,
            backfilled = chosen.len() - scored_count,
            limit,
            "recommendations computed"
        );

        chosen
    }

    /// Every unviewed, non-excluded product with its score, sorted descending.
    /// Ties keep catalog order.
    pub fn score_candidates<'a>(
        &self,
        products: &'a [Product],
        viewed_ids: &HashSet<&ProductId>,
        exclude: Option<&ProductId>,
        profile: &ViewedProfile,
    ) -> Vec<RecommendationScore<'a>> {
        let mut scored: Vec<RecommendationScore<'a>> = products
            .iter()
            .filter(|product| !viewed_ids.contains(&product.id))
            .filter(|product| exclude != Some(&product.id))
            .map(|product| RecommendationScore {
                product,
                score: self.calculator.score(product, profile),
            })
            .collect();

        scored.sort_by(|a, b| descending(a.score, b.score));
        scored
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use chrono::{TimeZone, Utc};

    use super::{popular_products, RecommendationEngine};
    use crate::catalog::test_support::{ids, product, rated, ProductExt};
    use crate::domain::product::{Product, ProductId};
    use crate::domain::user::ViewHistoryEntry;

    fn history(product_ids: &[&str]) -> Vec<ViewHistoryEntry> {
        product_ids
            .iter()
            .enumerate()
            .map(|(offset, id)| ViewHistoryEntry {
                product_id: ProductId::from(*id),
                viewed_at: Utc
                    .with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
                    .single()
                    .expect("valid timestamp")
                    - chrono::Duration::minutes(offset as i64),
            })
            .collect()
    }

    fn catalog() -> Vec<Product> {
        vec![
            product("cable-a", &["Cables"], 100.0).with_rating(4.0, 50),
            product("cable-b", &["Cables"], 110.0).with_rating(4.1, 20),
            product("tv", &["Televisions"], 30000.0).with_rating(4.6, 900),
            product("mouse", &["Mice"], 500.0).with_rating(2.0, 10),
            product("charger", &["Chargers", "Cables"], 95.0).with_rating(3.9, 300),
        ]
    }

    #[test]
    fn empty_history_returns_popularity_order() {
        let products = vec![rated("a", 4.0, 10), rated("b", 3.0, 100), rated("c", 5.0, 50)];
        let result = RecommendationEngine::new().recommend(&[], &products, None, 8);
        assert_eq!(ids(&result), vec!["b", "c", "a"]);
    }

    #[test]
    fn fallback_honours_exclusion_and_limit() {
        let products = vec![rated("a", 4.0, 10), rated("b", 3.0, 100), rated("c", 5.0, 50)];
        let exclude = ProductId::from("b");
        let result = RecommendationEngine::new().recommend(&[], &products, Some(&exclude), 1);
        assert_eq!(ids(&result), vec!["c"]);
    }

    #[test]
    fn unresolvable_history_behaves_like_no_history() {
        let products = catalog();
        let engine = RecommendationEngine::new();
        let with_ghosts = engine.recommend(&history(&["gone", "missing"]), &products, None, 3);
        let without = engine.recommend(&[], &products, None, 3);
        assert_eq!(ids(&with_ghosts), ids(&without));
    }

    #[test]
    fn similar_products_rank_first_and_viewed_are_skipped() {
        let products = catalog();
        let result =
            RecommendationEngine::new().recommend(&history(&["cable-a"]), &products, None, 2);

        assert_eq!(ids(&result), vec!["cable-b", "charger"]);
    }

    #[test]
    fn zero_scored_candidates_still_fill_before_backfill() {
        let products = catalog();
        let result =
            RecommendationEngine::new().recommend(&history(&["cable-a"]), &products, None, 8);

        assert_eq!(result.len(), 4);
        assert!(!ids(&result).contains(&"cable-a"));
        let unique: HashSet<&str> = ids(&result).into_iter().collect();
        assert_eq!(unique.len(), result.len());
    }

    #[test]
    fn excluded_product_never_appears() {
        let products = catalog();
        let exclude = ProductId::from("cable-b");
        let result = RecommendationEngine::new().recommend(
            &history(&["cable-a"]),
            &products,
            Some(&exclude),
            8,
        );

        assert!(!ids(&result).contains(&"cable-b"));
        assert_eq!(ids(&result)[0], "charger");
    }

    #[test]
    fn ties_keep_catalog_order() {
        let products = vec![
            product("viewed", &["x"], 100.0),
            product("first", &["y"], 5000.0),
            product("second", &["z"], 9000.0),
        ];
        let result =
            RecommendationEngine::new().recommend(&history(&["viewed"]), &products, None, 2);
        assert_eq!(ids(&result), vec!["first", "second"]);
    }

    #[test]
    fn popularity_skips_excluded_ids() {
        let products = catalog();
        let tv = ProductId::from("tv");
        let excluded: HashSet<&ProductId> = [&tv].into_iter().collect();
        let result = popular_products(&products, &excluded, 2);
        assert_eq!(ids(&result), vec!["charger", "cable-a"]);
    }
}
