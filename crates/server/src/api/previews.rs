use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use tracing::debug;

use storefront_core::catalog::{filter_products, to_previews, ProductPreview};
use storefront_core::search::{search_query, KeywordQuery, SearchMode};

use super::errors::ApiError;
use super::AppState;

pub const SEARCH_PROMPT: &str = "Please enter a search query";

/// Prefix of a search path segment that selects wide matching.
const WIDE_PREFIX: &str = "w=";

pub async fn list_previews(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductPreview>>, ApiError> {
    let products = state.products.list().await?;
    Ok(Json(to_previews(&products)))
}

pub async fn filter_previews(
    filter: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductPreview>>, ApiError> {
    let Path(filter) =
        filter.map_err(|rejection| ApiError::malformed_filter(rejection.body_text()))?;

    let products = state.products.list().await?;
    let matched = filter_products(products.iter().collect::<Vec<_>>(), &filter);
    Ok(Json(to_previews(&matched)))
}

pub async fn search_prompt() -> Json<&'static str> {
    Json(SEARCH_PROMPT)
}

/// `w=kw1 kw2&filter` searches wide; anything else is a strict search.
pub async fn search_previews(
    query: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductPreview>>, ApiError> {
    let Path(raw) =
        query.map_err(|rejection| ApiError::malformed_filter(rejection.body_text()))?;

    let (mode, raw) = match raw.strip_prefix(WIDE_PREFIX) {
        Some(rest) => (SearchMode::Wide, rest),
        None => (SearchMode::Strict, raw.as_str()),
    };
    let query = KeywordQuery::parse(raw);

    let products = state.products.list().await?;
    let matched = search_query(products.iter().collect::<Vec<_>>(), &query, mode);

    debug!(
        event_name = "api.previews.search",
        mode = ?mode,
        keyword_count = query.keywords.len(),
        match_count = matched.len(),
        "search served"
    );
    Ok(Json(to_previews(&matched)))
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Path, State},
        Json,
    };

    use super::{filter_previews, list_previews, search_previews, search_prompt, SEARCH_PROMPT};
    use crate::api::test_support::{memory_state_with, shelf};

    fn ids(previews: &[storefront_core::catalog::ProductPreview]) -> Vec<&str> {
        previews.iter().map(|preview| preview.product_id.as_str()).collect()
    }

    #[tokio::test]
    async fn all_previews_keep_catalog_order() {
        let Json(previews) = list_previews(State(memory_state_with(shelf()))).await.expect("list");
        assert_eq!(ids(&previews), vec!["cable", "tv", "mouse"]);
    }

    #[tokio::test]
    async fn filter_path_combines_category_and_price() {
        let state = memory_state_with(shelf());
        let Json(previews) =
            filter_previews(Ok(Path("USBCables*Mice&max=700".to_string())), State(state))
                .await
                .expect("filter");
        assert_eq!(ids(&previews), vec!["cable", "mouse"]);
    }

    #[tokio::test]
    async fn empty_search_returns_the_prompt() {
        let Json(prompt) = search_prompt().await;
        assert_eq!(prompt, SEARCH_PROMPT);
    }

    #[tokio::test]
    async fn strict_search_needs_every_name_keyword() {
        let state = memory_state_with(shelf());
        let Json(strict) =
            search_previews(Ok(Path("wireless cable".to_string())), State(state.clone()))
                .await
                .expect("strict");
        assert!(strict.is_empty());

        let Json(wide) = search_previews(Ok(Path("w=wireless cable".to_string())), State(state))
            .await
            .expect("wide");
        assert_eq!(ids(&wide), vec!["cable", "mouse"]);
    }

    #[tokio::test]
    async fn search_applies_trailing_filter() {
        let state = memory_state_with(shelf());
        let Json(previews) =
            search_previews(Ok(Path("w=wireless cable&all&min=300".to_string())), State(state))
                .await
                .expect("search");
        assert_eq!(ids(&previews), vec!["mouse"]);
    }
}
