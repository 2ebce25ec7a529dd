//! Saved items, recently viewed products and recommendations for a signed-in user.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use storefront_core::domain::product::{Product, ProductId};
use storefront_core::domain::user::{UserId, ViewHistoryEntry};
use storefront_core::errors::DomainError;
use storefront_core::history::{recent, record_view};

use super::auth::authorize_user;
use super::errors::ApiError;
use super::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct SavedItemsResponse {
    pub user_id: UserId,
    pub saved_item_ids: Vec<ProductId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ViewHistoryResponse {
    pub user_id: UserId,
    pub recently_viewed: Vec<ViewHistoryEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    pub limit: Option<usize>,
    #[serde(alias = "exclude")]
    pub exclude_product_id: Option<String>,
}

async fn ensure_product(state: &AppState, product_id: &ProductId) -> Result<(), ApiError> {
    match state.products.find_by_id(product_id).await? {
        Some(_) => Ok(()),
        None => Err(DomainError::not_found("product", product_id.as_str()).into()),
    }
}

async fn saved_items_of(state: &AppState, user_id: UserId) -> Result<SavedItemsResponse, ApiError> {
    let saved_item_ids = state.activity.saved_items(&user_id).await?;
    Ok(SavedItemsResponse { user_id, saved_item_ids })
}

pub async fn list_saved_items(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SavedItemsResponse>, ApiError> {
    let user_id = UserId(user_id);
    authorize_user(&state, &headers, &user_id).await?;
    Ok(Json(saved_items_of(&state, user_id).await?))
}

pub async fn save_item(
    Path((user_id, product_id)): Path<(String, String)>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SavedItemsResponse>, ApiError> {
    let user_id = UserId(user_id);
    let product_id = ProductId(product_id);
    authorize_user(&state, &headers, &user_id).await?;
    ensure_product(&state, &product_id).await?;

    state.activity.add_saved_item(&user_id, &product_id).await?;
    Ok(Json(saved_items_of(&state, user_id).await?))
}

pub async fn unsave_item(
    Path((user_id, product_id)): Path<(String, String)>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SavedItemsResponse>, ApiError> {
    let user_id = UserId(user_id);
    authorize_user(&state, &headers, &user_id).await?;

    state.activity.remove_saved_item(&user_id, &ProductId(product_id)).await?;
    Ok(Json(saved_items_of(&state, user_id).await?))
}

/// Moves the product to the front of the user's history and returns the whole history.
pub async fn record_product_view(
    Path((user_id, product_id)): Path<(String, String)>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ViewHistoryResponse>, ApiError> {
    let user_id = UserId(user_id);
    let product_id = ProductId(product_id);
    authorize_user(&state, &headers, &user_id).await?;
    ensure_product(&state, &product_id).await?;

    let mut history = state.activity.view_history(&user_id).await?;
    record_view(&mut history, product_id, Utc::now(), state.catalog.view_history_limit);
    state.activity.replace_view_history(&user_id, history.clone()).await?;

    Ok(Json(ViewHistoryResponse { user_id, recently_viewed: history }))
}

pub async fn view_history(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ViewHistoryResponse>, ApiError> {
    let user_id = UserId(user_id);
    authorize_user(&state, &headers, &user_id).await?;

    let limit = query.limit.unwrap_or(state.catalog.recently_viewed_default);
    let history = state.activity.view_history(&user_id).await?;
    let recently_viewed = recent(&history, limit).to_vec();
    Ok(Json(ViewHistoryResponse { user_id, recently_viewed }))
}

pub async fn recommendations(
    Path(user_id): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<RecommendationQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let user_id = UserId(user_id);
    authorize_user(&state, &headers, &user_id).await?;

    let limit = query.limit.unwrap_or(state.catalog.recommendation_limit);
    let exclude = query.exclude_product_id.map(ProductId);
    let history = state.activity.view_history(&user_id).await?;
    let products = state.products.list().await?;

    let picked = state.recommender.recommend(&history, &products, exclude.as_ref(), limit);
    debug!(
        event_name = "api.recommendations.served",
        user_id = %user_id,
        history_len = history.len(),
        count = picked.len(),
        "recommendations served"
    );
    Ok(Json(picked.into_iter().cloned().collect()))
}

#[cfg(test)]
mod tests {
    use axum::{
        extract::{Path, Query, State},
        http::{HeaderMap, StatusCode},
        Json,
    };

    use super::{
        list_saved_items, recommendations, record_product_view, save_item, unsave_item,
        view_history, HistoryQuery, RecommendationQuery,
    };
    use crate::api::test_support::{memory_state_with, shelf, signed_in};

    fn pair(user: &str, product: &str) -> Path<(String, String)> {
        Path((user.to_string(), product.to_string()))
    }

    fn ids<T>(items: &[T], id: impl Fn(&T) -> &str) -> Vec<&str> {
        items.iter().map(id).collect()
    }

    #[tokio::test]
    async fn saved_items_round_trip_in_order() {
        let state = memory_state_with(shelf());
        let headers = signed_in(&state, "u-1").await;

        let Json(first) = save_item(pair("u-1", "mouse"), State(state.clone()), headers.clone())
            .await
            .expect("save");
        assert_eq!(first.saved_item_ids.len(), 1);
        let _saved = save_item(pair("u-1", "cable"), State(state.clone()), headers.clone())
            .await
            .expect("save");
        let Json(saved) =
            save_item(pair("u-1", "mouse"), State(state.clone()), headers.clone())
                .await
                .expect("repeat save");
        assert_eq!(ids(&saved.saved_item_ids, |id| id.as_str()), vec!["mouse", "cable"]);

        let Json(saved) = unsave_item(pair("u-1", "mouse"), State(state.clone()), headers.clone())
            .await
            .expect("unsave");
        assert_eq!(ids(&saved.saved_item_ids, |id| id.as_str()), vec!["cable"]);

        let Json(listed) = list_saved_items(Path("u-1".to_string()), State(state), headers)
            .await
            .expect("list");
        assert_eq!(listed.user_id.as_str(), "u-1");
        assert_eq!(listed.saved_item_ids.len(), 1);
    }

    #[tokio::test]
    async fn saving_an_unknown_product_is_404() {
        let state = memory_state_with(shelf());
        let headers = signed_in(&state, "u-1").await;
        let error = save_item(pair("u-1", "ghost"), State(state), headers)
            .await
            .expect_err("unknown product");
        assert_eq!(error.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn user_routes_require_a_token() {
        let state = memory_state_with(shelf());
        let error = list_saved_items(Path("u-1".to_string()), State(state), HeaderMap::new())
            .await
            .expect_err("anonymous");
        assert_eq!(error.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn views_move_to_front_and_history_is_limited() {
        let state = memory_state_with(shelf());
        let headers = signed_in(&state, "u-1").await;

        for product in ["cable", "tv", "mouse", "cable"] {
            let Json(recorded) =
                record_product_view(pair("u-1", product), State(state.clone()), headers.clone())
                    .await
                    .expect("record view");
            assert_eq!(recorded.recently_viewed[0].product_id.as_str(), product);
        }

        let Json(history) = view_history(
            Path("u-1".to_string()),
            State(state.clone()),
            headers.clone(),
            Query(HistoryQuery::default()),
        )
        .await
        .expect("history");
        let viewed = ids(&history.recently_viewed, |entry| entry.product_id.as_str());
        assert_eq!(viewed, vec!["cable", "mouse", "tv"]);

        let Json(limited) = view_history(
            Path("u-1".to_string()),
            State(state),
            headers,
            Query(HistoryQuery { limit: Some(2) }),
        )
        .await
        .expect("limited history");
        assert_eq!(limited.recently_viewed.len(), 2);
    }

    #[tokio::test]
    async fn recommendations_follow_view_history() {
        let state = memory_state_with(shelf());
        let headers = signed_in(&state, "u-1").await;
        let _history =
            record_product_view(pair("u-1", "cable"), State(state.clone()), headers.clone())
                .await
                .expect("record view");

        let Json(picked) = recommendations(
            Path("u-1".to_string()),
            State(state.clone()),
            headers.clone(),
            Query(RecommendationQuery::default()),
        )
        .await
        .expect("recommendations");
        let picked_ids = ids(&picked, |product| product.id.as_str());
        assert_eq!(picked_ids.first(), Some(&"mouse"));
        assert!(!picked_ids.contains(&"cable"));

        let Json(excluded) = recommendations(
            Path("u-1".to_string()),
            State(state),
            headers,
            Query(RecommendationQuery {
                limit: Some(1),
                exclude_product_id: Some("mouse".to_string()),
            }),
        )
        .await
        .expect("recommendations");
        assert_eq!(ids(&excluded, |product| product.id.as_str()), vec!["tv"]);
    }

    #[tokio::test]
    async fn empty_history_falls_back_to_popularity() {
        let state = memory_state_with(shelf());
        let headers = signed_in(&state, "u-1").await;

        let Json(picked) = recommendations(
            Path("u-1".to_string()),
            State(state),
            headers,
            Query(RecommendationQuery { limit: Some(2), exclude_product_id: None }),
        )
        .await
        .expect("recommendations");
        assert_eq!(picked.len(), 2);
    }
}
