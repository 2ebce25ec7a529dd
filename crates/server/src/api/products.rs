use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use storefront_core::catalog::{sort_products, SortOrder};
use storefront_core::domain::product::{Product, ProductDraft, ProductId};
use storefront_core::errors::DomainError;

use super::errors::ApiError;
use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub sort_by: Option<String>,
}

pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    // Reject a bad sort before touching storage.
    let order = SortOrder::from_query(query.sort_by.as_deref())?;
    let mut products = state.products.list().await?;
    sort_products(&mut products, order);
    Ok(Json(products))
}

pub async fn get_product(
    Path(product_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Product>, ApiError> {
    let id = ProductId(product_id);
    let product = state
        .products
        .find_by_id(&id)
        .await?
        .ok_or_else(|| DomainError::not_found("product", id.as_str()))?;
    Ok(Json(product))
}

pub async fn create_product(
    State(state): State<AppState>,
    Json(draft): Json<ProductDraft>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    draft.validate()?;
    let product = Product::from_draft(ProductId::generate(), draft);
    state.products.save(product.clone()).await?;

    info!(event_name = "catalog.product.created", product_id = %product.id, "product created");
    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn update_product(
    Path(product_id): Path<String>,
    State(state): State<AppState>,
    Json(draft): Json<ProductDraft>,
) -> Result<Json<Product>, ApiError> {
    let id = ProductId(product_id);
    if state.products.find_by_id(&id).await?.is_none() {
        return Err(DomainError::not_found("product", id.as_str()).into());
    }
    draft.validate()?;

    let product = Product::from_draft(id, draft);
    state.products.save(product.clone()).await?;

    info!(event_name = "catalog.product.updated", product_id = %product.id, "product updated");
    Ok(Json(product))
}

pub async fn delete_product(
    Path(product_id): Path<String>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let id = ProductId(product_id);
    if !state.products.delete(&id).await? {
        return Err(DomainError::not_found("product", id.as_str()).into());
    }

    info!(event_name = "catalog.product.deleted", product_id = %id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}
