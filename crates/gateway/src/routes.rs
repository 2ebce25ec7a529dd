//! Frontend-facing routes. Product and preview payloads are reshaped into the
//! frontend schema; user routes are forwarded as-is.

use axum::{
    body::Bytes,
    extract::{Path, Query, RawQuery, State},
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use storefront_core::catalog::ProductPreview;
use storefront_core::domain::product::Product;

use crate::client::{BackendClient, GatewayError};
use crate::transform::{
    available_categories, featured, filter_string, previews_named, FrontendPreview,
    FrontendProduct, FrontendProductInput, PriceRange, ProductSearch,
};

const FEATURED_LIMIT: usize = 10;
const NAME_SEARCH_LIMIT: usize = 20;

#[derive(Clone)]
pub struct GatewayState {
    pub backend: BackendClient,
}

#[derive(Debug, Serialize)]
pub struct GatewayHealth {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct BackendHealth {
    pub status: &'static str,
    pub backend: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilteredQuery {
    pub categories: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    pub q: String,
    pub limit: Option<usize>,
}

pub fn router(state: GatewayState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/backend", get(backend_health))
        .route("/api/v1/products", get(list_products).post(create_product))
        .route("/api/v1/products/search", get(search_products))
        .route(
            "/api/v1/products/{product_id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/api/v1/previews", get(list_previews))
        .route("/api/v1/previews/filtered", get(filtered_previews))
        .route("/api/v1/previews/categories", get(list_categories))
        .route("/api/v1/previews/price-range", get(price_range))
        .route("/api/v1/previews/featured", get(featured_previews))
        .route("/api/v1/previews/search", get(previews_by_name))
        .route("/api/v1/previews/{filter}", get(filter_previews))
        .route("/api/v1/previews/search/", get(search_prompt))
        .route("/api/v1/previews/search/{query}", get(search_previews))
        .route("/api/v1/users/{*rest}", any(forward_user_route))
        .layer(cors_layer(allowed_origins))
        .with_state(state)
}

/// Only the configured origins may call the gateway from a browser.
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(event_name = "gateway.cors.invalid_origin", origin, "skipping origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
}

fn api_url(state: &GatewayState, tail: &[&str], query: Option<&str>) -> Result<Url, GatewayError> {
    let segments: Vec<&str> = ["api", "v1"].into_iter().chain(tail.iter().copied()).collect();
    state.backend.endpoint(&segments, query)
}

pub async fn health() -> Json<GatewayHealth> {
    Json(GatewayHealth { status: "healthy", service: "storefront-gateway" })
}

pub async fn backend_health(
    State(state): State<GatewayState>,
) -> Result<Json<BackendHealth>, GatewayError> {
    let url = state.backend.endpoint(&["health"], None)?;
    let backend = state.backend.get_json(url).await?;
    Ok(Json(BackendHealth { status: "healthy", backend }))
}

pub async fn list_products(
    State(state): State<GatewayState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<FrontendProduct>>, GatewayError> {
    let url = api_url(&state, &["products"], query.as_deref())?;
    let products: Vec<Product> = state.backend.get_json(url).await?;

    info!(event_name = "gateway.products.listed", count = products.len(), "products served");
    Ok(Json(products.into_iter().map(FrontendProduct::from).collect()))
}

async fn all_products(state: &GatewayState) -> Result<Vec<Product>, GatewayError> {
    let url = api_url(state, &["products"], None)?;
    state.backend.get_json(url).await
}

async fn all_previews(state: &GatewayState) -> Result<Vec<ProductPreview>, GatewayError> {
    let url = api_url(state, &["previews"], None)?;
    state.backend.get_json(url).await
}

pub async fn search_products(
    State(state): State<GatewayState>,
    Query(search): Query<ProductSearch>,
) -> Result<Json<Vec<FrontendProduct>>, GatewayError> {
    let matches = search.apply(all_products(&state).await?);
    info!(event_name = "gateway.products.searched", count = matches.len(), "product search served");
    Ok(Json(matches))
}

pub async fn get_product(
    Path(product_id): Path<String>,
    State(state): State<GatewayState>,
) -> Result<Json<FrontendProduct>, GatewayError> {
    let url = api_url(&state, &["products", &product_id], None)?;
    let product: Product = state.backend.get_json(url).await?;
    Ok(Json(product.into()))
}

pub async fn create_product(
    State(state): State<GatewayState>,
    Json(input): Json<FrontendProductInput>,
) -> Result<(StatusCode, Json<FrontendProduct>), GatewayError> {
    let url = api_url(&state, &["products"], None)?;
    let (status, product): (StatusCode, Product) =
        state.backend.send_json(Method::POST, url, &input.into_draft()).await?;

    info!(event_name = "gateway.products.created", product_id = %product.id, "product created");
    Ok((status, Json(product.into())))
}

pub async fn update_product(
    Path(product_id): Path<String>,
    State(state): State<GatewayState>,
    Json(input): Json<FrontendProductInput>,
) -> Result<Json<FrontendProduct>, GatewayError> {
    let url = api_url(&state, &["products", &product_id], None)?;
    let (_, product): (StatusCode, Product) =
        state.backend.send_json(Method::PUT, url, &input.into_draft()).await?;
    Ok(Json(product.into()))
}

pub async fn delete_product(
    Path(product_id): Path<String>,
    State(state): State<GatewayState>,
) -> Result<Json<MessageBody>, GatewayError> {
    let url = api_url(&state, &["products", &product_id], None)?;
    state.backend.send(Method::DELETE, url, None, None).await?;
    Ok(Json(MessageBody { message: format!("Product {product_id} deleted successfully") }))
}

async fn previews_at(
    state: &GatewayState,
    tail: &[&str],
) -> Result<Json<Vec<FrontendPreview>>, GatewayError> {
    let url = api_url(state, tail, None)?;
    let previews: Vec<ProductPreview> = state.backend.get_json(url).await?;
    Ok(Json(previews.into_iter().map(FrontendPreview::from).collect()))
}

pub async fn list_previews(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<FrontendPreview>>, GatewayError> {
    previews_at(&state, &["previews"]).await
}

pub async fn filter_previews(
    Path(filter): Path<String>,
    State(state): State<GatewayState>,
) -> Result<Json<Vec<FrontendPreview>>, GatewayError> {
    previews_at(&state, &["previews", &filter]).await
}

/// Translates structured query parameters into a backend filter string.
pub async fn filtered_previews(
    State(state): State<GatewayState>,
    Query(query): Query<FilteredQuery>,
) -> Result<Json<Vec<FrontendPreview>>, GatewayError> {
    let filter = filter_string(query.categories.as_deref(), query.min_price, query.max_price);
    info!(event_name = "gateway.previews.filtered", filter = %filter, "filter forwarded");
    previews_at(&state, &["previews", &filter]).await
}

pub async fn list_categories(
    State(state): State<GatewayState>,
) -> Result<Json<Vec<String>>, GatewayError> {
    Ok(Json(available_categories(&all_products(&state).await?)))
}

pub async fn price_range(
    State(state): State<GatewayState>,
) -> Result<Json<PriceRange>, GatewayError> {
    Ok(Json(PriceRange::of(&all_products(&state).await?)))
}

pub async fn featured_previews(
    State(state): State<GatewayState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<FrontendPreview>>, GatewayError> {
    let limit = query.limit.unwrap_or(FEATURED_LIMIT);
    Ok(Json(featured(all_previews(&state).await?, limit)))
}

pub async fn previews_by_name(
    State(state): State<GatewayState>,
    Query(query): Query<NameQuery>,
) -> Result<Json<Vec<FrontendPreview>>, GatewayError> {
    let limit = query.limit.unwrap_or(NAME_SEARCH_LIMIT);
    let found = previews_named(all_previews(&state).await?, &query.q, limit);
    info!(event_name = "gateway.previews.named", count = found.len(), "name search served");
    Ok(Json(found))
}

pub async fn search_prompt(
    State(state): State<GatewayState>,
) -> Result<Json<String>, GatewayError> {
    let url = api_url(&state, &["previews", "search", ""], None)?;
    Ok(Json(state.backend.get_json(url).await?))
}

pub async fn search_previews(
    Path(query): Path<String>,
    State(state): State<GatewayState>,
) -> Result<Json<Vec<FrontendPreview>>, GatewayError> {
    previews_at(&state, &["previews", "search", &query]).await
}

/// Passes a `/api/v1/users/...` call through with its method, query, bearer token and body.
pub async fn forward_user_route(
    State(state): State<GatewayState>,
    method: Method,
    Path(rest): Path<String>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, GatewayError> {
    let tail: Vec<&str> = std::iter::once("users").chain(rest.split('/')).collect();
    let url = api_url(&state, &tail, query.as_deref())?;
    let body = (!body.is_empty()).then_some(body);

    let (status, body) =
        state.backend.send(method, url, headers.get(AUTHORIZATION), body).await?;
    if body.is_empty() {
        return Ok(status.into_response());
    }
    Ok((status, [(CONTENT_TYPE, "application/json")], body).into_response())
}
