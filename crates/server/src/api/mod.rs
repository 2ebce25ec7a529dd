//! Backend HTTP API.
//!
//! Catalog:
//! - `GET    /api/v1/products?sort_by=`              list, optionally sorted
//! - `POST   /api/v1/products`                       create
//! - `GET    /api/v1/products/{product_id}`          fetch
//! - `PUT    /api/v1/products/{product_id}`          replace
//! - `DELETE /api/v1/products/{product_id}`          remove
//!
//! Previews and search:
//! - `GET /api/v1/previews`                          all previews
//! - `GET /api/v1/previews/{filter}`                 filtered previews
//! - `GET /api/v1/previews/search/`                  prompt for a query
//! - `GET /api/v1/previews/search/{query}`           strict search, `w=` prefix for wide
//!
//! Accounts (user-scoped routes need a bearer token for the same user):
//! - `POST /api/v1/users/{register,login,logout,forgot-password,reset-password}`
//! - `GET|PUT /api/v1/users/{user_id}`
//! - `GET /api/v1/users/{user_id}/saved-items`, `POST|DELETE .../saved-items/{product_id}`
//! - `GET /api/v1/users/{user_id}/view-history`, `POST .../view-history/{product_id}`
//! - `GET /api/v1/users/{user_id}/recommendations?limit=&exclude_product_id=`

pub mod activity;
pub mod auth;
pub mod errors;
pub mod previews;
pub mod products;
pub mod users;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use storefront_core::config::{AppConfig, CatalogConfig};
use storefront_core::credentials::SessionPolicy;
use storefront_core::recommendations::RecommendationEngine;
use storefront_db::repositories::{
    ActivityRepository, ProductRepository, SessionRepository, SqlActivityRepository,
    SqlProductRepository, SqlSessionRepository, SqlUserRepository, UserRepository,
};
use storefront_db::DbPool;

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub activity: Arc<dyn ActivityRepository>,
    pub catalog: CatalogConfig,
    pub session_policy: SessionPolicy,
    pub recommender: RecommendationEngine,
}

impl AppState {
    pub fn from_pool(db_pool: DbPool, config: &AppConfig) -> Self {
        Self {
            products: Arc::new(SqlProductRepository::new(db_pool.clone())),
            users: Arc::new(SqlUserRepository::new(db_pool.clone())),
            sessions: Arc::new(SqlSessionRepository::new(db_pool.clone())),
            activity: Arc::new(SqlActivityRepository::new(db_pool)),
            catalog: config.catalog.clone(),
            session_policy: config.auth.session_policy(),
            recommender: RecommendationEngine::new(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/products", get(products::list_products).post(products::create_product))
        .route("/api/v1/products/", get(products::list_products).post(products::create_product))
        .route(
            "/api/v1/products/{product_id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/api/v1/previews", get(previews::list_previews))
        .route("/api/v1/previews/", get(previews::list_previews))
        .route("/api/v1/previews/{filter}", get(previews::filter_previews))
        .route("/api/v1/previews/search/", get(previews::search_prompt))
        .route("/api/v1/previews/search/{query}", get(previews::search_previews))
        .route("/api/v1/users/register", post(users::register))
        .route("/api/v1/users/login", post(users::login))
        .route("/api/v1/users/logout", post(users::logout))
        .route("/api/v1/users/forgot-password", post(users::forgot_password))
        .route("/api/v1/users/reset-password", post(users::reset_password))
        .route("/api/v1/users/{user_id}", get(users::get_profile).put(users::update_profile))
        .route("/api/v1/users/{user_id}/saved-items", get(activity::list_saved_items))
        .route(
            "/api/v1/users/{user_id}/saved-items/{product_id}",
            post(activity::save_item).delete(activity::unsave_item),
        )
        .route("/api/v1/users/{user_id}/view-history", get(activity::view_history))
        .route(
            "/api/v1/users/{user_id}/view-history/{product_id}",
            post(activity::record_product_view),
        )
        .route("/api/v1/users/{user_id}/recommendations", get(activity::recommendations))
        .with_state(state)
}
