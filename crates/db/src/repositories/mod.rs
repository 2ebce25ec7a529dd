use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use storefront_core::domain::product::{Product, ProductId};
use storefront_core::domain::session::{PasswordReset, Session};
use storefront_core::domain::user::{User, UserId, ViewHistoryEntry};
use storefront_core::errors::{ApplicationError, DomainError};

pub mod activity;
pub mod memory;
pub mod product;
pub mod session;
pub mod user;

pub use activity::SqlActivityRepository;
pub use memory::{
    InMemoryActivityRepository, InMemoryProductRepository, InMemorySessionRepository,
    InMemoryUserRepository,
};
pub use product::SqlProductRepository;
pub use session::SqlSessionRepository;
pub use user::SqlUserRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Conflict(message) => DomainError::Conflict(message).into(),
            other => ApplicationError::Persistence(other.to_string()),
        }
    }
}

/// Maps a unique-constraint violation to `Conflict`, everything else to `Database`.
pub(crate) fn classify_write_error(error: sqlx::Error, what: &str) -> RepositoryError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Conflict(format!("{what} already exists"))
        }
        _ => RepositoryError::Database(error),
    }
}

/// Fixed-width UTC form; stored timestamps compare correctly as strings.
pub(crate) fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub(crate) fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Decode(format!("invalid timestamp `{value}`: {e}")))
}

/// Catalog storage. `list` returns products in catalog (insertion) order.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError>;
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;
    /// Inserts or replaces; a replaced product keeps its catalog position.
    async fn save(&self, product: Product) -> Result<(), RepositoryError>;
    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;
    /// Case-insensitive.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;
    /// Fails with `Conflict` when the username or email is taken.
    async fn insert(&self, user: User) -> Result<(), RepositoryError>;
    async fn update(&self, user: User) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: Session) -> Result<(), RepositoryError>;
    async fn find(&self, token_digest: &str) -> Result<Option<Session>, RepositoryError>;
    async fn delete(&self, token_digest: &str) -> Result<bool, RepositoryError>;
    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError>;
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError>;

    async fn create_reset(&self, reset: PasswordReset) -> Result<(), RepositoryError>;
    /// Removes and returns the grant, so a reset token works at most once.
    async fn take_reset(&self, token_digest: &str)
        -> Result<Option<PasswordReset>, RepositoryError>;
}

/// Per-user saved items and view history.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn saved_items(&self, user_id: &UserId) -> Result<Vec<ProductId>, RepositoryError>;
    /// Idempotent; a re-save keeps the original position.
    async fn add_saved_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), RepositoryError>;
    /// Idempotent.
    async fn remove_saved_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), RepositoryError>;

    /// Most recent first.
    async fn view_history(&self, user_id: &UserId)
        -> Result<Vec<ViewHistoryEntry>, RepositoryError>;
    async fn replace_view_history(
        &self,
        user_id: &UserId,
        history: Vec<ViewHistoryEntry>,
    ) -> Result<(), RepositoryError>;
}
