use chrono::Utc;
use sqlx::Row;

use storefront_core::domain::product::ProductId;
use storefront_core::domain::user::{UserId, ViewHistoryEntry};

use super::{format_timestamp, parse_timestamp, ActivityRepository, RepositoryError};
use crate::DbPool;

pub struct SqlActivityRepository {
    pool: DbPool,
}

impl SqlActivityRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ActivityRepository for SqlActivityRepository {
    async fn saved_items(&self, user_id: &UserId) -> Result<Vec<ProductId>, RepositoryError> {
        let rows = sqlx::query("SELECT product_id FROM saved_item WHERE user_id = ? ORDER BY seq")
            .bind(user_id.as_str())
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("product_id")
                    .map(ProductId)
                    .map_err(|e| RepositoryError::Decode(e.to_string()))
            })
            .collect()
    }

    async fn add_saved_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO saved_item (user_id, product_id, saved_at) VALUES (?, ?, ?)
             ON CONFLICT(user_id, product_id) DO NOTHING",
        )
        .bind(user_id.as_str())
        .bind(product_id.as_str())
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn remove_saved_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM saved_item WHERE user_id = ? AND product_id = ?")
            .bind(user_id.as_str())
            .bind(product_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn view_history(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ViewHistoryEntry>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT product_id, viewed_at FROM view_history WHERE user_id = ? ORDER BY position",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<ViewHistoryEntry, RepositoryError> {
                let product_id: String =
                    row.try_get("product_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                let viewed_at: String =
                    row.try_get("viewed_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
                Ok(ViewHistoryEntry {
                    product_id: ProductId(product_id),
                    viewed_at: parse_timestamp(&viewed_at)?,
                })
            })
            .collect()
    }

    async fn replace_view_history(
        &self,
        user_id: &UserId,
        history: Vec<ViewHistoryEntry>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM view_history WHERE user_id = ?")
            .bind(user_id.as_str())
            .execute(&mut *tx)
            .await?;

        for (position, entry) in history.iter().enumerate() {
            sqlx::query(
                "INSERT INTO view_history (user_id, position, product_id, viewed_at)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(user_id.as_str())
            .bind(position as i64)
            .bind(entry.product_id.as_str())
            .bind(format_timestamp(entry.viewed_at))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
