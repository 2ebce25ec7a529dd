use chrono::Utc;
use sqlx::Row;

use storefront_core::domain::product::{Product, ProductId, ProductReviews};

use super::{format_timestamp, ProductRepository, RepositoryError};
use crate::DbPool;

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, categories_json, discounted_price, actual_price,
    discount_percentage, rating, rating_count, about_product, reviews_json, img_link, product_link";

fn row_to_product(row: &sqlx::sqlite::SqliteRow) -> Result<Product, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let name: String = row.try_get("name").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let categories_json: String =
        row.try_get("categories_json").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let discounted_price: f64 =
        row.try_get("discounted_price").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let actual_price: f64 =
        row.try_get("actual_price").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let discount_percentage: String =
        row.try_get("discount_percentage").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let rating: f64 = row.try_get("rating").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let rating_count: i64 =
        row.try_get("rating_count").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let about_product: String =
        row.try_get("about_product").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let reviews_json: String =
        row.try_get("reviews_json").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let img_link: String =
        row.try_get("img_link").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let product_link: String =
        row.try_get("product_link").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    let categories: Vec<String> = serde_json::from_str(&categories_json)
        .map_err(|e| RepositoryError::Decode(format!("product `{id}` categories: {e}")))?;
    let reviews: ProductReviews = serde_json::from_str(&reviews_json)
        .map_err(|e| RepositoryError::Decode(format!("product `{id}` reviews: {e}")))?;
    let rating_count = u64::try_from(rating_count)
        .map_err(|_| RepositoryError::Decode(format!("product `{id}` has negative rating_count")))?;

    Ok(Product {
        id: ProductId(id),
        name,
        categories,
        discounted_price,
        actual_price,
        discount_percentage,
        rating,
        rating_count,
        about_product,
        reviews,
        img_link,
        product_link,
    })
}

#[async_trait::async_trait]
impl ProductRepository for SqlProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product ORDER BY seq"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_product).collect::<Result<Vec<_>, _>>()
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query(&format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?"))
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_product).transpose()
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        let categories_json = serde_json::to_string(&product.categories)
            .map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let reviews_json = serde_json::to_string(&product.reviews)
            .map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let rating_count = i64::try_from(product.rating_count)
            .map_err(|_| RepositoryError::Decode("rating_count out of range".to_string()))?;

        sqlx::query(
            "INSERT INTO product
                (id, name, categories_json, discounted_price, actual_price, discount_percentage,
                 rating, rating_count, about_product, reviews_json, img_link, product_link,
                 updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                categories_json = excluded.categories_json,
                discounted_price = excluded.discounted_price,
                actual_price = excluded.actual_price,
                discount_percentage = excluded.discount_percentage,
                rating = excluded.rating,
                rating_count = excluded.rating_count,
                about_product = excluded.about_product,
                reviews_json = excluded.reviews_json,
                img_link = excluded.img_link,
                product_link = excluded.product_link,
                updated_at = excluded.updated_at",
        )
        .bind(product.id.as_str())
        .bind(&product.name)
        .bind(&categories_json)
        .bind(product.discounted_price)
        .bind(product.actual_price)
        .bind(&product.discount_percentage)
        .bind(product.rating)
        .bind(rating_count)
        .bind(&product.about_product)
        .bind(&reviews_json)
        .bind(&product.img_link)
        .bind(&product.product_link)
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM product").fetch_one(&self.pool).await?;
        let count: i64 =
            row.try_get("count").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        Ok(count.max(0).unsigned_abs())
    }
}
