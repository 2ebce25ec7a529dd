use sqlx::Row;

use storefront_core::domain::user::{User, UserId};

use super::{
    classify_write_error, format_timestamp, parse_timestamp, RepositoryError, UserRepository,
};
use crate::DbPool;

pub struct SqlUserRepository {
    pool: DbPool,
}

impl SqlUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query(&format!(
            "SELECT id, username, email, password_hash, created_at
             FROM user_account WHERE {column} = ?"
        ))
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_user).transpose()
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> Result<User, RepositoryError> {
    let id: String = row.try_get("id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let username: String =
        row.try_get("username").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let email: String = row.try_get("email").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let password_hash: String =
        row.try_get("password_hash").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(User {
        id: UserId(id),
        username,
        email,
        password_hash,
        created_at: parse_timestamp(&created_at)?,
    })
}

#[async_trait::async_trait]
impl UserRepository for SqlUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        self.find_one("id", id.as_str()).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        // the column is declared COLLATE NOCASE
        self.find_one("email", email.trim()).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        self.find_one("username", username.trim()).await
    }

    async fn insert(&self, user: User) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO user_account (id, username, email, password_hash, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(user.id.as_str())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(format_timestamp(user.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, "username or email"))?;

        Ok(())
    }

    async fn update(&self, user: User) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE user_account SET username = ?, email = ?, password_hash = ? WHERE id = ?",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| classify_write_error(e, "username or email"))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use storefront_core::domain::user::{User, UserId};

    use super::SqlUserRepository;
    use crate::repositories::{RepositoryError, UserRepository};
    use crate::{connect_with_settings, migrations};

    async fn setup() -> SqlUserRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlUserRepository::new(pool)
    }

    fn user(id: &str, username: &str, email: &str) -> User {
        User {
            id: UserId::from(id),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$v=19$placeholder".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 2, 14, 9, 30, 0).single().expect("timestamp"),
        }
    }

    #[tokio::test]
    async fn insert_and_lookup_by_each_key() {
        let repo = setup().await;
        let alice = user("u-1", "alice", "alice@example.com");
        repo.insert(alice.clone()).await.expect("insert");

        assert_eq!(repo.find_by_id(&alice.id).await.expect("by id"), Some(alice.clone()));
        assert_eq!(
            repo.find_by_email("ALICE@example.com").await.expect("by email"),
            Some(alice.clone())
        );
        assert_eq!(repo.find_by_username("alice").await.expect("by username"), Some(alice));
        assert_eq!(repo.find_by_username("bob").await.expect("missing"), None);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let repo = setup().await;
        repo.insert(user("u-1", "alice", "shared@example.com")).await.expect("insert");

        let outcome = repo.insert(user("u-2", "bob", "Shared@Example.com")).await;
        assert!(matches!(outcome, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn update_changes_profile_fields() {
        let repo = setup().await;
        let mut alice = user("u-1", "alice", "alice@example.com");
        repo.insert(alice.clone()).await.expect("insert");
        repo.insert(user("u-2", "bob", "bob@example.com")).await.expect("insert bob");

        alice.username = "alice2".to_string();
        repo.update(alice.clone()).await.expect("update");
        assert_eq!(repo.find_by_id(&alice.id).await.expect("find"), Some(alice.clone()));

        alice.username = "bob".to_string();
        assert!(matches!(repo.update(alice).await, Err(RepositoryError::Conflict(_))));
    }
}
