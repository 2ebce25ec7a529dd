use chrono::{DateTime, Utc};
use sqlx::Row;

use storefront_core::domain::session::{PasswordReset, Session};
use storefront_core::domain::user::UserId;

use super::{format_timestamp, parse_timestamp, RepositoryError, SessionRepository};
use crate::DbPool;

pub struct SqlSessionRepository {
    pool: DbPool,
}

impl SqlSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_session(row: &sqlx::sqlite::SqliteRow) -> Result<Session, RepositoryError> {
    let token_digest: String =
        row.try_get("token_digest").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let user_id: String =
        row.try_get("user_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let created_at: String =
        row.try_get("created_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;
    let expires_at: String =
        row.try_get("expires_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

    Ok(Session {
        token_digest,
        user_id: UserId(user_id),
        created_at: parse_timestamp(&created_at)?,
        expires_at: parse_timestamp(&expires_at)?,
    })
}

#[async_trait::async_trait]
impl SessionRepository for SqlSessionRepository {
    async fn create(&self, session: Session) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO user_session (token_digest, user_id, created_at, expires_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&session.token_digest)
        .bind(session.user_id.as_str())
        .bind(format_timestamp(session.created_at))
        .bind(format_timestamp(session.expires_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, token_digest: &str) -> Result<Option<Session>, RepositoryError> {
        let row = sqlx::query(
            "SELECT token_digest, user_id, created_at, expires_at
             FROM user_session WHERE token_digest = ?",
        )
        .bind(token_digest)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_session).transpose()
    }

    async fn delete(&self, token_digest: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM user_session WHERE token_digest = ?")
            .bind(token_digest)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM user_session WHERE user_id = ?")
            .bind(user_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        // RFC 3339 strings in UTC compare lexicographically in time order.
        let sessions = sqlx::query("DELETE FROM user_session WHERE expires_at <= ?")
            .bind(format_timestamp(now))
            .execute(&self.pool)
            .await?;
        let resets = sqlx::query("DELETE FROM password_reset WHERE expires_at <= ?")
            .bind(format_timestamp(now))
            .execute(&self.pool)
            .await?;
        Ok(sessions.rows_affected() + resets.rows_affected())
    }

    async fn create_reset(&self, reset: PasswordReset) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO password_reset (token_digest, user_id, expires_at) VALUES (?, ?, ?)",
        )
        .bind(&reset.token_digest)
        .bind(reset.user_id.as_str())
        .bind(format_timestamp(reset.expires_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn take_reset(
        &self,
        token_digest: &str,
    ) -> Result<Option<PasswordReset>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT token_digest, user_id, expires_at FROM password_reset WHERE token_digest = ?",
        )
        .bind(token_digest)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.commit().await?;
            return Ok(None);
        };

        sqlx::query("DELETE FROM password_reset WHERE token_digest = ?")
            .bind(token_digest)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let user_id: String =
            row.try_get("user_id").map_err(|e| RepositoryError::Decode(e.to_string()))?;
        let expires_at: String =
            row.try_get("expires_at").map_err(|e| RepositoryError::Decode(e.to_string()))?;

        Ok(Some(PasswordReset {
            token_digest: token_digest.to_string(),
            user_id: UserId(user_id),
            expires_at: parse_timestamp(&expires_at)?,
        }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use storefront_core::domain::session::{PasswordReset, Session};
    use storefront_core::domain::user::{User, UserId};

    use super::SqlSessionRepository;
    use crate::repositories::{SessionRepository, SqlUserRepository, UserRepository};
    use crate::{connect_with_settings, migrations};

    async fn setup() -> SqlSessionRepository {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrations");
        SqlUserRepository::new(pool.clone())
            .insert(User {
                id: UserId::from("u-1"),
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                password_hash: "hash".to_string(),
                created_at: Utc::now(),
            })
            .await
            .expect("seed user");
        SqlSessionRepository::new(pool)
    }

    fn session(digest: &str, expires_in: Duration) -> Session {
        let now = Utc::now();
        Session {
            token_digest: digest.to_string(),
            user_id: UserId::from("u-1"),
            created_at: now,
            expires_at: now + expires_in,
        }
    }

    #[tokio::test]
    async fn sessions_are_found_by_digest_and_deleted() {
        let repo = setup().await;
        repo.create(session("live", Duration::hours(1))).await.expect("create");

        let found = repo.find("live").await.expect("find").expect("session");
        assert_eq!(found.user_id.as_str(), "u-1");

        assert!(repo.delete("live").await.expect("delete"));
        assert!(repo.find("live").await.expect("find").is_none());
    }

    #[tokio::test]
    async fn purge_removes_only_expired_sessions() {
        let repo = setup().await;
        repo.create(session("old", -Duration::minutes(5))).await.expect("create old");
        repo.create(session("new", Duration::hours(1))).await.expect("create new");

        assert_eq!(repo.purge_expired(Utc::now()).await.expect("purge"), 1);
        assert!(repo.find("old").await.expect("find").is_none());
        assert!(repo.find("new").await.expect("find").is_some());
    }

    #[tokio::test]
    async fn user_sessions_can_be_revoked_together() {
        let repo = setup().await;
        repo.create(session("a", Duration::hours(1))).await.expect("create a");
        repo.create(session("b", Duration::hours(1))).await.expect("create b");

        assert_eq!(repo.delete_for_user(&UserId::from("u-1")).await.expect("revoke"), 2);
    }

    #[tokio::test]
    async fn reset_tokens_are_single_use() {
        let repo = setup().await;
        repo.create_reset(PasswordReset {
            token_digest: "reset".to_string(),
            user_id: UserId::from("u-1"),
            expires_at: Utc::now() + Duration::minutes(60),
        })
        .await
        .expect("create reset");

        assert!(repo.take_reset("reset").await.expect("take").is_some());
        assert!(repo.take_reset("reset").await.expect("take again").is_none());
    }
}
