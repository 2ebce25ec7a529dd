use chrono::{DateTime, Utc};

use super::user::UserId;

/// A bearer session. Only the SHA-256 digest of the client's token is kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub token_digest: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Single-use password reset grant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PasswordReset {
    pub token_digest: String,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
}

impl PasswordReset {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::Session;
    use crate::domain::user::UserId;

    #[test]
    fn session_expires_at_its_deadline() {
        let now = Utc::now();
        let session = Session {
            token_digest: "digest".to_string(),
            user_id: UserId::from("u-1"),
            created_at: now - Duration::hours(1),
            expires_at: now,
        };

        assert!(session.is_expired(now));
        assert!(!session.is_expired(now - Duration::seconds(1)));
    }
}
