use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use storefront_core::domain::product::{Product, ProductId};
use storefront_core::domain::session::{PasswordReset, Session};
use storefront_core::domain::user::{User, UserId, ViewHistoryEntry};

use super::{
    ActivityRepository, ProductRepository, RepositoryError, SessionRepository, UserRepository,
};

/// Vec-backed so `list` keeps insertion order like the SQL table's `seq`.
#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub fn with_products(products: Vec<Product>) -> Self {
        Self { products: RwLock::new(products) }
    }
}

#[async_trait::async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.products.read().await.clone())
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        let products = self.products.read().await;
        Ok(products.iter().find(|product| &product.id == id).cloned())
    }

    async fn save(&self, product: Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        match products.iter_mut().find(|existing| existing.id == product.id) {
            Some(existing) => *existing = product,
            None => products.push(product),
        }
        Ok(())
    }

    async fn delete(&self, id: &ProductId) -> Result<bool, RepositoryError> {
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|product| &product.id != id);
        Ok(products.len() != before)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.products.read().await.len() as u64)
    }
}

#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

const TAKEN: &str = "username or email already exists";

impl InMemoryUserRepository {
    fn clashes(users: &HashMap<String, User>, candidate: &User) -> bool {
        users.values().any(|existing| {
            existing.id != candidate.id
                && (existing.username == candidate.username
                    || existing.email.eq_ignore_ascii_case(&candidate.email))
        })
    }
}

#[async_trait::async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(id.as_str()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let email = email.trim();
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.email.eq_ignore_ascii_case(email)).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let username = username.trim();
        let users = self.users.read().await;
        Ok(users.values().find(|user| user.username == username).cloned())
    }

    async fn insert(&self, user: User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        if users.contains_key(user.id.as_str()) || Self::clashes(&users, &user) {
            return Err(RepositoryError::Conflict(TAKEN.to_string()));
        }
        users.insert(user.id.0.clone(), user);
        Ok(())
    }

    async fn update(&self, user: User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        if Self::clashes(&users, &user) {
            return Err(RepositoryError::Conflict(TAKEN.to_string()));
        }
        if let Some(existing) = users.get_mut(user.id.as_str()) {
            *existing = user;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<String, Session>>,
    resets: RwLock<HashMap<String, PasswordReset>>,
}

#[async_trait::async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, session: Session) -> Result<(), RepositoryError> {
        self.sessions.write().await.insert(session.token_digest.clone(), session);
        Ok(())
    }

    async fn find(&self, token_digest: &str) -> Result<Option<Session>, RepositoryError> {
        Ok(self.sessions.read().await.get(token_digest).cloned())
    }

    async fn delete(&self, token_digest: &str) -> Result<bool, RepositoryError> {
        Ok(self.sessions.write().await.remove(token_digest).is_some())
    }

    async fn delete_for_user(&self, user_id: &UserId) -> Result<u64, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| &session.user_id != user_id);
        Ok((before - sessions.len()) as u64)
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let mut sessions = self.sessions.write().await;
        let mut resets = self.resets.write().await;
        let before = sessions.len() + resets.len();
        sessions.retain(|_, session| !session.is_expired(now));
        resets.retain(|_, reset| !reset.is_expired(now));
        Ok((before - sessions.len() - resets.len()) as u64)
    }

    async fn create_reset(&self, reset: PasswordReset) -> Result<(), RepositoryError> {
        self.resets.write().await.insert(reset.token_digest.clone(), reset);
        Ok(())
    }

    async fn take_reset(
        &self,
        token_digest: &str,
    ) -> Result<Option<PasswordReset>, RepositoryError> {
        Ok(self.resets.write().await.remove(token_digest))
    }
}

#[derive(Default)]
pub struct InMemoryActivityRepository {
    saved: RwLock<HashMap<String, Vec<ProductId>>>,
    history: RwLock<HashMap<String, Vec<ViewHistoryEntry>>>,
}

#[async_trait::async_trait]
impl ActivityRepository for InMemoryActivityRepository {
    async fn saved_items(&self, user_id: &UserId) -> Result<Vec<ProductId>, RepositoryError> {
        Ok(self.saved.read().await.get(user_id.as_str()).cloned().unwrap_or_default())
    }

    async fn add_saved_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), RepositoryError> {
        let mut saved = self.saved.write().await;
        let items = saved.entry(user_id.0.clone()).or_default();
        if !items.contains(product_id) {
            items.push(product_id.clone());
        }
        Ok(())
    }

    async fn remove_saved_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
    ) -> Result<(), RepositoryError> {
        if let Some(items) = self.saved.write().await.get_mut(user_id.as_str()) {
            items.retain(|item| item != product_id);
        }
        Ok(())
    }

    async fn view_history(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<ViewHistoryEntry>, RepositoryError> {
        Ok(self.history.read().await.get(user_id.as_str()).cloned().unwrap_or_default())
    }

    async fn replace_view_history(
        &self,
        user_id: &UserId,
        history: Vec<ViewHistoryEntry>,
    ) -> Result<(), RepositoryError> {
        self.history.write().await.insert(user_id.0.clone(), history);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use storefront_core::domain::product::{Product, ProductId, ProductReviews};
    use storefront_core::domain::session::Session;
    use storefront_core::domain::user::{User, UserId};

    use crate::repositories::{
        ActivityRepository, InMemoryActivityRepository, InMemoryProductRepository,
        InMemorySessionRepository, InMemoryUserRepository, ProductRepository, RepositoryError,
        SessionRepository, UserRepository,
    };

    fn product(id: &str) -> Product {
        Product {
            id: ProductId::from(id),
            name: format!("Product {id}"),
            categories: vec!["Misc".to_string()],
            discounted_price: 10.0,
            actual_price: 20.0,
            discount_percentage: "50%".to_string(),
            rating: 4.0,
            rating_count: 3,
            about_product: String::new(),
            reviews: ProductReviews::default(),
            img_link: String::new(),
            product_link: String::new(),
        }
    }

    fn user(id: &str, username: &str, email: &str) -> User {
        User {
            id: UserId::from(id),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn in_memory_product_repo_keeps_order_on_update() {
        let repo = InMemoryProductRepository::default();
        for id in ["b", "a", "c"] {
            repo.save(product(id)).await.expect("save");
        }
        let mut changed = product("a");
        changed.name = "Renamed".to_string();
        repo.save(changed.clone()).await.expect("update");

        let listed = repo.list().await.expect("list");
        let ids: Vec<&str> = listed.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
        assert_eq!(repo.find_by_id(&changed.id).await.expect("find"), Some(changed));
        assert!(repo.delete(&ProductId::from("b")).await.expect("delete"));
        assert_eq!(repo.count().await.expect("count"), 2);
    }

    #[tokio::test]
    async fn in_memory_user_repo_enforces_uniqueness() {
        let repo = InMemoryUserRepository::default();
        repo.insert(user("u-1", "alice", "alice@example.com")).await.expect("insert");

        let clash = repo.insert(user("u-2", "alice", "other@example.com")).await;
        assert!(matches!(clash, Err(RepositoryError::Conflict(_))));
        let clash = repo.insert(user("u-3", "carol", "ALICE@example.com")).await;
        assert!(matches!(clash, Err(RepositoryError::Conflict(_))));

        assert!(repo.find_by_email("Alice@Example.com").await.expect("find").is_some());
    }

    #[tokio::test]
    async fn in_memory_sessions_purge_expired() {
        let repo = InMemorySessionRepository::default();
        let now = Utc::now();
        repo.create(Session {
            token_digest: "old".to_string(),
            user_id: UserId::from("u-1"),
            created_at: now - Duration::days(2),
            expires_at: now - Duration::days(1),
        })
        .await
        .expect("create");

        assert_eq!(repo.purge_expired(now).await.expect("purge"), 1);
        assert!(repo.find("old").await.expect("find").is_none());
    }

    #[tokio::test]
    async fn in_memory_saved_items_are_idempotent() {
        let repo = InMemoryActivityRepository::default();
        let user = UserId::from("u-1");
        repo.add_saved_item(&user, &ProductId::from("p")).await.expect("add");
        repo.add_saved_item(&user, &ProductId::from("p")).await.expect("add again");
        assert_eq!(repo.saved_items(&user).await.expect("list").len(), 1);

        repo.remove_saved_item(&user, &ProductId::from("p")).await.expect("remove");
        repo.remove_saved_item(&user, &ProductId::from("p")).await.expect("remove again");
        assert!(repo.saved_items(&user).await.expect("list").is_empty());
    }
}
