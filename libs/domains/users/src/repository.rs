use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{User, UserFilter};

/// Repository trait for User persistence
///
/// This trait defines the data access interface for users.
/// Implementations can use different storage backends (MongoDB, etc.)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: User) -> UserResult<User>;

    /// Get a user by ID
    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>>;

    /// Get a user by email (exact match)
    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>>;

    /// List users matching a filter, newest first
    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>>;

    /// Count users matching a filter
    async fn count(&self, filter: UserFilter) -> UserResult<u64>;

    /// Update an existing user
    async fn update(&self, user: User) -> UserResult<User>;

    /// Delete a user by ID
    async fn delete(&self, id: Uuid) -> UserResult<bool>;

    /// Check if an email already exists
    async fn email_exists(&self, email: &str) -> UserResult<bool>;
}

fn matches_query(user: &User, q: &str) -> bool {
    let q = q.to_lowercase();
    user.email.to_lowercase().contains(&q)
        || user
            .full_name
            .as_ref()
            .is_some_and(|n| n.to_lowercase().contains(&q))
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::DuplicateEmail(user.email));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: Uuid) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn get_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn list(&self, filter: UserFilter) -> UserResult<Vec<User>> {
        let users = self.users.read().await;
        let mut matching: Vec<User> = users
            .values()
            .filter(|u| filter.q.as_deref().is_none_or(|q| matches_query(u, q)))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let limit = filter.limit.max(0) as usize;
        Ok(matching
            .into_iter()
            .skip(filter.skip as usize)
            .take(limit)
            .collect())
    }

    async fn count(&self, filter: UserFilter) -> UserResult<u64> {
        let users = self.users.read().await;
        let count = users
            .values()
            .filter(|u| filter.q.as_deref().is_none_or(|q| matches_query(u, q)))
            .count();
        Ok(count as u64)
    }

    async fn update(&self, user: User) -> UserResult<User> {
        let mut users = self.users.write().await;

        if !users.contains_key(&user.id) {
            return Err(UserError::NotFound(user.id));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> UserResult<bool> {
        let mut users = self.users.write().await;
        Ok(users.remove(&id).is_some())
    }

    async fn email_exists(&self, email: &str) -> UserResult<bool> {
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.email == email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserCreate;

    fn new_user(email: &str, full_name: Option<&str>) -> User {
        User::new(
            UserCreate {
                email: email.to_string(),
                password: "unused-here".to_string(),
                full_name: full_name.map(str::to_string),
                is_active: true,
                is_superuser: false,
            },
            "hashed".to_string(),
        )
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let repo = InMemoryUserRepository::new();

        let created = repo.create(new_user("test@example.com", None)).await.unwrap();
        assert_eq!(created.email, "test@example.com");

        let fetched = repo.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.unwrap().id, created.id);

        let fetched = repo.get_by_email("test@example.com").await.unwrap();
        assert!(fetched.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_email_error() {
        let repo = InMemoryUserRepository::new();

        repo.create(new_user("test@example.com", None)).await.unwrap();
        let result = repo.create(new_user("test@example.com", None)).await;
        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_list_with_search_query() {
        let repo = InMemoryUserRepository::new();

        repo.create(new_user("alice@example.com", Some("Alice Smith")))
            .await
            .unwrap();
        repo.create(new_user("bob@example.com", Some("Bob Jones")))
            .await
            .unwrap();

        let filter = UserFilter {
            q: Some("alice".to_string()),
            ..Default::default()
        };
        let users = repo.list(filter.clone()).await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(repo.count(filter).await.unwrap(), 1);

        // Matches full_name too, case-insensitively
        let filter = UserFilter {
            q: Some("SMITH".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.count(filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_returns_whether_removed() {
        let repo = InMemoryUserRepository::new();

        let user = repo.create(new_user("test@example.com", None)).await.unwrap();
        assert!(repo.delete(user.id).await.unwrap());
        assert!(!repo.delete(user.id).await.unwrap());
    }
}
