//! Item Service - Business logic layer

use std::sync::Arc;

use axum_helpers::CurrentUser;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ItemError, ItemResult};
use crate::models::{Item, ItemCreate, ItemFilter, ItemUpdate, ListParams};
use crate::repository::ItemRepository;

/// Item service providing business logic operations
///
/// The service layer handles validation, ownership enforcement, and
/// orchestrates repository operations. Regular users can only touch their own
/// items; superusers can touch everything.
pub struct ItemService<R: ItemRepository> {
    repository: Arc<R>,
}

impl<R: ItemRepository> ItemService<R> {
    /// Create a new ItemService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    fn ensure_can_access(user: &CurrentUser, item: &Item) -> ItemResult<()> {
        if item.owner_id == user.id || user.is_superuser {
            Ok(())
        } else {
            Err(ItemError::Forbidden)
        }
    }

    /// Create a new item owned by the current user
    #[instrument(skip(self, input), fields(item_title = %input.title, user_id = %user.id))]
    pub async fn create_item(&self, user: &CurrentUser, input: ItemCreate) -> ItemResult<Item> {
        input
            .validate()
            .map_err(|e| ItemError::Validation(e.to_string()))?;

        self.repository.create(input, user.id).await
    }

    /// Get an item by ID, enforcing ownership
    #[instrument(skip(self), fields(user_id = %user.id))]
    pub async fn get_item(&self, user: &CurrentUser, id: Uuid) -> ItemResult<Item> {
        let item = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(ItemError::NotFound(id))?;

        Self::ensure_can_access(user, &item)?;
        Ok(item)
    }

    /// List items visible to the current user with the total matching count
    ///
    /// Superusers see every item; regular users only their own.
    #[instrument(skip(self), fields(user_id = %user.id))]
    pub async fn list_items(
        &self,
        user: &CurrentUser,
        params: ListParams,
    ) -> ItemResult<(Vec<Item>, u64)> {
        let owner_id = if user.is_superuser {
            None
        } else {
            Some(user.id)
        };

        let filter = ItemFilter {
            owner_id,
            skip: Some(params.skip),
            limit: Some(params.limit),
        };

        let count = self
            .repository
            .count(ItemFilter {
                owner_id,
                ..Default::default()
            })
            .await?;
        let items = self.repository.list(filter).await?;

        Ok((items, count))
    }

    /// Update an existing item, enforcing ownership
    #[instrument(skip(self, input), fields(user_id = %user.id))]
    pub async fn update_item(
        &self,
        user: &CurrentUser,
        id: Uuid,
        input: ItemUpdate,
    ) -> ItemResult<Item> {
        input
            .validate()
            .map_err(|e| ItemError::Validation(e.to_string()))?;

        let existing = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(ItemError::NotFound(id))?;

        Self::ensure_can_access(user, &existing)?;

        self.repository.update(id, input).await
    }

    /// Delete an item, enforcing ownership
    #[instrument(skip(self), fields(user_id = %user.id))]
    pub async fn delete_item(&self, user: &CurrentUser, id: Uuid) -> ItemResult<()> {
        let existing = self
            .repository
            .get_by_id(id)
            .await?
            .ok_or(ItemError::NotFound(id))?;

        Self::ensure_can_access(user, &existing)?;

        self.repository.delete(id).await?;
        Ok(())
    }

    /// Delete every item owned by a user (used when the user account is removed)
    #[instrument(skip(self))]
    pub async fn delete_all_for_owner(&self, owner_id: Uuid) -> ItemResult<u64> {
        self.repository.delete_all_for_owner(owner_id).await
    }
}

impl<R: ItemRepository> Clone for ItemService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryItemRepository;

    fn regular_user() -> CurrentUser {
        CurrentUser {
            id: Uuid::now_v7(),
            email: "user@example.com".to_string(),
            full_name: Some("Regular User".to_string()),
            is_active: true,
            is_superuser: false,
        }
    }

    fn superuser() -> CurrentUser {
        CurrentUser {
            id: Uuid::now_v7(),
            email: "admin@example.com".to_string(),
            full_name: Some("Admin".to_string()),
            is_active: true,
            is_superuser: true,
        }
    }

    fn create_input(title: &str) -> ItemCreate {
        ItemCreate {
            title: title.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_item_assigns_current_user_as_owner() {
        let service = ItemService::new(InMemoryItemRepository::new());
        let user = regular_user();

        let item = service
            .create_item(&user, create_input("Widget"))
            .await
            .unwrap();
        assert_eq!(item.owner_id, user.id);
    }

    #[tokio::test]
    async fn test_create_item_rejects_empty_title() {
        let service = ItemService::new(InMemoryItemRepository::new());
        let user = regular_user();

        let result = service.create_item(&user, create_input("")).await;
        assert!(matches!(result, Err(ItemError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_item_denied_for_non_owner() {
        let service = ItemService::new(InMemoryItemRepository::new());
        let owner = regular_user();
        let other = regular_user();

        let item = service
            .create_item(&owner, create_input("Widget"))
            .await
            .unwrap();

        let result = service.get_item(&other, item.id).await;
        assert!(matches!(result, Err(ItemError::Forbidden)));
    }

    #[tokio::test]
    async fn test_superuser_can_access_any_item() {
        let service = ItemService::new(InMemoryItemRepository::new());
        let owner = regular_user();
        let admin = superuser();

        let item = service
            .create_item(&owner, create_input("Widget"))
            .await
            .unwrap();

        let fetched = service.get_item(&admin, item.id).await.unwrap();
        assert_eq!(fetched.id, item.id);

        service.delete_item(&admin, item.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_list_items_scopes_to_owner() {
        let service = ItemService::new(InMemoryItemRepository::new());
        let alice = regular_user();
        let bob = regular_user();

        service
            .create_item(&alice, create_input("a1"))
            .await
            .unwrap();
        service
            .create_item(&alice, create_input("a2"))
            .await
            .unwrap();
        service.create_item(&bob, create_input("b1")).await.unwrap();

        let (items, count) = service
            .list_items(&alice, ListParams::default())
            .await
            .unwrap();
        assert_eq!(count, 2);
        assert!(items.iter().all(|i| i.owner_id == alice.id));

        let (_, count) = service
            .list_items(&superuser(), ListParams::default())
            .await
            .unwrap();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn test_list_items_count_ignores_pagination() {
        let service = ItemService::new(InMemoryItemRepository::new());
        let user = regular_user();

        for i in 0..5 {
            service
                .create_item(&user, create_input(&format!("item-{i}")))
                .await
                .unwrap();
        }

        let params = ListParams { skip: 0, limit: 2 };
        let (items, count) = service.list_items(&user, params).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(count, 5);
    }

    #[tokio::test]
    async fn test_update_item_denied_for_non_owner() {
        let service = ItemService::new(InMemoryItemRepository::new());
        let owner = regular_user();
        let other = regular_user();

        let item = service
            .create_item(&owner, create_input("Widget"))
            .await
            .unwrap();

        let update = ItemUpdate {
            title: Some("Stolen".to_string()),
            description: None,
        };
        let result = service.update_item(&other, item.id, update).await;
        assert!(matches!(result, Err(ItemError::Forbidden)));
    }

    #[tokio::test]
    async fn test_delete_missing_item_is_not_found() {
        let service = ItemService::new(InMemoryItemRepository::new());
        let user = regular_user();

        let result = service.delete_item(&user, Uuid::now_v7()).await;
        assert!(matches!(result, Err(ItemError::NotFound(_))));
    }
}
