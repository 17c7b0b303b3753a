use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ItemError, ItemResult};
use crate::models::{Item, ItemCreate, ItemFilter, ItemUpdate};

/// Repository trait for Item persistence
///
/// This trait defines the data access interface for items.
/// Implementations can use different storage backends (MongoDB, etc.)
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Create a new item owned by the given user
    async fn create(&self, input: ItemCreate, owner_id: Uuid) -> ItemResult<Item>;

    /// Get an item by ID
    async fn get_by_id(&self, id: Uuid) -> ItemResult<Option<Item>>;

    /// List items matching a filter, newest first
    async fn list(&self, filter: ItemFilter) -> ItemResult<Vec<Item>>;

    /// Update an existing item
    async fn update(&self, id: Uuid, input: ItemUpdate) -> ItemResult<Item>;

    /// Delete an item by ID
    async fn delete(&self, id: Uuid) -> ItemResult<bool>;

    /// Count items matching a filter
    async fn count(&self, filter: ItemFilter) -> ItemResult<u64>;

    /// Delete every item owned by the given user, returning the number removed
    async fn delete_all_for_owner(&self, owner_id: Uuid) -> ItemResult<u64>;
}

/// In-memory implementation of ItemRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryItemRepository {
    items: Arc<RwLock<HashMap<Uuid, Item>>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn create(&self, input: ItemCreate, owner_id: Uuid) -> ItemResult<Item> {
        let item = Item::new(input, owner_id);
        let mut items = self.items.write().await;
        items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn get_by_id(&self, id: Uuid) -> ItemResult<Option<Item>> {
        let items = self.items.read().await;
        Ok(items.get(&id).cloned())
    }

    async fn list(&self, filter: ItemFilter) -> ItemResult<Vec<Item>> {
        let items = self.items.read().await;
        let mut matching: Vec<Item> = items
            .values()
            .filter(|i| filter.owner_id.is_none_or(|owner| i.owner_id == owner))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let skip = filter.skip.unwrap_or(0) as usize;
        let limit = filter.limit.unwrap_or(i64::MAX).max(0) as usize;
        Ok(matching.into_iter().skip(skip).take(limit).collect())
    }

    async fn update(&self, id: Uuid, input: ItemUpdate) -> ItemResult<Item> {
        let mut items = self.items.write().await;
        let item = items.get_mut(&id).ok_or(ItemError::NotFound(id))?;
        item.apply_update(input);
        Ok(item.clone())
    }

    async fn delete(&self, id: Uuid) -> ItemResult<bool> {
        let mut items = self.items.write().await;
        if items.remove(&id).is_none() {
            return Err(ItemError::NotFound(id));
        }
        Ok(true)
    }

    async fn count(&self, filter: ItemFilter) -> ItemResult<u64> {
        let items = self.items.read().await;
        let count = items
            .values()
            .filter(|i| filter.owner_id.is_none_or(|owner| i.owner_id == owner))
            .count();
        Ok(count as u64)
    }

    async fn delete_all_for_owner(&self, owner_id: Uuid) -> ItemResult<u64> {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|_, i| i.owner_id != owner_id);
        Ok((before - items.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_input(title: &str) -> ItemCreate {
        ItemCreate {
            title: title.to_string(),
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_item() {
        let repo = InMemoryItemRepository::new();
        let owner = Uuid::now_v7();

        let created = repo.create(create_input("Widget"), owner).await.unwrap();
        assert_eq!(created.title, "Widget");

        let fetched = repo.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.unwrap().owner_id, owner);
    }

    #[tokio::test]
    async fn test_list_filters_by_owner() {
        let repo = InMemoryItemRepository::new();
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();

        repo.create(create_input("a1"), alice).await.unwrap();
        repo.create(create_input("a2"), alice).await.unwrap();
        repo.create(create_input("b1"), bob).await.unwrap();

        let filter = ItemFilter {
            owner_id: Some(alice),
            ..Default::default()
        };
        let items = repo.list(filter).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.owner_id == alice));

        assert_eq!(repo.count(ItemFilter::default()).await.unwrap(), 3);
        assert_eq!(repo.count(filter).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_missing_item_errors() {
        let repo = InMemoryItemRepository::new();
        let result = repo.delete(Uuid::now_v7()).await;
        assert!(matches!(result, Err(ItemError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_all_for_owner() {
        let repo = InMemoryItemRepository::new();
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();

        repo.create(create_input("a1"), alice).await.unwrap();
        repo.create(create_input("a2"), alice).await.unwrap();
        repo.create(create_input("b1"), bob).await.unwrap();

        let removed = repo.delete_all_for_owner(alice).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(repo.count(ItemFilter::default()).await.unwrap(), 1);
    }
}
