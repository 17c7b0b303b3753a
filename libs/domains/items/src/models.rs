use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Item entity - represents an item stored in MongoDB
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Item {
    /// Unique identifier (stored as _id in MongoDB)
    #[serde(rename = "_id", alias = "id")]
    pub id: Uuid,
    /// Item title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Owning user's ID
    pub owner_id: Uuid,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Construct a new item owned by the given user
    pub fn new(input: ItemCreate, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            title: input.title,
            description: input.description,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update, refreshing the updated_at timestamp
    pub fn apply_update(&mut self, update: ItemUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        self.updated_at = Utc::now();
    }
}

/// DTO for creating a new item
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ItemCreate {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

/// DTO for updating an existing item
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct ItemUpdate {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[validate(length(max = 255))]
    pub description: Option<String>,
}

/// Item as exposed over the API
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemPublic {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Item> for ItemPublic {
    fn from(item: Item) -> Self {
        Self {
            id: item.id,
            title: item.title,
            description: item.description,
            owner_id: item.owner_id,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Paginated list of items with the total matching count
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ItemsPublic {
    pub data: Vec<ItemPublic>,
    pub count: u64,
}

/// Pagination parameters accepted by list endpoints
#[derive(Debug, Clone, Copy, Deserialize, IntoParams)]
pub struct ListParams {
    /// Number of items to skip
    #[serde(default)]
    pub skip: u64,
    /// Maximum number of items to return
    #[serde(default = "default_limit")]
    pub limit: i64,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: default_limit(),
        }
    }
}

fn default_limit() -> i64 {
    100
}

/// Repository-level filter for item queries
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemFilter {
    /// Restrict to items owned by this user
    pub owner_id: Option<Uuid>,
    pub skip: Option<u64>,
    pub limit: Option<i64>,
}
