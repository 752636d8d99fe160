use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// A board owned by exactly one user. Deleting it cascades to its lists.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub created_ts: DateTime<Utc>,
    pub modified_ts: DateTime<Utc>,
}

/// Body of `POST /boards` and `PUT /boards/{id}`.
#[derive(Debug, Deserialize, Validate)]
pub struct BoardInput {
    #[validate(length(min = 1, max = 100, message = "board name must be 1-100 characters"))]
    pub name: String,
}

impl BoardInput {
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self
    }
}

impl Board {
    pub fn new(input: BoardInput, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            owner_id,
            created_ts: now,
            modified_ts: now,
        }
    }

    /// Renames in place; the owner never changes.
    pub fn apply(&mut self, input: BoardInput) {
        self.name = input.name;
        self.modified_ts = Utc::now();
    }
}
