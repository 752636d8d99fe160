use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{truncate_chars, MAX_NAME_CHARS};

/// An ordered card inside a list. Never moves to another list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub content: String,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    pub list_id: Uuid,
    pub created_ts: DateTime<Utc>,
    pub modified_ts: DateTime<Utc>,
}

/// Body of `POST`/`PUT .../lists/{list_id}/tasks[/{id}]`.
#[derive(Debug, Deserialize)]
pub struct TaskInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub order: i32,
}

impl Task {
    pub fn new(input: TaskInput, list_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: truncate_chars(&input.name, MAX_NAME_CHARS),
            content: input.content,
            order: input.order,
            list_id,
            created_ts: now,
            modified_ts: now,
        }
    }

    pub fn apply(&mut self, input: TaskInput) {
        self.name = truncate_chars(&input.name, MAX_NAME_CHARS);
        self.content = input.content;
        self.order = input.order;
        self.modified_ts = Utc::now();
    }
}
