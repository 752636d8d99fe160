use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{truncate_chars, MAX_NAME_CHARS};

/// An ordered column on a board. Never moves to another board.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BoardList {
    pub id: Uuid,
    pub name: String,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    pub board_id: Uuid,
    pub created_ts: DateTime<Utc>,
    pub modified_ts: DateTime<Utc>,
}

/// Body of `POST`/`PUT /boards/{board_id}/lists[/{id}]`.
///
/// `order` is caller-supplied and not required to be unique.
#[derive(Debug, Deserialize)]
pub struct ListInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub order: i32,
}

impl BoardList {
    pub fn new(input: ListInput, board_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: truncate_chars(&input.name, MAX_NAME_CHARS),
            order: input.order,
            board_id,
            created_ts: now,
            modified_ts: now,
        }
    }

    /// Applies an update in place; the parent board is left untouched.
    pub fn apply(&mut self, input: ListInput) {
        self.name = truncate_chars(&input.name, MAX_NAME_CHARS);
        self.order = input.order;
        self.modified_ts = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_name_truncated_before_persistence() {
        let list = BoardList::new(
            ListInput {
                name: "l".repeat(250),
                order: 3,
            },
            Uuid::new_v4(),
        );
        assert_eq!(list.name.len(), MAX_NAME_CHARS);
        assert_eq!(list.order, 3);
    }

    #[test]
    fn test_list_update_keeps_board() {
        let board_id = Uuid::new_v4();
        let mut list = BoardList::new(
            ListInput {
                name: "Todo".into(),
                order: 0,
            },
            board_id,
        );
        list.apply(ListInput {
            name: "Doing".into(),
            order: 1,
        });
        assert_eq!(list.board_id, board_id);
        assert_eq!(list.name, "Doing");
        assert!(list.modified_ts >= list.created_ts);
    }

    #[test]
    fn test_order_serialized_as_order() {
        let list = BoardList::new(
            ListInput {
                name: "Todo".into(),
                order: 7,
            },
            Uuid::new_v4(),
        );
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["order"], 7);
        assert!(json.get("board_id").is_some());
    }
}
