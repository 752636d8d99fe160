use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

use super::{BoardStore, ListStore, TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{Board, BoardList, Task, User};

/// Process-local store used by tests and when no `DATABASE_URL` is configured.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    /// Username to id. Claiming an entry here is what makes a username taken.
    usernames: DashMap<String, Uuid>,
    boards: DashMap<Uuid, Board>,
    lists: DashMap<Uuid, BoardList>,
    tasks: DashMap<Uuid, Task>,
}

fn replace<T: Clone>(map: &DashMap<Uuid, T>, id: Uuid, value: &T) -> Option<T> {
    map.get_mut(&id).map(|mut entry| {
        *entry = value.clone();
        entry.clone()
    })
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<User, AppError> {
        match self.usernames.entry(user.username.clone()) {
            Entry::Occupied(_) => Err(AppError::Conflict(
                "user by that username already exists".into(),
            )),
            Entry::Vacant(slot) => {
                self.users.insert(user.id, user.clone());
                slot.insert(user.id);
                Ok(user.clone())
            }
        }
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.get(&id).map(|entry| entry.clone()))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let id = match self.usernames.get(username) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.users.get(&id).map(|entry| entry.clone()))
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let mut users: Vec<User> = self.users.iter().map(|entry| entry.clone()).collect();
        users.sort_by_key(|user| user.created_ts);
        Ok(users)
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, AppError> {
        Ok(replace(&self.users, user.id, user))
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError> {
        if let Some(mut user) = self.users.get_mut(&id) {
            user.last_login_ts = Some(at);
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        match self.users.remove(&id) {
            Some((_, user)) => {
                self.usernames.remove(&user.username);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn create_board(&self, board: &Board) -> Result<Board, AppError> {
        self.boards.insert(board.id, board.clone());
        Ok(board.clone())
    }

    async fn find_board(&self, id: Uuid) -> Result<Option<Board>, AppError> {
        Ok(self.boards.get(&id).map(|entry| entry.clone()))
    }

    async fn boards_for_owner(&self, owner_id: Uuid) -> Result<Vec<Board>, AppError> {
        let mut boards: Vec<Board> = self
            .boards
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.clone())
            .collect();
        boards.sort_by_key(|board| board.created_ts);
        Ok(boards)
    }

    async fn update_board(&self, board: &Board) -> Result<Option<Board>, AppError> {
        Ok(replace(&self.boards, board.id, board))
    }

    async fn delete_board(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.boards.remove(&id).is_some())
    }
}

#[async_trait]
impl ListStore for MemoryStore {
    async fn create_list(&self, list: &BoardList) -> Result<BoardList, AppError> {
        self.lists.insert(list.id, list.clone());
        Ok(list.clone())
    }

    async fn find_list(&self, id: Uuid) -> Result<Option<BoardList>, AppError> {
        Ok(self.lists.get(&id).map(|entry| entry.clone()))
    }

    async fn lists_for_board(&self, board_id: Uuid) -> Result<Vec<BoardList>, AppError> {
        let mut lists: Vec<BoardList> = self
            .lists
            .iter()
            .filter(|entry| entry.board_id == board_id)
            .map(|entry| entry.clone())
            .collect();
        lists.sort_by_key(|list| (list.order, list.created_ts));
        Ok(lists)
    }

    async fn update_list(&self, list: &BoardList) -> Result<Option<BoardList>, AppError> {
        Ok(replace(&self.lists, list.id, list))
    }

    async fn delete_list(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.lists.remove(&id).is_some())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn create_task(&self, task: &Task) -> Result<Task, AppError> {
        self.tasks.insert(task.id, task.clone());
        Ok(task.clone())
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        Ok(self.tasks.get(&id).map(|entry| entry.clone()))
    }

    async fn tasks_for_list(&self, list_id: Uuid) -> Result<Vec<Task>, AppError> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|entry| entry.list_id == list_id)
            .map(|entry| entry.clone())
            .collect();
        tasks.sort_by_key(|task| (task.order, task.created_ts));
        Ok(tasks)
    }

    async fn update_task(&self, task: &Task) -> Result<Option<Task>, AppError> {
        Ok(replace(&self.tasks, task.id, task))
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError> {
        Ok(self.tasks.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BoardInput, ListInput, TaskInput};

    fn user(username: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: username.to_string(),
            username: username.to_string(),
            password_hash: "hash".to_string(),
            email: format!("{}@example.com", username),
            is_admin: false,
            created_ts: Utc::now(),
            last_login_ts: None,
        }
    }

    #[actix_rt::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::default();
        store.create_user(&user("alice")).await.unwrap();
        match store.create_user(&user("alice")).await {
            Err(AppError::Conflict(_)) => {}
            other => panic!("expected conflict, got {:?}", other),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_signups_claim_username_once() {
        let store = std::sync::Arc::new(MemoryStore::default());
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.create_user(&user("alice")).await.is_ok() })
            })
            .collect();

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.list_users().await.unwrap().len(), 1);
    }

    #[actix_rt::test]
    async fn test_deleted_username_can_be_reused() {
        let store = MemoryStore::default();
        let alice = store.create_user(&user("alice")).await.unwrap();
        assert!(store.delete_user(alice.id).await.unwrap());
        assert!(store.find_user_by_username("alice").await.unwrap().is_none());

        let again = store.create_user(&user("alice")).await.unwrap();
        let found = store.find_user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, again.id);
    }

    #[actix_rt::test]
    async fn test_lists_sorted_by_order() {
        let store = MemoryStore::default();
        let board = Board::new(BoardInput { name: "b".into() }, Uuid::new_v4());
        store.create_board(&board).await.unwrap();
        for order in [3, 1, 2] {
            let list = BoardList::new(
                ListInput {
                    name: format!("list {}", order),
                    order,
                },
                board.id,
            );
            store.create_list(&list).await.unwrap();
        }
        let orders: Vec<i32> = store
            .lists_for_board(board.id)
            .await
            .unwrap()
            .iter()
            .map(|list| list.order)
            .collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[actix_rt::test]
    async fn test_update_and_delete_missing_records() {
        let store = MemoryStore::default();
        let task = Task::new(
            TaskInput {
                name: "t".into(),
                content: String::new(),
                order: 0,
            },
            Uuid::new_v4(),
        );
        assert!(store.update_task(&task).await.unwrap().is_none());
        assert!(!store.delete_task(task.id).await.unwrap());

        store.create_task(&task).await.unwrap();
        assert!(store.delete_task(task.id).await.unwrap());
        assert!(store.find_task(task.id).await.unwrap().is_none());
    }
}
