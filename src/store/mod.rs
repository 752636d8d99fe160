//! Storage seam.
//!
//! Each entity kind has its own async trait with create / find / list-by-parent
//! / update / delete operations. `Store` bundles one implementation of each so
//! handlers, the authorization chain and the cascade only see trait objects.
//! The storage layer is the sole arbiter of write ordering: concurrent updates
//! to the same record are last-write-wins.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Board, BoardList, Task, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `Conflict` when the username is already taken.
    async fn create_user(&self, user: &User) -> Result<User, AppError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn list_users(&self) -> Result<Vec<User>, AppError>;
    /// Replaces the stored record; `None` when it no longer exists.
    async fn update_user(&self, user: &User) -> Result<Option<User>, AppError>;
    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError>;
    /// Returns whether a record was removed.
    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn create_board(&self, board: &Board) -> Result<Board, AppError>;
    async fn find_board(&self, id: Uuid) -> Result<Option<Board>, AppError>;
    async fn boards_for_owner(&self, owner_id: Uuid) -> Result<Vec<Board>, AppError>;
    async fn update_board(&self, board: &Board) -> Result<Option<Board>, AppError>;
    async fn delete_board(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ListStore: Send + Sync {
    async fn create_list(&self, list: &BoardList) -> Result<BoardList, AppError>;
    async fn find_list(&self, id: Uuid) -> Result<Option<BoardList>, AppError>;
    /// Sorted by `order`, then creation time.
    async fn lists_for_board(&self, board_id: Uuid) -> Result<Vec<BoardList>, AppError>;
    async fn update_list(&self, list: &BoardList) -> Result<Option<BoardList>, AppError>;
    async fn delete_list(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create_task(&self, task: &Task) -> Result<Task, AppError>;
    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError>;
    /// Sorted by `order`, then creation time.
    async fn tasks_for_list(&self, list_id: Uuid) -> Result<Vec<Task>, AppError>;
    async fn update_task(&self, task: &Task) -> Result<Option<Task>, AppError>;
    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError>;
}

/// One handle per entity kind. Cloning is cheap.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn UserStore>,
    pub boards: Arc<dyn BoardStore>,
    pub lists: Arc<dyn ListStore>,
    pub tasks: Arc<dyn TaskStore>,
}

impl Store {
    /// Uses the same backend for every entity kind.
    pub fn from_backend<B>(backend: B) -> Self
    where
        B: UserStore + BoardStore + ListStore + TaskStore + 'static,
    {
        Self::from_shared(Arc::new(backend))
    }

    pub fn from_shared<B>(backend: Arc<B>) -> Self
    where
        B: UserStore + BoardStore + ListStore + TaskStore + 'static,
    {
        Self {
            users: backend.clone(),
            boards: backend.clone(),
            lists: backend.clone(),
            tasks: backend,
        }
    }

    pub fn memory() -> Self {
        Self::from_backend(MemoryStore::default())
    }

    /// Replaces the task backend, keeping the others.
    pub fn with_tasks(mut self, tasks: Arc<dyn TaskStore>) -> Self {
        self.tasks = tasks;
        self
    }
}
