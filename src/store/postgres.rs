use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};
use uuid::Uuid;

use super::{BoardStore, ListStore, TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{Board, BoardList, Task, User};

const SCHEMA: &str = include_str!("../../migrations/0001_create_tables.sql");

const USER_COLUMNS: &str =
    "id, name, username, password_hash, email, is_admin, created_ts, last_login_ts";
const BOARD_COLUMNS: &str = "id, name, owner_id, created_ts, modified_ts";
const LIST_COLUMNS: &str = "id, name, sort_order, board_id, created_ts, modified_ts";
const TASK_COLUMNS: &str = "id, name, content, sort_order, list_id, created_ts, modified_ts";

/// Postgres-backed store. Every call is bounded by `timeout`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgStore {
    pub async fn connect(database_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(timeout)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool, timeout))
    }

    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Creates the tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), AppError> {
        self.bounded(self.pool.execute(SCHEMA)).await?;
        Ok(())
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(AppError::from),
            Err(_) => Err(AppError::DatabaseError(format!(
                "storage call exceeded {:?} deadline",
                self.timeout
            ))),
        }
    }

    async fn delete_by_id(&self, table: &str, id: Uuid) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", table);
        let result = self
            .bounded(sqlx::query(&sql).bind(id).execute(&self.pool))
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: &User) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO users ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {cols}",
            cols = USER_COLUMNS
        );
        let query = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(&user.email)
            .bind(user.is_admin)
            .bind(user.created_ts)
            .bind(user.last_login_ts);
        match self.bounded(query.fetch_one(&self.pool)).await {
            Err(AppError::Conflict(_)) => Err(AppError::Conflict(
                "user by that username already exists".into(),
            )),
            other => other,
        }
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        self.bounded(sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool))
            .await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        self.bounded(
            sqlx::query_as::<_, User>(&sql)
                .bind(username)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT {} FROM users ORDER BY created_ts", USER_COLUMNS);
        self.bounded(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool))
            .await
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, AppError> {
        let sql = format!(
            "UPDATE users SET name = $2, password_hash = $3, email = $4, is_admin = $5 \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        );
        let query = sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(&user.email)
            .bind(user.is_admin);
        self.bounded(query.fetch_optional(&self.pool)).await
    }

    async fn record_login(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), AppError> {
        let query = sqlx::query("UPDATE users SET last_login_ts = $2 WHERE id = $1")
            .bind(id)
            .bind(at);
        self.bounded(query.execute(&self.pool)).await?;
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        self.delete_by_id("users", id).await
    }
}

#[async_trait]
impl BoardStore for PgStore {
    async fn create_board(&self, board: &Board) -> Result<Board, AppError> {
        let sql = format!(
            "INSERT INTO boards ({cols}) VALUES ($1, $2, $3, $4, $5) RETURNING {cols}",
            cols = BOARD_COLUMNS
        );
        let query = sqlx::query_as::<_, Board>(&sql)
            .bind(board.id)
            .bind(&board.name)
            .bind(board.owner_id)
            .bind(board.created_ts)
            .bind(board.modified_ts);
        self.bounded(query.fetch_one(&self.pool)).await
    }

    async fn find_board(&self, id: Uuid) -> Result<Option<Board>, AppError> {
        let sql = format!("SELECT {} FROM boards WHERE id = $1", BOARD_COLUMNS);
        self.bounded(sqlx::query_as::<_, Board>(&sql).bind(id).fetch_optional(&self.pool))
            .await
    }

    async fn boards_for_owner(&self, owner_id: Uuid) -> Result<Vec<Board>, AppError> {
        let sql = format!(
            "SELECT {} FROM boards WHERE owner_id = $1 ORDER BY created_ts",
            BOARD_COLUMNS
        );
        self.bounded(
            sqlx::query_as::<_, Board>(&sql)
                .bind(owner_id)
                .fetch_all(&self.pool),
        )
        .await
    }

    async fn update_board(&self, board: &Board) -> Result<Option<Board>, AppError> {
        let sql = format!(
            "UPDATE boards SET name = $2, modified_ts = $3 WHERE id = $1 RETURNING {}",
            BOARD_COLUMNS
        );
        let query = sqlx::query_as::<_, Board>(&sql)
            .bind(board.id)
            .bind(&board.name)
            .bind(board.modified_ts);
        self.bounded(query.fetch_optional(&self.pool)).await
    }

    async fn delete_board(&self, id: Uuid) -> Result<bool, AppError> {
        self.delete_by_id("boards", id).await
    }
}

#[async_trait]
impl ListStore for PgStore {
    async fn create_list(&self, list: &BoardList) -> Result<BoardList, AppError> {
        let sql = format!(
            "INSERT INTO lists ({cols}) VALUES ($1, $2, $3, $4, $5, $6) RETURNING {cols}",
            cols = LIST_COLUMNS
        );
        let query = sqlx::query_as::<_, BoardList>(&sql)
            .bind(list.id)
            .bind(&list.name)
            .bind(list.order)
            .bind(list.board_id)
            .bind(list.created_ts)
            .bind(list.modified_ts);
        self.bounded(query.fetch_one(&self.pool)).await
    }

    async fn find_list(&self, id: Uuid) -> Result<Option<BoardList>, AppError> {
        let sql = format!("SELECT {} FROM lists WHERE id = $1", LIST_COLUMNS);
        self.bounded(
            sqlx::query_as::<_, BoardList>(&sql)
                .bind(id)
                .fetch_optional(&self.pool),
        )
        .await
    }

    async fn lists_for_board(&self, board_id: Uuid) -> Result<Vec<BoardList>, AppError> {
        let sql = format!(
            "SELECT {} FROM lists WHERE board_id = $1 ORDER BY sort_order, created_ts",
            LIST_COLUMNS
        );
        self.bounded(
            sqlx::query_as::<_, BoardList>(&sql)
                .bind(board_id)
                .fetch_all(&self.pool),
        )
        .await
    }

    async fn update_list(&self, list: &BoardList) -> Result<Option<BoardList>, AppError> {
        let sql = format!(
            "UPDATE lists SET name = $2, sort_order = $3, modified_ts = $4 \
             WHERE id = $1 RETURNING {}",
            LIST_COLUMNS
        );
        let query = sqlx::query_as::<_, BoardList>(&sql)
            .bind(list.id)
            .bind(&list.name)
            .bind(list.order)
            .bind(list.modified_ts);
        self.bounded(query.fetch_optional(&self.pool)).await
    }

    async fn delete_list(&self, id: Uuid) -> Result<bool, AppError> {
        self.delete_by_id("lists", id).await
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn create_task(&self, task: &Task) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks ({cols}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {cols}",
            cols = TASK_COLUMNS
        );
        let query = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.name)
            .bind(&task.content)
            .bind(task.order)
            .bind(task.list_id)
            .bind(task.created_ts)
            .bind(task.modified_ts);
        self.bounded(query.fetch_one(&self.pool)).await
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        self.bounded(sqlx::query_as::<_, Task>(&sql).bind(id).fetch_optional(&self.pool))
            .await
    }

    async fn tasks_for_list(&self, list_id: Uuid) -> Result<Vec<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE list_id = $1 ORDER BY sort_order, created_ts",
            TASK_COLUMNS
        );
        self.bounded(
            sqlx::query_as::<_, Task>(&sql)
                .bind(list_id)
                .fetch_all(&self.pool),
        )
        .await
    }

    async fn update_task(&self, task: &Task) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "UPDATE tasks SET name = $2, content = $3, sort_order = $4, modified_ts = $5 \
             WHERE id = $1 RETURNING {}",
            TASK_COLUMNS
        );
        let query = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.name)
            .bind(&task.content)
            .bind(task.order)
            .bind(task.modified_ts);
        self.bounded(query.fetch_optional(&self.pool)).await
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, AppError> {
        self.delete_by_id("tasks", id).await
    }
}
