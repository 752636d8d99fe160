//! Best-effort cascading deletes.
//!
//! The parent row is removed first. Children are then enumerated and deleted
//! one at a time; a failed child is logged and recorded, never rolled back,
//! and never stops its siblings. The caller's response depends only on the
//! parent delete.

use uuid::Uuid;

use crate::error::AppError;
use crate::store::Store;

/// What a cascade managed to remove beneath the parent.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CascadeReport {
    pub lists_deleted: usize,
    pub tasks_deleted: usize,
    pub failures: Vec<String>,
}

impl CascadeReport {
    fn fail(&mut self, what: String) {
        log::warn!("Cascade delete: {}", what);
        self.failures.push(what);
    }
}

/// Deletes a board, then its lists, then each list's tasks.
pub async fn delete_board(store: &Store, board_id: Uuid) -> Result<CascadeReport, AppError> {
    if !store.boards.delete_board(board_id).await? {
        return Err(AppError::NotFound("board not found".into()));
    }

    let mut report = CascadeReport::default();
    let lists = match store.lists.lists_for_board(board_id).await {
        Ok(lists) => lists,
        Err(e) => {
            report.fail(format!("could not enumerate lists of board {}: {}", board_id, e));
            return Ok(report);
        }
    };

    for list in lists {
        match store.lists.delete_list(list.id).await {
            Ok(true) => {
                report.lists_deleted += 1;
                delete_tasks_of(store, list.id, &mut report).await;
            }
            Ok(false) => {}
            Err(e) => report.fail(format!("list {}: {}", list.id, e)),
        }
    }

    log::info!(
        "Deleted board {} with {} lists and {} tasks ({} failures)",
        board_id,
        report.lists_deleted,
        report.tasks_deleted,
        report.failures.len()
    );
    Ok(report)
}

/// Deletes a list, then its tasks.
pub async fn delete_list(store: &Store, list_id: Uuid) -> Result<CascadeReport, AppError> {
    if !store.lists.delete_list(list_id).await? {
        return Err(AppError::NotFound("list not found".into()));
    }

    let mut report = CascadeReport {
        lists_deleted: 1,
        ..CascadeReport::default()
    };
    delete_tasks_of(store, list_id, &mut report).await;
    Ok(report)
}

async fn delete_tasks_of(store: &Store, list_id: Uuid, report: &mut CascadeReport) {
    let tasks = match store.tasks.tasks_for_list(list_id).await {
        Ok(tasks) => tasks,
        Err(e) => {
            report.fail(format!("could not enumerate tasks of list {}: {}", list_id, e));
            return;
        }
    };
    for task in tasks {
        match store.tasks.delete_task(task.id).await {
            Ok(true) => report.tasks_deleted += 1,
            Ok(false) => {}
            Err(e) => report.fail(format!("task {}: {}", task.id, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::models::{Board, BoardInput, BoardList, ListInput, Task, TaskInput};
    use crate::store::{MemoryStore, TaskStore};

    /// Delegates to the memory store but refuses to delete one task.
    struct FailingTasks {
        inner: Arc<MemoryStore>,
        fail_on: Uuid,
    }

    #[async_trait]
    impl TaskStore for FailingTasks {
        async fn create_task(&self, task: &Task) -> Result<Task, AppError> {
            self.inner.create_task(task).await
        }

        async fn find_task(&self, id: Uuid) -> Result<Option<Task>, AppError> {
            self.inner.find_task(id).await
        }

        async fn tasks_for_list(&self, list_id: Uuid) -> Result<Vec<Task>, AppError> {
            self.inner.tasks_for_list(list_id).await
        }

        async fn update_task(&self, task: &Task) -> Result<Option<Task>, AppError> {
            self.inner.update_task(task).await
        }

        async fn delete_task(&self, id: Uuid) -> Result<bool, AppError> {
            if id == self.fail_on {
                return Err(AppError::DatabaseError("injected failure".into()));
            }
            self.inner.delete_task(id).await
        }
    }

    async fn seed(store: &Store, lists: usize, tasks_per_list: usize) -> (Board, Vec<Task>) {
        let board = Board::new(BoardInput { name: "Work".into() }, Uuid::new_v4());
        store.boards.create_board(&board).await.unwrap();
        let mut tasks = Vec::new();
        for l in 0..lists {
            let list = BoardList::new(
                ListInput {
                    name: format!("list {}", l),
                    order: l as i32,
                },
                board.id,
            );
            store.lists.create_list(&list).await.unwrap();
            for t in 0..tasks_per_list {
                let task = Task::new(
                    TaskInput {
                        name: format!("task {}", t),
                        content: String::new(),
                        order: t as i32,
                    },
                    list.id,
                );
                tasks.push(store.tasks.create_task(&task).await.unwrap());
            }
        }
        (board, tasks)
    }

    #[actix_rt::test]
    async fn test_board_cascade_removes_everything() {
        let store = Store::memory();
        let (board, tasks) = seed(&store, 2, 3).await;

        let report = delete_board(&store, board.id).await.unwrap();
        assert_eq!(report.lists_deleted, 2);
        assert_eq!(report.tasks_deleted, 6);
        assert!(report.failures.is_empty());

        assert!(store.boards.find_board(board.id).await.unwrap().is_none());
        assert!(store.lists.lists_for_board(board.id).await.unwrap().is_empty());
        for task in tasks {
            assert!(store.tasks.find_task(task.id).await.unwrap().is_none());
        }
    }

    #[actix_rt::test]
    async fn test_board_cascade_continues_past_failed_task() {
        let backend = Arc::new(MemoryStore::default());
        let plain = Store::from_shared(backend.clone());
        let (board, tasks) = seed(&plain, 2, 3).await;
        let doomed = tasks[1].id;

        let store = plain.with_tasks(Arc::new(FailingTasks {
            inner: backend,
            fail_on: doomed,
        }));
        let report = delete_board(&store, board.id).await.unwrap();

        assert_eq!(report.lists_deleted, 2);
        assert_eq!(report.tasks_deleted, 5);
        assert_eq!(report.failures.len(), 1);
        assert!(store.boards.find_board(board.id).await.unwrap().is_none());
        assert!(store.lists.lists_for_board(board.id).await.unwrap().is_empty());
        for task in tasks.iter().filter(|task| task.id != doomed) {
            assert!(store.tasks.find_task(task.id).await.unwrap().is_none());
        }
    }

    #[actix_rt::test]
    async fn test_list_cascade() {
        let store = Store::memory();
        let (board, tasks) = seed(&store, 2, 2).await;
        let list_id = tasks[0].list_id;

        let report = delete_list(&store, list_id).await.unwrap();
        assert_eq!(report.lists_deleted, 1);
        assert_eq!(report.tasks_deleted, 2);

        let remaining = store.lists.lists_for_board(board.id).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert!(store.tasks.tasks_for_list(list_id).await.unwrap().is_empty());
    }

    #[actix_rt::test]
    async fn test_missing_parent_is_not_found() {
        let store = Store::memory();
        assert!(matches!(
            delete_board(&store, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            delete_list(&store, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
