//! Ownership chain: Task -> List -> Board -> owning User.
//!
//! Every lookup in the chain is resolved before ownership is checked, so a
//! missing or mismatched parent is always `NotFound` and `Forbidden` is only
//! produced once the whole chain exists.

use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Board, BoardList, Task, User};
use crate::store::Store;

/// Parses a path id. Anything that is not a UUID is reported as a missing
/// `what`, the same as a well-formed id that matches nothing.
pub fn parse_id(raw: &str, what: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| not_found(what))
}

fn not_found(what: &str) -> AppError {
    AppError::NotFound(format!("{} not found", what))
}

/// Admins may touch any board; everyone else only their own.
pub fn authorize_board(user: &User, board: &Board) -> Result<(), AppError> {
    if user.is_admin || board.owner_id == user.id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "not allowed to access this board".into(),
        ))
    }
}

/// Admins may act on any user; everyone else only on themselves.
pub fn authorize_user(caller: &User, target_id: Uuid) -> Result<(), AppError> {
    if caller.is_admin || caller.id == target_id {
        Ok(())
    } else {
        Err(AppError::Forbidden("not allowed to access this user".into()))
    }
}

pub fn require_admin(caller: &User) -> Result<(), AppError> {
    if caller.is_admin {
        Ok(())
    } else {
        Err(AppError::Forbidden("admin privileges required".into()))
    }
}

async fn load_board(store: &Store, board_id: Uuid) -> Result<Board, AppError> {
    store
        .boards
        .find_board(board_id)
        .await?
        .ok_or_else(|| not_found("board"))
}

async fn load_list(store: &Store, board_id: Uuid, list_id: Uuid) -> Result<BoardList, AppError> {
    match store.lists.find_list(list_id).await? {
        Some(list) if list.board_id == board_id => Ok(list),
        _ => Err(not_found("list")),
    }
}

pub async fn resolve_board(store: &Store, user: &User, board_id: Uuid) -> Result<Board, AppError> {
    let board = load_board(store, board_id).await?;
    authorize_board(user, &board)?;
    Ok(board)
}

pub async fn resolve_list(
    store: &Store,
    user: &User,
    board_id: Uuid,
    list_id: Uuid,
) -> Result<(Board, BoardList), AppError> {
    let list = load_list(store, board_id, list_id).await?;
    let board = load_board(store, list.board_id).await?;
    authorize_board(user, &board)?;
    Ok((board, list))
}

pub async fn resolve_task(
    store: &Store,
    user: &User,
    board_id: Uuid,
    list_id: Uuid,
    task_id: Uuid,
) -> Result<(BoardList, Task), AppError> {
    let task = match store.tasks.find_task(task_id).await? {
        Some(task) if task.list_id == list_id => task,
        _ => return Err(not_found("task")),
    };
    let list = load_list(store, board_id, task.list_id).await?;
    let board = load_board(store, list.board_id).await?;
    authorize_board(user, &board)?;
    Ok((list, task))
}
