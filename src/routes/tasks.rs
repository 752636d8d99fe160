use crate::{
    auth::{
        authorization::{parse_id, resolve_list, resolve_task},
        CurrentUser,
    },
    error::AppError,
    models::{Task, TaskInput},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;

fn parse_list_path(board_id: &str, list_id: &str) -> Result<(Uuid, Uuid), AppError> {
    Ok((parse_id(board_id, "board")?, parse_id(list_id, "list")?))
}

fn parse_task_path(path: (String, String, String)) -> Result<(Uuid, Uuid, Uuid), AppError> {
    let (board_id, list_id, task_id) = path;
    let (board_id, list_id) = parse_list_path(&board_id, &list_id)?;
    Ok((board_id, list_id, parse_id(&task_id, "task")?))
}

/// Retrieves the tasks of a list.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects sorted by `order`, then creation time.
/// - `401 Unauthorized`: no valid session.
/// - `403 Forbidden`: the board belongs to someone else.
/// - `404 Not Found`: the board or list does not exist, or the list is not on that board.
#[get("/boards/{board_id}/lists/{list_id}/tasks")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(String, String)>,
) -> Result<impl Responder, AppError> {
    let (board_id, list_id) = path.into_inner();
    let (board_id, list_id) = parse_list_path(&board_id, &list_id)?;

    let (_, list) = resolve_list(&state.store, &user.0, board_id, list_id).await?;
    let tasks = state.store.tasks.tasks_for_list(list.id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task in a list. Names longer than 100 characters are cut.
#[post("/boards/{board_id}/lists/{list_id}/tasks")]
pub async fn create_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(String, String)>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let (board_id, list_id) = path.into_inner();
    let (board_id, list_id) = parse_list_path(&board_id, &list_id)?;

    let (_, list) = resolve_list(&state.store, &user.0, board_id, list_id).await?;
    let task = Task::new(task_data.into_inner(), list.id);
    let created = state.store.tasks.create_task(&task).await?;
    Ok(HttpResponse::Ok().json(created))
}

#[get("/boards/{board_id}/lists/{list_id}/tasks/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(String, String, String)>,
) -> Result<impl Responder, AppError> {
    let (board_id, list_id, task_id) = parse_task_path(path.into_inner())?;
    let (_, task) = resolve_task(&state.store, &user.0, board_id, list_id, task_id).await?;
    Ok(HttpResponse::Ok().json(task))
}

#[put("/boards/{board_id}/lists/{list_id}/tasks/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(String, String, String)>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let (board_id, list_id, task_id) = parse_task_path(path.into_inner())?;
    let (_, mut task) = resolve_task(&state.store, &user.0, board_id, list_id, task_id).await?;

    task.apply(task_data.into_inner());
    let updated = state
        .store
        .tasks
        .update_task(&task)
        .await?
        .ok_or_else(|| AppError::NotFound("task not found".into()))?;
    Ok(HttpResponse::Ok().json(updated))
}

#[delete("/boards/{board_id}/lists/{list_id}/tasks/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(String, String, String)>,
) -> Result<impl Responder, AppError> {
    let (board_id, list_id, task_id) = parse_task_path(path.into_inner())?;
    let (_, task) = resolve_task(&state.store, &user.0, board_id, list_id, task_id).await?;

    if !state.store.tasks.delete_task(task.id).await? {
        return Err(AppError::NotFound("task not found".into()));
    }
    Ok(HttpResponse::NoContent().finish())
}
