use crate::{
    auth::{
        authorization::{parse_id, resolve_board, resolve_list},
        CurrentUser,
    },
    cascade,
    error::AppError,
    models::{BoardList, ListInput},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

/// Lists of a board, sorted by `order` then creation time.
#[get("/boards/{board_id}/lists")]
pub async fn get_lists(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let board_id = parse_id(&path, "board")?;
    let board = resolve_board(&state.store, &user.0, board_id).await?;
    let lists = state.store.lists.lists_for_board(board.id).await?;
    Ok(HttpResponse::Ok().json(lists))
}

/// Adds a list to a board. Names longer than 100 characters are cut.
#[post("/boards/{board_id}/lists")]
pub async fn create_list(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    list_data: web::Json<ListInput>,
) -> Result<impl Responder, AppError> {
    let board_id = parse_id(&path, "board")?;
    let board = resolve_board(&state.store, &user.0, board_id).await?;

    let list = BoardList::new(list_data.into_inner(), board.id);
    let created = state.store.lists.create_list(&list).await?;
    Ok(HttpResponse::Ok().json(created))
}

#[get("/boards/{board_id}/lists/{id}")]
pub async fn get_list(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(String, String)>,
) -> Result<impl Responder, AppError> {
    let (board_id, list_id) = path.into_inner();
    let board_id = parse_id(&board_id, "board")?;
    let list_id = parse_id(&list_id, "list")?;

    let (_, list) = resolve_list(&state.store, &user.0, board_id, list_id).await?;
    Ok(HttpResponse::Ok().json(list))
}

#[put("/boards/{board_id}/lists/{id}")]
pub async fn update_list(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(String, String)>,
    list_data: web::Json<ListInput>,
) -> Result<impl Responder, AppError> {
    let (board_id, list_id) = path.into_inner();
    let board_id = parse_id(&board_id, "board")?;
    let list_id = parse_id(&list_id, "list")?;

    let (_, mut list) = resolve_list(&state.store, &user.0, board_id, list_id).await?;
    list.apply(list_data.into_inner());
    let updated = state
        .store
        .lists
        .update_list(&list)
        .await?
        .ok_or_else(|| AppError::NotFound("list not found".into()))?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a list and, best-effort, its tasks.
#[delete("/boards/{board_id}/lists/{id}")]
pub async fn delete_list(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<(String, String)>,
) -> Result<impl Responder, AppError> {
    let (board_id, list_id) = path.into_inner();
    let board_id = parse_id(&board_id, "board")?;
    let list_id = parse_id(&list_id, "list")?;

    let (_, list) = resolve_list(&state.store, &user.0, board_id, list_id).await?;
    let report = cascade::delete_list(&state.store, list.id).await?;
    log::info!(
        "List {} deleted by {} with {} tasks",
        list.id,
        user.0.username,
        report.tasks_deleted
    );
    Ok(HttpResponse::NoContent().finish())
}
