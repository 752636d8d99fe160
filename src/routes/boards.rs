use crate::{
    auth::{
        authorization::{parse_id, resolve_board},
        CurrentUser,
    },
    cascade,
    error::AppError,
    models::{Board, BoardInput},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Lists the boards owned by the caller.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Board` objects, oldest first.
/// - `401 Unauthorized`: no valid session.
#[get("/boards")]
pub async fn get_boards(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let boards = state.store.boards.boards_for_owner(user.0.id).await?;
    Ok(HttpResponse::Ok().json(boards))
}

/// Fetches one board.
///
/// ## Responses:
/// - `200 OK`: the `Board`.
/// - `403 Forbidden`: the caller neither owns the board nor is an admin.
/// - `404 Not Found`: no board with that id.
#[get("/boards/{id}")]
pub async fn get_board(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let board_id = parse_id(&path, "board")?;
    let board = resolve_board(&state.store, &user.0, board_id).await?;
    Ok(HttpResponse::Ok().json(board))
}

/// Creates a board owned by the caller. The name is trimmed and must be
/// 1-100 characters.
#[post("/boards")]
pub async fn create_board(
    state: web::Data<AppState>,
    user: CurrentUser,
    board_data: web::Json<BoardInput>,
) -> Result<impl Responder, AppError> {
    let input = board_data.into_inner().normalized();
    input.validate()?;

    let board = Board::new(input, user.0.id);
    let created = state.store.boards.create_board(&board).await?;
    Ok(HttpResponse::Ok().json(created))
}

#[put("/boards/{id}")]
pub async fn update_board(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
    board_data: web::Json<BoardInput>,
) -> Result<impl Responder, AppError> {
    let board_id = parse_id(&path, "board")?;
    let input = board_data.into_inner().normalized();
    input.validate()?;

    let mut board = resolve_board(&state.store, &user.0, board_id).await?;
    board.apply(input);
    let updated = state
        .store
        .boards
        .update_board(&board)
        .await?
        .ok_or_else(|| AppError::NotFound("board not found".into()))?;
    Ok(HttpResponse::Ok().json(updated))
}

/// Deletes a board and, best-effort, everything under it.
///
/// ## Responses:
/// - `204 No Content`: the board is gone; child cleanup failures are only logged.
#[delete("/boards/{id}")]
pub async fn delete_board(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let board_id = parse_id(&path, "board")?;
    let board = resolve_board(&state.store, &user.0, board_id).await?;
    cascade::delete_board(&state.store, board.id).await?;
    log::info!("Board {} deleted by {}", board.id, user.0.username);
    Ok(HttpResponse::NoContent().finish())
}
