pub mod auth;
pub mod boards;
pub mod health;
pub mod lists;
pub mod tasks;
pub mod users;

use actix_web::web;

use crate::auth::{AuthMiddleware, RefreshMiddleware};
use crate::error::AppError;

/// Registers every route.
///
/// Order of the session layers is fixed here: `AuthMiddleware` (registered
/// last, so it runs first) attaches the verified claims, `RefreshMiddleware`
/// reads them, then the handler runs. Logout sits outside both so a request
/// that expires the session can never rotate it.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(format!("bad request: {}", err)).into()),
    )
    .service(health::healthcheck)
    .service(auth::logout)
    .service(
        web::scope("")
            .wrap(RefreshMiddleware)
            .wrap(AuthMiddleware)
            .service(auth::login)
            .service(boards::get_boards)
            .service(boards::create_board)
            .service(boards::get_board)
            .service(boards::update_board)
            .service(boards::delete_board)
            .service(lists::get_lists)
            .service(lists::create_list)
            .service(lists::get_list)
            .service(lists::update_list)
            .service(lists::delete_list)
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task)
            .service(users::get_users)
            .service(users::create_user)
            .service(users::get_user)
            .service(users::update_user)
            .service(users::delete_user),
    );
}
