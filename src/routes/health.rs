use actix_web::{get, HttpResponse, Responder};

/// Liveness probe. Needs no session and touches no storage.
#[get("/api/healthcheck")]
pub async fn healthcheck() -> impl Responder {
    HttpResponse::Ok().body("OK")
}
