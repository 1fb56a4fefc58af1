use crate::state::AppState;
use actix_web::{get, web, HttpResponse};
use serde_json::json;

#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": state.config.service_name,
    }))
}

/// Ready once the database answers. The in-memory backend is always ready.
#[get("/ready")]
pub async fn ready(state: web::Data<AppState>) -> HttpResponse {
    let Some(pool) = &state.db else {
        return HttpResponse::Ok().json(json!({ "status": "ready" }));
    };

    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => HttpResponse::Ok().json(json!({ "status": "ready" })),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
        }
    }
}
