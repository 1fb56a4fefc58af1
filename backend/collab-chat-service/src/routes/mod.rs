pub mod conversations;
pub mod health;
pub mod messages;

use actix_middleware::{JwtAuthMiddleware, JwtValidator};
use actix_web::{error::JsonPayloadError, web, HttpRequest};
use std::sync::Arc;

use crate::error::AppError;
use crate::metrics;

/// Mounts the health probes, `/metrics` and the authenticated `/api/v1` API
pub fn configure(cfg: &mut web::ServiceConfig, validator: Arc<JwtValidator>) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(|err, _req| {
            AppError::BadRequest(err.to_string()).into()
        }))
        .service(health::health)
        .service(health::ready)
        .service(metrics::metrics_handler)
        .service(
            web::scope("/api/v1")
                .wrap(JwtAuthMiddleware::new(validator))
                .service(conversations::create_conversation)
                .service(conversations::list_conversations)
                .service(conversations::get_conversation)
                .service(messages::send_message)
                .service(messages::list_messages),
        );
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(format!("invalid request body: {err}")).into()
}
