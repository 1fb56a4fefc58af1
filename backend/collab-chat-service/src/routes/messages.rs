use crate::{error::AppError, middleware::guards::User, state::AppState};
use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ListMessagesQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// POST /conversations/{id}/messages
///
/// Contact details are masked before storage; `isFiltered` in the response tells
/// the client whether the stored text differs from what was sent.
#[post("/conversations/{id}/messages")]
pub async fn send_message(
    state: web::Data<AppState>,
    user: User,
    conversation_id: web::Path<String>,
    body: web::Json<SendMessageRequest>,
) -> Result<HttpResponse, AppError> {
    let sent = state
        .service
        .send_message(&conversation_id, user.id, &body.message)
        .await?;
    Ok(HttpResponse::Created().json(sent))
}

#[get("/conversations/{id}/messages")]
pub async fn list_messages(
    state: web::Data<AppState>,
    user: User,
    conversation_id: web::Path<String>,
    query: web::Query<ListMessagesQuery>,
) -> Result<HttpResponse, AppError> {
    let page = state
        .service
        .list_messages(&conversation_id, user.id, query.page, query.limit)
        .await?;
    Ok(HttpResponse::Ok().json(page))
}
