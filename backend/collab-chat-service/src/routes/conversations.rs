use crate::{
    error::AppError, middleware::guards::User, models::Conversation, state::AppState,
};
use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationRequest {
    pub participant_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateConversationResponse {
    pub conversation_id: String,
    pub conversation: Conversation,
}

#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<Conversation>,
}

#[derive(Debug, Serialize)]
pub struct ConversationResponse {
    pub conversation: Conversation,
}

/// POST /conversations
/// 201 when the conversation was created, 200 when it already existed
#[post("/conversations")]
pub async fn create_conversation(
    state: web::Data<AppState>,
    user: User,
    body: web::Json<CreateConversationRequest>,
) -> Result<HttpResponse, AppError> {
    let result = state
        .service
        .create_or_get_conversation(user.id, body.participant_id)
        .await?;

    let response = CreateConversationResponse {
        conversation_id: result.conversation_id,
        conversation: result.conversation,
    };
    if result.created {
        Ok(HttpResponse::Created().json(response))
    } else {
        Ok(HttpResponse::Ok().json(response))
    }
}

#[get("/conversations")]
pub async fn list_conversations(
    state: web::Data<AppState>,
    user: User,
) -> Result<HttpResponse, AppError> {
    let conversations = state.service.list_conversations(user.id).await?;
    Ok(HttpResponse::Ok().json(ConversationListResponse { conversations }))
}

#[get("/conversations/{id}")]
pub async fn get_conversation(
    state: web::Data<AppState>,
    user: User,
    conversation_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let conversation = state
        .service
        .get_conversation(&conversation_id, user.id)
        .await?;
    Ok(HttpResponse::Ok().json(ConversationResponse { conversation }))
}
