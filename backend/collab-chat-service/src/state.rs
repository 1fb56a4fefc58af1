use crate::{config::Config, services::conversation_service::ConversationService};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ConversationService>,
    pub config: Arc<Config>,
    /// Set when running on Postgres; used by the readiness probe
    pub db: Option<PgPool>,
}
