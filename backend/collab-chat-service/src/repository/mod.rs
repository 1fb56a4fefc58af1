//! Persistence for conversations and their message logs
//!
//! No business rules live here: pairing and membership checks belong to
//! `ConversationService`.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryConversationStore;
pub use postgres::PgConversationStore;

use crate::error::AppResult;
use crate::models::{Conversation, Message};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn get_conversation(&self, conversation_id: &str) -> AppResult<Option<Conversation>>;

    /// Insert unless a conversation with the same id already exists.
    /// Returns the stored record and whether this call created it.
    async fn insert_conversation_if_absent(
        &self,
        conversation: &Conversation,
    ) -> AppResult<(Conversation, bool)>;

    /// Conversations the user participates in, most recently updated first
    async fn list_conversations_for(&self, user_id: Uuid) -> AppResult<Vec<Conversation>>;

    /// Append `message` and point the conversation's last-message cache at it, as one
    /// atomic unit. Returns the updated conversation, or `NotFound` if it does not exist.
    async fn append_message(&self, message: &Message) -> AppResult<Conversation>;

    /// Messages newest first, ordered by `(timestamp, id)`
    async fn list_messages_desc(
        &self,
        conversation_id: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Message>>;
}
