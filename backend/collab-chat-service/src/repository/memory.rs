use crate::error::{AppError, AppResult};
use crate::models::{Conversation, Message};
use crate::repository::ConversationStore;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    conversations: HashMap<String, Conversation>,
    /// Each log is kept ascending by `(timestamp, id)`
    messages: HashMap<String, Vec<Message>>,
}

/// Process-local store. A single lock covers the message log and the conversation
/// cache, which gives `append_message` the same all-or-nothing behaviour as the
/// Postgres transaction.
#[derive(Default)]
pub struct InMemoryConversationStore {
    state: RwLock<MemoryState>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total stored messages for a conversation
    pub async fn message_count(&self, conversation_id: &str) -> usize {
        self.state
            .read()
            .await
            .messages
            .get(conversation_id)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn get_conversation(&self, conversation_id: &str) -> AppResult<Option<Conversation>> {
        Ok(self
            .state
            .read()
            .await
            .conversations
            .get(conversation_id)
            .cloned())
    }

    async fn insert_conversation_if_absent(
        &self,
        conversation: &Conversation,
    ) -> AppResult<(Conversation, bool)> {
        let mut state = self.state.write().await;
        if let Some(existing) = state.conversations.get(&conversation.id) {
            return Ok((existing.clone(), false));
        }
        state
            .conversations
            .insert(conversation.id.clone(), conversation.clone());
        Ok((conversation.clone(), true))
    }

    async fn list_conversations_for(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        let state = self.state.read().await;
        let mut conversations: Vec<Conversation> = state
            .conversations
            .values()
            .filter(|c| c.is_participant(user_id))
            .cloned()
            .collect();
        conversations.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(conversations)
    }

    async fn append_message(&self, message: &Message) -> AppResult<Conversation> {
        let mut state = self.state.write().await;

        let conversation = state
            .conversations
            .get_mut(&message.conversation_id)
            .ok_or_else(|| AppError::conversation_not_found(&message.conversation_id))?;

        conversation.last_message = Some(message.message.clone());
        conversation.last_message_time = Some(message.timestamp);
        conversation.last_message_sender = Some(message.sender_id);
        conversation.updated_at = message.timestamp;
        let updated = conversation.clone();

        let log = state
            .messages
            .entry(message.conversation_id.clone())
            .or_default();
        // Usually the end of the log
        let at = log.partition_point(|m| (m.timestamp, m.id) <= (message.timestamp, message.id));
        log.insert(at, message.clone());

        Ok(updated)
    }

    async fn list_messages_desc(
        &self,
        conversation_id: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Message>> {
        let state = self.state.read().await;
        let Some(log) = state.messages.get(conversation_id) else {
            return Ok(Vec::new());
        };

        Ok(log
            .iter()
            .rev()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}
