use crate::error::{AppError, AppResult};
use crate::models::{Conversation, Message, ParticipantDetails};
use crate::repository::ConversationStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use std::collections::BTreeMap;
use uuid::Uuid;

const CONVERSATION_COLUMNS: &str = r#"
    id, participant_a, participant_b, participant_details,
    last_message, last_message_time, last_message_sender,
    created_at, updated_at
"#;

#[derive(FromRow)]
struct ConversationRow {
    id: String,
    participant_a: Uuid,
    participant_b: Uuid,
    participant_details: Json<BTreeMap<Uuid, ParticipantDetails>>,
    last_message: Option<String>,
    last_message_time: Option<DateTime<Utc>>,
    last_message_sender: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ConversationRow> for Conversation {
    fn from(row: ConversationRow) -> Self {
        Conversation {
            id: row.id,
            participants: [row.participant_a, row.participant_b],
            participant_details: row.participant_details.0,
            last_message: row.last_message,
            last_message_time: row.last_message_time,
            last_message_sender: row.last_message_sender,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct MessageRow {
    id: Uuid,
    conversation_id: String,
    sender_id: Uuid,
    sender_name: String,
    message: String,
    sent_at: DateTime<Utc>,
    is_filtered: bool,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            conversation_id: row.conversation_id,
            sender_id: row.sender_id,
            sender_name: row.sender_name,
            message: row.message,
            timestamp: row.sent_at,
            is_filtered: row.is_filtered,
        }
    }
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgConversationStore {
    pool: PgPool,
}

impl PgConversationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationStore for PgConversationStore {
    async fn get_conversation(&self, conversation_id: &str) -> AppResult<Option<Conversation>> {
        let row = sqlx::query_as::<_, ConversationRow>(&format!(
            "SELECT {CONVERSATION_COLUMNS} FROM conversations WHERE id = $1"
        ))
        .bind(conversation_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Conversation::from))
    }

    async fn insert_conversation_if_absent(
        &self,
        conversation: &Conversation,
    ) -> AppResult<(Conversation, bool)> {
        let [participant_a, participant_b] = conversation.participants;

        let result = sqlx::query(
            r#"
            INSERT INTO conversations (
                id, participant_a, participant_b, participant_details,
                last_message, last_message_time, last_message_sender,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, NULL, NULL, NULL, $5, $6)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(&conversation.id)
        .bind(participant_a)
        .bind(participant_b)
        .bind(Json(&conversation.participant_details))
        .bind(conversation.created_at)
        .bind(conversation.updated_at)
        .execute(&self.pool)
        .await?;

        let created = result.rows_affected() == 1;

        // Losing a concurrent insert race lands here too: read back the winner.
        let stored = self
            .get_conversation(&conversation.id)
            .await?
            .ok_or_else(|| AppError::conversation_not_found(&conversation.id))?;

        Ok((stored, created))
    }

    async fn list_conversations_for(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        let rows = sqlx::query_as::<_, ConversationRow>(&format!(
            r#"
            SELECT {CONVERSATION_COLUMNS}
            FROM conversations
            WHERE participant_a = $1 OR participant_b = $1
            ORDER BY updated_at DESC, id ASC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Conversation::from).collect())
    }

    async fn append_message(&self, message: &Message) -> AppResult<Conversation> {
        let mut tx = self.pool.begin().await?;

        // Updating the conversation first takes its row lock, so concurrent sends to one
        // conversation commit one after another and the cache keeps the last committer.
        let updated = sqlx::query_as::<_, ConversationRow>(&format!(
            r#"
            UPDATE conversations
            SET last_message = $2,
                last_message_time = $3,
                last_message_sender = $4,
                updated_at = $3
            WHERE id = $1
            RETURNING {CONVERSATION_COLUMNS}
            "#
        ))
        .bind(&message.conversation_id)
        .bind(&message.message)
        .bind(message.timestamp)
        .bind(message.sender_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(updated) = updated else {
            tx.rollback().await?;
            return Err(AppError::conversation_not_found(&message.conversation_id));
        };

        sqlx::query(
            r#"
            INSERT INTO messages (
                id, conversation_id, sender_id, sender_name, message, sent_at, is_filtered
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(message.id)
        .bind(&message.conversation_id)
        .bind(message.sender_id)
        .bind(&message.sender_name)
        .bind(&message.message)
        .bind(message.timestamp)
        .bind(message.is_filtered)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated.into())
    }

    async fn list_messages_desc(
        &self,
        conversation_id: &str,
        limit: i64,
        offset: i64,
    ) -> AppResult<Vec<Message>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, conversation_id, sender_id, sender_name, message, sent_at, is_filtered
            FROM messages
            WHERE conversation_id = $1
            ORDER BY sent_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(conversation_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Message::from).collect())
    }
}
