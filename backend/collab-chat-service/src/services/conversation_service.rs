use crate::error::{AppError, AppResult};
use crate::metrics;
use crate::models::{can_pair, conversation_id_for, Conversation, Message, ParticipantDetails};
use crate::repository::ConversationStore;
use crate::services::clock::Clock;
use crate::services::content_filter::TextRedactor;
use crate::services::directory::{DirectoryUser, UserDirectory};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_LIMIT: u32 = 50;
pub const DEFAULT_PAGE_LIMIT_MAX: u32 = 100;
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 5000;

/// Request-independent bounds applied by the service
#[derive(Debug, Clone, Copy)]
pub struct ServiceLimits {
    /// Maximum message length in characters, counted after trimming
    pub max_message_length: usize,
    pub page_limit_max: u32,
}

impl Default for ServiceLimits {
    fn default() -> Self {
        Self {
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            page_limit_max: DEFAULT_PAGE_LIMIT_MAX,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResult {
    pub conversation_id: String,
    pub conversation: Conversation,
    /// False when an existing conversation was returned
    pub created: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    pub message: Message,
    pub is_filtered: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePage {
    /// Chronological, oldest first
    pub messages: Vec<Message>,
    pub conversation: Conversation,
    pub page: u32,
    pub limit: u32,
    pub has_more: bool,
}

/// Brand/creator conversations and their messages.
///
/// All collaborators are injected, so the same service runs against Postgres in
/// production and in-memory fakes in tests.
pub struct ConversationService {
    store: Arc<dyn ConversationStore>,
    directory: Arc<dyn UserDirectory>,
    redactor: Arc<dyn TextRedactor>,
    clock: Arc<dyn Clock>,
    limits: ServiceLimits,
}

impl ConversationService {
    pub fn new(
        store: Arc<dyn ConversationStore>,
        directory: Arc<dyn UserDirectory>,
        redactor: Arc<dyn TextRedactor>,
        clock: Arc<dyn Clock>,
        limits: ServiceLimits,
    ) -> Self {
        Self {
            store,
            directory,
            redactor,
            clock,
            limits,
        }
    }

    /// Get the conversation between `current_user` and `participant`, creating it
    /// when the pair is allowed to talk and none exists yet.
    pub async fn create_or_get_conversation(
        &self,
        current_user: Uuid,
        participant: Uuid,
    ) -> AppResult<ConversationResult> {
        if current_user == participant {
            return Err(AppError::SelfConversation);
        }

        let initiator = self.resolve_user(current_user).await?;
        let counterpart = self.resolve_user(participant).await?;

        let conversation_id = conversation_id_for(current_user, participant);

        // Existing pairs are returned as-is, even if a role changed since creation
        if let Some(existing) = self.store.get_conversation(&conversation_id).await? {
            return Ok(ConversationResult {
                conversation_id,
                conversation: existing,
                created: false,
            });
        }

        if !can_pair(initiator.role, counterpart.role) {
            tracing::info!(
                initiator = %current_user,
                participant = %participant,
                initiator_role = %initiator.role,
                participant_role = %counterpart.role,
                "Rejected conversation between incompatible roles"
            );
            return Err(AppError::InvalidPairing {
                initiator: initiator.role,
                participant: counterpart.role,
            });
        }

        let candidate = Conversation::new(
            (initiator.id, details_of(&initiator)),
            (counterpart.id, details_of(&counterpart)),
            self.clock.now(),
        );

        let (conversation, created) = self.store.insert_conversation_if_absent(&candidate).await?;

        if created {
            tracing::info!(
                conversation_id = %conversation.id,
                initiator = %current_user,
                participant = %participant,
                "Conversation created"
            );
        } else {
            tracing::debug!(
                conversation_id = %conversation.id,
                "Concurrent create converged on existing conversation"
            );
        }

        Ok(ConversationResult {
            conversation_id: conversation.id.clone(),
            conversation,
            created,
        })
    }

    /// Conversations the user takes part in, most recently active first
    pub async fn list_conversations(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        self.store.list_conversations_for(user_id).await
    }

    pub async fn get_conversation(
        &self,
        conversation_id: &str,
        requester: Uuid,
    ) -> AppResult<Conversation> {
        self.participant_conversation(conversation_id, requester)
            .await
    }

    /// Redact and store a message, then refresh the conversation's last-message
    /// summary in the same atomic unit.
    pub async fn send_message(
        &self,
        conversation_id: &str,
        sender: Uuid,
        raw_text: &str,
    ) -> AppResult<SentMessage> {
        let text = raw_text.trim();
        if text.is_empty() {
            return Err(AppError::BadRequest("message must not be empty".into()));
        }
        let length = text.chars().count();
        if length > self.limits.max_message_length {
            return Err(AppError::BadRequest(format!(
                "message exceeds {} characters",
                self.limits.max_message_length
            )));
        }

        let conversation = self
            .participant_conversation(conversation_id, sender)
            .await?;

        let redaction = self.redactor.redact(text);
        if redaction.is_filtered {
            let categories: Vec<&str> = redaction.categories.iter().map(|c| c.as_str()).collect();
            tracing::info!(
                conversation_id = %conversation_id,
                sender_id = %sender,
                categories = ?categories,
                "Contact information redacted from message"
            );
        }

        let sender_name = match conversation.participant_details.get(&sender) {
            Some(details) => details.name.clone(),
            None => self.resolve_user(sender).await?.display_name,
        };

        let message = Message {
            id: Uuid::now_v7(),
            conversation_id: conversation.id.clone(),
            sender_id: sender,
            sender_name,
            message: redaction.text,
            timestamp: self.clock.now(),
            is_filtered: redaction.is_filtered,
        };

        let updated = self.store.append_message(&message).await?;
        metrics::record_message_sent(&redaction.categories);

        tracing::debug!(
            conversation_id = %updated.id,
            message_id = %message.id,
            updated_at = %updated.updated_at,
            "Message stored"
        );

        Ok(SentMessage {
            is_filtered: message.is_filtered,
            message,
        })
    }

    /// One page of history. Page 1 is the most recent window; messages within a
    /// page are returned oldest first.
    pub async fn list_messages(
        &self,
        conversation_id: &str,
        requester: Uuid,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> AppResult<MessagePage> {
        let page = page.unwrap_or(DEFAULT_PAGE);
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);

        if page < 1 {
            return Err(AppError::BadRequest("page must be at least 1".into()));
        }
        if limit < 1 || limit > self.limits.page_limit_max {
            return Err(AppError::BadRequest(format!(
                "limit must be between 1 and {}",
                self.limits.page_limit_max
            )));
        }

        let conversation = self
            .participant_conversation(conversation_id, requester)
            .await?;

        let offset = i64::from(page - 1) * i64::from(limit);
        // One extra row tells us whether an older page exists
        let mut messages = self
            .store
            .list_messages_desc(&conversation.id, i64::from(limit) + 1, offset)
            .await?;

        let has_more = messages.len() > limit as usize;
        messages.truncate(limit as usize);
        messages.reverse();

        Ok(MessagePage {
            messages,
            conversation,
            page,
            limit,
            has_more,
        })
    }

    async fn participant_conversation(
        &self,
        conversation_id: &str,
        user_id: Uuid,
    ) -> AppResult<Conversation> {
        let conversation = self
            .store
            .get_conversation(conversation_id)
            .await?
            .ok_or_else(|| AppError::conversation_not_found(conversation_id))?;

        if !conversation.is_participant(user_id) {
            tracing::warn!(
                conversation_id = %conversation_id,
                user_id = %user_id,
                "Non-participant attempted to access conversation"
            );
            return Err(AppError::not_a_participant());
        }

        Ok(conversation)
    }

    async fn resolve_user(&self, user_id: Uuid) -> AppResult<DirectoryUser> {
        self.directory
            .find_user(user_id)
            .await?
            .ok_or(AppError::UserNotFound(user_id))
    }
}

fn details_of(user: &DirectoryUser) -> ParticipantDetails {
    ParticipantDetails {
        name: user.display_name.clone(),
        role: user.role,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use crate::repository::InMemoryConversationStore;
    use crate::services::clock::ManualClock;
    use crate::services::content_filter::ContactInfoRedactor;
    use crate::services::directory::InMemoryUserDirectory;
    use chrono::{Duration, TimeZone, Utc};

    struct Fixture {
        service: ConversationService,
        directory: Arc<InMemoryUserDirectory>,
        clock: Arc<ManualClock>,
    }

    fn fixture(limits: ServiceLimits) -> Fixture {
        let directory = Arc::new(InMemoryUserDirectory::new());
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
        ));
        let service = ConversationService::new(
            Arc::new(InMemoryConversationStore::new()),
            directory.clone(),
            Arc::new(ContactInfoRedactor::new()),
            clock.clone(),
            limits,
        );
        Fixture {
            service,
            directory,
            clock,
        }
    }

    #[tokio::test]
    async fn test_unknown_participant_is_not_found() {
        let f = fixture(ServiceLimits::default());
        let brand = f.directory.add("Acme", UserRole::Brand);

        let err = f
            .service
            .create_or_get_conversation(brand, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_message_length_counted_after_trim() {
        let f = fixture(ServiceLimits {
            max_message_length: 5,
            page_limit_max: 100,
        });
        let brand = f.directory.add("Acme", UserRole::Brand);
        let creator = f.directory.add("Jo", UserRole::UgcCreator);
        let conv = f
            .service
            .create_or_get_conversation(brand, creator)
            .await
            .unwrap();

        let sent = f
            .service
            .send_message(&conv.conversation_id, brand, "   hello   ")
            .await
            .unwrap();
        assert_eq!(sent.message.message, "hello");

        let err = f
            .service
            .send_message(&conv.conversation_id, brand, "hello!")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_sender_name_comes_from_snapshot() {
        let f = fixture(ServiceLimits::default());
        let brand = f.directory.add("Acme", UserRole::Brand);
        let creator = f.directory.add("Jo", UserRole::Influencer);
        let conv = f
            .service
            .create_or_get_conversation(brand, creator)
            .await
            .unwrap();

        f.directory.insert(DirectoryUser {
            id: creator,
            display_name: "Jo Renamed".into(),
            role: UserRole::Influencer,
        });
        f.clock.advance(Duration::seconds(1));

        let sent = f
            .service
            .send_message(&conv.conversation_id, creator, "hi there")
            .await
            .unwrap();
        assert_eq!(sent.message.sender_name, "Jo");
    }

    #[tokio::test]
    async fn test_list_messages_rejects_out_of_range_paging() {
        let f = fixture(ServiceLimits::default());
        let brand = f.directory.add("Acme", UserRole::Brand);
        let creator = f.directory.add("Jo", UserRole::Influencer);
        let conv = f
            .service
            .create_or_get_conversation(brand, creator)
            .await
            .unwrap();

        for (page, limit) in [(Some(0), None), (None, Some(0)), (None, Some(101))] {
            let err = f
                .service
                .list_messages(&conv.conversation_id, brand, page, limit)
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::BadRequest(_)));
        }
    }

    #[tokio::test]
    async fn test_has_more_reports_older_pages() {
        let f = fixture(ServiceLimits::default());
        let brand = f.directory.add("Acme", UserRole::Brand);
        let creator = f.directory.add("Jo", UserRole::Influencer);
        let conv = f
            .service
            .create_or_get_conversation(brand, creator)
            .await
            .unwrap();

        for i in 0..5 {
            f.clock.advance(Duration::seconds(1));
            f.service
                .send_message(&conv.conversation_id, brand, &format!("message {i}"))
                .await
                .unwrap();
        }

        let first = f
            .service
            .list_messages(&conv.conversation_id, brand, Some(1), Some(2))
            .await
            .unwrap();
        assert!(first.has_more);
        let texts: Vec<&str> = first.messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["message 3", "message 4"]);

        let last = f
            .service
            .list_messages(&conv.conversation_id, brand, Some(3), Some(2))
            .await
            .unwrap();
        assert!(!last.has_more);
        assert_eq!(last.messages.len(), 1);
        assert_eq!(last.messages[0].message, "message 0");
    }
}
