use crate::models::role::UserRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Separator between the two sorted participant ids in a conversation id
pub const CONVERSATION_ID_SEPARATOR: char = '_';

/// Canonical id for the unordered pair `{a, b}`.
///
/// The two ids are sorted by their string form and joined, so `(a, b)` and `(b, a)`
/// map to the same key. The primary key on this id is the only uniqueness guard.
pub fn conversation_id_for(a: Uuid, b: Uuid) -> String {
    let (a, b) = (a.to_string(), b.to_string());
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    format!("{first}{CONVERSATION_ID_SEPARATOR}{second}")
}

/// Snapshot of a participant taken when the conversation was created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantDetails {
    pub name: String,
    pub role: UserRole,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    /// Always two ids, sorted
    pub participants: [Uuid; 2],
    pub participant_details: BTreeMap<Uuid, ParticipantDetails>,
    pub last_message: Option<String>,
    pub last_message_time: Option<DateTime<Utc>>,
    pub last_message_sender: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Fresh conversation with an empty last-message cache
    pub fn new(
        a: (Uuid, ParticipantDetails),
        b: (Uuid, ParticipantDetails),
        now: DateTime<Utc>,
    ) -> Self {
        let mut participants = [a.0, b.0];
        participants.sort_by_key(|id| id.to_string());

        let mut participant_details = BTreeMap::new();
        participant_details.insert(a.0, a.1);
        participant_details.insert(b.0, b.1);

        Self {
            id: conversation_id_for(a.0, b.0),
            participants,
            participant_details,
            last_message: None,
            last_message_time: None,
            last_message_sender: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_participant(&self, user_id: Uuid) -> bool {
        self.participants.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(name: &str, role: UserRole) -> ParticipantDetails {
        ParticipantDetails {
            name: name.to_string(),
            role,
        }
    }

    #[test]
    fn test_conversation_id_is_order_independent() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(conversation_id_for(a, b), conversation_id_for(b, a));
    }

    #[test]
    fn test_conversation_id_sorts_lexicographically() {
        let low = Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap();
        let high = Uuid::parse_str("ffffffff-0000-0000-0000-000000000000").unwrap();
        assert_eq!(
            conversation_id_for(high, low),
            "00000000-0000-0000-0000-000000000001_ffffffff-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_new_conversation_has_empty_cache() {
        let brand = Uuid::new_v4();
        let creator = Uuid::new_v4();
        let now = Utc::now();
        let conv = Conversation::new(
            (brand, details("Acme", UserRole::Brand)),
            (creator, details("Jo", UserRole::Influencer)),
            now,
        );

        assert_eq!(conv.id, conversation_id_for(brand, creator));
        assert!(conv.last_message.is_none());
        assert!(conv.last_message_time.is_none());
        assert!(conv.last_message_sender.is_none());
        assert_eq!(conv.created_at, now);
        assert_eq!(conv.updated_at, now);
        assert_eq!(conv.participant_details.len(), 2);
    }

    #[test]
    fn test_serializes_camel_case() {
        let conv = Conversation::new(
            (Uuid::new_v4(), details("Acme", UserRole::Brand)),
            (Uuid::new_v4(), details("Jo", UserRole::UgcCreator)),
            Utc::now(),
        );
        let json = serde_json::to_value(&conv).unwrap();
        assert!(json.get("participantDetails").is_some());
        assert!(json["lastMessage"].is_null());
    }
}
