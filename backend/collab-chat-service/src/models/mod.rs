pub mod conversation;
pub mod message;
pub mod role;

pub use conversation::{conversation_id_for, Conversation, ParticipantDetails};
pub use message::Message;
pub use role::{can_pair, UserRole};
