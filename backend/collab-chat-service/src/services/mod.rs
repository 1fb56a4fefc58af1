pub mod clock;
pub mod content_filter;
pub mod conversation_service;
pub mod directory;
