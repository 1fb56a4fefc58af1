//! Contact-information redaction for chat messages
//!
//! Brands and creators are expected to keep negotiations on the platform, so anything that
//! looks like a way to reach someone elsewhere is masked before a message is stored.
//! Detectors run in a fixed order over the output of the previous detector.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Replacement for every detected span
pub const MASK: &str = "*****";

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("Invalid email regex")
});

// Broad on purpose: separators, country codes and parentheses are all tolerated.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}")
        .expect("Invalid phone regex")
});

static MESSAGING_APP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)whatsapp|wa\.me|t\.me|telegram").expect("Invalid messaging app regex")
});

// Also catches ordinary @-mentions.
static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@[A-Za-z0-9._]+").expect("Invalid handle regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionCategory {
    Email,
    Phone,
    MessagingApp,
    Handle,
}

impl RedactionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::MessagingApp => "messaging_app",
            Self::Handle => "handle",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            Self::Email => &EMAIL_RE,
            Self::Phone => &PHONE_RE,
            Self::MessagingApp => &MESSAGING_APP_RE,
            Self::Handle => &HANDLE_RE,
        }
    }
}

/// Application order of the detectors
const DETECTION_ORDER: [RedactionCategory; 4] = [
    RedactionCategory::Email,
    RedactionCategory::Phone,
    RedactionCategory::MessagingApp,
    RedactionCategory::Handle,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redaction {
    pub text: String,
    /// True iff `text` differs from the input
    pub is_filtered: bool,
    /// Detectors that replaced at least one span
    pub categories: Vec<RedactionCategory>,
}

/// Pluggable redaction strategy used by the conversation service
pub trait TextRedactor: Send + Sync {
    fn redact(&self, text: &str) -> Redaction;
}

/// Default redactor: emails, phone numbers, messaging-app names and @handles
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactInfoRedactor;

impl ContactInfoRedactor {
    pub fn new() -> Self {
        Self
    }
}

impl TextRedactor for ContactInfoRedactor {
    fn redact(&self, text: &str) -> Redaction {
        let mut current = text.to_string();
        let mut categories = Vec::new();

        for category in DETECTION_ORDER {
            let pattern = category.pattern();
            if pattern.is_match(&current) {
                current = pattern.replace_all(&current, MASK).into_owned();
                categories.push(category);
            }
        }

        Redaction {
            is_filtered: current != text,
            text: current,
            categories,
        }
    }
}
