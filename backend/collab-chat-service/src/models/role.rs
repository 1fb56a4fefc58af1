//! Marketplace roles and the conversation pairing rule
//!
//! Conversations are only allowed between a brand and a creator (influencer or UGC
//! creator). Everything else, including staff roles, is rejected.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Brand,
    Influencer,
    UgcCreator,
    Admin,
    Support,
    ContentCreator,
}

impl UserRole {
    /// Parse role from database string.
    /// Directory rows have been written by more than one client, so case and
    /// hyphen/underscore spelling are normalized.
    pub fn from_db(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        match normalized.as_str() {
            "brand" => Some(Self::Brand),
            "influencer" => Some(Self::Influencer),
            "ugc_creator" | "ugccreator" => Some(Self::UgcCreator),
            "admin" => Some(Self::Admin),
            "support" => Some(Self::Support),
            "content_creator" | "contentcreator" => Some(Self::ContentCreator),
            _ => None,
        }
    }

    pub fn to_db(&self) -> &'static str {
        match self {
            Self::Brand => "brand",
            Self::Influencer => "influencer",
            Self::UgcCreator => "ugc_creator",
            Self::Admin => "admin",
            Self::Support => "support",
            Self::ContentCreator => "content_creator",
        }
    }

    pub fn is_brand(&self) -> bool {
        matches!(self, Self::Brand)
    }

    /// Creator side of the pairing rule
    pub fn is_creator(&self) -> bool {
        matches!(self, Self::Influencer | Self::UgcCreator)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db())
    }
}

/// One brand and one creator, in either order.
pub fn can_pair(a: UserRole, b: UserRole) -> bool {
    (a.is_brand() && b.is_creator()) || (b.is_brand() && a.is_creator())
}
