//! Domain documents stored for each identity and conversation
//!
//! This module defines the typed views of the profile and dialog
//! documents, the wire field names they are stored under, and the
//! conversions to and from raw store fields. Decoding is tolerant:
//! missing or mistyped fields fall back to defaults, because a profile
//! document may not have been provisioned yet (see `ProfileStore`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{FieldValue, Fields};

/// Wire field names, matching the original document shape
pub mod field {
    pub const DISPLAY_NAME: &str = "displayName";
    pub const IS_ONLINE: &str = "isOnline";
    pub const LAST_SESSION: &str = "lastSession";
    pub const PHOTO_URL: &str = "photoUrl";
    pub const ACTIVE_CHATS_WITH: &str = "activeChatsWith";
    pub const PARTICIPANTS: &str = "participants";
    pub const TYPE: &str = "type";
    pub const DATE: &str = "date";
    pub const TEXT: &str = "text";
    pub const LINK_ON_FILE: &str = "linkOnFile";
}

/// Application-level user record, one document per identity
///
/// Keyed by identity uid. A profile document exists for every identity
/// that has ever signed up; it is written exactly once at sign-up and
/// mutated field-by-field afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// User-facing display name, empty until chosen
    pub display_name: String,
    /// Whether the user is currently online
    pub is_online: bool,
    /// Server-assigned timestamp of the last session touch
    pub last_session: Option<DateTime<Utc>>,
    /// Avatar URL, empty until uploaded
    pub photo_url: String,
    /// Participant ids the user has an open conversation with, in order
    pub active_chats_with: Vec<String>,
}

impl Profile {
    /// Fields written for a brand-new account
    ///
    /// `lastSession` carries the server-timestamp sentinel; the store
    /// resolves it at commit.
    pub fn signup_fields() -> Fields {
        let mut fields = Fields::new();
        fields.insert(
            field::DISPLAY_NAME.to_string(),
            FieldValue::String(String::new()),
        );
        fields.insert(field::IS_ONLINE.to_string(), FieldValue::Bool(true));
        fields.insert(
            field::LAST_SESSION.to_string(),
            FieldValue::ServerTimestamp,
        );
        fields.insert(
            field::PHOTO_URL.to_string(),
            FieldValue::String(String::new()),
        );
        fields.insert(
            field::ACTIVE_CHATS_WITH.to_string(),
            FieldValue::StringList(Vec::new()),
        );
        fields
    }

    /// Decode a profile from raw document fields
    ///
    /// Tolerant of missing or mistyped fields; each falls back to its
    /// default. A `None` input (absent document) yields the empty profile.
    pub fn from_fields(fields: &Fields) -> Self {
        Self {
            display_name: fields
                .get(field::DISPLAY_NAME)
                .and_then(FieldValue::as_str)
                .unwrap_or_default()
                .to_string(),
            is_online: fields
                .get(field::IS_ONLINE)
                .and_then(FieldValue::as_bool)
                .unwrap_or(false),
            last_session: fields
                .get(field::LAST_SESSION)
                .and_then(FieldValue::as_timestamp),
            photo_url: fields
                .get(field::PHOTO_URL)
                .and_then(FieldValue::as_str)
                .unwrap_or_default()
                .to_string(),
            active_chats_with: fields
                .get(field::ACTIVE_CHATS_WITH)
                .and_then(FieldValue::as_string_list)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
        }
    }
}

/// A two-participant conversation record
///
/// Exactly two participants, immutable after creation. Never updated or
/// deleted by this layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    /// The two participant ids (unordered pair)
    pub participants: [String; 2],
}

impl Dialog {
    /// Create a dialog record between two participants
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            participants: [a.into(), b.into()],
        }
    }

    /// Fields written for this dialog document
    pub fn to_fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert(
            field::PARTICIPANTS.to_string(),
            FieldValue::StringList(self.participants.to_vec()),
        );
        fields
    }
}
