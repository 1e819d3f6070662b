//! Typed message envelopes and submission
//!
//! This module implements [`MessageComposer`], which structures outbound
//! messages into a uniform envelope and inserts them into a dialog's
//! message sub-collection. Payloads are tagged variants keyed by message
//! kind rather than an open-ended field bag, and a submission that fails
//! validation yields an explicit [`SendOutcome::Skipped`] instead of a
//! silent no-op.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::Result;
use crate::model::field;
use crate::store::{CollectionPath, DocumentStore, FieldValue, Fields};

/// The three message kinds carried on the wire in the `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Plain text message
    Text,
    /// Image with an uploaded file link and optional caption
    Image,
    /// Document with an uploaded file link and optional caption
    Document,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Image => write!(f, "image"),
            Self::Document => write!(f, "document"),
        }
    }
}

/// Message payload, one variant per kind
///
/// The kind determines which fields are present: text messages carry only
/// `text`; image and document messages carry `link_on_file` (a URL already
/// resolved by the external blob store) plus an optional caption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessagePayload {
    /// Plain text
    Text {
        /// The message text
        text: String,
    },
    /// Image link with optional caption
    Image {
        /// Caption, empty if omitted
        text: String,
        /// URL of the already-uploaded image
        link_on_file: String,
    },
    /// Document link with optional caption
    Document {
        /// Caption, empty if omitted
        text: String,
        /// URL of the already-uploaded document
        link_on_file: String,
    },
}

impl MessagePayload {
    /// The kind this payload is tagged with
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Text { .. } => MessageKind::Text,
            Self::Image { .. } => MessageKind::Image,
            Self::Document { .. } => MessageKind::Document,
        }
    }

    /// Reason this payload cannot be sent, if any
    fn skip_reason(&self) -> Option<&'static str> {
        match self {
            Self::Text { text } if text.is_empty() => Some("empty message text"),
            Self::Image { link_on_file, .. } | Self::Document { link_on_file, .. }
                if link_on_file.is_empty() =>
            {
                Some("missing linkOnFile")
            }
            _ => None,
        }
    }
}

/// Outcome of a message submission
///
/// `Skipped` replaces the original's silent absent return value: callers
/// always learn whether anything was inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The message document was inserted
    Sent {
        /// Id of the inserted message document
        message_id: String,
    },
    /// Validation failed; nothing was inserted
    Skipped {
        /// What was missing
        reason: String,
    },
}

impl SendOutcome {
    /// Whether a message document was inserted
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent { .. })
    }
}

/// Builds and submits typed message envelopes
///
/// Messages are addressed purely by dialog id; the envelope carries no
/// sender field, so submission needs no signed-in identity.
pub struct MessageComposer {
    store: Arc<dyn DocumentStore>,
    dialogs: CollectionPath,
    messages: String,
}

impl MessageComposer {
    /// Create a message composer over the document store
    pub fn new(store: Arc<dyn DocumentStore>, config: &Config) -> Self {
        Self {
            store,
            dialogs: CollectionPath::new(config.collections.dialogs.clone()),
            messages: config.collections.messages.clone(),
        }
    }

    /// Submit a message envelope into a dialog's message sub-collection
    ///
    /// The envelope is the payload fields plus `type` and a
    /// server-assigned `date`; the send time is never taken from the
    /// caller's clock. A missing dialog id or an invalid payload yields
    /// [`SendOutcome::Skipped`] without touching the store.
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::StoreWrite` if the insertion fails
    pub async fn send_message(
        &self,
        dialog_id: &str,
        payload: MessagePayload,
    ) -> Result<SendOutcome> {
        if dialog_id.is_empty() {
            tracing::warn!("skipping message: missing dialog id");
            return Ok(SendOutcome::Skipped {
                reason: "missing dialog id".to_string(),
            });
        }
        if let Some(reason) = payload.skip_reason() {
            tracing::warn!("skipping {} message: {}", payload.kind(), reason);
            return Ok(SendOutcome::Skipped {
                reason: reason.to_string(),
            });
        }

        let collection = self.dialogs.doc(dialog_id).subcollection(&self.messages);
        let message_id = self.store.add(&collection, envelope(&payload)).await?;
        Ok(SendOutcome::Sent { message_id })
    }

    /// Send a plain text message
    ///
    /// Empty text is skipped, matching the original guard.
    pub async fn send_text(&self, dialog_id: &str, text: &str) -> Result<SendOutcome> {
        self.send_message(
            dialog_id,
            MessagePayload::Text {
                text: text.to_string(),
            },
        )
        .await
    }

    /// Send an image message with an optional caption
    ///
    /// The file must already be uploaded; `link_on_file` is its resolved
    /// URL. An empty link is skipped.
    pub async fn send_image(
        &self,
        dialog_id: &str,
        text: Option<&str>,
        link_on_file: &str,
    ) -> Result<SendOutcome> {
        self.send_message(
            dialog_id,
            MessagePayload::Image {
                text: text.unwrap_or_default().to_string(),
                link_on_file: link_on_file.to_string(),
            },
        )
        .await
    }

    /// Send a document message with an optional caption
    ///
    /// Same contract as [`Self::send_image`].
    pub async fn send_document(
        &self,
        dialog_id: &str,
        text: Option<&str>,
        link_on_file: &str,
    ) -> Result<SendOutcome> {
        self.send_message(
            dialog_id,
            MessagePayload::Document {
                text: text.unwrap_or_default().to_string(),
                link_on_file: link_on_file.to_string(),
            },
        )
        .await
    }
}

/// Envelope fields for a validated payload
fn envelope(payload: &MessagePayload) -> Fields {
    let mut fields = Fields::new();
    fields.insert(
        field::TYPE.to_string(),
        FieldValue::String(payload.kind().to_string()),
    );
    fields.insert(field::DATE.to_string(), FieldValue::ServerTimestamp);
    match payload {
        MessagePayload::Text { text } => {
            fields.insert(field::TEXT.to_string(), FieldValue::String(text.clone()));
        }
        MessagePayload::Image { text, link_on_file }
        | MessagePayload::Document { text, link_on_file } => {
            fields.insert(field::TEXT.to_string(), FieldValue::String(text.clone()));
            fields.insert(
                field::LINK_ON_FILE.to_string(),
                FieldValue::String(link_on_file.clone()),
            );
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    struct Fixture {
        composer: MessageComposer,
        store: Arc<MemoryStore>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let composer = MessageComposer::new(store.clone(), &Config::default());
        Fixture { composer, store }
    }

    fn messages_of(store: &MemoryStore, dialog_id: &str) -> Vec<(String, Fields)> {
        store.documents(
            &CollectionPath::new("dialogs")
                .doc(dialog_id)
                .subcollection("messages"),
        )
    }

    #[tokio::test]
    async fn test_send_text_inserts_one_envelope() {
        let fixture = fixture();
        let outcome = fixture.composer.send_text("d1", "hello").await.unwrap();
        assert!(outcome.is_sent());

        let messages = messages_of(&fixture.store, "d1");
        assert_eq!(messages.len(), 1);
        let (_, fields) = &messages[0];
        assert_eq!(fields[field::TYPE].as_str(), Some("text"));
        assert_eq!(fields[field::TEXT].as_str(), Some("hello"));
        assert!(fields[field::DATE].as_timestamp().is_some());
        assert!(!fields.contains_key(field::LINK_ON_FILE));
    }

    #[tokio::test]
    async fn test_send_image_defaults_caption_to_empty() {
        let fixture = fixture();
        let outcome = fixture
            .composer
            .send_image("d1", None, "http://x/y.png")
            .await
            .unwrap();
        assert!(outcome.is_sent());

        let messages = messages_of(&fixture.store, "d1");
        assert_eq!(messages.len(), 1);
        let (_, fields) = &messages[0];
        assert_eq!(fields[field::TYPE].as_str(), Some("image"));
        assert_eq!(fields[field::TEXT].as_str(), Some(""));
        assert_eq!(fields[field::LINK_ON_FILE].as_str(), Some("http://x/y.png"));
    }

    #[tokio::test]
    async fn test_send_document_keeps_caption() {
        let fixture = fixture();
        let outcome = fixture
            .composer
            .send_document("d1", Some("spec v2"), "http://x/spec.pdf")
            .await
            .unwrap();
        assert!(outcome.is_sent());

        let (_, fields) = &messages_of(&fixture.store, "d1")[0];
        assert_eq!(fields[field::TYPE].as_str(), Some("document"));
        assert_eq!(fields[field::TEXT].as_str(), Some("spec v2"));
    }

    #[tokio::test]
    async fn test_missing_dialog_id_is_skipped() {
        let fixture = fixture();
        let outcome = fixture.composer.send_text("", "hello").await.unwrap();
        assert_eq!(
            outcome,
            SendOutcome::Skipped {
                reason: "missing dialog id".to_string()
            }
        );
        assert!(messages_of(&fixture.store, "").is_empty());
    }

    #[tokio::test]
    async fn test_empty_text_is_skipped() {
        let fixture = fixture();
        let outcome = fixture.composer.send_text("d1", "").await.unwrap();
        assert!(!outcome.is_sent());
        assert!(messages_of(&fixture.store, "d1").is_empty());
    }

    #[tokio::test]
    async fn test_missing_link_is_skipped_for_image_and_document() {
        let fixture = fixture();
        let image = fixture.composer.send_image("d1", Some("pic"), "").await.unwrap();
        let document = fixture.composer.send_document("d1", None, "").await.unwrap();

        for outcome in [image, document] {
            assert_eq!(
                outcome,
                SendOutcome::Skipped {
                    reason: "missing linkOnFile".to_string()
                }
            );
        }
        assert!(messages_of(&fixture.store, "d1").is_empty());
    }

    #[tokio::test]
    async fn test_send_is_addressed_by_dialog_id_alone() {
        // No sign-in anywhere in the fixture; the insert still lands.
        let fixture = fixture();
        let outcome = fixture.composer.send_text("d1", "hello").await.unwrap();
        assert!(outcome.is_sent());
        assert_eq!(messages_of(&fixture.store, "d1").len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let fixture = fixture();
        fixture.store.set_fail_writes(true);
        assert!(fixture.composer.send_text("d1", "hello").await.is_err());
    }

    #[test]
    fn test_message_kind_display_matches_wire_values() {
        assert_eq!(MessageKind::Text.to_string(), "text");
        assert_eq!(MessageKind::Image.to_string(), "image");
        assert_eq!(MessageKind::Document.to_string(), "document");
    }

    #[test]
    fn test_payload_serialization_is_tagged_by_type() {
        let payload = MessagePayload::Image {
            text: String::new(),
            link_on_file: "http://x/y.png".to_string(),
        };
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"type\":\"image\""));
    }
}
