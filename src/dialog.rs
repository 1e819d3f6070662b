//! Dialog creation and active-conversation tracking

use std::sync::Arc;

use crate::config::Config;
use crate::model::Dialog;
use crate::session::Session;
use crate::store::{CollectionPath, DocumentPath, DocumentStore};

/// Creates conversation records and tracks the currently open one
pub struct DialogManager {
    store: Arc<dyn DocumentStore>,
    session: Session,
    dialogs: CollectionPath,
}

impl DialogManager {
    /// Create a dialog manager over the shared session
    pub fn new(store: Arc<dyn DocumentStore>, session: Session, config: &Config) -> Self {
        Self {
            store,
            session,
            dialogs: CollectionPath::new(config.collections.dialogs.clone()),
        }
    }

    /// Create a dialog between the current identity and another participant
    ///
    /// Writes a dialog document with `participants = [current uid,
    /// other]` and points the session's active dialog reference at it.
    /// Any failure (no session, id allocation, write) is logged and
    /// leaves the active reference unchanged.
    ///
    /// # Returns
    ///
    /// Returns the new dialog reference, or `None` if creation failed;
    /// callers must check whether the reference actually advanced.
    pub async fn create_dialog(&self, other_participant_id: &str) -> Option<DocumentPath> {
        let identity = match self.session.identity().await {
            Some(identity) => identity,
            None => {
                tracing::error!("cannot create dialog without an authenticated session");
                return None;
            }
        };

        let dialog = Dialog::new(identity.uid, other_participant_id);
        match self.store.add(&self.dialogs, dialog.to_fields()).await {
            Ok(id) => {
                let dialog_ref = self.dialogs.doc(id);
                self.session.set_active_dialog_ref(dialog_ref.clone()).await;
                tracing::debug!("created dialog {}", dialog_ref);
                Some(dialog_ref)
            }
            Err(e) => {
                tracing::error!("dialog creation failed: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Identity;
    use crate::model::field;
    use crate::store::{FieldValue, MemoryStore};

    async fn authenticated_session() -> Session {
        let session = Session::new();
        session
            .set_authenticated(
                Identity::new("uid-1", "ada@example.com"),
                CollectionPath::new("users").doc("uid-1"),
            )
            .await;
        session
    }

    #[tokio::test]
    async fn test_create_dialog_writes_participants_and_sets_active_ref() {
        let store = Arc::new(MemoryStore::new());
        let session = authenticated_session().await;
        let dialogs = DialogManager::new(store.clone(), session.clone(), &Config::default());

        let dialog_ref = dialogs.create_dialog("uid-2").await.unwrap();
        assert_eq!(session.active_dialog_ref().await.unwrap(), dialog_ref);

        let docs = store.documents(&CollectionPath::new("dialogs"));
        assert_eq!(docs.len(), 1);
        assert_eq!(
            docs[0].1[field::PARTICIPANTS],
            FieldValue::StringList(vec!["uid-1".to_string(), "uid-2".to_string()])
        );
    }

    #[tokio::test]
    async fn test_create_dialog_failure_leaves_active_ref_unchanged() {
        let store = Arc::new(MemoryStore::new());
        let session = authenticated_session().await;
        let dialogs = DialogManager::new(store.clone(), session.clone(), &Config::default());

        let first = dialogs.create_dialog("uid-2").await.unwrap();

        store.set_fail_writes(true);
        assert!(dialogs.create_dialog("uid-3").await.is_none());
        assert_eq!(session.active_dialog_ref().await.unwrap(), first);
    }

    #[tokio::test]
    async fn test_create_dialog_without_session_is_a_logged_no_op() {
        let store = Arc::new(MemoryStore::new());
        let session = Session::new();
        let dialogs = DialogManager::new(store.clone(), session.clone(), &Config::default());

        assert!(dialogs.create_dialog("uid-2").await.is_none());
        assert!(session.active_dialog_ref().await.is_none());
        assert!(store.documents(&CollectionPath::new("dialogs")).is_empty());
    }
}
