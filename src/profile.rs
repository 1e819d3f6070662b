//! Profile document operations
//!
//! This module implements [`ProfileStore`], the read/write surface for
//! the authenticated user's profile document. Every accepted mutation
//! re-synchronizes the session's profile cache so local and server truth
//! do not drift.
//!
//! Two failure modes are deliberately tolerated rather than propagated,
//! matching the documented contract:
//!
//! - A profile write failing right after account creation is logged and
//!   swallowed; the account exists without a profile document until the
//!   next write. [`ProfileStore::get_profile`] returns the empty default
//!   profile for such identities.
//! - The provider-side display name update and the document-side
//!   `displayName` write are independent; the provider failing does not
//!   block the document update.

use std::sync::Arc;

use crate::auth::{AuthProvider, Identity};
use crate::config::Config;
use crate::error::Result;
use crate::model::{field, Profile};
use crate::session::Session;
use crate::store::{CollectionPath, DocumentPath, DocumentStore, FieldValue, Fields};

/// Fetch a profile document, returning the empty default when it is
/// absent or the read fails
///
/// Callers must already defend against a not-yet-provisioned profile, so
/// both cases log and degrade to `Profile::default()` instead of failing.
pub(crate) async fn load_profile(store: &dyn DocumentStore, path: &DocumentPath) -> Profile {
    match store.get(path).await {
        Ok(Some(fields)) => Profile::from_fields(&fields),
        Ok(None) => {
            tracing::warn!("no profile document at {}", path);
            Profile::default()
        }
        Err(e) => {
            tracing::error!("profile read at {} failed: {}", path, e);
            Profile::default()
        }
    }
}

/// Read/write operations on the current identity's profile document
pub struct ProfileStore {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DocumentStore>,
    session: Session,
    users: CollectionPath,
}

impl ProfileStore {
    /// Create a profile store over the shared session
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
        session: Session,
        config: &Config,
    ) -> Self {
        Self {
            auth,
            store,
            session,
            users: CollectionPath::new(config.collections.users.clone()),
        }
    }

    /// Register a new account and provision its profile document
    ///
    /// The profile is written with sign-up defaults (`displayName=""`,
    /// `isOnline=true`, server-assigned `lastSession`, `photoUrl=""`,
    /// empty `activeChatsWith`), keyed by the new identity's uid. A
    /// failed profile write is logged but does not roll back the created
    /// account.
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Auth` if the provider rejects the signup
    pub async fn create_account(&self, email: &str, password: &str) -> Result<Identity> {
        let identity = self.auth.sign_up(email, password).await?;

        let profile_ref = self.users.doc(identity.uid.clone());
        if let Err(e) = self.store.set(&profile_ref, Profile::signup_fields()).await {
            // Accepted inconsistency: the account exists, the profile
            // document does not. get_profile tolerates this.
            tracing::error!("profile write for new account {} failed: {}", profile_ref, e);
        }
        Ok(identity)
    }

    /// Request a verification email for the current identity
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::NoSession` if unauthenticated, or
    /// `ParleyError::Auth` if the provider rejects the request
    pub async fn verify_email(&self) -> Result<()> {
        let identity = self.session.require_identity().await?;
        self.auth.send_verification_email(&identity.uid).await
    }

    /// Update the display name on both the provider and the profile document
    ///
    /// The two writes are independent: a provider failure is logged and
    /// the document update proceeds regardless.
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::NoSession` if unauthenticated, or
    /// `ParleyError::StoreWrite` if the document update fails
    pub async fn update_display_name(&self, display_name: &str) -> Result<()> {
        let identity = self.session.require_identity().await?;
        if let Err(e) = self.auth.update_display_name(&identity.uid, display_name).await {
            tracing::error!("provider display name update failed: {}", e);
        }
        self.update_field(
            field::DISPLAY_NAME,
            FieldValue::String(display_name.to_string()),
        )
        .await
    }

    /// Set the online flag on the profile document
    pub async fn set_online(&self, is_online: bool) -> Result<()> {
        self.update_field(field::IS_ONLINE, FieldValue::Bool(is_online))
            .await
    }

    /// Stamp the profile with a fresh server-assigned last-session time
    ///
    /// Always writes the server-timestamp sentinel, never the caller's
    /// clock.
    pub async fn touch_last_session(&self) -> Result<()> {
        self.update_field(field::LAST_SESSION, FieldValue::ServerTimestamp)
            .await
    }

    /// Set the avatar URL on the profile document
    pub async fn set_photo_url(&self, photo_url: &str) -> Result<()> {
        self.update_field(field::PHOTO_URL, FieldValue::String(photo_url.to_string()))
            .await
    }

    /// Append a participant to the active-chat list
    ///
    /// Read-modify-write from the cached list: the new id is appended to
    /// a flat copy of the current list and the whole list is written
    /// back. This is not atomic against the server; two concurrent calls
    /// from the same cached base clobber each other (documented lost
    /// update).
    ///
    /// # Returns
    ///
    /// Returns the new list, which also replaces the cached one
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::NoSession` if unauthenticated, or
    /// `ParleyError::StoreWrite` if the write fails
    pub async fn add_active_chat(&self, participant_id: &str) -> Result<Vec<String>> {
        let mut chats = self.cached_active_chats().await?;
        chats.push(participant_id.to_string());
        self.write_active_chats(chats).await
    }

    /// Remove a participant from the active-chat list
    ///
    /// Same read-modify-write contract as [`Self::add_active_chat`].
    pub async fn remove_active_chat(&self, participant_id: &str) -> Result<Vec<String>> {
        let mut chats = self.cached_active_chats().await?;
        chats.retain(|id| id != participant_id);
        self.write_active_chats(chats).await
    }

    /// Fetch a profile document by identity id
    ///
    /// Returns the empty default profile (and logs) when the document is
    /// absent or the read fails; callers must defend against a profile
    /// that has not been provisioned yet.
    pub async fn get_profile(&self, uid: &str) -> Profile {
        load_profile(self.store.as_ref(), &self.users.doc(uid)).await
    }

    /// Current active-chat base list: the cache if primed, else a fetch
    async fn cached_active_chats(&self) -> Result<Vec<String>> {
        let profile_ref = self.session.require_profile_ref().await?;
        if let Some(cache) = self.session.profile_cache().await {
            return Ok(cache.active_chats_with);
        }
        Ok(load_profile(self.store.as_ref(), &profile_ref).await.active_chats_with)
    }

    async fn write_active_chats(&self, chats: Vec<String>) -> Result<Vec<String>> {
        let profile_ref = self.session.require_profile_ref().await?;
        let mut fields = Fields::new();
        fields.insert(
            field::ACTIVE_CHATS_WITH.to_string(),
            FieldValue::StringList(chats.clone()),
        );
        self.store.update(&profile_ref, fields).await?;
        self.session.set_cached_active_chats(chats.clone()).await;
        Ok(chats)
    }

    /// Single-field document update, then cache resynchronization
    async fn update_field(&self, name: &str, value: FieldValue) -> Result<()> {
        let profile_ref = self.session.require_profile_ref().await?;
        let mut fields = Fields::new();
        fields.insert(name.to_string(), value);
        self.store.update(&profile_ref, fields).await?;

        // Re-fetch rather than patch locally so server-resolved values
        // (lastSession) land in the cache too.
        let profile = load_profile(self.store.as_ref(), &profile_ref).await;
        self.session.set_profile_cache(Some(profile)).await;
        Ok(())
    }
}
