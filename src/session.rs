//! Process-wide authenticated session context
//!
//! This module implements the explicit `Session` struct shared by the
//! synchronizer, profile store, dialog manager, and message composer. It
//! replaces any ambient singleton: each component receives a clone (cheap,
//! `Arc`-backed) at construction.
//!
//! Ownership of the fields is split by writer: only the auth-state
//! synchronizer assigns `identity`, `profile_ref`, and (initially)
//! `profile_cache`; the profile store refreshes `profile_cache` after
//! accepted mutations; the dialog manager assigns `active_dialog_ref`.
//! Everything else reads only.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::auth::Identity;
use crate::error::{ParleyError, Result};
use crate::model::Profile;
use crate::store::DocumentPath;

/// Snapshot of the session fields at one point in time
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// The authenticated identity, if any
    pub identity: Option<Identity>,
    /// Reference to the identity's profile document
    pub profile_ref: Option<DocumentPath>,
    /// Last-fetched profile snapshot
    pub profile_cache: Option<Profile>,
    /// Reference to the currently open conversation
    pub active_dialog_ref: Option<DocumentPath>,
}

/// Shared session context
///
/// Created empty at startup and populated/cleared by the auth-state
/// synchronizer for the lifetime of the process. Cloning shares the
/// underlying state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    state: Arc<RwLock<SessionState>>,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot all fields at once
    pub async fn snapshot(&self) -> SessionState {
        self.state.read().await.clone()
    }

    /// The authenticated identity, if any
    pub async fn identity(&self) -> Option<Identity> {
        self.state.read().await.identity.clone()
    }

    /// Reference to the authenticated identity's profile document
    pub async fn profile_ref(&self) -> Option<DocumentPath> {
        self.state.read().await.profile_ref.clone()
    }

    /// Last-fetched profile snapshot
    pub async fn profile_cache(&self) -> Option<Profile> {
        self.state.read().await.profile_cache.clone()
    }

    /// Reference to the currently open conversation
    pub async fn active_dialog_ref(&self) -> Option<DocumentPath> {
        self.state.read().await.active_dialog_ref.clone()
    }

    /// The authenticated identity, or `ParleyError::NoSession`
    pub async fn require_identity(&self) -> Result<Identity> {
        self.identity().await.ok_or_else(|| ParleyError::NoSession.into())
    }

    /// Reference to the profile document, or `ParleyError::NoSession`
    pub async fn require_profile_ref(&self) -> Result<DocumentPath> {
        self.profile_ref()
            .await
            .ok_or_else(|| ParleyError::NoSession.into())
    }

    /// Enter the authenticated state (synchronizer only)
    pub(crate) async fn set_authenticated(&self, identity: Identity, profile_ref: DocumentPath) {
        let mut state = self.state.write().await;
        state.identity = Some(identity);
        state.profile_ref = Some(profile_ref);
    }

    /// Leave the authenticated state, dropping derived fields
    pub(crate) async fn clear_authenticated(&self) {
        let mut state = self.state.write().await;
        state.identity = None;
        state.profile_ref = None;
        state.profile_cache = None;
    }

    /// Replace the cached profile snapshot
    pub(crate) async fn set_profile_cache(&self, profile: Option<Profile>) {
        self.state.write().await.profile_cache = profile;
    }

    /// Replace only the cached active-chat list, leaving the rest intact
    pub(crate) async fn set_cached_active_chats(&self, chats: Vec<String>) {
        let mut state = self.state.write().await;
        state
            .profile_cache
            .get_or_insert_with(Profile::default)
            .active_chats_with = chats;
    }

    /// Point the session at a newly created dialog
    pub(crate) async fn set_active_dialog_ref(&self, dialog_ref: DocumentPath) {
        self.state.write().await.active_dialog_ref = Some(dialog_ref);
    }
}
