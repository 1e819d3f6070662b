//! Authentication provider abstraction for Parley
//!
//! This module defines the `AuthProvider` trait that all auth backends
//! must implement, along with the identity record and the auth-change
//! event stream consumed by the synchronizer.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

pub mod fake;
pub use fake::{FakeAuthProvider, FakeAuthHandle};

/// An authenticated principal issued by the auth provider
///
/// The `uid` is the stable key for the identity's profile document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable identity id, used as the profile document key
    pub uid: String,
    /// Email address the identity was registered with
    pub email: String,
    /// Display name held by the provider, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Identity {
    /// Create a new identity
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::auth::Identity;
    ///
    /// let identity = Identity::new("uid-1", "ada@example.com");
    /// assert_eq!(identity.uid, "uid-1");
    /// assert!(identity.display_name.is_none());
    /// ```
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            display_name: None,
        }
    }
}

/// A single event on the auth-change stream
#[derive(Debug, Clone, PartialEq)]
pub enum AuthEvent {
    /// An identity is now signed in
    SignedIn(Identity),
    /// No identity is signed in
    SignedOut,
    /// The stream itself failed; the observer should resubscribe
    StreamError(String),
}

/// Cancellable subscription to the auth-change stream
///
/// Yields a lazy sequence of [`AuthEvent`]s. Dropping the subscription
/// detaches the observer.
#[derive(Debug)]
pub struct AuthSubscription {
    events: mpsc::UnboundedReceiver<AuthEvent>,
}

impl AuthSubscription {
    /// Wrap a receiver end of an event channel
    pub fn new(events: mpsc::UnboundedReceiver<AuthEvent>) -> Self {
        Self { events }
    }

    /// Wait for the next auth event
    ///
    /// # Returns
    ///
    /// Returns `None` once the provider side of the stream is gone.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        self.events.recv().await
    }
}

impl futures::Stream for AuthSubscription {
    type Item = AuthEvent;

    fn poll_next(
        self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<AuthEvent>> {
        self.get_mut().events.poll_recv(cx)
    }
}

/// Auth provider trait
///
/// All auth backends must implement this trait. Credential operations
/// return the resulting [`Identity`] or a `ParleyError::Auth`; the
/// auth-change stream is exposed as a fresh subscription per call so an
/// observer can resubscribe after a stream error.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new account
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Auth` if the provider rejects the signup
    /// (duplicate email, weak password, etc.)
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity>;

    /// Sign in with existing credentials
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Auth` on unknown email or wrong password
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity>;

    /// Sign out the current identity
    async fn sign_out(&self) -> Result<()>;

    /// Request a verification email for an identity
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Auth` if the identity is unknown to the provider
    async fn send_verification_email(&self, uid: &str) -> Result<()>;

    /// Update the display name held by the provider
    ///
    /// This is independent of the profile document's `displayName` field;
    /// the two are written separately.
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::Auth` if the provider rejects the update
    async fn update_display_name(&self, uid: &str, display_name: &str) -> Result<()>;

    /// Subscribe to the auth-change stream
    ///
    /// Each call attaches a fresh observer. The subscription yields
    /// [`AuthEvent`]s until it is dropped or the provider goes away.
    fn subscribe(&self) -> AuthSubscription;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_new() {
        let identity = Identity::new("uid-1", "ada@example.com");
        assert_eq!(identity.uid, "uid-1");
        assert_eq!(identity.email, "ada@example.com");
        assert!(identity.display_name.is_none());
    }

    #[test]
    fn test_identity_serialization_skips_empty_display_name() {
        let identity = Identity::new("uid-1", "ada@example.com");
        let json = serde_json::to_string(&identity).unwrap();
        assert!(!json.contains("display_name"));
    }

    #[tokio::test]
    async fn test_subscription_yields_events_in_order() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut subscription = AuthSubscription::new(rx);

        tx.send(AuthEvent::SignedIn(Identity::new("u1", "a@b.c"))).unwrap();
        tx.send(AuthEvent::SignedOut).unwrap();

        assert!(matches!(
            subscription.next().await,
            Some(AuthEvent::SignedIn(identity)) if identity.uid == "u1"
        ));
        assert_eq!(subscription.next().await, Some(AuthEvent::SignedOut));

        drop(tx);
        assert_eq!(subscription.next().await, None);
    }

    #[tokio::test]
    async fn test_subscription_works_as_a_stream() {
        use futures::StreamExt;

        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = AuthSubscription::new(rx);

        tx.send(AuthEvent::SignedOut).unwrap();
        tx.send(AuthEvent::StreamError("boom".to_string())).unwrap();
        drop(tx);

        let events: Vec<AuthEvent> = subscription.collect().await;
        assert_eq!(
            events,
            vec![
                AuthEvent::SignedOut,
                AuthEvent::StreamError("boom".to_string())
            ]
        );
    }
}
