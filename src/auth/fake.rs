//! In-process fake auth provider for unit and integration tests
//!
//! This module provides [`FakeAuthProvider`] and [`FakeAuthHandle`], an
//! in-process pair that replaces a real auth backend in tests and in the
//! demo binary.
//!
//! # Usage
//!
//! Call [`FakeAuthProvider::new`] to obtain a
//! `(Arc<FakeAuthProvider>, FakeAuthHandle)` pair. Wire the provider into
//! the code under test. From the test side, use the handle to:
//!
//! - Inject auth-stream errors: `handle.emit_stream_error("...")`
//! - Make display-name updates fail: `handle.set_fail_display_name_updates(true)`
//! - Observe verification email requests: `handle.verification_emails()`
//!
//! Like the real backend, the stream delivers the current auth state to
//! every fresh subscriber, so an observer that resubscribes after a
//! stream error immediately re-learns who is signed in.
//!
//! # Example
//!
//! ```
//! use parley::auth::{AuthEvent, AuthProvider, FakeAuthProvider};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let (provider, _handle) = FakeAuthProvider::new();
//! let mut subscription = provider.subscribe();
//!
//! // Fresh subscription learns the current (anonymous) state first.
//! assert_eq!(subscription.next().await, Some(AuthEvent::SignedOut));
//!
//! let identity = provider.sign_up("ada@example.com", "s3cret!").await?;
//! assert_eq!(
//!     subscription.next().await,
//!     Some(AuthEvent::SignedIn(identity))
//! );
//! # Ok(())
//! # }
//! ```

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::auth::{AuthEvent, AuthProvider, AuthSubscription, Identity};
use crate::error::{ParleyError, Result};

/// Minimum accepted password length, mirroring common provider policy
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone)]
struct Account {
    uid: String,
    password: String,
    display_name: Option<String>,
}

#[derive(Debug, Default)]
struct Inner {
    /// Registered accounts, keyed by email
    accounts: HashMap<String, Account>,
    /// The currently signed-in identity, if any
    current: Option<Identity>,
    /// Live auth-change subscribers
    subscribers: Vec<mpsc::UnboundedSender<AuthEvent>>,
    /// Emails for which a verification message was requested
    verification_emails: Vec<String>,
    /// Monotonic uid counter
    next_uid: u64,
}

/// In-process fake auth provider
///
/// Implements the full [`AuthProvider`] trait in memory, so tests can
/// drive sign-up/sign-in flows and the auth-change stream without a real
/// backend. Create with [`FakeAuthProvider::new`] to obtain both the
/// provider and the complementary [`FakeAuthHandle`].
#[derive(Debug, Default)]
pub struct FakeAuthProvider {
    inner: Mutex<Inner>,
    fail_display_name_updates: AtomicBool,
}

impl FakeAuthProvider {
    /// Create a new `(Arc<FakeAuthProvider>, FakeAuthHandle)` pair
    ///
    /// Wire the provider into the code under test; keep the handle on the
    /// test side to inject stream errors and observe provider activity.
    pub fn new() -> (Arc<Self>, FakeAuthHandle) {
        let provider = Arc::new(Self::default());
        let handle = FakeAuthHandle {
            provider: Arc::clone(&provider),
        };
        (provider, handle)
    }

    fn broadcast(inner: &mut Inner, event: AuthEvent) {
        inner
            .subscribers
            .retain(|subscriber| subscriber.send(event.clone()).is_ok());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AuthProvider for FakeAuthProvider {
    async fn sign_up(&self, email: &str, password: &str) -> Result<Identity> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(ParleyError::Auth(format!(
                "password must be at least {} characters",
                MIN_PASSWORD_LEN
            ))
            .into());
        }

        let mut inner = self.lock();
        if inner.accounts.contains_key(email) {
            return Err(ParleyError::Auth(format!("email already in use: {}", email)).into());
        }

        inner.next_uid += 1;
        let uid = format!("uid-{}", inner.next_uid);
        inner.accounts.insert(
            email.to_string(),
            Account {
                uid: uid.clone(),
                password: password.to_string(),
                display_name: None,
            },
        );

        // Sign-up also signs the new identity in, like the real backend.
        let identity = Identity::new(uid, email);
        inner.current = Some(identity.clone());
        Self::broadcast(&mut inner, AuthEvent::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity> {
        let mut inner = self.lock();
        let account = inner
            .accounts
            .get(email)
            .ok_or_else(|| ParleyError::Auth(format!("no account for {}", email)))?;
        if account.password != password {
            return Err(ParleyError::Auth("wrong password".to_string()).into());
        }

        let mut identity = Identity::new(account.uid.clone(), email);
        identity.display_name = account.display_name.clone();
        inner.current = Some(identity.clone());
        Self::broadcast(&mut inner, AuthEvent::SignedIn(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<()> {
        let mut inner = self.lock();
        inner.current = None;
        Self::broadcast(&mut inner, AuthEvent::SignedOut);
        Ok(())
    }

    async fn send_verification_email(&self, uid: &str) -> Result<()> {
        let mut inner = self.lock();
        let email = inner
            .accounts
            .iter()
            .find(|(_, account)| account.uid == uid)
            .map(|(email, _)| email.clone())
            .ok_or_else(|| ParleyError::Auth(format!("unknown identity: {}", uid)))?;
        inner.verification_emails.push(email);
        Ok(())
    }

    async fn update_display_name(&self, uid: &str, display_name: &str) -> Result<()> {
        if self.fail_display_name_updates.load(Ordering::SeqCst) {
            return Err(
                ParleyError::Auth("injected display name update failure".to_string()).into(),
            );
        }

        let mut inner = self.lock();
        let account = inner
            .accounts
            .values_mut()
            .find(|account| account.uid == uid)
            .ok_or_else(|| ParleyError::Auth(format!("unknown identity: {}", uid)))?;
        account.display_name = Some(display_name.to_string());

        if let Some(current) = inner.current.as_mut() {
            if current.uid == uid {
                current.display_name = Some(display_name.to_string());
            }
        }
        Ok(())
    }

    fn subscribe(&self) -> AuthSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.lock();

        // New observers immediately learn the current state.
        let initial = match &inner.current {
            Some(identity) => AuthEvent::SignedIn(identity.clone()),
            None => AuthEvent::SignedOut,
        };
        let _ = tx.send(initial);

        inner.subscribers.push(tx);
        AuthSubscription::new(rx)
    }
}

/// Test-side handle for a [`FakeAuthProvider`]
///
/// Lets tests inject stream-level faults and observe provider activity
/// without going through the `AuthProvider` surface.
#[derive(Debug, Clone)]
pub struct FakeAuthHandle {
    provider: Arc<FakeAuthProvider>,
}

impl FakeAuthHandle {
    /// Push a stream error to every live subscriber
    pub fn emit_stream_error(&self, message: impl Into<String>) {
        let mut inner = self.provider.lock();
        FakeAuthProvider::broadcast(&mut inner, AuthEvent::StreamError(message.into()));
    }

    /// Make subsequent `update_display_name` calls fail
    pub fn set_fail_display_name_updates(&self, fail: bool) {
        self.provider
            .fail_display_name_updates
            .store(fail, Ordering::SeqCst);
    }

    /// Emails for which a verification message was requested, in order
    pub fn verification_emails(&self) -> Vec<String> {
        self.provider.lock().verification_emails.clone()
    }

    /// Number of live auth-change subscribers
    ///
    /// Closed subscriptions are pruned lazily on the next broadcast, so
    /// this can briefly over-count after a subscriber is dropped.
    pub fn subscriber_count(&self) -> usize {
        self.provider.lock().subscribers.len()
    }
}
