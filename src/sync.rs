//! Auth-state synchronization task
//!
//! This module keeps the shared [`Session`] consistent with the
//! provider's auth-change stream. A dedicated task consumes the
//! subscription: a signed-in event sets the identity, derives the profile
//! document reference, and fetches the profile into the cache; a
//! signed-out event clears all three. Stream errors never propagate; the
//! task logs and resubscribes according to the configured policy
//! (default: immediately, forever).
//!
//! The session has exactly two auth states, anonymous and authenticated,
//! and transitions fire only on stream events. Resubscribing after an
//! error restarts observation without touching the session state.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::auth::{AuthEvent, AuthProvider, Identity};
use crate::config::{AuthStreamConfig, Config};
use crate::profile::load_profile;
use crate::session::Session;
use crate::store::{CollectionPath, DocumentStore};

/// Keeps the session's identity fields consistent with the auth stream
pub struct AuthStateSynchronizer {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DocumentStore>,
    session: Session,
    users: CollectionPath,
    policy: AuthStreamConfig,
}

impl AuthStateSynchronizer {
    /// Create a synchronizer for the given session and collaborators
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
            policy: config.auth_stream.clone(),
        }
    }

    /// Attach to the auth stream and start mirroring it into the session
    ///
    /// # Returns
    ///
    /// Returns a [`SyncHandle`]; call [`SyncHandle::unsubscribe`] exactly
    /// once during session teardown (extra calls are harmless no-ops).
    pub fn spawn(self) -> SyncHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(self.run(shutdown_rx));
        SyncHandle {
            shutdown: shutdown_tx,
            task: Mutex::new(Some(task)),
        }
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut resubscribes: u32 = 0;
        'observe: loop {
            let mut subscription = self.auth.subscribe();
            tracing::debug!("observing auth stream");

            let error = loop {
                tokio::select! {
                    _ = shutdown.changed() => break 'observe,
                    event = subscription.next() => match event {
                        Some(AuthEvent::SignedIn(identity)) => {
                            self.apply_signed_in(identity).await;
                        }
                        Some(AuthEvent::SignedOut) => {
                            tracing::debug!("auth stream: signed out");
                            self.session.clear_authenticated().await;
                        }
                        Some(AuthEvent::StreamError(message)) => break message,
                        None => {
                            // Provider gone; nothing left to observe.
                            tracing::debug!("auth stream closed, stopping synchronizer");
                            break 'observe;
                        }
                    },
                }
            };

            // Give up only once the permitted number of resubscriptions
            // has actually been performed; the counter is cumulative, as
            // every attach replays the current auth state as an event.
            resubscribes += 1;
            if let Some(max) = self.policy.max_resubscribe_attempts {
                if resubscribes > max {
                    tracing::warn!(
                        "auth stream error: {}, giving up after {} resubscriptions",
                        error,
                        max
                    );
                    break;
                }
            }
            tracing::error!(
                attempt = resubscribes,
                "auth stream error: {}, resubscribing",
                error
            );

            let interval = self.policy.resubscribe_interval();
            if !interval.is_zero() {
                tokio::select! {
                    _ = shutdown.changed() => break,
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        }
    }

    async fn apply_signed_in(&self, identity: Identity) {
        let uid = identity.uid.clone();
        tracing::debug!(uid = %uid, "auth stream: signed in");
        let profile_ref = self.users.doc(uid);
        self.session
            .set_authenticated(identity, profile_ref.clone())
            .await;

        let profile = load_profile(self.store.as_ref(), &profile_ref).await;
        self.session.set_profile_cache(Some(profile)).await;
    }
}

/// Handle for detaching the synchronizer from the auth stream
///
/// `unsubscribe` is idempotent and deterministic: it signals shutdown and
/// waits for the task to finish before returning.
pub struct SyncHandle {
    shutdown: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl SyncHandle {
    /// Detach from the auth stream and wait for the task to stop
    pub async fn unsubscribe(&self) {
        let _ = self.shutdown.send(true);
        if let Some(task) = self.task.lock().await.take() {
            if let Err(e) = task.await {
                tracing::error!("auth synchronizer task failed: {}", e);
            }
        }
    }
}
