//! Shared harness for Parley integration tests

#![allow(dead_code)]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parley::auth::{FakeAuthHandle, FakeAuthProvider, Identity};
use parley::store::MemoryStore;
use parley::{
    AuthStateSynchronizer, Config, DialogManager, MessageComposer, ProfileStore, Session,
    SyncHandle,
};

/// Everything a test needs: the components under test, their in-process
/// collaborators, and the running synchronizer.
pub struct Harness {
    pub auth: Arc<FakeAuthProvider>,
    pub fake: FakeAuthHandle,
    pub store: Arc<MemoryStore>,
    pub session: Session,
    pub config: Config,
    pub sync: SyncHandle,
    pub profiles: ProfileStore,
    pub dialogs: DialogManager,
    pub composer: MessageComposer,
}

impl Harness {
    /// Build the full component stack and start the synchronizer
    pub fn spawn() -> Self {
        let (auth, fake) = FakeAuthProvider::new();
        let store = Arc::new(MemoryStore::new());
        let session = Session::new();
        let config = Config::default();

        let sync =
            AuthStateSynchronizer::new(auth.clone(), store.clone(), session.clone(), &config)
                .spawn();
        let profiles = ProfileStore::new(auth.clone(), store.clone(), session.clone(), &config);
        let dialogs = DialogManager::new(store.clone(), session.clone(), &config);
        let composer = MessageComposer::new(store.clone(), &config);

        Self {
            auth,
            fake,
            store,
            session,
            config,
            sync,
            profiles,
            dialogs,
            composer,
        }
    }

    /// Create an account and wait for the auth stream to mirror it into
    /// the session
    pub async fn sign_up_and_wait(&self, email: &str, password: &str) -> Identity {
        let identity = self
            .profiles
            .create_account(email, password)
            .await
            .expect("account creation failed");
        let session = self.session.clone();
        let uid = identity.uid.clone();
        assert!(
            eventually(move || {
                let session = session.clone();
                let uid = uid.clone();
                async move { session.identity().await.map(|i| i.uid) == Some(uid) }
            })
            .await,
            "session never reflected the signed-in identity"
        );
        identity
    }
}

/// Poll a condition until it holds or a short deadline passes
pub async fn eventually<F, Fut>(mut condition: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if condition().await {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}
