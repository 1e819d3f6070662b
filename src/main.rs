//! Parley demo binary
//!
//! Runs a scripted sign-up, dialog, and messaging flow against the
//! in-process collaborators so the session layer can be exercised end to
//! end without a real backend.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use parley::auth::{AuthProvider, FakeAuthProvider};
use parley::cli::Cli;
use parley::store::MemoryStore;
use parley::{
    AuthStateSynchronizer, Config, DialogManager, MessageComposer, ProfileStore, Session,
};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse_args();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config.validate()?;

    let (auth, _auth_handle) = FakeAuthProvider::new();
    let store = Arc::new(MemoryStore::new());
    let session = Session::new();

    let sync_handle =
        AuthStateSynchronizer::new(auth.clone(), store.clone(), session.clone(), &config).spawn();

    let profiles = ProfileStore::new(auth.clone(), store.clone(), session.clone(), &config);
    let dialogs = DialogManager::new(store.clone(), session.clone(), &config);
    let composer = MessageComposer::new(store.clone(), &config);

    let identity = profiles.create_account(&cli.email, &cli.password).await?;
    tracing::info!("created account {} ({})", identity.uid, identity.email);

    wait_for_session(&session).await?;

    profiles.update_display_name("Demo User").await?;
    profiles.set_online(true).await?;
    let chats = profiles.add_active_chat(&cli.peer).await?;
    tracing::info!("active chats: {:?}", chats);

    let dialog_ref = dialogs
        .create_dialog(&cli.peer)
        .await
        .ok_or_else(|| anyhow::anyhow!("dialog creation failed"))?;
    tracing::info!("opened dialog {}", dialog_ref);

    let outcome = composer.send_text(dialog_ref.id(), "hello from parley").await?;
    tracing::info!("text message outcome: {:?}", outcome);

    let outcome = composer
        .send_image(dialog_ref.id(), None, "http://blobs.local/pic.png")
        .await?;
    tracing::info!("image message outcome: {:?}", outcome);

    profiles.touch_last_session().await?;
    auth.sign_out().await?;
    sync_handle.unsubscribe().await;

    Ok(())
}

/// Wait for the synchronizer to mirror the sign-up into the session
async fn wait_for_session(session: &Session) -> Result<()> {
    for _ in 0..200 {
        if session.identity().await.is_some() {
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    anyhow::bail!("auth stream never delivered the signed-in event")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
