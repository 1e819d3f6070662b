//! Parley - client-side session and messaging layer for a chat application
//!
//! This library keeps a local mirror of "who is logged in and what is
//! their profile" consistent with a server-pushed authentication stream,
//! exposes mutation operations on profile and conversation state, and
//! structures outbound messages into a uniform envelope.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: the shared session context populated by the auth stream
//! - `sync`: the auth-state synchronizer task and its teardown handle
//! - `profile`: profile document operations with cache resynchronization
//! - `dialog`: dialog creation and active-conversation tracking
//! - `message`: typed message envelopes and submission outcomes
//! - `auth`: the auth provider seam (plus an in-process fake)
//! - `store`: the document store seam (plus an in-memory implementation)
//! - `config`: configuration management and validation
//! - `error`: error types and result aliases
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use parley::auth::FakeAuthProvider;
//! use parley::store::MemoryStore;
//! use parley::{AuthStateSynchronizer, Config, ProfileStore, Session};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (auth, _handle) = FakeAuthProvider::new();
//!     let store = Arc::new(MemoryStore::new());
//!     let session = Session::new();
//!     let config = Config::default();
//!
//!     let sync = AuthStateSynchronizer::new(auth.clone(), store.clone(), session.clone(), &config);
//!     let sync_handle = sync.spawn();
//!
//!     let profiles = ProfileStore::new(auth, store, session, &config);
//!     profiles.create_account("ada@example.com", "s3cret!").await?;
//!
//!     sync_handle.unsubscribe().await;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod cli;
pub mod config;
pub mod dialog;
pub mod error;
pub mod message;
pub mod model;
pub mod profile;
pub mod session;
pub mod store;
pub mod sync;

// Re-export commonly used types
pub use config::Config;
pub use dialog::DialogManager;
pub use error::{ParleyError, Result};
pub use message::{MessageComposer, MessageKind, MessagePayload, SendOutcome};
pub use model::{Dialog, Profile};
pub use profile::ProfileStore;
pub use session::{Session, SessionState};
pub use sync::{AuthStateSynchronizer, SyncHandle};

#[cfg(test)]
pub mod test_utils;
