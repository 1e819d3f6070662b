//! In-process document store for tests and demos
//!
//! This module provides [`MemoryStore`], an in-memory [`DocumentStore`]
//! implementation that replaces a real backing store in tests and in the
//! demo binary. It resolves the server-timestamp sentinel with its own
//! clock at write time and supports fault injection so tests can exercise
//! read and write failure paths deterministically.
//!
//! # Example
//!
//! ```
//! use parley::store::{CollectionPath, DocumentStore, FieldValue, MemoryStore};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let store = MemoryStore::new();
//! let users = CollectionPath::new("users");
//!
//! let mut fields = parley::store::Fields::new();
//! fields.insert("displayName".to_string(), FieldValue::String("ada".to_string()));
//! store.set(&users.doc("u1"), fields).await?;
//!
//! let doc = store.get(&users.doc("u1")).await?.unwrap();
//! assert_eq!(doc["displayName"].as_str(), Some("ada"));
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::error::{ParleyError, Result};
use crate::store::{CollectionPath, DocumentPath, DocumentStore, FieldValue, Fields};

/// In-process document store
///
/// Collections are keyed by their full path string, so sub-collections
/// (`dialogs/{id}/messages`) live alongside top-level collections without
/// any hierarchy bookkeeping.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Fields>>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make all subsequent writes fail with `ParleyError::StoreWrite`
    ///
    /// Covers `set`, `update`, and `add`. Used by tests to simulate a
    /// store outage.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make all subsequent reads fail with `ParleyError::StoreRead`
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Snapshot all documents in a collection, ordered by id
    ///
    /// Test observation hook; returns an empty list for an unknown
    /// collection.
    pub fn documents(&self, collection: &CollectionPath) -> Vec<(String, Fields)> {
        let collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        collections
            .get(&collection.to_string())
            .map(|docs| docs.iter().map(|(id, f)| (id.clone(), f.clone())).collect())
            .unwrap_or_default()
    }

    /// Resolve write sentinels against the store clock
    fn resolve(fields: Fields) -> Fields {
        let now = Utc::now();
        fields
            .into_iter()
            .map(|(name, value)| {
                let value = match value {
                    FieldValue::ServerTimestamp => FieldValue::Timestamp(now),
                    other => other,
                };
                (name, value)
            })
            .collect()
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ParleyError::StoreWrite("injected write failure".to_string()).into());
        }
        Ok(())
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ParleyError::StoreRead("injected read failure".to_string()).into());
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &DocumentPath) -> Result<Option<Fields>> {
        self.check_read()?;
        let collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        Ok(collections
            .get(&path.collection().to_string())
            .and_then(|docs| docs.get(path.id()))
            .cloned())
    }

    async fn set(&self, path: &DocumentPath, fields: Fields) -> Result<()> {
        self.check_write()?;
        let mut collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        collections
            .entry(path.collection().to_string())
            .or_default()
            .insert(path.id().to_string(), Self::resolve(fields));
        Ok(())
    }

    async fn update(&self, path: &DocumentPath, fields: Fields) -> Result<()> {
        self.check_write()?;
        let mut collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        let doc = collections
            .get_mut(&path.collection().to_string())
            .and_then(|docs| docs.get_mut(path.id()))
            .ok_or_else(|| {
                ParleyError::StoreWrite(format!("no document at {} to update", path))
            })?;
        for (name, value) in Self::resolve(fields) {
            doc.insert(name, value);
        }
        Ok(())
    }

    async fn add(&self, collection: &CollectionPath, fields: Fields) -> Result<String> {
        self.check_write()?;
        let id = Uuid::new_v4().to_string();
        let mut collections = self.collections.lock().unwrap_or_else(|e| e.into_inner());
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), Self::resolve(fields));
        Ok(id)
    }
}
