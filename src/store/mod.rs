//! Document store abstraction for Parley
//!
//! This module defines the `DocumentStore` trait that all backing stores
//! must implement, along with the field value model, path types, and the
//! server-timestamp sentinel. The concrete store (and its wire format) is
//! an external collaborator; the session layer only speaks this surface.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod memory;
pub use memory::MemoryStore;

/// A single document field value
///
/// Documents are flat maps of named fields. `ServerTimestamp` is a write
/// sentinel: the store replaces it with its own wall-clock time at commit,
/// never the caller's clock, so message ordering stays consistent across
/// clients with unsynchronized clocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// UTF-8 string field
    String(String),
    /// Boolean field
    Bool(bool),
    /// A resolved timestamp, as stored
    Timestamp(DateTime<Utc>),
    /// Ordered list of string ids
    StringList(Vec<String>),
    /// Write sentinel resolved to server time at commit
    ServerTimestamp,
}

impl FieldValue {
    /// Borrow the string payload, if this is a string field
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the boolean payload, if this is a bool field
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the timestamp payload, if this is a resolved timestamp
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }

    /// Borrow the list payload, if this is a string list
    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            Self::StringList(items) => Some(items),
            _ => None,
        }
    }
}

/// A flat map of field names to values, the unit of document storage
pub type Fields = BTreeMap<String, FieldValue>;

/// Path to a collection of documents
///
/// Either a top-level collection (`users`) or a sub-collection of a
/// document (`dialogs/{id}/messages`). Segments are joined with `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Create a top-level collection path
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::store::CollectionPath;
    ///
    /// let users = CollectionPath::new("users");
    /// assert_eq!(users.to_string(), "users");
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Path to a document within this collection
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::store::CollectionPath;
    ///
    /// let doc = CollectionPath::new("users").doc("uid-1");
    /// assert_eq!(doc.to_string(), "users/uid-1");
    /// ```
    pub fn doc(&self, id: impl Into<String>) -> DocumentPath {
        DocumentPath {
            collection: self.clone(),
            id: id.into(),
        }
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Path to a single document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentPath {
    collection: CollectionPath,
    id: String,
}

impl DocumentPath {
    /// The document id (last path segment)
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The collection this document belongs to
    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    /// Path to a sub-collection of this document
    ///
    /// # Examples
    ///
    /// ```
    /// use parley::store::CollectionPath;
    ///
    /// let messages = CollectionPath::new("dialogs").doc("d1").subcollection("messages");
    /// assert_eq!(messages.to_string(), "dialogs/d1/messages");
    /// ```
    pub fn subcollection(&self, name: impl AsRef<str>) -> CollectionPath {
        CollectionPath(format!("{}/{}/{}", self.collection, self.id, name.as_ref()))
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Document store trait for backing stores
///
/// All document stores must implement this trait. Every call is an
/// asynchronous, non-blocking request against the external store; no
/// timeouts are applied here, callers needing them must wrap externally.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document
    ///
    /// # Returns
    ///
    /// Returns `Some(fields)` if the document exists, `None` otherwise
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::StoreRead` if the read fails
    async fn get(&self, path: &DocumentPath) -> Result<Option<Fields>>;

    /// Create or fully replace a document
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::StoreWrite` if the write fails
    async fn set(&self, path: &DocumentPath, fields: Fields) -> Result<()>;

    /// Merge fields into an existing document
    ///
    /// Fields not named in `fields` are left untouched.
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::StoreWrite` if the write fails or the
    /// document does not exist
    async fn update(&self, path: &DocumentPath, fields: Fields) -> Result<()>;

    /// Insert a new document with a store-generated id
    ///
    /// # Returns
    ///
    /// Returns the generated document id
    ///
    /// # Errors
    ///
    /// Returns `ParleyError::StoreWrite` if id allocation or the write fails
    async fn add(&self, collection: &CollectionPath, fields: Fields) -> Result<String>;
}
