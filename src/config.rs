//! Configuration management for Parley
//!
//! This module handles loading, parsing, and validating configuration
//! from YAML files, covering store collection layout and the auth-stream
//! resubscription policy.

use crate::error::{ParleyError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main configuration structure for Parley
///
/// Holds the document-store collection layout and the behavior of the
/// auth-state synchronizer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Document store collection names
    #[serde(default)]
    pub collections: CollectionsConfig,

    /// Auth stream observation settings
    #[serde(default)]
    pub auth_stream: AuthStreamConfig,
}

/// Document store collection layout
///
/// These names define where profile, dialog, and message documents live
/// in the backing store. The defaults match the original deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionsConfig {
    /// Collection holding one profile document per identity
    #[serde(default = "default_users_collection")]
    pub users: String,

    /// Collection holding dialog documents
    #[serde(default = "default_dialogs_collection")]
    pub dialogs: String,

    /// Sub-collection of each dialog holding its messages
    #[serde(default = "default_messages_collection")]
    pub messages: String,
}

fn default_users_collection() -> String {
    "users".to_string()
}

fn default_dialogs_collection() -> String {
    "dialogs".to_string()
}

fn default_messages_collection() -> String {
    "messages".to_string()
}

impl Default for CollectionsConfig {
    fn default() -> Self {
        Self {
            users: default_users_collection(),
            dialogs: default_dialogs_collection(),
            messages: default_messages_collection(),
        }
    }
}

/// Auth stream observation settings
///
/// Controls how the synchronizer reacts to auth-stream errors. The
/// defaults preserve the original behavior: resubscribe immediately,
/// forever. Tests inject a bounded policy to avoid spinning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthStreamConfig {
    /// Delay between resubscription attempts, in milliseconds
    #[serde(default)]
    pub resubscribe_interval_ms: u64,

    /// Maximum number of resubscription attempts; `None` retries forever
    #[serde(default)]
    pub max_resubscribe_attempts: Option<u32>,
}

impl Default for AuthStreamConfig {
    fn default() -> Self {
        Self {
            resubscribe_interval_ms: 0,
            max_resubscribe_attempts: None,
        }
    }
}

impl AuthStreamConfig {
    /// Resubscription delay as a `Duration`
    pub fn resubscribe_interval(&self) -> Duration {
        Duration::from_millis(self.resubscribe_interval_ms)
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// Missing fields fall back to their defaults, so a partial file (or
    /// an empty mapping) is valid.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ParleyError::Config(format!("failed to read config file: {}", e)))?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any collection name is empty or contains a path
    /// separator, or if a zero-attempt retry policy is configured
    pub fn validate(&self) -> Result<()> {
        for (field, name) in [
            ("collections.users", &self.collections.users),
            ("collections.dialogs", &self.collections.dialogs),
            ("collections.messages", &self.collections.messages),
        ] {
            if name.is_empty() {
                return Err(ParleyError::Validation(format!("{} must not be empty", field)).into());
            }
            if name.contains('/') {
                return Err(ParleyError::Validation(format!(
                    "{} must be a single path segment, got '{}'",
                    field, name
                ))
                .into());
            }
        }

        if self.auth_stream.max_resubscribe_attempts == Some(0) {
            return Err(ParleyError::Validation(
                "auth_stream.max_resubscribe_attempts must be at least 1 when set".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
