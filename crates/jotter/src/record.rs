//! Core record type for jotter.
//!
//! A [`Record`] is one submitted message together with the moment it was
//! submitted and an identifier that stays with it for its whole life.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message stored in place of an empty submission.
pub const EMPTY_MESSAGE_PLACEHOLDER: &str = "Empty Message";

/// A single submitted message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier, generated at creation.
    ///
    /// Blobs written without an identifier receive a fresh one when decoded.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// The message text, never empty after creation.
    pub message: String,

    /// When the message was submitted.
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Create a record stamped with the current time.
    ///
    /// An empty `message` is replaced with [`EMPTY_MESSAGE_PLACEHOLDER`].
    /// Anything else is kept verbatim, whitespace included.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_timestamp(message, Utc::now())
    }

    /// Create a record with an explicit creation time.
    #[must_use]
    pub fn with_timestamp(message: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            EMPTY_MESSAGE_PLACEHOLDER.to_string()
        } else {
            message
        };

        Self {
            id: Uuid::new_v4(),
            message,
            created_at,
        }
    }

    /// Check whether two records carry the same content, ignoring identity.
    #[must_use]
    pub fn same_content(&self, other: &Self) -> bool {
        self.message == other.message && self.created_at == other.created_at
    }
}
