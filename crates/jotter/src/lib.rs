//! `jotter` - an append-only message log kept in local key-value storage
//!
//! Messages are wrapped in timestamped [`Record`]s, appended to a
//! [`RecordStore`], and persisted as a single value under one key so the
//! list survives restarts.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod codec;
pub mod config;
pub mod error;
pub mod kv;
pub mod logging;
pub mod record;
pub mod store;

pub use codec::{LoadDiagnostic, LoadOutcome};
pub use config::Config;
pub use error::{Error, Result};
pub use kv::{KeyValueStore, MemoryStore, SqliteStore, StorageStats};
pub use logging::init_logging;
pub use record::{Record, EMPTY_MESSAGE_PLACEHOLDER};
pub use store::{RecordStore, RecordSummary, SubscriptionId, RECORDS_BACKUP_KEY, RECORDS_KEY};
