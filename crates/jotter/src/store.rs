//! The record store.
//!
//! [`RecordStore`] owns the authoritative in-memory list of records and keeps
//! a full copy of it under [`RECORDS_KEY`] in a [`KeyValueStore`]. The list is
//! loaded once when the store is opened; every [`RecordStore::add`] appends
//! and rewrites the whole persisted value before observers are told.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::codec::{self, LoadDiagnostic, LoadOutcome};
use crate::error::Result;
use crate::kv::KeyValueStore;
use crate::record::Record;

/// The single storage key the record list lives under.
pub const RECORDS_KEY: &str = "jotter.records";

/// Key that receives the raw stored value when it held unreadable entries,
/// written just before the first save would overwrite them.
pub const RECORDS_BACKUP_KEY: &str = "jotter.records.corrupt";

/// Handle returned by [`RecordStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&[Record])>;

/// Read the persisted record list from `backend`.
///
/// A missing key yields an empty outcome. Entries that fail to decode are
/// skipped and reported in [`LoadOutcome::diagnostics`].
///
/// # Errors
///
/// Returns an error only if the backend itself cannot be read.
pub fn load<S: KeyValueStore + ?Sized>(backend: &S) -> Result<LoadOutcome> {
    Ok(load_raw(backend)?.1)
}

/// Like [`load`], but also hands back the raw value when decoding was lossy.
fn load_raw<S: KeyValueStore + ?Sized>(backend: &S) -> Result<(Option<Vec<u8>>, LoadOutcome)> {
    match backend.get(RECORDS_KEY)? {
        Some(value) => {
            let outcome = codec::decode_list(&value);
            let raw = (!outcome.is_clean()).then_some(value);
            Ok((raw, outcome))
        }
        None => {
            debug!("No stored records under {}", RECORDS_KEY);
            Ok((None, LoadOutcome::default()))
        }
    }
}

/// Overwrite the persisted record list in `backend` with `records`.
///
/// # Errors
///
/// Returns an error if a record cannot be encoded or the backend write fails.
pub fn save<S: KeyValueStore + ?Sized>(backend: &mut S, records: &[Record]) -> Result<()> {
    let value = codec::encode_list(records)?;
    backend.set(RECORDS_KEY, &value)?;
    debug!("Saved {} records", records.len());
    Ok(())
}

/// Counts and time span of the records held by a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSummary {
    /// Number of records.
    pub total_records: usize,
    /// Earliest creation time among the records.
    pub oldest: Option<DateTime<Utc>>,
    /// Latest creation time among the records.
    pub newest: Option<DateTime<Utc>>,
}

/// Append-only list of records mirrored to key-value storage.
pub struct RecordStore<S> {
    backend: S,
    records: Vec<Record>,
    diagnostics: Vec<LoadDiagnostic>,
    /// Raw stored value still to be copied to [`RECORDS_BACKUP_KEY`].
    pending_backup: Option<Vec<u8>>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> RecordStore<S> {
    /// Open a store over `backend`, loading whatever it already holds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    pub fn open(backend: S) -> Result<Self> {
        let (pending_backup, outcome) = load_raw(&backend)?;

        if outcome.is_clean() {
            info!("Loaded {} records", outcome.records.len());
        } else {
            warn!(
                "Loaded {} records, skipped {} unreadable entries; the stored value will be kept under {} on the next save",
                outcome.records.len(),
                outcome.diagnostics.len(),
                RECORDS_BACKUP_KEY
            );
        }

        Ok(Self {
            backend,
            records: outcome.records,
            diagnostics: outcome.diagnostics,
            pending_backup,
            observers: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Append a new record and persist the full list.
    ///
    /// An empty `message` is stored as the placeholder text. Observers are
    /// notified after the write succeeds. If the write fails the record is
    /// not kept and observers are not called.
    ///
    /// If the stored value held unreadable entries when the store was
    /// opened, it is copied to [`RECORDS_BACKUP_KEY`] before being
    /// overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if the backup or the list cannot be persisted.
    pub fn add(&mut self, message: impl Into<String>) -> Result<Record> {
        if let Some(raw) = &self.pending_backup {
            self.backend.set(RECORDS_BACKUP_KEY, raw)?;
            warn!("Kept unreadable stored value under {}", RECORDS_BACKUP_KEY);
            self.pending_backup = None;
        }

        let record = Record::new(message);
        self.records.push(record.clone());

        if let Err(e) = save(&mut self.backend, &self.records) {
            self.records.pop();
            return Err(e);
        }

        debug!("Added record {}", record.id);
        self.notify();
        Ok(record)
    }

    /// The records in insertion order.
    #[must_use]
    pub fn list(&self) -> &[Record] {
        &self.records
    }

    /// Entries skipped when the store was opened.
    #[must_use]
    pub fn diagnostics(&self) -> &[LoadDiagnostic] {
        &self.diagnostics
    }

    /// Register a callback invoked with the full list after every `add`.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&[Record]) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Remove a callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(existing, _)| *existing != id);
        self.observers.len() != before
    }

    /// Summarize the records currently held.
    #[must_use]
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            total_records: self.records.len(),
            oldest: self.records.iter().map(|r| r.created_at).min(),
            newest: self.records.iter().map(|r| r.created_at).max(),
        }
    }

    /// Borrow the underlying backend.
    #[must_use]
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Consume the store and return its backend.
    #[must_use]
    pub fn into_backend(self) -> S {
        self.backend
    }

    fn notify(&mut self) {
        for (_, observer) in &mut self.observers {
            observer(&self.records);
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for RecordStore<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("backend", &self.backend)
            .field("records", &self.records.len())
            .field("diagnostics", &self.diagnostics.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}
