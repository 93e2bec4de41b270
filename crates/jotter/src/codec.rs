//! Persisted value format.
//!
//! A record list is stored as a JSON array of strings. Each string is one
//! record encoded on its own, so a damaged entry can be dropped without
//! losing its neighbours.

use std::fmt;

use serde_json::Value;
use tracing::{trace, warn};

use crate::error::{Error, Result};
use crate::record::Record;

/// A problem found while decoding a persisted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadDiagnostic {
    /// Position of the offending blob, or `None` when the envelope itself
    /// could not be read.
    pub index: Option<usize>,
    /// Decoder error message.
    pub reason: String,
}

impl fmt::Display for LoadDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            Some(index) => write!(f, "entry {index}: {}", self.reason),
            None => write!(f, "stored value: {}", self.reason),
        }
    }
}

/// Records decoded from a persisted value, plus whatever had to be skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Successfully decoded records, in stored order.
    pub records: Vec<Record>,
    /// One entry per blob (or envelope) that failed to decode.
    pub diagnostics: Vec<LoadDiagnostic>,
}

impl LoadOutcome {
    /// Check whether every stored entry decoded cleanly.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Encode a single record as a standalone blob.
///
/// # Errors
///
/// Returns an error if the record cannot be serialized.
pub fn encode_record(record: &Record) -> Result<String> {
    serde_json::to_string(record).map_err(|source| Error::RecordEncode {
        id: record.id,
        source,
    })
}

/// Decode a single record blob.
///
/// # Errors
///
/// Returns the decoder error if the blob is not a valid record.
pub fn decode_record(blob: &str) -> std::result::Result<Record, serde_json::Error> {
    serde_json::from_str(blob)
}

/// Encode a full list into the persisted value.
///
/// # Errors
///
/// Returns an error if any record cannot be serialized.
pub fn encode_list(records: &[Record]) -> Result<Vec<u8>> {
    let blobs = records
        .iter()
        .map(encode_record)
        .collect::<Result<Vec<_>>>()?;
    Ok(serde_json::to_vec(&blobs)?)
}

/// Decode a persisted value, skipping entries that do not parse.
///
/// Never fails. Each array element is decoded on its own, so one bad entry
/// costs only itself. A value that is not a JSON array produces an empty
/// list and a single diagnostic with no index.
#[must_use]
pub fn decode_list(value: &[u8]) -> LoadOutcome {
    let elements: Vec<Value> = match serde_json::from_slice(value) {
        Ok(elements) => elements,
        Err(e) => {
            warn!("Stored value is not a list of records: {}", e);
            return LoadOutcome {
                records: Vec::new(),
                diagnostics: vec![LoadDiagnostic {
                    index: None,
                    reason: e.to_string(),
                }],
            };
        }
    };

    let mut outcome = LoadOutcome::default();
    for (index, element) in elements.iter().enumerate() {
        let decoded = match element {
            Value::String(blob) => decode_record(blob).map_err(|e| e.to_string()),
            other => Err(format!("expected an encoded record string, found {other}")),
        };

        match decoded {
            Ok(record) => outcome.records.push(record),
            Err(reason) => {
                warn!("Skipping malformed record at index {}: {}", index, reason);
                outcome.diagnostics.push(LoadDiagnostic {
                    index: Some(index),
                    reason,
                });
            }
        }
    }

    trace!(
        "Decoded {} records ({} skipped)",
        outcome.records.len(),
        outcome.diagnostics.len()
    );
    outcome
}
