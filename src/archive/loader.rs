//! Resolution & load pipeline
//!
//! Resolves logical names to decompressed payloads: row lookup, at most
//! one alias hop, digest verification over the compressed bytes, then
//! bounded decompression. A missing name aborts the whole batch; a
//! corrupt or undecodable payload only blanks that entry and the batch
//! carries on.

use crate::archive::Archive;
use crate::codec;
use crate::digest::{self, DIGEST_LEN};
use crate::error::{ReliquaryError, Result};
use rusqlite::{params, OptionalExtension, Statement};
use thiserror::Error;
use tracing::{debug, warn};

const LOOKUP_SQL: &str = "SELECT alias, payload, digest FROM entries WHERE name = ?1";

/// Outcome of loading a single entry
///
/// Ownership of the decompressed buffer transfers to the caller. An
/// entry whose payload failed a per-entry check comes back as `Absent`
/// with the check that rejected it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    /// Decompressed payload bytes
    Loaded(Vec<u8>),
    /// The entry was found but produced no data
    Absent(AbsentReason),
}

/// Why an entry in an otherwise successful batch produced no data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbsentReason {
    /// The row's payload column is empty or NULL (e.g. an alias-only row)
    EmptyPayload,
    /// The stored digest is missing or shorter than [`DIGEST_LEN`] bytes
    ShortDigest,
    /// The stored digest does not match the compressed payload
    DigestMismatch,
    /// The payload failed to decompress or would exceed the ceiling
    DecodeFailed,
}

impl LoadResult {
    /// True when the entry yielded decompressed data
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadResult::Loaded(_))
    }

    /// Decompressed bytes, if any
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            LoadResult::Loaded(data) => Some(data),
            LoadResult::Absent(_) => None,
        }
    }

    /// Consume the result, yielding the buffer if one was loaded
    pub fn into_data(self) -> Option<Vec<u8>> {
        match self {
            LoadResult::Loaded(data) => Some(data),
            LoadResult::Absent(_) => None,
        }
    }

    /// Decompressed length; zero for absent entries
    pub fn len(&self) -> usize {
        self.data().map_or(0, <[u8]>::len)
    }

    /// True when no data was loaded
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A batch abort: a name or alias lookup failed at `index`
///
/// Results already completed for earlier indices stand as final and are
/// carried in `completed`; there is no rollback.
#[derive(Debug, Error)]
#[error("Batch aborted at entry {index} ({name}): {source}")]
pub struct BatchError {
    pub index: usize,
    pub name: String,
    pub completed: Vec<LoadResult>,
    #[source]
    pub source: ReliquaryError,
}

/// One row of the `entries` table, as the lookup statement sees it
struct EntryRow {
    alias: Option<String>,
    payload: Option<Vec<u8>>,
    digest: Option<Vec<u8>>,
}

fn lookup(stmt: &mut Statement<'_>, name: &str) -> Result<Option<EntryRow>> {
    stmt.query_row(params![name], |row| {
        Ok(EntryRow {
            alias: row.get(0)?,
            payload: row.get(1)?,
            digest: row.get(2)?,
        })
    })
    .optional()
    .map_err(ReliquaryError::from)
}

impl Archive {
    /// Load a batch of names, preserving order
    ///
    /// One prepared lookup statement serves the whole batch. A missing
    /// name or alias target, or any statement failure, aborts the batch
    /// with a [`BatchError`]; per-entry integrity or decode failures
    /// yield [`LoadResult::Absent`] and the batch continues.
    pub fn load_batch(&self, names: &[&str]) -> std::result::Result<Vec<LoadResult>, BatchError> {
        let mut completed = Vec::with_capacity(names.len());

        // Statement lifetime is scoped to this call; it is finalized on
        // every exit path, including aborts.
        let mut stmt = match self.conn.prepare(LOOKUP_SQL) {
            Ok(stmt) => stmt,
            Err(e) => {
                return Err(BatchError {
                    index: 0,
                    name: names.first().map(|n| n.to_string()).unwrap_or_default(),
                    completed,
                    source: e.into(),
                });
            }
        };

        for (index, &name) in names.iter().enumerate() {
            match load_entry(&mut stmt, name) {
                Ok(result) => completed.push(result),
                Err(source) => {
                    return Err(BatchError {
                        index,
                        name: name.to_string(),
                        completed,
                        source,
                    });
                }
            }
        }

        Ok(completed)
    }

    /// Load a single name; a batch of one with the slot unwrapped
    pub fn load_one(&self, name: &str) -> Result<LoadResult> {
        let mut results = self.load_batch(&[name]).map_err(|e| e.source)?;
        results
            .pop()
            .ok_or_else(|| ReliquaryError::Internal("empty batch result".to_string()))
    }
}

fn load_entry(stmt: &mut Statement<'_>, name: &str) -> Result<LoadResult> {
    let mut row = lookup(stmt, name)?.ok_or_else(|| ReliquaryError::EntryNotFound(name.to_string()))?;

    // At most one alias hop; the resolved row's own alias column is
    // never consulted.
    if let Some(target) = row.alias.take().filter(|alias| !alias.is_empty()) {
        debug!("resolving alias {} -> {}", name, target);
        row = match lookup(stmt, &target)? {
            Some(resolved) => resolved,
            None => {
                return Err(ReliquaryError::AliasNotFound {
                    name: name.to_string(),
                    target,
                });
            }
        };
    }

    Ok(extract_payload(name, row))
}

/// Per-entry integrity and decode checks; failures here never abort a batch
fn extract_payload(name: &str, row: EntryRow) -> LoadResult {
    let payload = match row.payload {
        Some(payload) if !payload.is_empty() => payload,
        _ => return LoadResult::Absent(AbsentReason::EmptyPayload),
    };

    let digest = match row.digest {
        Some(digest) if digest.len() >= DIGEST_LEN => digest,
        _ => {
            warn!("entry {}: stored digest missing or shorter than {} bytes", name, DIGEST_LEN);
            return LoadResult::Absent(AbsentReason::ShortDigest);
        }
    };

    if !digest::verify(&payload, &digest[..DIGEST_LEN]) {
        warn!(
            "entry {}: digest mismatch (stored {})",
            name,
            hex::encode(&digest[..DIGEST_LEN])
        );
        return LoadResult::Absent(AbsentReason::DigestMismatch);
    }

    match codec::decompress(&payload) {
        Ok(data) => LoadResult::Loaded(data),
        Err(e) => {
            warn!("entry {}: {}", name, e);
            LoadResult::Absent(AbsentReason::DecodeFailed)
        }
    }
}
