//! Transaction store: the whole record list, loaded and saved as one blob

use std::collections::HashSet;
use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::record::TransactionRecord;
use crate::storage::Storage;
use crate::tag::Tag;

/// Key the record list lives under unless configured otherwise
pub const DEFAULT_KEY: &str = "transactions";

/// Owns the persisted transaction list.
///
/// Mutations only touch memory; call [`TransactionStore::save`] to write
/// the full list back under the store key.
#[derive(Debug)]
pub struct TransactionStore<S: Storage> {
    storage: S,
    key: String,
    records: Vec<TransactionRecord>,
    next_seq: u64,
}

impl<S: Storage> TransactionStore<S> {
    /// Load the record list stored under `key`. A missing key is an empty store.
    pub fn load(storage: S, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let records: Vec<TransactionRecord> = match storage.get(&key)? {
            Some(blob) if !blob.trim().is_empty() => serde_json::from_str(&blob)
                .map_err(|source| CoreError::Corrupt {
                    key: key.clone(),
                    source,
                })?,
            _ => Vec::new(),
        };
        debug!(key = %key, count = records.len(), "loaded transactions");

        let next_seq = records
            .iter()
            .filter_map(|r| r.id.strip_prefix("txn-")?.parse::<u64>().ok())
            .max()
            .map_or(1, |n| n + 1);

        Ok(Self {
            storage,
            key,
            records,
            next_seq,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn records(&self) -> &[TransactionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&TransactionRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Append records. Records with an empty id, or an id already present,
    /// are given a fresh `txn-<n>` id. Returns the number appended.
    pub fn import(&mut self, incoming: Vec<TransactionRecord>) -> usize {
        let mut seen: HashSet<String> = self.records.iter().map(|r| r.id.clone()).collect();
        let count = incoming.len();
        for mut record in incoming {
            if record.id.trim().is_empty() || seen.contains(&record.id) {
                record.id = self.fresh_id(&seen);
            }
            seen.insert(record.id.clone());
            self.records.push(record);
        }
        info!(count, total = self.records.len(), "imported transactions");
        count
    }

    /// Add `tag` to every record whose id is listed. Returns how many changed.
    pub fn add_tag(&mut self, ids: &[String], tag: Tag) -> usize {
        self.for_ids(ids, |r| r.add_tag(tag))
    }

    pub fn remove_tag(&mut self, ids: &[String], tag: Tag) -> usize {
        self.for_ids(ids, |r| r.remove_tag(tag))
    }

    pub fn accept_suggested(&mut self, ids: &[String]) -> usize {
        self.for_ids(ids, TransactionRecord::accept_suggested)
    }

    /// Remove every record whose id is listed. Returns how many were removed.
    pub fn delete(&mut self, ids: &[String]) -> usize {
        let before = self.records.len();
        self.records.retain(|r| !ids.contains(&r.id));
        before - self.records.len()
    }

    /// Drop all records and the stored blob
    pub fn clear(&mut self) -> Result<()> {
        self.records.clear();
        self.next_seq = 1;
        self.storage.remove(&self.key)?;
        info!(key = %self.key, "cleared transactions");
        Ok(())
    }

    /// Write the whole record list back to storage
    pub fn save(&mut self) -> Result<()> {
        let blob = serde_json::to_string(&self.records)?;
        self.storage.set(&self.key, &blob)?;
        debug!(key = %self.key, count = self.records.len(), "saved transactions");
        Ok(())
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    fn for_ids(&mut self, ids: &[String], mut f: impl FnMut(&mut TransactionRecord) -> bool) -> usize {
        self.records
            .iter_mut()
            .filter(|r| ids.contains(&r.id))
            .map(|r| f(r))
            .filter(|changed| *changed)
            .count()
    }

    fn fresh_id(&mut self, taken: &HashSet<String>) -> String {
        loop {
            let id = format!("txn-{}", self.next_seq);
            self.next_seq += 1;
            if !taken.contains(&id) {
                return id;
            }
        }
    }
}
