// src/ledger/pool.rs
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::transaction::{OutputRecord, UtxoId};
use crate::error::LedgerError;

/// Authoritative set of unspent outputs.
///
/// Every key was created by an accepted transaction and has not been spent by a
/// later one. The pool holds no validation logic; callers uphold the insert/remove
/// contracts below.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<(UtxoId, OutputRecord)>",
    into = "Vec<(UtxoId, OutputRecord)>"
)]
pub struct UtxoPool {
    utxos: HashMap<UtxoId, OutputRecord>,
}

impl UtxoPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &UtxoId) -> bool {
        self.utxos.contains_key(id)
    }

    pub fn get(&self, id: &UtxoId) -> Option<&OutputRecord> {
        self.utxos.get(id)
    }

    /// Add a new unspent output.
    ///
    /// # Panics
    /// If `id` is already present.
    pub fn insert(&mut self, id: UtxoId, record: OutputRecord) {
        let previous = self.utxos.insert(id, record);
        assert!(previous.is_none(), "utxo {} inserted twice", id);
    }

    /// Remove a spent output, returning its record.
    ///
    /// # Panics
    /// If `id` is absent.
    pub fn remove(&mut self, id: &UtxoId) -> OutputRecord {
        match self.utxos.remove(id) {
            Some(record) => record,
            None => panic!("utxo {} removed but not in pool", id),
        }
    }

    pub fn len(&self) -> usize {
        self.utxos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.utxos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&UtxoId, &OutputRecord)> {
        self.utxos.iter()
    }

    pub fn utxo_ids(&self) -> Vec<UtxoId> {
        self.utxos.keys().copied().collect()
    }

    /// Sum of all unspent values.
    pub fn total_value(&self) -> i128 {
        self.utxos.values().map(|r| r.value as i128).sum()
    }
}

impl FromIterator<(UtxoId, OutputRecord)> for UtxoPool {
    fn from_iter<I: IntoIterator<Item = (UtxoId, OutputRecord)>>(iter: I) -> Self {
        let mut pool = UtxoPool::new();
        pool.extend(iter);
        pool
    }
}

impl Extend<(UtxoId, OutputRecord)> for UtxoPool {
    fn extend<I: IntoIterator<Item = (UtxoId, OutputRecord)>>(&mut self, iter: I) {
        for (id, record) in iter {
            self.insert(id, record);
        }
    }
}

// Serialized as an entry list so formats with string-only map keys can carry it.
impl From<UtxoPool> for Vec<(UtxoId, OutputRecord)> {
    fn from(pool: UtxoPool) -> Self {
        pool.utxos.into_iter().collect()
    }
}

impl TryFrom<Vec<(UtxoId, OutputRecord)>> for UtxoPool {
    type Error = LedgerError;

    fn try_from(entries: Vec<(UtxoId, OutputRecord)>) -> Result<Self, Self::Error> {
        let mut pool = UtxoPool::new();
        for (id, record) in entries {
            if pool.contains(&id) {
                return Err(LedgerError::DuplicateUtxo(id));
            }
            pool.insert(id, record);
        }
        Ok(pool)
    }
}
