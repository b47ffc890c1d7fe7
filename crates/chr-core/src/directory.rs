//! County reference directory.
//!
//! Built once per run from every source that carries county codes. Supplies
//! output names and resolves name/state keys for releases without codes.

use std::collections::BTreeMap;

use chr_model::{CountyFips, CountyKey, CountyRecord};
use chr_transform::county_key;

#[derive(Debug, Clone, PartialEq, Eq)]
enum KeyEntry {
    Unique(CountyFips),
    Ambiguous,
}

/// Outcome of a name/state lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyLookup<'a> {
    Found(&'a CountyFips),
    Unknown,
    /// Two or more counties share the key; the row cannot be placed.
    Ambiguous,
}

#[derive(Debug, Clone, Default)]
pub struct CountyDirectory {
    records: BTreeMap<CountyFips, CountyRecord>,
    keys: BTreeMap<CountyKey, KeyEntry>,
}

impl CountyDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record unless the county is already known. Returns whether the
    /// record was added.
    pub fn insert(&mut self, record: CountyRecord) -> bool {
        if self.records.contains_key(&record.fips) {
            return false;
        }
        let state = record.state_abbr.as_deref().unwrap_or(&record.state);
        if let Ok(key) = county_key(&record.county, state) {
            self.keys
                .entry(key)
                .and_modify(|entry| {
                    if *entry != KeyEntry::Unique(record.fips.clone()) {
                        *entry = KeyEntry::Ambiguous;
                    }
                })
                .or_insert_with(|| KeyEntry::Unique(record.fips.clone()));
        }
        self.records.insert(record.fips.clone(), record);
        true
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = CountyRecord>) -> usize {
        let mut added = 0;
        for record in records {
            if self.insert(record) {
                added += 1;
            }
        }
        added
    }

    pub fn get(&self, fips: &CountyFips) -> Option<&CountyRecord> {
        self.records.get(fips)
    }

    pub fn resolve_key(&self, key: &CountyKey) -> KeyLookup<'_> {
        match self.keys.get(key) {
            Some(KeyEntry::Unique(fips)) => KeyLookup::Found(fips),
            Some(KeyEntry::Ambiguous) => KeyLookup::Ambiguous,
            None => KeyLookup::Unknown,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
