//! In-memory registry of tracked quotes.
//!
//! `QuoteStore` owns the authoritative list of `QuoteRecord`s, unique by id and
//! kept in insertion order. It exposes the host-facing operations:
//!
//! - `add` / `update` / `remove` — explicit mutations returning `DuplicateId` or
//!   `NotFound` instead of silently doing nothing.
//! - `get` / `get_many` / `find_by_symbol` / `list` — reads that hand out copies.
//! - `replace_all` — swaps the whole contents at the end of a refresh tick.
//!
//! Design notes:
//! - The store is not synchronized; `SharedQuoteStore` wraps it in a single
//!   `Mutex` so host mutations and the scheduler's read-modify-write never
//!   interleave.
//! - Lookups by id go through a `HashMap` index of positions, rebuilt after
//!   removals and full replacements.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use quote_common::{QuoteError, QuoteId, QuoteRecord, Result};

/// Ordered collection of quotes, unique by id.
#[derive(Debug, Default)]
pub struct QuoteStore {
    records: Vec<QuoteRecord>,
    index: HashMap<QuoteId, usize>,
}

impl QuoteStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new record. Fails with `DuplicateId` if its id is already present.
    pub fn add(&mut self, record: QuoteRecord) -> Result<()> {
        if self.index.contains_key(record.id()) {
            return Err(QuoteError::DuplicateId(record.id().clone()));
        }
        self.index.insert(record.id().clone(), self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Replace the record with the same id, keeping its position.
    pub fn update(&mut self, record: QuoteRecord) -> Result<()> {
        match self.index.get(record.id()) {
            Some(&pos) => {
                self.records[pos] = record;
                Ok(())
            }
            None => Err(QuoteError::NotFound(record.id().clone())),
        }
    }

    /// Stop tracking `id` and hand back the removed record.
    pub fn remove(&mut self, id: &QuoteId) -> Result<QuoteRecord> {
        let pos = self
            .index
            .remove(id)
            .ok_or_else(|| QuoteError::NotFound(id.clone()))?;
        let removed = self.records.remove(pos);
        for record in &self.records[pos..] {
            if let Some(slot) = self.index.get_mut(record.id()) {
                *slot -= 1;
            }
        }
        Ok(removed)
    }

    /// Copy of the record tracked under `id`.
    pub fn get(&self, id: &QuoteId) -> Option<QuoteRecord> {
        self.index.get(id).map(|&pos| self.records[pos].clone())
    }

    /// Copies of the records whose id is in `ids`, in store order.
    pub fn get_many(&self, ids: &[QuoteId]) -> Vec<QuoteRecord> {
        self.records
            .iter()
            .filter(|r| ids.contains(r.id()))
            .cloned()
            .collect()
    }

    /// First record tracking `symbol`, compared case-insensitively.
    pub fn find_by_symbol(&self, symbol: &str) -> Option<QuoteRecord> {
        let symbol = symbol.trim();
        self.records
            .iter()
            .find(|r| r.symbol().eq_ignore_ascii_case(symbol))
            .cloned()
    }

    /// Snapshot copy of every record, in insertion order.
    pub fn list(&self) -> Vec<QuoteRecord> {
        self.records.clone()
    }

    /// Swap the whole contents for `records`.
    ///
    /// Fails with `DuplicateId` and leaves the store untouched if `records`
    /// repeats an id.
    pub fn replace_all(&mut self, records: Vec<QuoteRecord>) -> Result<()> {
        let mut index = HashMap::with_capacity(records.len());
        for (pos, record) in records.iter().enumerate() {
            if index.insert(record.id().clone(), pos).is_some() {
                return Err(QuoteError::DuplicateId(record.id().clone()));
            }
        }
        self.records = records;
        self.index = index;
        Ok(())
    }

    /// Whether `id` is tracked.
    pub fn contains(&self, id: &QuoteId) -> bool {
        self.index.contains_key(id)
    }

    /// Number of tracked records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Thread-safe handle to a `QuoteStore`, cheap to clone.
///
/// Every operation takes the same lock the refresh scheduler holds during its
/// read-simulate-write step, so a host `add` can never be lost to a tick.
#[derive(Debug, Clone, Default)]
pub struct SharedQuoteStore {
    inner: Arc<Mutex<QuoteStore>>,
}

impl SharedQuoteStore {
    /// Create an empty shared store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock the store for a multi-step operation.
    pub fn lock(&self) -> Result<MutexGuard<'_, QuoteStore>> {
        Ok(self.inner.lock()?)
    }

    /// See [`QuoteStore::add`].
    pub fn add(&self, record: QuoteRecord) -> Result<()> {
        self.lock()?.add(record)
    }

    /// See [`QuoteStore::update`].
    pub fn update(&self, record: QuoteRecord) -> Result<()> {
        self.lock()?.update(record)
    }

    /// See [`QuoteStore::remove`].
    pub fn remove(&self, id: &QuoteId) -> Result<QuoteRecord> {
        self.lock()?.remove(id)
    }

    /// See [`QuoteStore::get`].
    pub fn get(&self, id: &QuoteId) -> Result<Option<QuoteRecord>> {
        Ok(self.lock()?.get(id))
    }

    /// See [`QuoteStore::get_many`].
    pub fn get_many(&self, ids: &[QuoteId]) -> Result<Vec<QuoteRecord>> {
        Ok(self.lock()?.get_many(ids))
    }

    /// See [`QuoteStore::find_by_symbol`].
    pub fn find_by_symbol(&self, symbol: &str) -> Result<Option<QuoteRecord>> {
        Ok(self.lock()?.find_by_symbol(symbol))
    }

    /// See [`QuoteStore::list`].
    pub fn list(&self) -> Result<Vec<QuoteRecord>> {
        Ok(self.lock()?.list())
    }

    /// See [`QuoteStore::len`].
    pub fn len(&self) -> Result<usize> {
        Ok(self.lock()?.len())
    }

    /// See [`QuoteStore::is_empty`].
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.lock()?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_common::Prices;
    use rust_decimal_macros::dec;

    fn record(id: &str, symbol: &str) -> QuoteRecord {
        QuoteRecord::with_id(
            QuoteId::from(id),
            symbol,
            Prices::new(dec!(14.32), dec!(1), dec!(2), dec!(3), dec!(4)),
        )
        .unwrap()
    }

    fn ids(store: &QuoteStore) -> Vec<String> {
        store.list().iter().map(|r| r.id().to_string()).collect()
    }

    #[test]
    fn add_then_get_returns_the_same_record() {
        let mut store = QuoteStore::new();
        let abev = record("1", "ABEV3");
        store.add(abev.clone()).unwrap();
        assert_eq!(store.get(&QuoteId::from("1")), Some(abev));
        assert!(store.contains(&QuoteId::from("1")));
    }

    #[test]
    fn duplicate_add_fails_and_leaves_store_unchanged() {
        let mut store = QuoteStore::new();
        store.add(record("1", "ABEV3")).unwrap();

        let result = store.add(record("1", "AZUL4"));
        assert!(matches!(result, Err(QuoteError::DuplicateId(id)) if id.as_str() == "1"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(&QuoteId::from("1")).unwrap().symbol(), "ABEV3");
    }

    #[test]
    fn update_keeps_position() {
        let mut store = QuoteStore::new();
        store.add(record("1", "ABEV3")).unwrap();
        store.add(record("2", "AZUL4")).unwrap();
        store.add(record("3", "BTOW3")).unwrap();

        let moved = QuoteRecord::with_id(
            QuoteId::from("2"),
            "AZUL4",
            Prices::new(dec!(20), dec!(10), dec!(20), dec!(30), dec!(40)),
        )
        .unwrap();
        store.update(moved).unwrap();

        assert_eq!(ids(&store), vec!["1", "2", "3"]);
        assert_eq!(store.list()[1].last_price(), dec!(20));
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let mut store = QuoteStore::new();
        let result = store.update(record("9", "ABEV3"));
        assert!(matches!(result, Err(QuoteError::NotFound(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn remove_absent_id_fails_without_changing_size() {
        let mut store = QuoteStore::new();
        store.add(record("1", "ABEV3")).unwrap();
        let result = store.remove(&QuoteId::from("2"));
        assert!(matches!(result, Err(QuoteError::NotFound(_))));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_reindexes_following_records() {
        let mut store = QuoteStore::new();
        for (id, symbol) in [("1", "ABEV3"), ("2", "AZUL4"), ("3", "BTOW3"), ("4", "B3SA3")] {
            store.add(record(id, symbol)).unwrap();
        }
        let removed = store.remove(&QuoteId::from("2")).unwrap();
        assert_eq!(removed.symbol(), "AZUL4");

        assert_eq!(ids(&store), vec!["1", "3", "4"]);
        assert_eq!(store.get(&QuoteId::from("4")).unwrap().symbol(), "B3SA3");
        store.update(record("3", "BTOW3")).unwrap();
        assert!(store.remove(&QuoteId::from("4")).is_ok());
        assert_eq!(ids(&store), vec!["1", "3"]);
    }

    #[test]
    fn list_is_a_snapshot_in_insertion_order() {
        let mut store = QuoteStore::new();
        store.add(record("b", "AZUL4")).unwrap();
        store.add(record("a", "ABEV3")).unwrap();
        let snapshot = store.list();
        store.remove(&QuoteId::from("b")).unwrap();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].id().as_str(), "b");
        assert_eq!(ids(&store), vec!["a"]);
    }

    #[test]
    fn replace_all_rejects_repeated_ids() {
        let mut store = QuoteStore::new();
        store.add(record("1", "ABEV3")).unwrap();

        let result = store.replace_all(vec![record("2", "AZUL4"), record("2", "BTOW3")]);
        assert!(matches!(result, Err(QuoteError::DuplicateId(_))));
        assert_eq!(ids(&store), vec!["1"]);

        store
            .replace_all(vec![record("2", "AZUL4"), record("3", "BTOW3")])
            .unwrap();
        assert_eq!(ids(&store), vec!["2", "3"]);
        assert!(!store.contains(&QuoteId::from("1")));
    }

    #[test]
    fn get_many_and_find_by_symbol() {
        let mut store = QuoteStore::new();
        store.add(record("1", "ABEV3")).unwrap();
        store.add(record("2", "AZUL4")).unwrap();
        store.add(record("3", "BTOW3")).unwrap();

        let picked = store.get_many(&[
            QuoteId::from("3"),
            QuoteId::from("1"),
            QuoteId::from("x"),
        ]);
        let picked: Vec<&str> = picked.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(picked, vec!["1", "3"]);

        assert_eq!(store.find_by_symbol("azul4").unwrap().id().as_str(), "2");
        assert!(store.find_by_symbol("PETR4").is_none());
    }

    #[test]
    fn shared_store_serializes_access() {
        let shared = SharedQuoteStore::new();
        let clone = shared.clone();
        clone.add(record("1", "ABEV3")).unwrap();
        assert_eq!(shared.len().unwrap(), 1);
        assert!(shared.get(&QuoteId::from("1")).unwrap().is_some());
        assert!(matches!(
            shared.add(record("1", "ABEV3")),
            Err(QuoteError::DuplicateId(_))
        ));
    }
}
