use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Something that can live in a [`RecordStore`]: it has a stable identity and a
/// sort key.
pub trait Record {
    type Id: Copy + Eq + Hash + Debug;

    fn id(&self) -> Self::Id;
    fn position(&self) -> i64;
}

#[derive(Debug, Clone)]
struct Slot<T> {
    seq: u64,
    record: T,
}

/// Identity-keyed records with a position-ordered read view.
///
/// Adding a record whose id is already stored replaces the stored fields but keeps
/// the original insertion slot, so ties on `position` keep resolving the same way.
#[derive(Debug, Clone)]
pub struct RecordStore<T: Record> {
    records: HashMap<T::Id, Slot<T>>,
    next_seq: u64,
}

impl<T: Record> Default for RecordStore<T> {
    fn default() -> Self {
        Self {
            records: HashMap::new(),
            next_seq: 0,
        }
    }
}

impl<T: Record> RecordStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `record`, overwriting any record with the same id.
    /// Returns `true` iff the id was not present before.
    pub fn add(&mut self, record: T) -> bool {
        match self.records.get_mut(&record.id()) {
            Some(slot) => {
                slot.record = record;
                false
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.records.insert(record.id(), Slot { seq, record });
                true
            }
        }
    }

    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.records.get(&id).map(|slot| &slot.record)
    }

    pub fn contains(&self, id: T::Id) -> bool {
        self.records.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records ascending by `position`, ties in insertion order.
    pub fn view(&self) -> Vec<&T> {
        let mut slots: Vec<&Slot<T>> = self.records.values().collect();
        slots.sort_by_key(|slot| (slot.record.position(), slot.seq));
        slots.into_iter().map(|slot| &slot.record).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: u64,
        position: i64,
        body: &'static str,
    }

    impl Record for Note {
        type Id = u64;

        fn id(&self) -> u64 {
            self.id
        }

        fn position(&self) -> i64 {
            self.position
        }
    }

    fn note(id: u64, position: i64, body: &'static str) -> Note {
        Note { id, position, body }
    }

    fn ids(store: &RecordStore<Note>) -> Vec<u64> {
        store.view().iter().map(|n| n.id).collect()
    }

    #[test]
    fn add_reports_new_ids_only() {
        let mut store = RecordStore::new();
        assert!(store.add(note(1, 0, "first")));
        assert!(!store.add(note(1, 0, "second")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(1).map(|n| n.body), Some("second"));
    }

    #[test]
    fn view_sorts_by_position() {
        let mut store = RecordStore::new();
        store.add(note(30, 3, "c"));
        store.add(note(10, 1, "a"));
        store.add(note(20, 2, "b"));
        assert_eq!(ids(&store), vec![10, 20, 30]);
    }

    #[test]
    fn equal_positions_keep_insertion_order() {
        let mut store = RecordStore::new();
        for id in [7, 3, 9, 1] {
            store.add(note(id, 5, "tie"));
        }
        assert_eq!(ids(&store), vec![7, 3, 9, 1]);
    }

    #[test]
    fn overwrite_keeps_original_slot() {
        let mut store = RecordStore::new();
        store.add(note(1, 0, "a"));
        store.add(note(2, 0, "b"));
        store.add(note(1, 0, "a2"));
        assert_eq!(ids(&store), vec![1, 2]);
    }

    #[test]
    fn overwrite_can_move_a_record() {
        let mut store = RecordStore::new();
        store.add(note(1, 1, "a"));
        store.add(note(2, 2, "b"));
        store.add(note(1, 3, "a moved"));
        assert_eq!(ids(&store), vec![2, 1]);
    }

    #[test]
    fn view_is_repeatable() {
        let mut store = RecordStore::new();
        store.add(note(2, 2, "b"));
        store.add(note(1, 1, "a"));
        assert_eq!(store.view(), store.view());
    }
}
