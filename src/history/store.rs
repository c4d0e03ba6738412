use std::collections::BTreeSet;

use super::entry::ClipboardEntry;

pub const DEFAULT_CAPACITY: usize = 24;

/// Bounded, deduplicating clipboard history. Position 0 is the newest entry.
///
/// Pins are position markers, not entry identities: they move with the
/// entries on insertion and removal, but capacity eviction drops the tail
/// regardless of pins. Only [`HistoryStore::clear_items`] honours pins.
///
/// Every mutating method returns whether the store changed.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    entries: Vec<ClipboardEntry>,
    pinned: BTreeSet<usize>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity),
            pinned: BTreeSet::new(),
            capacity,
        }
    }

    pub fn entries(&self) -> &[ClipboardEntry] {
        &self.entries
    }

    pub fn pinned(&self) -> &BTreeSet<usize> {
        &self.pinned
    }

    pub fn get(&self, position: usize) -> Option<&ClipboardEntry> {
        self.entries.get(position)
    }

    pub fn is_pinned(&self, position: usize) -> bool {
        self.pinned.contains(&position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn add_item(&mut self, content: impl Into<String>) -> bool {
        self.add_entry(ClipboardEntry::text(content))
    }

    pub fn add_entry(&mut self, entry: ClipboardEntry) -> bool {
        if entry.content().is_empty() {
            return false;
        }
        if self
            .entries
            .first()
            .is_some_and(|newest| newest.content() == entry.content())
        {
            return false;
        }

        if let Some(duplicate) = self
            .entries
            .iter()
            .position(|existing| existing.content() == entry.content())
        {
            self.remove_item(duplicate);
        }

        self.entries.insert(0, entry);
        self.pinned = self.pinned.iter().map(|position| position + 1).collect();

        if self.entries.len() > self.capacity {
            self.entries.truncate(self.capacity);
            let capacity = self.capacity;
            self.pinned.retain(|position| *position < capacity);
        }
        true
    }

    /// Out-of-range positions are ignored; a UI row may outlive its entry.
    pub fn remove_item(&mut self, position: usize) -> bool {
        if position >= self.entries.len() {
            return false;
        }

        self.entries.remove(position);
        self.pinned = self
            .pinned
            .iter()
            .filter(|pinned| **pinned != position)
            .map(|pinned| {
                if *pinned > position {
                    pinned - 1
                } else {
                    *pinned
                }
            })
            .collect();
        true
    }

    /// Keeps only pinned entries, compacted to the front in their original
    /// order and still pinned.
    pub fn clear_items(&mut self) -> bool {
        let before = self.entries.len();
        let pinned = std::mem::take(&mut self.pinned);
        let mut position = 0;
        self.entries.retain(|_| {
            let keep = pinned.contains(&position);
            position += 1;
            keep
        });
        self.pinned = (0..self.entries.len()).collect();
        self.entries.len() != before
    }

    pub fn toggle_pin(&mut self, position: usize) -> bool {
        if position >= self.entries.len() {
            return false;
        }
        if !self.pinned.remove(&position) {
            self.pinned.insert(position);
        }
        true
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(store: &HistoryStore) -> Vec<&str> {
        store.entries().iter().map(ClipboardEntry::content).collect()
    }

    fn pinned(store: &HistoryStore) -> Vec<usize> {
        store.pinned().iter().copied().collect()
    }

    /// Builds a store whose position order matches `items` (index 0 newest).
    fn store_with(items: &[&str]) -> HistoryStore {
        let mut store = HistoryStore::default();
        for item in items.iter().rev() {
            store.add_item(*item);
        }
        store
    }

    #[test]
    fn add_item_inserts_newest_first() {
        let store = store_with(&["c", "b", "a"]);
        assert_eq!(contents(&store), vec!["c", "b", "a"]);
    }

    #[test]
    fn add_item_ignores_empty_content() {
        let mut store = store_with(&["a"]);
        assert!(!store.add_item(""));
        assert_eq!(contents(&store), vec!["a"]);
    }

    #[test]
    fn add_item_twice_is_a_no_op_on_the_second_call() {
        let mut store = store_with(&["b", "a"]);
        store.toggle_pin(1);
        let before = store.entries().to_vec();

        assert!(store.add_item("x"));
        let after_first = store.entries().to_vec();
        assert!(!store.add_item("x"));

        assert_ne!(before.len(), after_first.len());
        assert_eq!(store.entries(), after_first.as_slice());
        assert_eq!(pinned(&store), vec![2]);
    }

    #[test]
    fn add_duplicate_relocates_to_front_and_tracks_pins() {
        let mut store = store_with(&["A", "B", "C"]);
        store.toggle_pin(1);

        assert!(store.add_item("C"));

        assert_eq!(contents(&store), vec!["C", "A", "B"]);
        assert_eq!(pinned(&store), vec![2]);
    }

    #[test]
    fn add_duplicate_of_pinned_entry_moves_entry_and_drops_pin() {
        let mut store = store_with(&["A", "B", "C"]);
        store.toggle_pin(2);

        store.add_item("C");

        assert_eq!(contents(&store), vec!["C", "A", "B"]);
        assert!(pinned(&store).is_empty());
    }

    #[test]
    fn length_never_exceeds_capacity() {
        let mut store = HistoryStore::new(5);
        for index in 0..50 {
            store.add_item(format!("item-{index}"));
            assert!(store.len() <= store.capacity());
        }
        assert_eq!(contents(&store)[0], "item-49");
        assert_eq!(contents(&store)[4], "item-45");
    }

    #[test]
    fn capacity_eviction_ignores_pins_unlike_clear() {
        // Pins protect against clear_items but not against overflow; this
        // asymmetry is kept on purpose and pinned down here.
        let mut store = HistoryStore::new(3);
        store.add_item("oldest");
        store.toggle_pin(0);
        store.add_item("b");
        store.add_item("c");
        assert_eq!(pinned(&store), vec![2]);

        store.add_item("d");

        assert_eq!(contents(&store), vec!["d", "c", "b"]);
        assert!(pinned(&store).is_empty());
    }

    #[test]
    fn remove_item_renumbers_pins_above_removed_position() {
        let mut store = store_with(&["a", "b", "c", "d"]);
        store.toggle_pin(0);
        store.toggle_pin(1);
        store.toggle_pin(3);

        assert!(store.remove_item(1));

        assert_eq!(contents(&store), vec!["a", "c", "d"]);
        assert_eq!(pinned(&store), vec![0, 2]);
    }

    #[test]
    fn remove_item_out_of_range_leaves_store_unchanged() {
        let mut store = store_with(&["a", "b"]);
        store.toggle_pin(1);
        let entries = store.entries().to_vec();
        let pins = store.pinned().clone();

        assert!(!store.remove_item(2));
        assert!(!store.remove_item(usize::MAX));

        assert_eq!(store.entries(), entries.as_slice());
        assert_eq!(store.pinned(), &pins);
    }

    #[test]
    fn clear_items_keeps_pinned_entries_compacted_and_pinned() {
        let mut store = store_with(&["A", "B", "C", "D"]);
        store.toggle_pin(1);
        store.toggle_pin(3);

        assert!(store.clear_items());

        assert_eq!(contents(&store), vec!["B", "D"]);
        assert_eq!(pinned(&store), vec![0, 1]);
    }

    #[test]
    fn clear_items_without_pins_empties_store() {
        let mut store = store_with(&["a", "b"]);
        assert!(store.clear_items());
        assert!(store.is_empty());
        assert!(!store.clear_items());
    }

    #[test]
    fn toggle_pin_flips_marker_and_ignores_out_of_range() {
        let mut store = store_with(&["a", "b"]);
        assert!(store.toggle_pin(1));
        assert!(store.is_pinned(1));
        assert!(store.toggle_pin(1));
        assert!(!store.is_pinned(1));
        assert!(!store.toggle_pin(7));
        assert!(pinned(&store).is_empty());
    }
}
