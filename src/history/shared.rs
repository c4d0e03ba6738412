use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;

use super::entry::ClipboardEntry;
use super::store::HistoryStore;

#[derive(Debug)]
struct Guarded {
    store: HistoryStore,
    revision: u64,
}

impl Guarded {
    fn apply(&mut self, mutation: impl FnOnce(&mut HistoryStore) -> bool) -> bool {
        let changed = mutation(&mut self.store);
        if changed {
            self.revision = self.revision.wrapping_add(1);
        }
        changed
    }
}

/// Thread-safe handle to the single history store of a session.
///
/// The poller thread and the UI thread each hold a clone. Every mutation
/// runs under one lock and bumps `revision` when it changed the store, which
/// is the refresh signal the UI polls for.
#[derive(Debug, Clone)]
pub struct SharedHistory {
    inner: Arc<Mutex<Guarded>>,
}

impl SharedHistory {
    pub fn new(store: HistoryStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Guarded { store, revision: 0 })),
        }
    }

    pub fn add_item(&self, content: impl Into<String>) -> bool {
        let content = content.into();
        self.inner.lock().apply(|store| store.add_item(content))
    }

    pub fn add_entry(&self, entry: ClipboardEntry) -> bool {
        self.inner.lock().apply(|store| store.add_entry(entry))
    }

    pub fn remove_item(&self, position: usize) -> bool {
        self.inner.lock().apply(|store| store.remove_item(position))
    }

    pub fn clear_items(&self) -> bool {
        self.inner.lock().apply(HistoryStore::clear_items)
    }

    pub fn toggle_pin(&self, position: usize) -> bool {
        self.inner.lock().apply(|store| store.toggle_pin(position))
    }

    pub fn revision(&self) -> u64 {
        self.inner.lock().revision
    }

    pub fn content_at(&self, position: usize) -> Option<String> {
        self.inner
            .lock()
            .store
            .get(position)
            .map(|entry| entry.content().to_string())
    }

    /// Copies the current view out from under the lock.
    pub fn snapshot(&self) -> HistorySnapshot {
        let guarded = self.inner.lock();
        HistorySnapshot {
            entries: guarded.store.entries().to_vec(),
            pinned: guarded.store.pinned().clone(),
            revision: guarded.revision,
        }
    }
}

impl Default for SharedHistory {
    fn default() -> Self {
        Self::new(HistoryStore::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistorySnapshot {
    entries: Vec<ClipboardEntry>,
    pinned: BTreeSet<usize>,
    revision: u64,
}

/// One renderable row. `position` addresses the store, not the filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryRow<'a> {
    pub position: usize,
    pub entry: &'a ClipboardEntry,
    pub pinned: bool,
}

impl HistorySnapshot {
    pub fn entries(&self) -> &[ClipboardEntry] {
        &self.entries
    }

    pub fn pinned(&self) -> &BTreeSet<usize> {
        &self.pinned
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = HistoryRow<'_>> {
        self.entries
            .iter()
            .enumerate()
            .map(|(position, entry)| HistoryRow {
                position,
                entry,
                pinned: self.pinned.contains(&position),
            })
    }

    /// Case-insensitive substring search. An empty or blank query keeps
    /// every row.
    pub fn filter(&self, query: &str) -> Vec<HistoryRow<'_>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.rows().collect();
        }
        self.rows()
            .filter(|row| row.entry.content().to_lowercase().contains(&needle))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn shared_with(items: &[&str]) -> SharedHistory {
        let shared = SharedHistory::default();
        for item in items.iter().rev() {
            shared.add_item(*item);
        }
        shared
    }

    #[test]
    fn revision_only_advances_on_real_changes() {
        let shared = SharedHistory::default();
        assert_eq!(shared.revision(), 0);

        assert!(shared.add_item("a"));
        assert_eq!(shared.revision(), 1);

        assert!(!shared.add_item("a"));
        assert!(!shared.remove_item(9));
        assert!(!shared.toggle_pin(9));
        assert_eq!(shared.revision(), 1);

        assert!(shared.toggle_pin(0));
        assert_eq!(shared.revision(), 2);
    }

    #[test]
    fn snapshot_is_detached_from_later_mutations() {
        let shared = shared_with(&["a", "b"]);
        let snapshot = shared.snapshot();

        shared.clear_items();

        assert_eq!(snapshot.entries().len(), 2);
        assert!(shared.snapshot().is_empty());
        assert!(snapshot.revision() < shared.revision());
    }

    #[test]
    fn filter_is_case_insensitive_and_keeps_store_positions() {
        let shared = shared_with(&["Hello World", "other", "say HELLO"]);
        shared.toggle_pin(2);
        let snapshot = shared.snapshot();

        let rows = snapshot.filter("hello");
        let found = rows
            .iter()
            .map(|row| (row.position, row.entry.content(), row.pinned))
            .collect::<Vec<_>>();

        assert_eq!(
            found,
            vec![(0, "Hello World", false), (2, "say HELLO", true)]
        );
    }

    #[test]
    fn blank_filter_returns_every_row() {
        let snapshot = shared_with(&["a", "b", "c"]).snapshot();
        assert_eq!(snapshot.filter("  ").len(), 3);
        assert_eq!(snapshot.filter("").len(), 3);
    }

    #[test]
    fn content_at_reads_by_position() {
        let shared = shared_with(&["first", "second"]);
        assert_eq!(shared.content_at(1).as_deref(), Some("second"));
        assert_eq!(shared.content_at(5), None);
    }

    #[test]
    fn concurrent_writers_keep_store_within_capacity() {
        let shared = SharedHistory::new(HistoryStore::new(8));

        let workers = (0..4)
            .map(|worker| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for index in 0..200 {
                        shared.add_item(format!("{worker}-{index}"));
                        if index % 7 == 0 {
                            shared.toggle_pin(index % 8);
                        }
                        if index % 11 == 0 {
                            shared.remove_item(index % 8);
                        }
                        if index % 50 == 0 {
                            shared.clear_items();
                        }
                    }
                })
            })
            .collect::<Vec<_>>();
        for worker in workers {
            worker.join().expect("worker thread");
        }

        let snapshot = shared.snapshot();
        assert!(snapshot.entries().len() <= 8);
        assert!(snapshot
            .pinned()
            .iter()
            .all(|position| *position < snapshot.entries().len()));
    }
}
