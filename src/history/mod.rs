mod entry;
mod shared;
mod store;

pub use entry::{ClipboardEntry, EntryKind};
pub use shared::{HistoryRow, HistorySnapshot, SharedHistory};
pub use store::{HistoryStore, DEFAULT_CAPACITY};
