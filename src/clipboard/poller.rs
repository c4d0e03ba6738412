use std::sync::Arc;
use std::thread;
use std::time::Duration;

use super::ClipboardBackend;
use crate::history::SharedHistory;

pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Captured,
    /// Same text as the previous sample, or rejected by the store.
    Unchanged,
    Empty,
    ReadFailed,
}

/// Samples the clipboard and feeds new text into the shared history.
pub struct ClipboardPoller {
    backend: Arc<dyn ClipboardBackend>,
    history: SharedHistory,
    last_seen: Option<String>,
    failing: bool,
}

impl ClipboardPoller {
    pub fn new(backend: Arc<dyn ClipboardBackend>, history: SharedHistory) -> Self {
        Self {
            backend,
            history,
            last_seen: None,
            failing: false,
        }
    }

    pub fn poll_once(&mut self) -> PollOutcome {
        let text = match self.backend.read_text() {
            Ok(text) => {
                if self.failing {
                    tracing::info!("clipboard reads recovered");
                    self.failing = false;
                }
                text
            }
            Err(err) => {
                if self.failing {
                    tracing::debug!(?err, "clipboard read failed");
                } else {
                    tracing::warn!(?err, "clipboard read failed; retrying next tick");
                    self.failing = true;
                }
                return PollOutcome::ReadFailed;
            }
        };

        if text.is_empty() {
            return PollOutcome::Empty;
        }
        if self.last_seen.as_deref() == Some(text.as_str()) {
            return PollOutcome::Unchanged;
        }

        let added = self.history.add_item(text.clone());
        self.last_seen = Some(text);
        if added {
            tracing::debug!(revision = self.history.revision(), "captured clipboard text");
            PollOutcome::Captured
        } else {
            PollOutcome::Unchanged
        }
    }

    /// Runs the poll loop on a dedicated thread for the rest of the process.
    pub fn spawn(mut self) -> std::io::Result<thread::JoinHandle<()>> {
        thread::Builder::new()
            .name("noteboard-clipboard-poller".to_string())
            .spawn(move || {
                tracing::info!(interval_ms = POLL_INTERVAL.as_millis() as u64, "clipboard poller started");
                loop {
                    self.poll_once();
                    thread::sleep(POLL_INTERVAL);
                }
            })
    }
}

impl std::fmt::Debug for ClipboardPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipboardPoller")
            .field("last_seen", &self.last_seen)
            .field("failing", &self.failing)
            .finish_non_exhaustive()
    }
}
