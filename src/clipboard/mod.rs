mod poller;

use parking_lot::Mutex;
use thiserror::Error;

use crate::process::{self, CommandError};

pub use poller::{ClipboardPoller, PollOutcome, POLL_INTERVAL};

const WL_PASTE_COMMAND: &str = "wl-paste";
const WL_COPY_COMMAND: &str = "wl-copy";

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("clipboard is unavailable: {message}")]
    Unavailable { message: String },
    #[error("failed to read clipboard text: {message}")]
    Read { message: String },
    #[error("failed to write clipboard text: {message}")]
    Write { message: String },
    #[error("clipboard bridge command failed")]
    Command(#[from] CommandError),
}

pub type ClipboardResult<T> = std::result::Result<T, ClipboardError>;

/// Text-only clipboard access. An empty clipboard reads as `Ok("")`.
pub trait ClipboardBackend: Send + Sync {
    fn read_text(&self) -> ClipboardResult<String>;
    fn write_text(&self, text: &str) -> ClipboardResult<()>;
}

/// In-process clipboard for sessions that allow direct access.
///
/// The handle is created lazily and kept alive: on X11 the selection is only
/// served while the owning `arboard::Clipboard` exists.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Mutex<Option<arboard::Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_handle<T>(
        &self,
        operation: impl FnOnce(&mut arboard::Clipboard) -> ClipboardResult<T>,
    ) -> ClipboardResult<T> {
        let mut handle = self.handle.lock();
        if handle.is_none() {
            let clipboard = arboard::Clipboard::new().map_err(|err| ClipboardError::Unavailable {
                message: err.to_string(),
            })?;
            *handle = Some(clipboard);
        }
        match handle.as_mut() {
            Some(clipboard) => operation(clipboard),
            None => Err(ClipboardError::Unavailable {
                message: "clipboard handle missing".to_string(),
            }),
        }
    }
}

impl ClipboardBackend for SystemClipboard {
    fn read_text(&self) -> ClipboardResult<String> {
        self.with_handle(|clipboard| match clipboard.get_text() {
            Ok(text) => Ok(text),
            Err(arboard::Error::ContentNotAvailable) => Ok(String::new()),
            Err(err) => Err(ClipboardError::Read {
                message: err.to_string(),
            }),
        })
    }

    fn write_text(&self, text: &str) -> ClipboardResult<()> {
        self.with_handle(|clipboard| {
            clipboard
                .set_text(text.to_string())
                .map_err(|err| ClipboardError::Write {
                    message: err.to_string(),
                })
        })
    }
}

impl std::fmt::Debug for SystemClipboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemClipboard").finish_non_exhaustive()
    }
}

/// Clipboard bridged through `wl-paste`/`wl-copy` for Wayland sessions.
#[derive(Debug, Default)]
pub struct WlClipboard;

impl ClipboardBackend for WlClipboard {
    fn read_text(&self) -> ClipboardResult<String> {
        match process::run_output(WL_PASTE_COMMAND, &["-n"]) {
            Ok(text) => Ok(text),
            // wl-paste exits non-zero when the selection is empty or non-text.
            Err(CommandError::CommandFailed { .. }) => Ok(String::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn write_text(&self, text: &str) -> ClipboardResult<()> {
        process::run_with_stdin(WL_COPY_COMMAND, &[], text)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::VecDeque;

    use parking_lot::Mutex;

    use super::{ClipboardBackend, ClipboardError, ClipboardResult};

    /// Scripted clipboard: each read pops the next queued result, and the
    /// last value is repeated once the queue is drained.
    #[derive(Default)]
    pub struct FakeClipboard {
        reads: Mutex<VecDeque<ClipboardResult<String>>>,
        current: Mutex<String>,
        pub writes: Mutex<Vec<String>>,
    }

    impl FakeClipboard {
        pub fn with_reads(reads: Vec<ClipboardResult<String>>) -> Self {
            Self {
                reads: Mutex::new(reads.into()),
                ..Self::default()
            }
        }

        pub fn failing_read() -> ClipboardResult<String> {
            Err(ClipboardError::Read {
                message: "scripted failure".to_string(),
            })
        }
    }

    impl ClipboardBackend for FakeClipboard {
        fn read_text(&self) -> ClipboardResult<String> {
            match self.reads.lock().pop_front() {
                Some(Ok(text)) => {
                    *self.current.lock() = text.clone();
                    Ok(text)
                }
                Some(Err(err)) => Err(err),
                None => Ok(self.current.lock().clone()),
            }
        }

        fn write_text(&self, text: &str) -> ClipboardResult<()> {
            *self.current.lock() = text.to_string();
            self.writes.lock().push(text.to_string());
            Ok(())
        }
    }
}
