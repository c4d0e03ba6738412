use crate::clipboard::ClipboardError;
use crate::config::ConfigError;
use crate::hotkey::HotkeyError;
use crate::input::CaptureError;
use crate::process::CommandError;
use crate::shell::ShellError;
use crate::window::WindowError;
use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
    #[error(transparent)]
    Command(#[from] CommandError),
    #[error(transparent)]
    Shell(#[from] ShellError),
    #[error(transparent)]
    Hotkey(#[from] HotkeyError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Window(#[from] WindowError),
    #[error("failed to start background thread {name}")]
    Thread {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}
