mod shortcut;
mod window_rule;

use std::path::PathBuf;

use thiserror::Error;

use crate::process::{self, CommandError};

pub use shortcut::{kde_shortcut_string, write_global_shortcut, SHORTCUTS_FILE, SHORTCUT_GROUP, SHORTCUT_KEY};
pub use window_rule::{
    find_or_create_window_rule, find_window_rule, is_keep_above_enabled, set_keep_above,
    RULES_FILE,
};

const WRITER_TOOLS: [&str; 2] = ["kwriteconfig6", "kwriteconfig5"];
const READER_TOOLS: [&str; 2] = ["kreadconfig6", "kreadconfig5"];
const DBUS_TOOLS: [&str; 3] = ["qdbus6", "qdbus-qt6", "qdbus"];
const SHORTCUT_SETTINGS_TOOLS: [(&str, &[&str]); 4] = [
    ("systemsettings", &["kcm_keys"]),
    ("kcmshell6", &["kcm_keys"]),
    ("systemsettings5", &["shortcuts"]),
    ("kcmshell5", &["keys"]),
];

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("desktop shell tool not found: {tool}")]
    ToolMissing { tool: String },
    #[error("desktop shell configuration command failed")]
    Command(#[from] CommandError),
}

pub type ShellResult<T> = std::result::Result<T, ShellError>;

/// Key-value access to the desktop shell's configuration store.
pub trait ShellConfigBackend: Send + Sync {
    fn write_entry(&self, file: &str, group: &str, key: &str, value: &str) -> ShellResult<()>;
    /// Missing keys and failed reads both come back as `None`.
    fn read_entry(&self, file: &str, group: &str, key: &str) -> Option<String>;
    /// Asks the shell to reload its configuration.
    fn reconfigure(&self) -> ShellResult<()>;
}

/// KDE Plasma configuration through `kwriteconfig`/`kreadconfig`/`qdbus`,
/// preferring the Plasma 6 tools when both generations are installed.
#[derive(Debug, Clone)]
pub struct KdeConfigBackend {
    writer: PathBuf,
    reader: Option<PathBuf>,
    dbus: Option<PathBuf>,
}

impl KdeConfigBackend {
    /// Fails only when no config writer is installed; the reader and D-Bus
    /// tools degrade individual operations instead.
    pub fn discover() -> ShellResult<Self> {
        let writer = process::find_tool(&WRITER_TOOLS).ok_or_else(|| ShellError::ToolMissing {
            tool: WRITER_TOOLS.join(" or "),
        })?;
        let backend = Self {
            writer,
            reader: process::find_tool(&READER_TOOLS),
            dbus: process::find_tool(&DBUS_TOOLS),
        };
        tracing::debug!(
            writer = ?backend.writer,
            reader = ?backend.reader,
            dbus = ?backend.dbus,
            "resolved KDE configuration tools"
        );
        Ok(backend)
    }
}

impl ShellConfigBackend for KdeConfigBackend {
    fn write_entry(&self, file: &str, group: &str, key: &str, value: &str) -> ShellResult<()> {
        process::run_status(
            &self.writer,
            &["--file", file, "--group", group, "--key", key, value],
        )?;
        Ok(())
    }

    fn read_entry(&self, file: &str, group: &str, key: &str) -> Option<String> {
        let reader = self.reader.as_ref()?;
        match process::run_output(reader, &["--file", file, "--group", group, "--key", key]) {
            Ok(value) => Some(value.trim().to_string()).filter(|value| !value.is_empty()),
            Err(err) => {
                tracing::debug!(?err, file, group, key, "failed to read shell config entry");
                None
            }
        }
    }

    fn reconfigure(&self) -> ShellResult<()> {
        let dbus = self.dbus.as_ref().ok_or_else(|| ShellError::ToolMissing {
            tool: DBUS_TOOLS.join(" or "),
        })?;
        process::run_status(dbus, &["org.kde.KWin", "/KWin", "org.kde.KWin.reconfigure"])?;
        Ok(())
    }
}

/// Opens the shell's keyboard shortcut settings page.
pub fn open_shortcut_settings() -> ShellResult<()> {
    for (tool, args) in SHORTCUT_SETTINGS_TOOLS {
        if let Some(path) = process::find_tool(&[tool]) {
            process::spawn_detached(path, args)?;
            return Ok(());
        }
    }
    Err(ShellError::ToolMissing {
        tool: "systemsettings".to_string(),
    })
}
