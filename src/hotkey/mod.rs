mod codes;
mod dispatcher;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use global_hotkey::hotkey::HotKey;
use global_hotkey::GlobalHotKeyManager;
use thiserror::Error;

use crate::input::HotkeySettings;
use crate::shell::{self, ShellConfigBackend, ShellError};

pub use codes::{key_code, to_hotkey};
pub use dispatcher::{spawn_listener, ToggleRequest, TOGGLE_ACK_TIMEOUT};

#[derive(Debug, Error)]
pub enum HotkeyError {
    #[error("unsupported hotkey key: {key}")]
    UnsupportedKey { key: String },
    #[error("global hotkey manager unavailable: {message}")]
    ManagerUnavailable { message: String },
    #[error("failed to register global hotkey {combination}: {source}")]
    Register {
        combination: String,
        #[source]
        source: global_hotkey::Error,
    },
    #[error("desktop shell shortcut tools are unavailable; bind the shortcut in the shell settings")]
    ShellToolMissing,
    #[error("failed to write desktop shell shortcut")]
    Shell(#[from] ShellError),
}

pub type HotkeyResult<T> = std::result::Result<T, HotkeyError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Installed in-process; presses arrive on the listener thread.
    Hooked { id: u32 },
    /// Written to the desktop shell, which launches the app on press.
    DelegatedToShell,
}

/// Id of the hotkey the listener should react to. Zero means none.
#[derive(Debug, Clone, Default)]
pub struct ActiveHotkey(Arc<AtomicU32>);

impl ActiveHotkey {
    pub fn set(&self, id: u32) {
        self.0.store(id, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(0, Ordering::SeqCst);
    }

    pub fn get(&self) -> Option<u32> {
        Some(self.0.load(Ordering::SeqCst)).filter(|id| *id != 0)
    }

    pub fn matches(&self, id: u32) -> bool {
        self.get() == Some(id)
    }
}

/// Installs the show/hide hotkey under one of the two session strategies.
pub trait HotkeyRegistrar {
    /// Replaces any previous registration. On error the previous one stays.
    fn register(&mut self, settings: &HotkeySettings) -> HotkeyResult<RegistrationOutcome>;
    /// Present only when presses are delivered to this process.
    fn active_hotkey(&self) -> Option<ActiveHotkey>;
}

/// In-process global hotkey for sessions that allow input grabs.
pub struct GlobalHotkeyRegistrar {
    manager: Option<GlobalHotKeyManager>,
    current: Option<HotKey>,
    active: ActiveHotkey,
}

impl GlobalHotkeyRegistrar {
    pub fn new() -> Self {
        Self {
            manager: None,
            current: None,
            active: ActiveHotkey::default(),
        }
    }

    fn manager(&mut self) -> HotkeyResult<&GlobalHotKeyManager> {
        if self.manager.is_none() {
            let manager =
                GlobalHotKeyManager::new().map_err(|err| HotkeyError::ManagerUnavailable {
                    message: err.to_string(),
                })?;
            self.manager = Some(manager);
        }
        self.manager
            .as_ref()
            .ok_or_else(|| HotkeyError::ManagerUnavailable {
                message: "manager not initialized".to_string(),
            })
    }
}

impl Default for GlobalHotkeyRegistrar {
    fn default() -> Self {
        Self::new()
    }
}

impl HotkeyRegistrar for GlobalHotkeyRegistrar {
    fn register(&mut self, settings: &HotkeySettings) -> HotkeyResult<RegistrationOutcome> {
        let hotkey = to_hotkey(settings)?;
        if self.current == Some(hotkey) {
            return Ok(RegistrationOutcome::Hooked { id: hotkey.id() });
        }

        let previous = self.current;
        let manager = self.manager()?;
        if let Some(previous) = previous {
            if let Err(err) = manager.unregister(previous) {
                tracing::warn!(?err, "failed to unregister previous global hotkey");
            }
        }

        if let Err(source) = manager.register(hotkey) {
            if let Some(previous) = previous {
                if let Err(err) = manager.register(previous) {
                    tracing::warn!(?err, "failed to restore previous global hotkey");
                }
            }
            return Err(HotkeyError::Register {
                combination: settings.display(),
                source,
            });
        }

        self.current = Some(hotkey);
        self.active.set(hotkey.id());
        tracing::info!(combination = %settings.display(), id = hotkey.id(), "registered global hotkey");
        Ok(RegistrationOutcome::Hooked { id: hotkey.id() })
    }

    fn active_hotkey(&self) -> Option<ActiveHotkey> {
        Some(self.active.clone())
    }
}

impl std::fmt::Debug for GlobalHotkeyRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalHotkeyRegistrar")
            .field("current", &self.current)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

/// Writes the hotkey into the desktop shell's shortcut store instead of
/// grabbing it; the shell relaunches the binary, which toggles the window.
pub struct ShellShortcutRegistrar {
    backend: Option<Arc<dyn ShellConfigBackend>>,
}

impl ShellShortcutRegistrar {
    pub fn new(backend: Option<Arc<dyn ShellConfigBackend>>) -> Self {
        Self { backend }
    }
}

impl HotkeyRegistrar for ShellShortcutRegistrar {
    fn register(&mut self, settings: &HotkeySettings) -> HotkeyResult<RegistrationOutcome> {
        let backend = self.backend.as_deref().ok_or(HotkeyError::ShellToolMissing)?;
        shell::write_global_shortcut(backend, settings)?;
        Ok(RegistrationOutcome::DelegatedToShell)
    }

    fn active_hotkey(&self) -> Option<ActiveHotkey> {
        None
    }
}

impl std::fmt::Debug for ShellShortcutRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellShortcutRegistrar")
            .field("has_backend", &self.backend.is_some())
            .finish()
    }
}
