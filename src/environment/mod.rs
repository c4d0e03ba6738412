use std::sync::Arc;

use crate::clipboard::{ClipboardBackend, SystemClipboard, WlClipboard};
use crate::hotkey::{
    ActiveHotkey, GlobalHotkeyRegistrar, HotkeyRegistrar, HotkeyResult, RegistrationOutcome,
    ShellShortcutRegistrar,
};
use crate::input::HotkeySettings;
use crate::process;
use crate::shell::{KdeConfigBackend, ShellConfigBackend};
use crate::window::{
    KdeRuleKeepOnTop, KeepOnTop, UnsupportedKeepOnTop, X11KeepOnTop, WINDOW_TITLE,
};

/// How the session lets this process reach the clipboard and input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// X11: in-process clipboard, global hotkey grabs, and window hints.
    Direct,
    /// Wayland: the desktop shell owns shortcuts and window rules.
    Delegated,
}

impl DisplayMode {
    pub const fn session_label(self) -> &'static str {
        match self {
            Self::Direct => "X11",
            Self::Delegated => "Wayland",
        }
    }

    pub const fn is_delegated(self) -> bool {
        matches!(self, Self::Delegated)
    }
}

/// Environment variables the mode decision reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSignals {
    pub session_type: Option<String>,
    pub current_desktop: Option<String>,
    pub kde_full_session: Option<String>,
}

impl SessionSignals {
    pub fn from_env() -> Self {
        Self {
            session_type: std::env::var("XDG_SESSION_TYPE").ok(),
            current_desktop: std::env::var("XDG_CURRENT_DESKTOP").ok(),
            kde_full_session: std::env::var("KDE_FULL_SESSION").ok(),
        }
    }

    pub fn is_kde_plasma(&self) -> bool {
        self.current_desktop
            .as_deref()
            .is_some_and(|desktop| desktop.to_lowercase().contains("kde"))
            || self.kde_full_session.as_deref() == Some("true")
    }
}

pub fn resolve_mode(signals: &SessionSignals) -> DisplayMode {
    match signals.session_type.as_deref() {
        Some("wayland") => DisplayMode::Delegated,
        _ => DisplayMode::Direct,
    }
}

/// External programs a mode shells out to.
pub fn required_tools(mode: DisplayMode) -> &'static [&'static str] {
    match mode {
        DisplayMode::Direct => &["xdotool", "xprop"],
        DisplayMode::Delegated => &["wl-paste", "wl-copy"],
    }
}

pub fn missing_tools(mode: DisplayMode) -> Vec<&'static str> {
    required_tools(mode)
        .iter()
        .copied()
        .filter(|tool| !process::tool_available(tool))
        .collect()
}

/// The one place that knows which strategy backs each session capability.
///
/// Built once at startup; everything else calls through it without looking
/// at the mode.
pub struct Capabilities {
    mode: DisplayMode,
    clipboard: Arc<dyn ClipboardBackend>,
    hotkeys: Box<dyn HotkeyRegistrar>,
    keep_on_top: Arc<dyn KeepOnTop>,
}

impl Capabilities {
    pub fn new(
        mode: DisplayMode,
        clipboard: Arc<dyn ClipboardBackend>,
        hotkeys: Box<dyn HotkeyRegistrar>,
        keep_on_top: Arc<dyn KeepOnTop>,
    ) -> Self {
        Self {
            mode,
            clipboard,
            hotkeys,
            keep_on_top,
        }
    }

    pub fn resolve(signals: &SessionSignals) -> Self {
        let mode = resolve_mode(signals);
        tracing::info!(?mode, session = mode.session_label(), "resolved display mode");

        match mode {
            DisplayMode::Direct => Self::new(
                mode,
                Arc::new(SystemClipboard::new()),
                Box::new(GlobalHotkeyRegistrar::new()),
                Arc::new(X11KeepOnTop::new(WINDOW_TITLE)),
            ),
            DisplayMode::Delegated => {
                let shell = discover_shell(signals);
                let keep_on_top: Arc<dyn KeepOnTop> = if signals.is_kde_plasma() {
                    Arc::new(KdeRuleKeepOnTop::new(shell.clone(), WINDOW_TITLE))
                } else {
                    Arc::new(UnsupportedKeepOnTop)
                };
                Self::new(
                    mode,
                    Arc::new(WlClipboard),
                    Box::new(ShellShortcutRegistrar::new(shell)),
                    keep_on_top,
                )
            }
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    pub fn clipboard(&self) -> Arc<dyn ClipboardBackend> {
        Arc::clone(&self.clipboard)
    }

    pub fn register_hotkey(&mut self, settings: &HotkeySettings) -> HotkeyResult<RegistrationOutcome> {
        self.hotkeys.register(settings)
    }

    pub fn active_hotkey(&self) -> Option<ActiveHotkey> {
        self.hotkeys.active_hotkey()
    }

    pub fn keep_on_top(&self) -> Arc<dyn KeepOnTop> {
        Arc::clone(&self.keep_on_top)
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

fn discover_shell(signals: &SessionSignals) -> Option<Arc<dyn ShellConfigBackend>> {
    if !signals.is_kde_plasma() {
        tracing::warn!(
            desktop = ?signals.current_desktop,
            "no supported desktop shell configuration store; shortcuts must be bound manually"
        );
        return None;
    }
    match KdeConfigBackend::discover() {
        Ok(backend) => Some(Arc::new(backend)),
        Err(err) => {
            tracing::warn!(?err, "KDE configuration tools unavailable");
            None
        }
    }
}
