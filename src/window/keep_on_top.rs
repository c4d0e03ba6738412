use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::{find_x11_window, WindowError, WindowResult};
use crate::process;
use crate::shell::{self, ShellConfigBackend};

const XPROP: &str = "xprop";

/// Keeps the main window above other windows.
pub trait KeepOnTop: Send + Sync {
    fn set_keep_on_top(&self, enabled: bool) -> WindowResult<()>;
    fn is_enabled(&self) -> bool;
}

/// Sets `_NET_WM_STATE_ABOVE` on the mapped X11 window.
#[derive(Debug)]
pub struct X11KeepOnTop {
    title: String,
    enabled: AtomicBool,
}

impl X11KeepOnTop {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            enabled: AtomicBool::new(false),
        }
    }
}

impl KeepOnTop for X11KeepOnTop {
    fn set_keep_on_top(&self, enabled: bool) -> WindowResult<()> {
        let window_id = find_x11_window(&self.title)?;
        if enabled {
            process::run_status(
                XPROP,
                &[
                    "-id",
                    &window_id,
                    "-f",
                    "_NET_WM_STATE",
                    "32a",
                    "-set",
                    "_NET_WM_STATE",
                    "_NET_WM_STATE_ABOVE",
                ],
            )?;
        } else {
            process::run_status(XPROP, &["-id", &window_id, "-remove", "_NET_WM_STATE"])?;
        }
        self.enabled.store(enabled, Ordering::SeqCst);
        tracing::info!(window_id = %window_id, enabled, "updated X11 keep-on-top state");
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }
}

/// Persists keep-above as a window rule in the desktop shell.
pub struct KdeRuleKeepOnTop {
    backend: Option<Arc<dyn ShellConfigBackend>>,
    title: String,
}

impl KdeRuleKeepOnTop {
    pub fn new(backend: Option<Arc<dyn ShellConfigBackend>>, title: impl Into<String>) -> Self {
        Self {
            backend,
            title: title.into(),
        }
    }
}

impl KeepOnTop for KdeRuleKeepOnTop {
    fn set_keep_on_top(&self, enabled: bool) -> WindowResult<()> {
        let backend = self.backend.as_deref().ok_or(WindowError::Unsupported)?;
        shell::set_keep_above(backend, &self.title, enabled)?;
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.backend
            .as_deref()
            .is_some_and(|backend| shell::is_keep_above_enabled(backend, &self.title))
    }
}

impl std::fmt::Debug for KdeRuleKeepOnTop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KdeRuleKeepOnTop")
            .field("title", &self.title)
            .field("has_backend", &self.backend.is_some())
            .finish()
    }
}

/// For delegated sessions outside KDE Plasma, where no rule store exists.
#[derive(Debug, Default)]
pub struct UnsupportedKeepOnTop;

impl KeepOnTop for UnsupportedKeepOnTop {
    fn set_keep_on_top(&self, _enabled: bool) -> WindowResult<()> {
        Err(WindowError::Unsupported)
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::memory::MemoryShellConfig;

    #[test]
    fn kde_rule_keep_on_top_round_trips_through_rule_store() {
        let backend = Arc::new(MemoryShellConfig::default());
        let keep_on_top = KdeRuleKeepOnTop::new(Some(backend.clone()), "NoteBoard");

        assert!(!keep_on_top.is_enabled());
        keep_on_top.set_keep_on_top(true).expect("enable keep-above");
        assert!(keep_on_top.is_enabled());
        keep_on_top.set_keep_on_top(false).expect("disable keep-above");
        assert!(!keep_on_top.is_enabled());
        assert_eq!(backend.reconfigure_count(), 2);
    }

    #[test]
    fn kde_rule_keep_on_top_without_tools_is_unsupported() {
        let keep_on_top = KdeRuleKeepOnTop::new(None, "NoteBoard");
        assert!(matches!(
            keep_on_top.set_keep_on_top(true),
            Err(WindowError::Unsupported)
        ));
        assert!(!keep_on_top.is_enabled());
    }
}
