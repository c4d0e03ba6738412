use super::{ShellConfigBackend, ShellResult};
use crate::input::HotkeySettings;

pub const SHORTCUTS_FILE: &str = "kglobalshortcutsrc";
pub const SHORTCUT_GROUP: &str = "noteboard";
pub const SHORTCUT_KEY: &str = "show_clipboard";
const SHORTCUT_LABEL: &str = "Show Clipboard Manager";

fn kde_modifier(modifier: &str) -> Option<&'static str> {
    match modifier {
        "ctrl" => Some("Ctrl"),
        "alt" => Some("Alt"),
        "shift" => Some("Shift"),
        "super" => Some("Meta"),
        _ => None,
    }
}

/// Qt key-sequence name for a normalized action key, e.g. `pageup` is
/// stored as `PgUp` and `esc` as `Esc`.
fn kde_key_name(action_key: &str) -> String {
    let named = match action_key {
        "esc" => "Esc",
        "enter" => "Return",
        "tab" => "Tab",
        "backspace" => "Backspace",
        "insert" => "Ins",
        "delete" => "Del",
        "home" => "Home",
        "end" => "End",
        "pageup" => "PgUp",
        "pagedown" => "PgDown",
        "up" => "Up",
        "down" => "Down",
        "left" => "Left",
        "right" => "Right",
        "space" => "Space",
        "capslock" => "CapsLock",
        "menu" => "Menu",
        "printscreen" => "Print",
        "minus" => "-",
        "equal" => "=",
        "comma" => ",",
        "period" => ".",
        "slash" => "/",
        "backslash" => "\\",
        "semicolon" => ";",
        "apostrophe" => "'",
        "grave" => "`",
        "bracketleft" => "[",
        "bracketright" => "]",
        other => return other.to_uppercase(),
    };
    named.to_string()
}

/// Formats settings the way `kglobalshortcutsrc` stores a chord,
/// e.g. `Ctrl+Alt+V`. Unknown modifiers are dropped.
pub fn kde_shortcut_string(settings: &HotkeySettings) -> String {
    settings
        .modifiers()
        .filter_map(kde_modifier)
        .map(str::to_string)
        .chain(
            Some(settings.action_key.as_str())
                .filter(|action_key| !action_key.is_empty())
                .map(kde_key_name),
        )
        .collect::<Vec<_>>()
        .join("+")
}

/// Writes the show/hide chord into the shell's global shortcut store and asks
/// KWin to reconfigure. A failed reload is logged; the entry is still written.
///
/// kglobalaccel only reads `kglobalshortcutsrc` when it starts, so the chord
/// becomes live after the next login or once the user confirms it in the
/// KDE shortcut settings.
pub fn write_global_shortcut(
    backend: &dyn ShellConfigBackend,
    settings: &HotkeySettings,
) -> ShellResult<()> {
    let chord = kde_shortcut_string(settings);
    let value = format!("{chord},none,{SHORTCUT_LABEL}");
    backend.write_entry(SHORTCUTS_FILE, SHORTCUT_GROUP, SHORTCUT_KEY, &value)?;
    tracing::info!(
        shortcut = %chord,
        "wrote desktop shell global shortcut; active after re-login or confirming in system settings"
    );

    if let Err(err) = backend.reconfigure() {
        tracing::warn!(?err, "failed to reload desktop shell after writing shortcut");
    }
    Ok(())
}
