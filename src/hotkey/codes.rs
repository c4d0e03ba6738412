use global_hotkey::hotkey::{Code, HotKey, Modifiers};

use super::{HotkeyError, HotkeyResult};
use crate::input::{is_modifier, HotkeySettings};

fn modifier_flag(name: &str) -> Option<Modifiers> {
    match name {
        "ctrl" => Some(Modifiers::CONTROL),
        "alt" => Some(Modifiers::ALT),
        "shift" => Some(Modifiers::SHIFT),
        "super" => Some(Modifiers::SUPER),
        _ => None,
    }
}

/// Physical key code for a canonical, non-modifier key name.
pub fn key_code(name: &str) -> Option<Code> {
    let code = match name {
        "a" => Code::KeyA,
        "b" => Code::KeyB,
        "c" => Code::KeyC,
        "d" => Code::KeyD,
        "e" => Code::KeyE,
        "f" => Code::KeyF,
        "g" => Code::KeyG,
        "h" => Code::KeyH,
        "i" => Code::KeyI,
        "j" => Code::KeyJ,
        "k" => Code::KeyK,
        "l" => Code::KeyL,
        "m" => Code::KeyM,
        "n" => Code::KeyN,
        "o" => Code::KeyO,
        "p" => Code::KeyP,
        "q" => Code::KeyQ,
        "r" => Code::KeyR,
        "s" => Code::KeyS,
        "t" => Code::KeyT,
        "u" => Code::KeyU,
        "v" => Code::KeyV,
        "w" => Code::KeyW,
        "x" => Code::KeyX,
        "y" => Code::KeyY,
        "z" => Code::KeyZ,
        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,
        "f1" => Code::F1,
        "f2" => Code::F2,
        "f3" => Code::F3,
        "f4" => Code::F4,
        "f5" => Code::F5,
        "f6" => Code::F6,
        "f7" => Code::F7,
        "f8" => Code::F8,
        "f9" => Code::F9,
        "f10" => Code::F10,
        "f11" => Code::F11,
        "f12" => Code::F12,
        "esc" => Code::Escape,
        "enter" => Code::Enter,
        "tab" => Code::Tab,
        "backspace" => Code::Backspace,
        "insert" => Code::Insert,
        "delete" => Code::Delete,
        "right" => Code::ArrowRight,
        "left" => Code::ArrowLeft,
        "down" => Code::ArrowDown,
        "up" => Code::ArrowUp,
        "home" => Code::Home,
        "end" => Code::End,
        "pageup" => Code::PageUp,
        "pagedown" => Code::PageDown,
        "space" => Code::Space,
        "capslock" => Code::CapsLock,
        "menu" => Code::ContextMenu,
        "printscreen" => Code::PrintScreen,
        "minus" | "-" => Code::Minus,
        "equal" | "=" => Code::Equal,
        "comma" | "," => Code::Comma,
        "period" | "." => Code::Period,
        "slash" | "/" => Code::Slash,
        "backslash" | "\\" => Code::Backslash,
        "semicolon" | ";" => Code::Semicolon,
        "apostrophe" | "'" => Code::Quote,
        "grave" | "`" => Code::Backquote,
        "bracketleft" | "[" => Code::BracketLeft,
        "bracketright" | "]" => Code::BracketRight,
        _ => return None,
    };
    Some(code)
}

/// Builds the OS-level hotkey for persisted settings.
pub fn to_hotkey(settings: &HotkeySettings) -> HotkeyResult<HotKey> {
    let mut modifiers = Modifiers::empty();
    for name in settings.modifiers() {
        let flag = modifier_flag(name).ok_or_else(|| HotkeyError::UnsupportedKey {
            key: name.to_string(),
        })?;
        modifiers |= flag;
    }

    // A chord needs a non-modifier key to fire on.
    if is_modifier(&settings.action_key) {
        return Err(HotkeyError::UnsupportedKey {
            key: settings.action_key.clone(),
        });
    }
    let code = key_code(&settings.action_key).ok_or_else(|| HotkeyError::UnsupportedKey {
        key: if settings.action_key.is_empty() {
            "<none>".to_string()
        } else {
            settings.action_key.clone()
        },
    })?;

    Ok(HotKey::new(
        (!modifiers.is_empty()).then_some(modifiers),
        code,
    ))
}
