/// Modifier names in canonical priority order.
pub const MODIFIER_KEYS: [&str; 4] = ["ctrl", "alt", "shift", "super"];

const NON_MODIFIER_RANK: usize = 100;

/// Maps a platform key identifier (GDK key names and the common
/// `LeftShift`-style spellings) to the canonical key vocabulary.
///
/// Unknown identifiers come back unchanged so the capture surface always has
/// something to display. Only an empty identifier yields `None`.
pub fn normalize_key(raw: &str) -> Option<String> {
    if raw.is_empty() {
        return None;
    }

    let canonical = match raw {
        "Escape" | "Esc" | "esc" => "esc",
        "Return" | "Enter" | "KP_Enter" | "enter" => "enter",
        "Tab" | "ISO_Left_Tab" | "tab" => "tab",
        "BackSpace" | "Backspace" | "backspace" => "backspace",
        "Insert" | "KP_Insert" | "insert" => "insert",
        "Delete" | "KP_Delete" | "delete" => "delete",
        "Right" | "KP_Right" | "right" => "right",
        "Left" | "KP_Left" | "left" => "left",
        "Down" | "KP_Down" | "down" => "down",
        "Up" | "KP_Up" | "up" => "up",
        "Home" | "KP_Home" | "home" => "home",
        "End" | "KP_End" | "end" => "end",
        "Page_Up" | "Prior" | "KP_Page_Up" | "PageUp" | "pageup" => "pageup",
        "Page_Down" | "Next" | "KP_Page_Down" | "PageDown" | "pagedown" => "pagedown",
        "space" | "Space" => "space",

        "Shift_L" | "Shift_R" | "LeftShift" | "RightShift" | "shift" => "shift",
        "Control_L" | "Control_R" | "LeftControl" | "RightControl" | "ctrl" => "ctrl",
        "Alt_L" | "Alt_R" | "LeftAlt" | "RightAlt" | "alt" => "alt",
        "Super_L" | "Super_R" | "LeftSuper" | "RightSuper" | "super" => "super",
        "Caps_Lock" | "CapsLock" | "capslock" => "capslock",
        "Menu" | "menu" => "menu",
        "Print" | "PrintScreen" | "printscreen" => "printscreen",
        _ => return Some(function_key_name(raw).unwrap_or_else(|| raw.to_string())),
    };

    Some(canonical.to_string())
}

fn function_key_name(raw: &str) -> Option<String> {
    let number = raw
        .strip_prefix('F')
        .or_else(|| raw.strip_prefix('f'))?
        .parse::<u8>()
        .ok()?;
    (1..=12).contains(&number).then(|| format!("f{number}"))
}

pub fn is_modifier(key: &str) -> bool {
    MODIFIER_KEYS.contains(&key)
}

fn modifier_rank(key: &str) -> usize {
    MODIFIER_KEYS
        .iter()
        .position(|modifier| *modifier == key)
        .unwrap_or(NON_MODIFIER_RANK)
}

/// Sorts keys into canonical hotkey order: modifiers by fixed priority
/// (ctrl, alt, shift, super), then everything else lexicographically.
pub fn sort_keys_for_hotkey(keys: &mut [String]) {
    keys.sort_by(|left, right| {
        modifier_rank(left)
            .cmp(&modifier_rank(right))
            .then_with(|| left.cmp(right))
    });
}
