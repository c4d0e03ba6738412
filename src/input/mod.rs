mod capture;
mod combination;
mod keys;

pub use capture::{CaptureError, CaptureEvent, CaptureResult, CaptureState, HotkeyCapture};
pub use combination::{HotkeyCombination, HotkeySettings};
pub use keys::{is_modifier, normalize_key, sort_keys_for_hotkey, MODIFIER_KEYS};
