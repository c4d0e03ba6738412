mod keep_on_top;
mod x11;

use thiserror::Error;

use crate::process::CommandError;
use crate::shell::ShellError;

pub use keep_on_top::{KdeRuleKeepOnTop, KeepOnTop, UnsupportedKeepOnTop, X11KeepOnTop};
pub use x11::{find_x11_window, move_x11_window};

pub const WINDOW_TITLE: &str = "NoteBoard";
pub const WINDOW_WIDTH: i32 = 400;
pub const WINDOW_HEIGHT: i32 = 500;
pub const POINTER_OFFSET: i32 = 20;

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("window not found: {title}")]
    NotFound { title: String },
    #[error("window command failed")]
    Command(#[from] CommandError),
    #[error("desktop shell window rule failed")]
    Shell(#[from] ShellError),
    #[error("keep-on-top is not supported in this session")]
    Unsupported,
}

pub type WindowResult<T> = std::result::Result<T, WindowError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const MAIN_WINDOW: Self = Self {
        width: WINDOW_WIDTH,
        height: WINDOW_HEIGHT,
    };
}

/// Operations the hotkey toggle needs from the main window.
///
/// `set_position` is best effort: some sessions do not let clients place
/// their own windows, and a failure there is ignored.
pub trait WindowControl {
    fn hide(&self);
    fn show(&self);
    fn resize(&self, size: Size);
    fn set_position(&self, position: Point);
    fn request_focus(&self);
    fn is_visible(&self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Hidden,
    Shown { position: Point },
}

/// Picks a position on one axis: after the pointer, then before it, then
/// centered on the screen.
fn place_on_axis(pointer: i32, window: i32, screen: i32) -> i32 {
    if pointer + window + POINTER_OFFSET < screen {
        pointer + POINTER_OFFSET
    } else if pointer - window - POINTER_OFFSET > 0 {
        pointer - window - POINTER_OFFSET
    } else {
        (screen - window) / 2
    }
}

pub fn place_near_pointer(pointer: Point, screen: Size, window: Size) -> Point {
    Point {
        x: place_on_axis(pointer.x, window.width, screen.width),
        y: place_on_axis(pointer.y, window.height, screen.height),
    }
}

/// Hides a visible window, otherwise shows it next to the pointer.
///
/// The show path always runs hide, resize, position, show, focus in that
/// order so the window manager re-evaluates placement.
pub fn toggle_window(control: &dyn WindowControl, pointer: Point, screen: Size) -> ToggleOutcome {
    if control.is_visible() {
        control.hide();
        return ToggleOutcome::Hidden;
    }

    let position = place_near_pointer(pointer, screen, Size::MAIN_WINDOW);
    control.hide();
    control.resize(Size::MAIN_WINDOW);
    control.set_position(position);
    control.show();
    control.request_focus();
    tracing::debug!(?pointer, ?position, "showed main window near pointer");
    ToggleOutcome::Shown { position }
}
