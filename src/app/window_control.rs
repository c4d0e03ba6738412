use std::cell::Cell;

use gtk4::gdk;
use gtk4::prelude::*;
use gtk4::ApplicationWindow;
use mouse_position::mouse_position::Mouse;

use crate::environment::DisplayMode;
use crate::window::{self, Point, Size, WindowControl};

use super::worker::spawn_worker_action;

const FALLBACK_SCREEN: Size = Size {
    width: 1920,
    height: 1080,
};

/// Main window as seen by the hotkey toggle.
///
/// X11 placement is applied once the window is mapped, since `xdotool`
/// can only find mapped windows.
pub(super) struct GtkWindowControl {
    window: ApplicationWindow,
    mode: DisplayMode,
    pending_position: Cell<Option<Point>>,
}

impl GtkWindowControl {
    pub(super) fn new(window: ApplicationWindow, mode: DisplayMode) -> Self {
        Self {
            window,
            mode,
            pending_position: Cell::new(None),
        }
    }

    fn apply_pending_position(&self) {
        let Some(position) = self.pending_position.take() else {
            return;
        };
        spawn_worker_action(
            move || window::move_x11_window(window::WINDOW_TITLE, position),
            move |result| {
                if let Err(err) = result {
                    tracing::debug!(?err, ?position, "failed to move main window");
                }
            },
        );
    }
}

impl WindowControl for GtkWindowControl {
    fn hide(&self) {
        self.window.set_visible(false);
    }

    fn show(&self) {
        self.window.set_visible(true);
        self.apply_pending_position();
    }

    fn resize(&self, size: Size) {
        self.window.set_default_size(size.width, size.height);
    }

    fn set_position(&self, position: Point) {
        // Wayland clients cannot place their own toplevels.
        if self.mode.is_delegated() {
            tracing::debug!(?position, "skipping window placement in delegated session");
            return;
        }
        self.pending_position.set(Some(position));
    }

    fn request_focus(&self) {
        self.window.present();
    }

    fn is_visible(&self) -> bool {
        self.window.is_visible()
    }
}

pub(super) fn pointer_position() -> Point {
    match Mouse::get_mouse_position() {
        Mouse::Position { x, y } => Point { x, y },
        Mouse::Error => {
            tracing::debug!("pointer position unavailable");
            Point::default()
        }
    }
}

/// Size of the primary monitor.
pub(super) fn screen_size(window: &ApplicationWindow) -> Size {
    let display = WidgetExt::display(window);
    display
        .monitors()
        .item(0)
        .and_then(|item| item.downcast::<gdk::Monitor>().ok())
        .map(|monitor| {
            let geometry = monitor.geometry();
            Size {
                width: geometry.width(),
                height: geometry.height(),
            }
        })
        .unwrap_or(FALLBACK_SCREEN)
}
