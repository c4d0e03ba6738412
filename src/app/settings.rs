use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use gtk4::prelude::*;
use gtk4::{
    Align, Application, Box as GtkBox, Button, CheckButton, Entry, EventControllerFocus,
    EventControllerKey, Label, Orientation, PropagationPhase, Window,
};

use super::worker::spawn_worker_action;
use crate::environment::DisplayMode;
use crate::hotkey::RegistrationOutcome;
use crate::input::HotkeyCapture;
use crate::session::SessionContext;
use crate::shell;
use crate::window::KeepOnTop;
use crate::{AppError, AppResult};

const SETTINGS_TITLE: &str = "NoteBoard Settings";
const CAPTURE_PLACEHOLDER: &str = "Click here and press your shortcut";
const KDE_SHORTCUT_STEPS: &str = "On KDE Wayland the shortcut is managed by System Settings.\n\
1. Open Shortcuts settings\n\
2. Find \"noteboard\" under Applications\n\
3. Assign a key to \"Show Clipboard Manager\"\n\
A shortcut written by NoteBoard becomes active after you log in again.";

pub(super) fn present_settings_window(app: &Application, session: &Rc<SessionContext>) {
    let window = Window::builder()
        .application(app)
        .title(SETTINGS_TITLE)
        .default_width(360)
        .resizable(false)
        .build();

    let root = GtkBox::new(Orientation::Vertical, 10);
    root.set_margin_top(12);
    root.set_margin_bottom(12);
    root.set_margin_start(12);
    root.set_margin_end(12);

    let heading = Label::new(Some("Show/Hide shortcut"));
    heading.add_css_class("heading");
    heading.set_halign(Align::Start);
    root.append(&heading);

    let current_label = Label::new(Some(&current_hotkey_text(session)));
    current_label.set_halign(Align::Start);
    root.append(&current_label);

    match session.mode() {
        DisplayMode::Direct => append_capture_section(&root, session, &current_label),
        DisplayMode::Delegated => append_delegated_section(&root),
    }

    root.append(&keep_on_top_toggle(session));

    let close_button = Button::with_label("Close");
    close_button.set_halign(Align::End);
    {
        let window = window.clone();
        close_button.connect_clicked(move |_| window.close());
    }
    root.append(&close_button);

    window.set_child(Some(&root));
    window.present();
}

fn current_hotkey_text(session: &SessionContext) -> String {
    match session.mode() {
        DisplayMode::Direct => format!("Current: {}", session.hotkeys().display()),
        DisplayMode::Delegated => "Current: managed by KDE global shortcuts".to_string(),
    }
}

fn append_capture_section(root: &GtkBox, session: &Rc<SessionContext>, current_label: &Label) {
    let entry = Entry::new();
    entry.set_editable(false);
    entry.set_placeholder_text(Some(CAPTURE_PLACEHOLDER));
    root.append(&entry);

    let status_label = Label::new(None);
    status_label.set_halign(Align::Start);
    status_label.set_wrap(true);
    status_label.add_css_class("dim-label");

    let capture = {
        let entry = entry.clone();
        Rc::new(RefCell::new(HotkeyCapture::with_observer(move |keys| {
            entry.set_text(&keys.join("+"));
        })))
    };

    let key_controller = EventControllerKey::new();
    key_controller.set_propagation_phase(PropagationPhase::Capture);
    {
        let capture = capture.clone();
        key_controller.connect_key_pressed(move |_, key, _, _| {
            let name = key.to_lower().name();
            if let Some(name) = name {
                capture.borrow_mut().key_pressed(name.as_str());
            }
            gtk4::glib::Propagation::Stop
        });
    }
    {
        let capture = capture.clone();
        key_controller.connect_key_released(move |_, key, _, _| {
            if let Some(name) = key.to_lower().name() {
                capture.borrow_mut().key_released(name.as_str());
            }
        });
    }
    entry.add_controller(key_controller);

    let focus_controller = EventControllerFocus::new();
    {
        let capture = capture.clone();
        focus_controller.connect_enter(move |_| capture.borrow_mut().focus_gained());
    }
    {
        let capture = capture.clone();
        focus_controller.connect_leave(move |_| capture.borrow_mut().focus_lost());
    }
    entry.add_controller(focus_controller);

    let buttons = GtkBox::new(Orientation::Horizontal, 6);
    buttons.set_halign(Align::End);
    let reset_button = Button::with_label("Reset");
    let apply_button = Button::with_label("Apply");
    apply_button.add_css_class("suggested-action");
    buttons.append(&reset_button);
    buttons.append(&apply_button);
    root.append(&buttons);
    root.append(&status_label);

    {
        let capture = capture.clone();
        let entry = entry.clone();
        let status_label = status_label.clone();
        reset_button.connect_clicked(move |_| {
            capture.borrow_mut().reset();
            entry.set_text("");
            status_label.set_text("");
        });
    }
    {
        let session = session.clone();
        let current_label = current_label.clone();
        apply_button.connect_clicked(move |_| {
            let result = session.confirm_capture(&mut capture.borrow_mut());
            status_label.set_text(&apply_status_message(&result));
            if result.is_ok() {
                current_label.set_text(&current_hotkey_text(&session));
            }
        });
    }
}

fn apply_status_message(result: &AppResult<Option<RegistrationOutcome>>) -> String {
    match result {
        Ok(Some(_)) => "Shortcut saved".to_string(),
        Ok(None) => "Shortcut saved, but it could not be registered".to_string(),
        Err(AppError::Capture(_)) => "Press a key combination first".to_string(),
        Err(err) => {
            tracing::warn!(?err, "failed to apply hotkey");
            format!("Could not apply shortcut: {err}")
        }
    }
}

fn append_delegated_section(root: &GtkBox) {
    let steps = Label::new(Some(KDE_SHORTCUT_STEPS));
    steps.set_halign(Align::Start);
    steps.set_wrap(true);
    root.append(&steps);

    let open_button = Button::with_label("Open KDE Shortcuts Settings");
    open_button.set_halign(Align::Start);
    open_button.connect_clicked(|_| {
        if let Err(err) = shell::open_shortcut_settings() {
            tracing::warn!(?err, "failed to open shortcut settings");
            crate::notification::send("Could not open KDE shortcut settings");
        }
    });
    root.append(&open_button);
}

/// The current state is read on a worker; the toggle stays insensitive until
/// it arrives so a click cannot race the initial value.
fn keep_on_top_toggle(session: &SessionContext) -> CheckButton {
    let toggle = CheckButton::with_label("Keep window on top");
    toggle.set_sensitive(false);

    let keep_on_top = session.keep_on_top();
    let reader = Arc::clone(&keep_on_top);
    let button = toggle.clone();
    spawn_worker_action(
        move || reader.is_enabled(),
        move |enabled| {
            button.set_active(enabled);
            button.set_sensitive(true);
            connect_keep_on_top(&button, Arc::clone(&keep_on_top));
        },
    );
    toggle
}

fn connect_keep_on_top(toggle: &CheckButton, keep_on_top: Arc<dyn KeepOnTop>) {
    toggle.connect_toggled(move |toggle| {
        let enabled = toggle.is_active();
        let keep_on_top = Arc::clone(&keep_on_top);
        spawn_worker_action(
            move || keep_on_top.set_keep_on_top(enabled),
            move |result| {
                if let Err(err) = result {
                    tracing::warn!(?err, enabled, "failed to change keep-on-top");
                    crate::notification::warn_capability_missing("Keep window on top", &err);
                }
            },
        );
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkey::HotkeyError;
    use crate::input::CaptureError;

    #[test]
    fn apply_status_message_distinguishes_outcomes() {
        assert_eq!(
            apply_status_message(&Ok(Some(RegistrationOutcome::DelegatedToShell))),
            "Shortcut saved"
        );
        assert_eq!(
            apply_status_message(&Ok(None)),
            "Shortcut saved, but it could not be registered"
        );
        assert_eq!(
            apply_status_message(&Err(AppError::Capture(CaptureError::EmptyCombination))),
            "Press a key combination first"
        );
        let unsupported = apply_status_message(&Err(AppError::Hotkey(
            HotkeyError::UnsupportedKey {
                key: "alt".to_string(),
            },
        )));
        assert!(unsupported.starts_with("Could not apply shortcut"));
    }
}
