use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use global_hotkey::{GlobalHotKeyEvent, HotKeyState};

use super::ActiveHotkey;

pub const TOGGLE_ACK_TIMEOUT: Duration = Duration::from_secs(2);

/// A hotkey press handed to the UI thread. The UI acknowledges once the
/// window sequence has finished.
#[derive(Debug)]
pub struct ToggleRequest {
    done: mpsc::Sender<()>,
}

impl ToggleRequest {
    pub fn new() -> (Self, mpsc::Receiver<()>) {
        let (done, ack) = mpsc::channel();
        (Self { done }, ack)
    }

    pub fn complete(self) {
        let _ = self.done.send(());
    }
}

/// Whether a raw hotkey event should toggle the window.
fn is_toggle_press(active: &ActiveHotkey, id: u32, state: HotKeyState) -> bool {
    state == HotKeyState::Pressed && active.matches(id)
}

/// Forwards presses of the active hotkey to the UI thread and waits for each
/// toggle to finish before reading the next event.
pub fn spawn_listener(
    active: ActiveHotkey,
    requests: mpsc::Sender<ToggleRequest>,
) -> std::io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("noteboard-hotkey-listener".to_string())
        .spawn(move || {
            let receiver = GlobalHotKeyEvent::receiver();
            tracing::info!("global hotkey listener started");
            while let Ok(event) = receiver.recv() {
                if !is_toggle_press(&active, event.id, event.state) {
                    continue;
                }

                let (request, ack) = ToggleRequest::new();
                if requests.send(request).is_err() {
                    tracing::debug!("toggle receiver closed; stopping hotkey listener");
                    break;
                }
                if ack.recv_timeout(TOGGLE_ACK_TIMEOUT).is_err() {
                    tracing::warn!("window toggle did not complete in time");
                }
            }
        })
}
