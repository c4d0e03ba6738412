use thiserror::Error;

use super::combination::{HotkeyCombination, HotkeySettings};
use super::keys::{normalize_key, sort_keys_for_hotkey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    Capturing,
    Committed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureEvent {
    FocusGained,
    FocusLost,
    Confirmed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CaptureError {
    #[error("no keys were captured; press at least one key combination")]
    EmptyCombination,
}

pub type CaptureResult<T> = std::result::Result<T, CaptureError>;

type KeysObserver = Box<dyn FnMut(&[String])>;

/// Accumulates the keys held on the capture surface into a candidate chord.
///
/// Key releases never remove keys: a capture session only grows until focus
/// is regained or the candidate is reset.
pub struct HotkeyCapture {
    state: CaptureState,
    keys: Vec<String>,
    observer: Option<KeysObserver>,
}

impl HotkeyCapture {
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
            keys: Vec::new(),
            observer: None,
        }
    }

    pub fn with_observer(observer: impl FnMut(&[String]) + 'static) -> Self {
        Self {
            observer: Some(Box::new(observer)),
            ..Self::new()
        }
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn candidate(&self) -> &[String] {
        &self.keys
    }

    fn next_state(&self, event: CaptureEvent) -> CaptureState {
        match (self.state, event) {
            (_, CaptureEvent::FocusGained) => CaptureState::Capturing,
            (CaptureState::Capturing, CaptureEvent::FocusLost) => CaptureState::Committed,
            (state, CaptureEvent::FocusLost) => state,
            (_, CaptureEvent::Confirmed) => CaptureState::Committed,
        }
    }

    fn transition(&mut self, event: CaptureEvent) {
        let next = self.next_state(event);
        tracing::debug!(from = ?self.state, event = ?event, to = ?next, "hotkey capture transition");
        self.state = next;
    }

    pub fn focus_gained(&mut self) {
        self.transition(CaptureEvent::FocusGained);
        self.keys.clear();
        self.notify();
    }

    pub fn focus_lost(&mut self) {
        self.transition(CaptureEvent::FocusLost);
    }

    /// Records a pressed key. Returns whether the candidate changed.
    pub fn key_pressed(&mut self, raw_key: &str) -> bool {
        if self.state != CaptureState::Capturing {
            return false;
        }
        let Some(key) = normalize_key(raw_key) else {
            return false;
        };
        if self.keys.contains(&key) {
            return false;
        }

        self.keys.push(key);
        sort_keys_for_hotkey(&mut self.keys);
        self.notify();
        true
    }

    pub fn key_released(&mut self, _raw_key: &str) {}

    pub fn reset(&mut self) {
        self.keys.clear();
        self.notify();
    }

    /// Turns the current candidate into persisted hotkey settings and commits
    /// the capture. An empty candidate is rejected and the state is kept.
    pub fn confirm(&mut self) -> CaptureResult<HotkeySettings> {
        let combination = HotkeyCombination::from_keys(self.keys.iter().cloned());
        let settings = HotkeySettings::from_combination(&combination)
            .ok_or(CaptureError::EmptyCombination)?;
        self.transition(CaptureEvent::Confirmed);
        Ok(settings)
    }

    fn notify(&mut self) {
        if let Some(observer) = self.observer.as_mut() {
            observer(&self.keys);
        }
    }
}

impl Default for HotkeyCapture {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HotkeyCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HotkeyCapture")
            .field("state", &self.state)
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}
