use std::cell::{Ref, RefCell};
use std::sync::Arc;
use std::thread;

use crate::clipboard::{ClipboardBackend, ClipboardPoller};
use crate::config::{AppConfig, ConfigStore};
use crate::environment::{self, Capabilities, DisplayMode, SessionSignals};
use crate::history::{ClipboardEntry, SharedHistory};
use crate::hotkey::{ActiveHotkey, HotkeyError, RegistrationOutcome};
use crate::input::{HotkeyCapture, HotkeySettings};
use crate::notification;
use crate::window::KeepOnTop;
use crate::{AppError, AppResult};

const DELEGATED_HOTKEY_HINT: &str = "Using KDE global shortcuts (set in System Settings)";

/// Status lines shown in the history on startup, oldest first. The hotkey
/// hint is left out when no show/hide combination is configured.
pub fn welcome_messages(mode: DisplayMode, hotkeys: &HotkeySettings) -> Vec<String> {
    let hotkey_hint = match mode {
        DisplayMode::Direct if hotkeys.is_unset() => None,
        DisplayMode::Direct => Some(format!("Press {} to open this manager", hotkeys.display())),
        DisplayMode::Delegated => Some(DELEGATED_HOTKEY_HINT.to_string()),
    };
    [
        Some(format!("Running on {} mode", mode.session_label())),
        Some("Welcome to NoteBoard!".to_string()),
        hotkey_hint,
        Some("Items copied to your clipboard will appear here".to_string()),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Process-wide state, owned by the UI thread and shared by reference.
pub struct SessionContext {
    capabilities: RefCell<Capabilities>,
    config: ConfigStore,
    history: SharedHistory,
    hotkeys: RefCell<HotkeySettings>,
}

impl SessionContext {
    pub fn new(capabilities: Capabilities, config: ConfigStore, history: SharedHistory) -> Self {
        let AppConfig { hotkeys } = config.load();
        tracing::info!(hotkey = %hotkeys.display(), path = ?config.path(), "loaded configuration");
        Self {
            capabilities: RefCell::new(capabilities),
            config,
            history,
            hotkeys: RefCell::new(hotkeys),
        }
    }

    pub fn from_env() -> Self {
        let signals = SessionSignals::from_env();
        let capabilities = Capabilities::resolve(&signals);
        let missing = environment::missing_tools(capabilities.mode());
        if !missing.is_empty() {
            notification::warn_capability_missing(
                "Desktop tools",
                format!("not found on PATH: {}", missing.join(", ")),
            );
        }
        Self::new(capabilities, ConfigStore::from_env(), SharedHistory::default())
    }

    pub fn mode(&self) -> DisplayMode {
        self.capabilities.borrow().mode()
    }

    pub fn history(&self) -> &SharedHistory {
        &self.history
    }

    pub fn hotkeys(&self) -> Ref<'_, HotkeySettings> {
        self.hotkeys.borrow()
    }

    pub fn clipboard(&self) -> Arc<dyn ClipboardBackend> {
        self.capabilities.borrow().clipboard()
    }

    pub fn active_hotkey(&self) -> Option<ActiveHotkey> {
        self.capabilities.borrow().active_hotkey()
    }

    pub fn seed_welcome_entries(&self) {
        for message in welcome_messages(self.mode(), &self.hotkeys()) {
            self.history.add_entry(ClipboardEntry::status(message));
        }
    }

    pub fn start_clipboard_poller(&self) -> AppResult<thread::JoinHandle<()>> {
        ClipboardPoller::new(self.clipboard(), self.history.clone())
            .spawn()
            .map_err(|source| AppError::Thread {
                name: "clipboard poller",
                source,
            })
    }

    /// Registers the persisted hotkey. Failures degrade the feature and are
    /// surfaced as a warning rather than an error.
    pub fn register_show_hide_hotkey(&self) -> Option<RegistrationOutcome> {
        let settings = self.hotkeys.borrow().clone();
        match self.capabilities.borrow_mut().register_hotkey(&settings) {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                report_hotkey_failure(&err);
                None
            }
        }
    }

    /// Confirms the capture surface's candidate and applies it.
    /// An empty candidate leaves the persisted settings untouched.
    pub fn confirm_capture(
        &self,
        capture: &mut HotkeyCapture,
    ) -> AppResult<Option<RegistrationOutcome>> {
        let settings = capture.confirm()?;
        self.apply_hotkey(settings)
    }

    /// Registers and persists a new hotkey.
    ///
    /// A key the hook cannot express is rejected before anything is saved and
    /// the previous registration stays. A missing capability still saves the
    /// choice and returns `None`. Once registration went through, a failed
    /// save only warns: the session keeps the new hotkey for this run.
    pub fn apply_hotkey(
        &self,
        settings: HotkeySettings,
    ) -> AppResult<Option<RegistrationOutcome>> {
        let registered = self.capabilities.borrow_mut().register_hotkey(&settings);
        let outcome = match registered {
            Ok(outcome) => Some(outcome),
            Err(err @ HotkeyError::UnsupportedKey { .. }) => return Err(err.into()),
            Err(err) => {
                report_hotkey_failure(&err);
                None
            }
        };

        match self.config.save(&AppConfig {
            hotkeys: settings.clone(),
        }) {
            Ok(()) => tracing::info!(hotkey = %settings.display(), "saved hotkey settings"),
            Err(err) => {
                tracing::warn!(?err, hotkey = %settings.display(), "failed to save hotkey settings");
                notification::warn_capability_missing("Saving settings", &err);
            }
        }
        *self.hotkeys.borrow_mut() = settings;
        Ok(outcome)
    }

    pub fn entry_content(&self, position: usize) -> Option<String> {
        self.history.content_at(position)
    }

    pub fn delete_entry(&self, position: usize) -> bool {
        self.history.remove_item(position)
    }

    pub fn toggle_pin(&self, position: usize) -> bool {
        self.history.toggle_pin(position)
    }

    pub fn clear_unpinned(&self) -> bool {
        self.history.clear_items()
    }

    /// Shareable handle so callers can toggle keep-on-top off the UI thread.
    pub fn keep_on_top(&self) -> Arc<dyn KeepOnTop> {
        self.capabilities.borrow().keep_on_top()
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("capabilities", &self.capabilities)
            .field("config", &self.config)
            .field("hotkeys", &self.hotkeys)
            .finish_non_exhaustive()
    }
}

fn report_hotkey_failure(err: &HotkeyError) {
    match err {
        HotkeyError::UnsupportedKey { .. } => {
            tracing::warn!(?err, "configured hotkey cannot be registered");
            notification::send(format!("{err}"));
        }
        _ => notification::warn_capability_missing("Global shortcut", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::fake::FakeClipboard;
    use crate::hotkey::{HotkeyRegistrar, HotkeyResult};
    use crate::input::CaptureError;
    use crate::window::{KeepOnTop, WindowResult};
    use std::rc::Rc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[derive(Default)]
    struct RecordingRegistrar {
        registered: Rc<RefCell<Vec<HotkeySettings>>>,
    }

    impl HotkeyRegistrar for RecordingRegistrar {
        fn register(&mut self, settings: &HotkeySettings) -> HotkeyResult<RegistrationOutcome> {
            if settings.action_key == "alt" {
                return Err(HotkeyError::UnsupportedKey {
                    key: settings.action_key.clone(),
                });
            }
            self.registered.borrow_mut().push(settings.clone());
            Ok(RegistrationOutcome::Hooked { id: 7 })
        }

        fn active_hotkey(&self) -> Option<ActiveHotkey> {
            None
        }
    }

    #[derive(Default)]
    struct FlagKeepOnTop(AtomicBool);

    impl KeepOnTop for FlagKeepOnTop {
        fn set_keep_on_top(&self, enabled: bool) -> WindowResult<()> {
            self.0.store(enabled, Ordering::SeqCst);
            Ok(())
        }

        fn is_enabled(&self) -> bool {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct Fixture {
        _dir: tempfile::TempDir,
        session: SessionContext,
        registered: Rc<RefCell<Vec<HotkeySettings>>>,
        config: ConfigStore,
    }

    fn fixture(mode: DisplayMode) -> Fixture {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ConfigStore::at(dir.path().join("noteboard").join("config.json"));
        let registrar = RecordingRegistrar::default();
        let registered = registrar.registered.clone();
        let capabilities = Capabilities::new(
            mode,
            Arc::new(FakeClipboard::default()),
            Box::new(registrar),
            Arc::new(FlagKeepOnTop::default()),
        );
        let session = SessionContext::new(capabilities, config.clone(), SharedHistory::default());
        Fixture {
            _dir: dir,
            session,
            registered,
            config,
        }
    }

    fn contents(session: &SessionContext) -> Vec<String> {
        session
            .history()
            .snapshot()
            .entries()
            .iter()
            .map(|entry| entry.content().to_string())
            .collect()
    }

    #[test]
    fn welcome_messages_describe_direct_mode_hotkey() {
        let messages = welcome_messages(DisplayMode::Direct, &HotkeySettings::default());
        assert_eq!(
            messages,
            vec![
                "Running on X11 mode",
                "Welcome to NoteBoard!",
                "Press ctrl+alt+v to open this manager",
                "Items copied to your clipboard will appear here",
            ]
        );
    }

    #[test]
    fn welcome_messages_point_delegated_mode_to_shell_settings() {
        let messages = welcome_messages(DisplayMode::Delegated, &HotkeySettings::default());
        assert_eq!(messages[0], "Running on Wayland mode");
        assert_eq!(messages[2], DELEGATED_HOTKEY_HINT);
    }

    #[test]
    fn seeded_entries_are_status_entries_newest_first() {
        let fixture = fixture(DisplayMode::Direct);
        fixture.session.seed_welcome_entries();

        let snapshot = fixture.session.history().snapshot();
        assert_eq!(snapshot.entries().len(), 4);
        assert_eq!(
            snapshot.entries()[0].content(),
            "Items copied to your clipboard will appear here"
        );
        assert!(snapshot
            .entries()
            .iter()
            .all(|entry| entry.kind() == crate::history::EntryKind::Status));
    }

    #[test]
    fn new_session_writes_default_config() {
        let fixture = fixture(DisplayMode::Direct);
        assert!(fixture.config.path().expect("file-backed store").exists());
        assert_eq!(*fixture.session.hotkeys(), HotkeySettings::default());
    }

    #[test]
    fn apply_hotkey_registers_then_persists() {
        let fixture = fixture(DisplayMode::Direct);
        let settings = HotkeySettings::from_parts("super", "c");

        let outcome = fixture.session.apply_hotkey(settings.clone()).expect("apply");

        assert_eq!(outcome, Some(RegistrationOutcome::Hooked { id: 7 }));
        assert_eq!(*fixture.registered.borrow(), vec![settings.clone()]);
        assert_eq!(fixture.config.load().hotkeys, settings);
        assert_eq!(*fixture.session.hotkeys(), settings);
    }

    #[test]
    fn unsupported_hotkey_is_not_persisted() {
        let fixture = fixture(DisplayMode::Direct);

        let result = fixture
            .session
            .apply_hotkey(HotkeySettings::from_parts("ctrl", "alt"));

        assert!(matches!(
            result,
            Err(AppError::Hotkey(HotkeyError::UnsupportedKey { .. }))
        ));
        assert_eq!(fixture.config.load().hotkeys, HotkeySettings::default());
        assert_eq!(*fixture.session.hotkeys(), HotkeySettings::default());
    }

    #[test]
    fn confirming_empty_capture_leaves_settings_untouched() {
        let fixture = fixture(DisplayMode::Direct);
        let mut capture = HotkeyCapture::new();
        capture.focus_gained();

        let result = fixture.session.confirm_capture(&mut capture);

        assert!(matches!(
            result,
            Err(AppError::Capture(CaptureError::EmptyCombination))
        ));
        assert!(fixture.registered.borrow().is_empty());
        assert_eq!(fixture.config.load().hotkeys, HotkeySettings::default());
    }

    #[test]
    fn confirming_capture_applies_sorted_combination() {
        let fixture = fixture(DisplayMode::Direct);
        let mut capture = HotkeyCapture::new();
        capture.focus_gained();
        capture.key_pressed("k");
        capture.key_pressed("Shift_L");
        capture.key_pressed("Control_R");

        fixture.session.confirm_capture(&mut capture).expect("confirm");

        assert_eq!(capture.state(), crate::input::CaptureState::Committed);

        let saved = fixture.config.load().hotkeys;
        assert_eq!(saved.modifier_key, "ctrl+shift");
        assert_eq!(saved.action_key, "k");
    }

    #[test]
    fn row_actions_mutate_shared_history() {
        let fixture = fixture(DisplayMode::Direct);
        let history = fixture.session.history();
        history.add_item("a");
        history.add_item("b");
        history.add_item("c");

        assert!(fixture.session.toggle_pin(1));
        assert!(fixture.session.delete_entry(0));
        assert_eq!(contents(&fixture.session), vec!["b", "a"]);

        assert!(fixture.session.clear_unpinned());
        assert_eq!(contents(&fixture.session), vec!["b"]);
        assert_eq!(fixture.session.entry_content(0).as_deref(), Some("b"));
    }

    #[test]
    fn keep_on_top_handle_is_shared_with_capabilities() {
        let fixture = fixture(DisplayMode::Delegated);
        let handle = fixture.session.keep_on_top();
        assert!(!handle.is_enabled());

        std::thread::spawn(move || handle.set_keep_on_top(true))
            .join()
            .expect("worker thread")
            .expect("keep on top");
        assert!(fixture.session.keep_on_top().is_enabled());
    }

    #[test]
    fn welcome_messages_skip_hint_when_hotkey_is_unset() {
        let messages = welcome_messages(DisplayMode::Direct, &HotkeySettings::from_parts("", ""));
        assert_eq!(
            messages,
            vec![
                "Running on X11 mode",
                "Welcome to NoteBoard!",
                "Items copied to your clipboard will appear here",
            ]
        );
    }

    #[test]
    fn failed_save_still_applies_registered_hotkey() {
        let dir = tempfile::tempdir().expect("tempdir");
        // A regular file where the config directory should be makes every save fail.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").expect("write blocker");
        let registrar = RecordingRegistrar::default();
        let registered = registrar.registered.clone();
        let capabilities = Capabilities::new(
            DisplayMode::Direct,
            Arc::new(FakeClipboard::default()),
            Box::new(registrar),
            Arc::new(FlagKeepOnTop::default()),
        );
        let session = SessionContext::new(
            capabilities,
            ConfigStore::at(blocker.join("config.json")),
            SharedHistory::default(),
        );
        let settings = HotkeySettings::from_parts("super", "c");

        let outcome = session.apply_hotkey(settings.clone()).expect("apply");

        assert_eq!(outcome, Some(RegistrationOutcome::Hooked { id: 7 }));
        assert_eq!(*registered.borrow(), vec![settings.clone()]);
        assert_eq!(*session.hotkeys(), settings);
    }

    #[test]
    fn session_without_config_directory_runs_on_defaults() {
        let capabilities = Capabilities::new(
            DisplayMode::Direct,
            Arc::new(FakeClipboard::default()),
            Box::new(RecordingRegistrar::default()),
            Arc::new(FlagKeepOnTop::default()),
        );
        let session =
            SessionContext::new(capabilities, ConfigStore::in_memory(), SharedHistory::default());
        assert_eq!(*session.hotkeys(), HotkeySettings::default());

        let settings = HotkeySettings::from_parts("ctrl", "f5");
        session.apply_hotkey(settings.clone()).expect("apply");
        assert_eq!(*session.hotkeys(), settings);
    }
}
