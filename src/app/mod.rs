use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;
use std::time::Duration;

use gtk4::gio::{ApplicationFlags, ApplicationHoldGuard, SimpleAction};
use gtk4::prelude::*;
use gtk4::{gdk, glib, Application, ApplicationWindow, EventControllerKey, HeaderBar, MenuButton};

use crate::error::{AppError, AppResult};
use crate::hotkey::{self, ToggleRequest};
use crate::session::SessionContext;
use crate::tray::{self, TrayCommand};
use crate::window::{self, ToggleOutcome, WINDOW_HEIGHT, WINDOW_TITLE, WINDOW_WIDTH};

mod history_view;
mod settings;
mod window_control;
mod worker;

use self::history_view::{HistoryView, RowAction};
use self::settings::present_settings_window;
use self::window_control::{pointer_position, screen_size, GtkWindowControl};
use self::worker::spawn_worker_action;

const APPLICATION_ID: &str = "io.github.noteboard.NoteBoard";
const UI_TICK_INTERVAL: Duration = Duration::from_millis(100);

type SharedMainWindow = Rc<RefCell<Option<Rc<MainWindow>>>>;

struct MainWindow {
    window: ApplicationWindow,
    control: GtkWindowControl,
    view: Rc<HistoryView>,
    _hold_guard: ApplicationHoldGuard,
}

impl MainWindow {
    fn toggle(&self) {
        let outcome = window::toggle_window(
            &self.control,
            pointer_position(),
            screen_size(&self.window),
        );
        if let ToggleOutcome::Shown { .. } = outcome {
            self.view.refresh_if_changed();
            self.view.search_entry().grab_focus();
        }
    }
}

pub struct App {
    session: Rc<SessionContext>,
}

impl App {
    pub fn new(session: SessionContext) -> Self {
        Self {
            session: Rc::new(session),
        }
    }

    /// Runs the GTK main loop. A second launch only activates the running
    /// instance, which toggles its window.
    pub fn start(&mut self) -> AppResult<()> {
        tracing::info!(mode = ?self.session.mode(), "starting gtk runtime");
        let application = Application::new(Some(APPLICATION_ID), ApplicationFlags::default());

        let main_window: SharedMainWindow = Rc::new(RefCell::new(None));
        let startup_error = Rc::new(RefCell::new(None::<AppError>));

        {
            let session = self.session.clone();
            let main_window = main_window.clone();
            let startup_error = startup_error.clone();
            application.connect_activate(move |app| {
                let existing = main_window.borrow().clone();
                if let Some(existing) = existing {
                    tracing::debug!("activated by another launch; toggling window");
                    existing.toggle();
                    return;
                }

                match build_main_window(app, &session) {
                    Ok(built) => {
                        install_ui_tick(app, built.clone(), &session);
                        built.toggle();
                        main_window.borrow_mut().replace(built);
                    }
                    Err(err) => {
                        tracing::error!(?err, "failed to start noteboard");
                        startup_error.borrow_mut().replace(err);
                        app.quit();
                    }
                }
            });
        }
        install_app_actions(&application, &self.session, &main_window);

        // Pass only argv[0] so GTK does not try to parse our arguments.
        let gtk_args: Vec<String> = std::env::args().take(1).collect();
        let exit_code = application.run_with_args(&gtk_args);
        tracing::info!(?exit_code, "gtk runtime stopped");

        if let Some(err) = startup_error.borrow_mut().take() {
            return Err(err);
        }
        Ok(())
    }
}

fn build_main_window(app: &Application, session: &Rc<SessionContext>) -> AppResult<Rc<MainWindow>> {
    session.seed_welcome_entries();
    session.start_clipboard_poller()?;
    if let Some(outcome) = session.register_show_hide_hotkey() {
        tracing::info!(?outcome, "show/hide hotkey ready");
    }

    let window = ApplicationWindow::builder()
        .application(app)
        .title(WINDOW_TITLE)
        .default_width(WINDOW_WIDTH)
        .default_height(WINDOW_HEIGHT)
        .build();

    let header = HeaderBar::new();
    let menu = gtk4::gio::Menu::new();
    menu.append(Some("Settings"), Some("app.settings"));
    menu.append(Some("Quit"), Some("app.quit"));
    let menu_button = MenuButton::builder()
        .icon_name("open-menu-symbolic")
        .tooltip_text("Menu")
        .menu_model(&menu)
        .build();
    header.pack_end(&menu_button);
    window.set_titlebar(Some(&header));

    let view = HistoryView::new(session.history().clone(), {
        let session = session.clone();
        let window = window.clone();
        move |action| handle_row_action(&session, &window, action)
    });
    window.set_child(Some(view.root()));

    window.connect_close_request(|window| {
        window.set_visible(false);
        glib::Propagation::Stop
    });

    let key_controller = EventControllerKey::new();
    {
        let window = window.clone();
        key_controller.connect_key_pressed(move |_, key, _, _| {
            if key == gdk::Key::Escape {
                window.set_visible(false);
                return glib::Propagation::Stop;
            }
            glib::Propagation::Proceed
        });
    }
    window.add_controller(key_controller);

    app.set_accels_for_action("app.quit", &["<Ctrl>q"]);

    let control = GtkWindowControl::new(window.clone(), session.mode());
    Ok(Rc::new(MainWindow {
        window,
        control,
        view,
        _hold_guard: <Application as gtk4::gio::prelude::ApplicationExtManual>::hold(app),
    }))
}

/// Redraws the history when it changed and serves hotkey and tray requests.
fn install_ui_tick(app: &Application, main_window: Rc<MainWindow>, session: &SessionContext) {
    let (requests_tx, requests_rx) = mpsc::channel::<ToggleRequest>();
    if let Some(active) = session.active_hotkey() {
        if let Err(err) = hotkey::spawn_listener(active, requests_tx) {
            tracing::warn!(?err, "failed to start hotkey listener");
            crate::notification::warn_capability_missing("Global shortcut", &err);
        }
    }

    let (tray_tx, tray_rx) = mpsc::channel::<TrayCommand>();
    let tray_handle = match tray::spawn_tray(tray_tx) {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::warn!(?err, "failed to start tray icon");
            crate::notification::warn_capability_missing("System tray", &err);
            None
        }
    };

    let app = app.clone();
    glib::timeout_add_local(UI_TICK_INTERVAL, move || {
        // Owning the handle here ties the tray icon to the UI loop.
        let _tray = &tray_handle;
        main_window.view.refresh_if_changed();
        while let Ok(request) = requests_rx.try_recv() {
            main_window.toggle();
            request.complete();
        }
        while let Ok(command) = tray_rx.try_recv() {
            tracing::debug!(?command, "tray command");
            app.activate_action(command.action_name(), None);
        }
        glib::ControlFlow::Continue
    });
}

fn install_app_actions(
    application: &Application,
    session: &Rc<SessionContext>,
    main_window: &SharedMainWindow,
) {
    let toggle = SimpleAction::new("toggle", None);
    {
        let main_window = main_window.clone();
        toggle.connect_activate(move |_, _| {
            let current = main_window.borrow().clone();
            if let Some(current) = current {
                current.toggle();
            }
        });
    }
    application.add_action(&toggle);

    let settings = SimpleAction::new("settings", None);
    {
        let application = application.clone();
        let session = session.clone();
        settings.connect_activate(move |_, _| present_settings_window(&application, &session));
    }
    application.add_action(&settings);

    let quit = SimpleAction::new("quit", None);
    {
        let application = application.clone();
        quit.connect_activate(move |_, _| {
            tracing::info!("quit requested");
            application.quit();
        });
    }
    application.add_action(&quit);
}

fn handle_row_action(session: &SessionContext, window: &ApplicationWindow, action: RowAction) {
    tracing::debug!(?action, "history row action");
    match action {
        RowAction::Copy(position) => {
            let Some(content) = session.entry_content(position) else {
                return;
            };
            let clipboard = session.clipboard();
            let window = window.clone();
            spawn_worker_action(
                move || clipboard.write_text(&content),
                move |result| match result {
                    Ok(()) => window.set_visible(false),
                    Err(err) => {
                        tracing::warn!(?err, "failed to copy entry to clipboard");
                        crate::notification::send(format!("Could not copy to clipboard: {err}"));
                    }
                },
            );
        }
        RowAction::TogglePin(position) => {
            session.toggle_pin(position);
        }
        RowAction::Delete(position) => {
            session.delete_entry(position);
        }
        RowAction::ClearUnpinned => {
            session.clear_unpinned();
        }
    }
}
