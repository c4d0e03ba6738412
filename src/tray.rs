use std::sync::mpsc::Sender;

use ksni::blocking::{Handle, TrayMethods};
use ksni::menu::StandardItem;
use ksni::{MenuItem, Tray};
use thiserror::Error;

use crate::window::WINDOW_TITLE;

const TRAY_ID: &str = "noteboard";
const TRAY_ICON: &str = "edit-paste";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayCommand {
    Toggle,
    Settings,
    Quit,
}

impl TrayCommand {
    /// Name of the application action that serves this command.
    pub const fn action_name(self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::Settings => "settings",
            Self::Quit => "quit",
        }
    }
}

const MENU_ENTRIES: [(&str, TrayCommand); 3] = [
    ("Show/Hide", TrayCommand::Toggle),
    ("Settings", TrayCommand::Settings),
    ("Quit", TrayCommand::Quit),
];

#[derive(Debug, Error)]
pub enum TrayError {
    #[error("failed to register the status notifier item")]
    Spawn(#[from] ksni::Error),
}

/// Panel icon. Runs on the tray service thread and forwards every click to
/// the UI thread as a [`TrayCommand`].
#[derive(Debug)]
pub struct NoteBoardTray {
    commands: Sender<TrayCommand>,
}

impl NoteBoardTray {
    pub fn new(commands: Sender<TrayCommand>) -> Self {
        Self { commands }
    }

    fn send(&self, command: TrayCommand) {
        if self.commands.send(command).is_err() {
            tracing::debug!(?command, "tray command dropped; ui loop is gone");
        }
    }
}

impl Tray for NoteBoardTray {
    fn id(&self) -> String {
        TRAY_ID.into()
    }

    fn title(&self) -> String {
        WINDOW_TITLE.into()
    }

    fn icon_name(&self) -> String {
        TRAY_ICON.into()
    }

    fn activate(&mut self, _x: i32, _y: i32) {
        self.send(TrayCommand::Toggle);
    }

    fn menu(&self) -> Vec<MenuItem<Self>> {
        MENU_ENTRIES
            .iter()
            .map(|&(label, command)| {
                StandardItem {
                    label: label.into(),
                    activate: Box::new(move |tray: &mut Self| tray.send(command)),
                    ..Default::default()
                }
                .into()
            })
            .collect()
    }
}

/// Publishes the tray icon. The returned handle keeps the service alive.
pub fn spawn_tray(commands: Sender<TrayCommand>) -> Result<Handle<NoteBoardTray>, TrayError> {
    let handle = NoteBoardTray::new(commands).spawn()?;
    tracing::info!(id = TRAY_ID, "tray icon registered");
    Ok(handle)
}
