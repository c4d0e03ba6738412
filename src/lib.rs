pub mod app;
pub mod clipboard;
pub mod config;
pub mod environment;
pub mod error;
pub mod history;
pub mod hotkey;
pub mod input;
pub mod logging;
pub mod notification;
pub mod process;
pub mod session;
pub mod shell;
pub mod tray;
pub mod window;
pub use error::{AppError, AppResult};

/// Entrypoint used by the binary.
pub fn run() -> AppResult<()> {
    logging::init();
    tracing::info!("starting NoteBoard");

    let session = session::SessionContext::from_env();
    tracing::info!(mode = ?session.mode(), "resolved display mode");

    let mut app = app::App::new(session);
    app.start()?;

    tracing::info!("NoteBoard stopped");
    Ok(())
}
