use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("command failed: {command}: {message}")]
    CommandFailed { command: String, message: String },
    #[error("command io error: {command}")]
    CommandIo {
        command: String,
        #[source]
        source: io::Error,
    },
}

pub type CommandResult<T> = std::result::Result<T, CommandError>;

/// Runs `command` and returns its stdout. Empty output is not an error.
pub fn run_output<S: AsRef<OsStr>>(command: S, args: &[&str]) -> CommandResult<String> {
    let command = command.as_ref();
    let label = command_label(command);
    tracing::debug!(command = %label, ?args, "running command");

    let output = Command::new(command)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|err| CommandError::CommandIo {
            command: label.clone(),
            source: err,
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CommandError::CommandFailed {
            command: label,
            message: format!("exit status: {}; stderr: {}", output.status, stderr.trim()),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

pub fn run_status<S: AsRef<OsStr>>(command: S, args: &[&str]) -> CommandResult<()> {
    let command = command.as_ref();
    let label = command_label(command);
    tracing::debug!(command = %label, ?args, "running command");

    let status = Command::new(command)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|err| CommandError::CommandIo {
            command: label.clone(),
            source: err,
        })?;

    if status.success() {
        Ok(())
    } else {
        Err(CommandError::CommandFailed {
            command: label,
            message: format!("command exited with status: {status}"),
        })
    }
}

/// Feeds `payload` to the command's stdin and waits for it to exit.
///
/// Output streams are discarded rather than piped: clipboard owners such as
/// `wl-copy` fork a server that keeps inherited pipes open indefinitely.
pub fn run_with_stdin<S: AsRef<OsStr>>(
    command: S,
    args: &[&str],
    payload: &str,
) -> CommandResult<()> {
    let command = command.as_ref();
    let label = command_label(command);
    tracing::debug!(command = %label, ?args, bytes = payload.len(), "running command with stdin");

    let mut child = Command::new(command)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|err| CommandError::CommandIo {
            command: label.clone(),
            source: err,
        })?;

    {
        let Some(mut stdin) = child.stdin.take() else {
            cleanup_command_child(&mut child);
            return Err(CommandError::CommandFailed {
                command: label,
                message: "command stdin unavailable".to_string(),
            });
        };
        if let Err(err) = stdin.write_all(payload.as_bytes()) {
            cleanup_command_child(&mut child);
            return Err(CommandError::CommandIo {
                command: label,
                source: err,
            });
        }
    }

    let status = child.wait().map_err(|err| CommandError::CommandIo {
        command: label.clone(),
        source: err,
    })?;
    if status.success() {
        Ok(())
    } else {
        Err(CommandError::CommandFailed {
            command: label,
            message: format!("command exited with status: {status}"),
        })
    }
}

/// Starts the command without waiting for it.
pub fn spawn_detached<S: AsRef<OsStr>>(command: S, args: &[&str]) -> CommandResult<()> {
    let command = command.as_ref();
    let label = command_label(command);
    tracing::debug!(command = %label, ?args, "spawning detached command");

    Command::new(command)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map(|_| ())
        .map_err(|err| CommandError::CommandIo {
            command: label,
            source: err,
        })
}

/// First candidate found on `PATH`, in preference order.
pub fn find_tool(candidates: &[&str]) -> Option<PathBuf> {
    candidates
        .iter()
        .find_map(|candidate| which::which(candidate).ok())
}

pub fn tool_available(name: &str) -> bool {
    find_tool(&[name]).is_some()
}

fn command_label(command: &OsStr) -> String {
    Path::new(command)
        .file_name()
        .unwrap_or(command)
        .to_string_lossy()
        .into_owned()
}

fn cleanup_command_child(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
