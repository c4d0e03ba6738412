use std::time::Duration;

use super::{Point, WindowError, WindowResult};
use crate::process;

const XDOTOOL: &str = "xdotool";
const WINDOW_LOOKUP_RETRY_COUNT: u8 = 10;
const WINDOW_LOOKUP_RETRY_DELAY: Duration = Duration::from_millis(50);

fn first_window_id(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && line.bytes().all(|byte| byte.is_ascii_digit()))
        .map(str::to_string)
}

fn retry_until_some<T, F, S>(
    retry_count: u8,
    retry_delay: Duration,
    mut action: F,
    mut sleep: S,
) -> Option<T>
where
    F: FnMut(u8) -> Option<T>,
    S: FnMut(Duration),
{
    for attempt in 1..=retry_count {
        if let Some(value) = action(attempt) {
            return Some(value);
        }
        if attempt < retry_count {
            sleep(retry_delay);
        }
    }
    None
}

/// X11 window id for an exact title, retried briefly because a freshly
/// shown window may not be mapped yet.
pub fn find_x11_window(title: &str) -> WindowResult<String> {
    let pattern = format!("^{title}$");
    retry_until_some(
        WINDOW_LOOKUP_RETRY_COUNT,
        WINDOW_LOOKUP_RETRY_DELAY,
        |attempt| match process::run_output(XDOTOOL, &["search", "--name", &pattern]) {
            Ok(stdout) => first_window_id(&stdout),
            Err(err) => {
                tracing::debug!(?err, attempt, title, "xdotool window search failed");
                None
            }
        },
        std::thread::sleep,
    )
    .ok_or_else(|| WindowError::NotFound {
        title: title.to_string(),
    })
}

pub fn move_x11_window(title: &str, position: Point) -> WindowResult<()> {
    let window_id = find_x11_window(title)?;
    process::run_status(
        XDOTOOL,
        &[
            "windowmove",
            &window_id,
            &position.x.to_string(),
            &position.y.to_string(),
        ],
    )?;
    Ok(())
}
