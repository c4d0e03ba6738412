const APP_NAME: &str = "NoteBoard";

pub fn send(body: impl Into<String>) {
    send_with_summary(APP_NAME, body);
}

fn send_with_summary(summary: &str, body: impl Into<String>) {
    let body = body.into();
    if let Err(err) = notify_rust::Notification::new()
        .appname(APP_NAME)
        .summary(summary)
        .body(&body)
        .show()
    {
        tracing::warn!("system notification failed: {err}");
    }
}

/// Non-blocking warning for a session feature that could not be set up.
pub fn warn_capability_missing(feature: &str, detail: impl std::fmt::Display) {
    tracing::warn!(feature, %detail, "capability unavailable");
    send_with_summary(
        &format!("{APP_NAME}: {feature} unavailable"),
        detail.to_string(),
    );
}
