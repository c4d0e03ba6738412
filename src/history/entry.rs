use chrono::{DateTime, Local};

const PREVIEW_LINE_COUNT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Text observed on the system clipboard.
    Text,
    /// Synthetic message injected by the app itself.
    Status,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardEntry {
    content: String,
    captured_at: DateTime<Local>,
    kind: EntryKind,
}

impl ClipboardEntry {
    pub fn new(content: impl Into<String>, kind: EntryKind) -> Self {
        Self::captured_at(content, kind, Local::now())
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(content, EntryKind::Text)
    }

    pub fn status(content: impl Into<String>) -> Self {
        Self::new(content, EntryKind::Status)
    }

    pub fn captured_at(
        content: impl Into<String>,
        kind: EntryKind,
        captured_at: DateTime<Local>,
    ) -> Self {
        Self {
            content: content.into(),
            captured_at,
            kind,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn time_label(&self) -> String {
        self.captured_at.format("%H:%M:%S").to_string()
    }

    /// First two lines of the content, and whether anything was cut off.
    pub fn preview(&self) -> (String, bool) {
        let mut lines = self.content.split('\n');
        let head = lines
            .by_ref()
            .take(PREVIEW_LINE_COUNT)
            .collect::<Vec<_>>()
            .join("\n");
        let truncated = lines.next().is_some();
        (head, truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn preview_keeps_short_content_intact() {
        let entry = ClipboardEntry::text("first\nsecond");
        assert_eq!(entry.preview(), ("first\nsecond".to_string(), false));
    }

    #[test]
    fn preview_truncates_after_two_lines() {
        let entry = ClipboardEntry::text("one\ntwo\nthree\nfour");
        assert_eq!(entry.preview(), ("one\ntwo".to_string(), true));
    }

    #[test]
    fn time_label_uses_24_hour_clock() {
        let at = Local
            .with_ymd_and_hms(2024, 3, 9, 17, 4, 5)
            .single()
            .expect("unambiguous local time");
        let entry = ClipboardEntry::captured_at("x", EntryKind::Text, at);
        assert_eq!(entry.time_label(), "17:04:05");
    }
}
