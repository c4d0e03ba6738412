use super::{ShellConfigBackend, ShellResult};

pub const RULES_FILE: &str = "kwinrulesrc";
const GENERAL_GROUP: &str = "General";
const COUNT_KEY: &str = "count";
const RULES_KEY: &str = "rules";

// KWin rule policy values.
const RULE_FORCE: &str = "2";
const RULE_APPLY_ALL: &str = "3";
const TITLE_MATCH_EXACT: &str = "0";
const LAYER_ABOVE: &str = "4";
const LAYER_NORMAL: &str = "0";

fn rule_count(backend: &dyn ShellConfigBackend) -> usize {
    backend
        .read_entry(RULES_FILE, GENERAL_GROUP, COUNT_KEY)
        .and_then(|count| count.parse().ok())
        .unwrap_or(0)
}

/// Group names listed in `General/rules`, when the store keeps that list.
fn listed_rules(backend: &dyn ShellConfigBackend) -> Option<Vec<String>> {
    backend
        .read_entry(RULES_FILE, GENERAL_GROUP, RULES_KEY)
        .map(|rules| {
            rules
                .split(',')
                .map(str::trim)
                .filter(|rule| !rule.is_empty())
                .map(str::to_string)
                .collect()
        })
}

fn candidate_groups(backend: &dyn ShellConfigBackend) -> Vec<String> {
    listed_rules(backend).unwrap_or_else(|| {
        (1..=rule_count(backend))
            .map(|index| index.to_string())
            .collect()
    })
}

fn rule_matches(backend: &dyn ShellConfigBackend, group: &str, title: &str) -> bool {
    if backend
        .read_entry(RULES_FILE, group, "Description")
        .is_some_and(|description| description.contains(title))
    {
        return true;
    }
    backend
        .read_entry(RULES_FILE, group, "title")
        .is_some_and(|rule_title| rule_title == title)
}

/// Looks up the rule group for `title` without touching the store.
pub fn find_window_rule(backend: &dyn ShellConfigBackend, title: &str) -> Option<String> {
    candidate_groups(backend)
        .into_iter()
        .find(|group| rule_matches(backend, group, title))
}

/// Returns the rule group for `title` and whether it was newly allocated.
pub fn find_or_create_window_rule(
    backend: &dyn ShellConfigBackend,
    title: &str,
) -> ShellResult<(String, bool)> {
    if let Some(group) = find_window_rule(backend, title) {
        return Ok((group, false));
    }

    let listed = listed_rules(backend);
    let mut next = rule_count(backend) + 1;
    if let Some(listed) = listed.as_ref() {
        while listed.contains(&next.to_string()) {
            next += 1;
        }
    }
    let group = next.to_string();
    let count = listed.as_ref().map_or(next, |listed| listed.len() + 1);

    backend.write_entry(RULES_FILE, GENERAL_GROUP, COUNT_KEY, &count.to_string())?;
    if let Some(mut listed) = listed {
        listed.push(group.clone());
        backend.write_entry(RULES_FILE, GENERAL_GROUP, RULES_KEY, &listed.join(","))?;
    }
    tracing::debug!(%group, title, "allocated window rule");
    Ok((group, true))
}

/// Writes a keep-above rule matched on the exact window title and reloads
/// the window manager.
pub fn set_keep_above(
    backend: &dyn ShellConfigBackend,
    title: &str,
    enabled: bool,
) -> ShellResult<()> {
    let (group, is_new) = find_or_create_window_rule(backend, title)?;
    let write = |key: &str, value: &str| backend.write_entry(RULES_FILE, &group, key, value);

    write("above", if enabled { "true" } else { "false" })?;
    write("aboverule", RULE_FORCE)?;

    if is_new || enabled {
        write("title", title)?;
        write("titlematch", TITLE_MATCH_EXACT)?;
        write("Description", &format!("{title} Window Rule"))?;
        write("layer", if enabled { LAYER_ABOVE } else { LAYER_NORMAL })?;
        write("layerrule", RULE_FORCE)?;
        write("desktops", "")?;
        write("desktopsrule", RULE_APPLY_ALL)?;
        write("activity", "")?;
        write("activityrule", RULE_APPLY_ALL)?;
    }

    backend.reconfigure()?;
    tracing::info!(%group, enabled, "updated keep-above window rule");
    Ok(())
}

pub fn is_keep_above_enabled(backend: &dyn ShellConfigBackend, title: &str) -> bool {
    find_window_rule(backend, title)
        .and_then(|group| backend.read_entry(RULES_FILE, &group, "above"))
        .is_some_and(|above| above == "true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::memory::MemoryShellConfig;

    const TITLE: &str = "NoteBoard";

    #[test]
    fn keep_above_creates_rule_in_next_slot() {
        let backend = MemoryShellConfig::default();
        backend.set(RULES_FILE, "General", "count", "2");
        backend.set(RULES_FILE, "1", "Description", "Firefox rule");
        backend.set(RULES_FILE, "2", "title", "Terminal");

        set_keep_above(&backend, TITLE, true).expect("write rule");

        assert_eq!(backend.get(RULES_FILE, "General", "count").as_deref(), Some("3"));
        assert_eq!(backend.get(RULES_FILE, "3", "above").as_deref(), Some("true"));
        assert_eq!(backend.get(RULES_FILE, "3", "aboverule").as_deref(), Some("2"));
        assert_eq!(backend.get(RULES_FILE, "3", "title").as_deref(), Some(TITLE));
        assert_eq!(backend.get(RULES_FILE, "3", "titlematch").as_deref(), Some("0"));
        assert_eq!(
            backend.get(RULES_FILE, "3", "Description").as_deref(),
            Some("NoteBoard Window Rule")
        );
        assert_eq!(backend.get(RULES_FILE, "3", "layer").as_deref(), Some("4"));
        assert_eq!(backend.get(RULES_FILE, "3", "desktopsrule").as_deref(), Some("3"));
        assert_eq!(backend.get(RULES_FILE, "3", "activityrule").as_deref(), Some("3"));
        assert_eq!(backend.reconfigure_count(), 1);
    }

    #[test]
    fn keep_above_reuses_existing_rule() {
        let backend = MemoryShellConfig::default();
        set_keep_above(&backend, TITLE, true).expect("first write");
        set_keep_above(&backend, TITLE, false).expect("second write");

        assert_eq!(backend.get(RULES_FILE, "General", "count").as_deref(), Some("1"));
        assert_eq!(backend.get(RULES_FILE, "1", "above").as_deref(), Some("false"));
        // Disabling an existing rule leaves its matching keys alone.
        assert_eq!(backend.get(RULES_FILE, "1", "layer").as_deref(), Some("4"));
        assert!(!is_keep_above_enabled(&backend, TITLE));
    }

    #[test]
    fn rule_found_by_exact_title() {
        let backend = MemoryShellConfig::default();
        backend.set(RULES_FILE, "General", "count", "2");
        backend.set(RULES_FILE, "1", "title", "NoteBoard Settings");
        backend.set(RULES_FILE, "2", "title", TITLE);

        assert_eq!(find_window_rule(&backend, TITLE).as_deref(), Some("2"));
    }

    #[test]
    fn listed_rules_are_scanned_and_extended() {
        let backend = MemoryShellConfig::default();
        backend.set(RULES_FILE, "General", "count", "2");
        backend.set(RULES_FILE, "General", "rules", "1,3");
        backend.set(RULES_FILE, "3", "title", "Terminal");

        let (group, is_new) = find_or_create_window_rule(&backend, TITLE).expect("allocate");

        assert!(is_new);
        assert_eq!(group, "4");
        assert_eq!(backend.get(RULES_FILE, "General", "rules").as_deref(), Some("1,3,4"));
        assert_eq!(backend.get(RULES_FILE, "General", "count").as_deref(), Some("3"));
    }

    #[test]
    fn reading_keep_above_never_allocates() {
        let backend = MemoryShellConfig::default();
        backend.set(RULES_FILE, "General", "count", "1");
        backend.set(RULES_FILE, "1", "title", "Terminal");
        let entries = backend.entry_count();

        assert!(!is_keep_above_enabled(&backend, TITLE));
        assert_eq!(backend.entry_count(), entries);
        assert_eq!(backend.get(RULES_FILE, "General", "count").as_deref(), Some("1"));
    }

    #[test]
    fn keep_above_enabled_reads_back_rule_state() {
        let backend = MemoryShellConfig::default();
        set_keep_above(&backend, TITLE, true).expect("write rule");
        assert!(is_keep_above_enabled(&backend, TITLE));
    }
}
