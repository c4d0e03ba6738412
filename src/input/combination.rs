use serde::{Deserialize, Serialize};

use super::keys::sort_keys_for_hotkey;

const MODIFIER_SEPARATOR: char = '+';

/// Canonically ordered chord of key names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HotkeyCombination {
    keys: Vec<String>,
}

impl HotkeyCombination {
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut keys = keys.into_iter().map(Into::into).collect::<Vec<_>>();
        sort_keys_for_hotkey(&mut keys);
        keys.dedup();
        Self { keys }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Splits the chord into its persisted form: the last key is the action
    /// key, everything before it is the `+`-joined modifier string.
    pub fn split(&self) -> Option<(String, String)> {
        let (action_key, modifiers) = self.keys.split_last()?;
        Some((modifiers.join("+"), action_key.clone()))
    }

    pub fn display(&self) -> String {
        self.keys.join("+")
    }
}

/// Persisted show/hide hotkey.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotkeySettings {
    #[serde(default)]
    pub show_hide: Vec<String>,
    #[serde(default)]
    pub modifier_key: String,
    #[serde(default)]
    pub action_key: String,
}

impl Default for HotkeySettings {
    fn default() -> Self {
        Self::from_parts("ctrl+alt", "v")
    }
}

impl HotkeySettings {
    pub fn from_parts(modifier_key: impl Into<String>, action_key: impl Into<String>) -> Self {
        let modifier_key = modifier_key.into();
        let action_key = action_key.into();
        let mut show_hide = modifier_keys(&modifier_key)
            .map(str::to_string)
            .collect::<Vec<_>>();
        if !action_key.is_empty() {
            show_hide.push(action_key.clone());
        }

        Self {
            show_hide,
            modifier_key,
            action_key,
        }
    }

    pub fn from_combination(combination: &HotkeyCombination) -> Option<Self> {
        combination
            .split()
            .map(|(modifier_key, action_key)| Self::from_parts(modifier_key, action_key))
    }

    pub fn modifiers(&self) -> impl Iterator<Item = &str> {
        modifier_keys(&self.modifier_key)
    }

    pub fn combination(&self) -> HotkeyCombination {
        HotkeyCombination {
            keys: self
                .modifiers()
                .chain(Some(self.action_key.as_str()).filter(|key| !key.is_empty()))
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn is_unset(&self) -> bool {
        self.action_key.is_empty() && self.modifier_key.is_empty()
    }

    pub fn display(&self) -> String {
        match (self.modifier_key.is_empty(), self.action_key.is_empty()) {
            (false, false) => format!("{}+{}", self.modifier_key, self.action_key),
            (true, false) => self.action_key.clone(),
            (false, true) => self.modifier_key.clone(),
            (true, true) => String::new(),
        }
    }
}

fn modifier_keys(modifier_key: &str) -> impl Iterator<Item = &str> {
    modifier_key
        .split(MODIFIER_SEPARATOR)
        .filter(|modifier| !modifier.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combination_sorts_and_deduplicates_keys() {
        let combination = HotkeyCombination::from_keys(["v", "alt", "ctrl", "alt"]);
        assert_eq!(combination.keys(), ["ctrl", "alt", "v"]);
        assert_eq!(combination.display(), "ctrl+alt+v");
    }

    #[test]
    fn split_uses_last_sorted_key_as_action_key() {
        let combination = HotkeyCombination::from_keys(["ctrl", "alt", "v"]);
        assert_eq!(
            combination.split(),
            Some(("ctrl+alt".to_string(), "v".to_string()))
        );
    }

    #[test]
    fn split_single_key_has_empty_modifier_string() {
        let combination = HotkeyCombination::from_keys(["a"]);
        assert_eq!(combination.split(), Some((String::new(), "a".to_string())));
        assert_eq!(HotkeyCombination::default().split(), None);
    }

    #[test]
    fn from_parts_rebuilds_show_hide_sequence() {
        let settings = HotkeySettings::from_parts("ctrl+shift", "k");
        assert_eq!(settings.show_hide, vec!["ctrl", "shift", "k"]);

        let bare = HotkeySettings::from_parts("", "f9");
        assert_eq!(bare.show_hide, vec!["f9"]);

        let empty = HotkeySettings::from_parts("", "");
        assert!(empty.show_hide.is_empty());
        assert!(empty.is_unset());
    }

    #[test]
    fn default_settings_are_ctrl_alt_v() {
        let settings = HotkeySettings::default();
        assert_eq!(settings.show_hide, vec!["ctrl", "alt", "v"]);
        assert_eq!(settings.modifier_key, "ctrl+alt");
        assert_eq!(settings.action_key, "v");
        assert_eq!(settings.display(), "ctrl+alt+v");
    }

    #[test]
    fn settings_combination_concatenates_modifiers_and_action() {
        let settings = HotkeySettings::from_parts("ctrl+alt", "v");
        assert_eq!(settings.combination().keys(), ["ctrl", "alt", "v"]);
    }

    #[test]
    fn settings_serialize_with_camel_case_keys() {
        let json = serde_json::to_value(HotkeySettings::default()).expect("serialize settings");
        assert_eq!(
            json,
            serde_json::json!({
                "showHide": ["ctrl", "alt", "v"],
                "modifierKey": "ctrl+alt",
                "actionKey": "v"
            })
        );
    }
}
