use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default members of the unproductive list, seeded on first run.
const DEFAULT_UNPRODUCTIVE_APPS: [&str; 3] = ["chrome", "firefox", "edge"];

/// Get the local data directory for focal.
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn get_data_dir() -> Result<PathBuf> {
    let mut path =
        dirs::data_local_dir().ok_or_else(|| anyhow::anyhow!("Failed to get local data dir"))?;
    path.push("focal");
    Ok(path)
}

/// Default path of the persisted unproductive-app list.
///
/// # Errors
///
/// Returns an error if the local data directory cannot be determined.
pub fn default_list_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join("unproductive_apps.json"))
}

/// Tunable engine parameters.
///
/// Durations mirror the classic Pomodoro defaults; the own-window token keeps
/// the tracker's own window out of classification and usage accounting.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Seconds charged to the accumulator per tick.
    pub tick_secs: u32,
    /// How long the face may be absent before the face rule fires.
    pub face_grace: Duration,
    pub work_duration: Duration,
    pub break_duration: Duration,
    pub long_break_duration: Duration,
    /// Completed work phases before a long break is inserted.
    pub work_phases_per_cycle: u32,
    /// Substring identifying the tracker's own window.
    pub own_window_token: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_secs: 1,
            face_grace: Duration::seconds(5),
            work_duration: Duration::minutes(25),
            break_duration: Duration::minutes(5),
            long_break_duration: Duration::minutes(15),
            work_phases_per_cycle: 4,
            own_window_token: String::from("focal"),
        }
    }
}

/// The user's set of unproductive application-name substrings.
///
/// Tokens are stored trimmed and lowercased; matching is substring
/// containment against a lowercased window token. The set persists across
/// sessions as a flat JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnproductiveList {
    #[serde(rename = "unproductive_apps")]
    apps: BTreeSet<String>,
}

impl UnproductiveList {
    #[must_use]
    pub fn with_defaults() -> Self {
        let apps = DEFAULT_UNPRODUCTIVE_APPS
            .iter()
            .map(|app| (*app).to_string())
            .collect();
        Self { apps }
    }

    /// Load the list from `path`, seeding the default set on first run.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if seeding the default file fails.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("Failed to read app list from {}", path.display()))?;
            let list = serde_json::from_str(&raw)
                .with_context(|| format!("Failed to parse app list at {}", path.display()))?;
            Ok(list)
        } else {
            let list = Self::with_defaults();
            list.save(path)?;
            Ok(list)
        }
    }

    /// Persist the list as pretty-printed JSON, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation, serialization, or the write
    /// fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create app list directory")?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        fs::write(path, raw)
            .with_context(|| format!("Failed to write app list to {}", path.display()))?;
        Ok(())
    }

    /// Add a token; returns false for empty input or an existing member.
    pub fn add(&mut self, name: &str) -> bool {
        let token = Self::normalize(name);
        if token.is_empty() {
            return false;
        }
        self.apps.insert(token)
    }

    /// Remove a token; returns false when it was not a member.
    pub fn remove(&mut self, name: &str) -> bool {
        self.apps.remove(&Self::normalize(name))
    }

    /// True when any member is a substring of `token` (case-insensitive).
    #[must_use]
    pub fn contains_match(&self, token: &str) -> bool {
        let token = token.to_lowercase();
        self.apps.iter().any(|app| token.contains(app.as_str()))
    }

    /// Members in sorted order.
    #[must_use]
    pub fn apps(&self) -> Vec<String> {
        self.apps.iter().cloned().collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.apps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.apps.is_empty()
    }

    fn normalize(name: &str) -> String {
        name.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_normalizes_and_rejects_duplicates() {
        let mut list = UnproductiveList::default();
        assert!(list.add("  YouTube "));
        assert!(!list.add("youtube"));
        assert!(!list.add("   "));
        assert_eq!(list.apps(), vec!["youtube".to_string()]);
    }

    #[test]
    fn test_remove_missing_member() {
        let mut list = UnproductiveList::with_defaults();
        assert!(list.remove("Chrome"));
        assert!(!list.remove("chrome"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_contains_match_is_substring_and_case_insensitive() {
        let list = UnproductiveList::with_defaults();
        assert!(list.contains_match("google chrome - inbox"));
        assert!(list.contains_match("FIREFOX"));
        assert!(!list.contains_match("code - editor"));
        assert!(!list.contains_match(""));
    }

    #[test]
    fn test_load_seeds_defaults_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("unproductive_apps.json");

        let list = UnproductiveList::load(&path).unwrap();
        assert_eq!(list, UnproductiveList::with_defaults());
        assert!(path.exists());
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("apps.json");

        let mut list = UnproductiveList::default();
        list.add("twitter");
        list.add("reddit");
        list.save(&path).unwrap();

        let loaded = UnproductiveList::load(&path).unwrap();
        assert_eq!(loaded, list);
    }
}
