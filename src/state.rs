//! Persisted stack state
//!
//! Records, per declared resource, the inputs it was last applied with and
//! the outputs it produced. Those inputs are the "olds" handed to `update`
//! on the next apply.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use declarative::ResourceState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// State of every resource in one stack
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StackState {
    /// Resources keyed by declared name
    #[serde(default)]
    pub resources: BTreeMap<String, ResourceState>,

    /// Last time the state was updated
    pub last_updated: DateTime<Utc>,
}

impl Default for StackState {
    fn default() -> Self {
        Self {
            resources: BTreeMap::new(),
            last_updated: Utc::now(),
        }
    }
}

impl StackState {
    /// Load state from disk, or return default if file doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using default state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: StackState = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!("Loaded state from {}", path.display());
        Ok(state)
    }

    /// Save state to disk
    ///
    /// Written to a sibling temp file first and renamed into place, so a
    /// crash mid-write leaves the previous state intact.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        let content =
            serde_json::to_string_pretty(&self).context("Failed to serialize state to JSON")?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &content)
            .with_context(|| format!("Failed to write state file: {}", tmp.display()))?;
        fs::rename(&tmp, path)
            .with_context(|| format!("Failed to replace state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// Update the last_updated timestamp and save
    pub fn touch(&mut self, path: &Path) -> Result<()> {
        self.last_updated = Utc::now();
        self.save(path)
    }

    /// Get a resource's state
    pub fn get(&self, name: &str) -> Option<&ResourceState> {
        self.resources.get(name)
    }

    /// Record a resource's state
    pub fn set(&mut self, name: &str, state: ResourceState) {
        self.resources.insert(name.to_string(), state);
    }

    /// Drop a resource from state, returning what was stored
    pub fn forget(&mut self, name: &str) -> Option<ResourceState> {
        self.resources.remove(name)
    }

    /// Names in state that `declared` no longer mentions
    pub fn orphans<'a>(&'a self, declared: &[&str]) -> Vec<&'a str> {
        self.resources
            .keys()
            .map(String::as_str)
            .filter(|name| !declared.contains(name))
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use declarative::LifecycleResult;
    use serde_json::json;
    use tempfile::TempDir;

    fn resource(result: &str) -> ResourceState {
        ResourceState::created(
            "script",
            json!({"script": "echo hi"}),
            LifecycleResult::changed("hello", result),
            Some("4-abc1234".into()),
        )
    }

    #[test]
    fn test_missing_file_is_empty_state() {
        let dir = TempDir::new().unwrap();
        let state = StackState::load(&dir.path().join("state.json")).unwrap();
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".effector").join("state.json");

        let mut state = StackState::default();
        state.set("hello", resource("hi"));
        state.touch(&path).unwrap();

        assert!(!path.with_extension("json.tmp").exists());

        let loaded = StackState::load(&path).unwrap();
        let hello = loaded.get("hello").unwrap();
        assert_eq!(hello.result(), Some("hi"));
        assert_eq!(hello.inputs, json!({"script": "echo hi"}));
        assert_eq!(hello.revision.as_deref(), Some("4-abc1234"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();
        assert!(StackState::load(&path).is_err());
    }

    #[test]
    fn test_forget_and_orphans() {
        let mut state = StackState::default();
        state.set("a", resource("1"));
        state.set("b", resource("2"));

        assert_eq!(state.orphans(&["a"]), vec!["b"]);
        assert!(state.forget("b").is_some());
        assert!(state.forget("b").is_none());
        assert!(state.orphans(&["a"]).is_empty());
    }
}
