//! Stack configuration
//!
//! A stack file declares resources and the defaults they share:
//!
//! ```toml
//! [defaults]
//! region = "us-east-1"
//! timeout = 300
//!
//! [[resource]]
//! name = "migrate"
//! type = "script"
//! script = "./bin/migrate"
//! ```
//!
//! TOML or JSON, chosen by extension. A global `~/.config/effector/config.toml`
//! may hold a `[defaults]` table that the stack's own defaults override.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::resource;

/// Stack file names searched in the working directory, in order
pub const STACK_FILES: &[&str] = &["effector.toml", "effector.json"];

/// Directory next to the stack file holding its state
pub const STATE_DIR: &str = ".effector";

/// Get the global config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("effector"))
}

// ============================================================================
// Defaults
// ============================================================================

/// Values shared by every resource that takes them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    /// AWS region for CLI-backed resources
    #[serde(default)]
    pub region: Option<String>,
    /// Polling timeout in seconds
    #[serde(default)]
    pub timeout: Option<u64>,
    /// Shell program commands run under
    #[serde(default)]
    pub shell: Option<String>,
}

impl Defaults {
    /// Fill anything unset here from `base`
    pub fn or(self, base: &Defaults) -> Self {
        Self {
            region: self.region.or_else(|| base.region.clone()),
            timeout: self.timeout.or(base.timeout),
            shell: self.shell.or_else(|| base.shell.clone()),
        }
    }

    /// Treat `no`/`false`/`none` as unset and fall back to the environment
    /// for the region
    pub fn resolve(self, env_region: Option<String>) -> Self {
        Self {
            region: unset_if_disabled(self.region).or_else(|| unset_if_disabled(env_region)),
            timeout: self.timeout,
            shell: unset_if_disabled(self.shell),
        }
    }
}

/// `None` for values that spell out "off"
fn unset_if_disabled(value: Option<String>) -> Option<String> {
    value.filter(|v| {
        let v = v.trim().to_lowercase();
        !(v.is_empty() || v == "no" || v == "false" || v == "none")
    })
}

/// Region from the environment, as the AWS CLI would pick it
pub fn env_region() -> Option<String> {
    std::env::var("AWS_DEFAULT_REGION")
        .ok()
        .or_else(|| std::env::var("AWS_REGION").ok())
}

// ============================================================================
// Global Config
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub defaults: Defaults,
}

impl GlobalConfig {
    /// Load config.toml from the config directory, or defaults when absent
    pub fn load() -> Result<Self> {
        let path = config_dir()?.join("config.toml");
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No global config at {}", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }
}

// ============================================================================
// Stack Config
// ============================================================================

/// A declared resource: name, type, and its inputs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(flatten)]
    pub inputs: Map<String, Value>,
}

impl ResourceDecl {
    /// Inputs with stack defaults filled in where the resource left them out
    pub fn resolved_inputs(&self, defaults: &Defaults) -> Value {
        let mut inputs = self.inputs.clone();
        if resource::uses_aws_defaults(&self.kind) {
            if let Some(region) = &defaults.region {
                inputs
                    .entry("region")
                    .or_insert_with(|| Value::String(region.clone()));
            }
            if let Some(timeout) = defaults.timeout {
                inputs.entry("timeout").or_insert_with(|| Value::from(timeout));
            }
        }
        Value::Object(inputs)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StackConfig {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default, rename = "resource")]
    pub resources: Vec<ResourceDecl>,
}

/// Supported stack file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    /// Detect format from file extension
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::Json,
            _ => Self::Toml,
        }
    }
}

impl StackConfig {
    /// Parse stack text in the given format
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Self> {
        let config: Self = match format {
            ConfigFormat::Toml => toml::from_str(content).context("Invalid TOML stack file")?,
            ConfigFormat::Json => serde_json::from_str(content).context("Invalid JSON stack file")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a stack file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config = Self::parse(&content, ConfigFormat::from_path(path))
            .with_context(|| format!("Failed to load {}", path.display()))?;
        log::debug!(
            "Loaded {} resources from {}",
            config.resources.len(),
            path.display()
        );
        Ok(config)
    }

    /// Reject empty or duplicate names and unknown types
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for decl in &self.resources {
            if decl.name.trim().is_empty() {
                bail!("resource of type '{}' has an empty name", decl.kind);
            }
            if !seen.insert(decl.name.as_str()) {
                bail!("duplicate resource name '{}'", decl.name);
            }
            if !resource::KINDS.contains(&decl.kind.as_str()) {
                bail!(
                    "unknown resource type '{}' for {} (expected one of: {})",
                    decl.kind,
                    decl.name,
                    resource::KINDS.join(", ")
                );
            }
        }
        Ok(())
    }

    /// Find a declared resource by name
    pub fn find(&self, name: &str) -> Option<&ResourceDecl> {
        self.resources.iter().find(|r| r.name == name)
    }
}

/// Locate the stack file: explicit path, else the first known name in `dir`
pub fn find_stack_file(explicit: Option<&Path>, dir: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
        if !expanded.exists() {
            bail!("Stack file not found: {}", expanded.display());
        }
        return Ok(expanded);
    }
    STACK_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.exists())
        .with_context(|| {
            format!(
                "No stack file in {} (looked for {})",
                dir.display(),
                STACK_FILES.join(", ")
            )
        })
}

/// Default state file for a stack file
pub fn default_state_path(stack_file: &Path) -> PathBuf {
    stack_file
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(STATE_DIR)
        .join("state.json")
}

// ============================================================================
// Tests
// ============================================================================
