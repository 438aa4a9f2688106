//! Core types for side-effect resource management

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Output property every provider reports.
pub const RESULT_KEY: &str = "result";

/// Output properties of a resource
///
/// Outputs are never supplied as inputs, so a resource's own previous
/// result never takes part in its diff.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Outputs(BTreeMap<String, Value>);

impl Outputs {
    /// Empty outputs (the "no observable change" delta)
    pub fn new() -> Self {
        Self::default()
    }

    /// Outputs holding just a `result`
    pub fn with_result(result: impl Into<String>) -> Self {
        let mut outs = Self::new();
        outs.insert(RESULT_KEY, Value::String(result.into()));
        outs
    }

    /// Set a property
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Get a property
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The `result` property as a string
    pub fn result(&self) -> Option<&str> {
        self.get(RESULT_KEY).and_then(Value::as_str)
    }

    /// Whether no properties are set
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate properties in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Overlay `delta` onto these outputs; keys absent from `delta` are kept
    pub fn merge(&mut self, delta: &Outputs) {
        for (key, value) in delta.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }
}

/// What a lifecycle call hands back to the host: `{id, outs}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleResult {
    /// Stable identity of the resource
    pub id: String,
    /// Changed output properties; empty means nothing observable changed
    #[serde(default, skip_serializing_if = "Outputs::is_empty")]
    pub outs: Outputs,
}

impl LifecycleResult {
    /// A result carrying a fresh `result` output
    pub fn changed(id: impl Into<String>, result: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outs: Outputs::with_result(result),
        }
    }

    /// A no-op result with empty outputs
    pub fn unchanged(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            outs: Outputs::new(),
        }
    }

    /// Whether the call reported no output change
    pub fn is_noop(&self) -> bool {
        self.outs.is_empty()
    }
}

/// Persisted state of one managed resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceState {
    /// Identity returned by `create`
    pub id: String,
    /// Resource type category (e.g. "script", "lambda")
    pub resource_type: String,
    /// Last-applied inputs, used as "olds" on the next update
    pub inputs: Value,
    /// Output properties, at minimum `result`
    #[serde(default)]
    pub outputs: Outputs,
    /// When the resource was first created
    pub created_at: DateTime<Utc>,
    /// When the side effect last ran
    pub updated_at: DateTime<Utc>,
    /// Source revision the stack was at when the side effect last ran
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<String>,
}

impl ResourceState {
    /// State after a successful `create`
    pub fn created(
        resource_type: &str,
        inputs: Value,
        result: LifecycleResult,
        revision: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: result.id,
            resource_type: resource_type.to_string(),
            inputs,
            outputs: result.outs,
            created_at: now,
            updated_at: now,
            revision,
        }
    }

    /// Record a successful `update`
    ///
    /// The new inputs always become the stored "olds". Outputs are merged so
    /// keys the call did not return keep their previous values; timestamps
    /// and revision only move when the side effect actually ran.
    pub fn record_update(
        &mut self,
        inputs: Value,
        result: LifecycleResult,
        revision: Option<String>,
    ) {
        self.inputs = inputs;
        self.id = result.id;
        if !result.outs.is_empty() {
            self.outputs.merge(&result.outs);
            self.updated_at = Utc::now();
            self.revision = revision;
        }
    }

    /// The stored `result` output
    pub fn result(&self) -> Option<&str> {
        self.outputs.result()
    }
}

/// Lifecycle call an apply would make for a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlanAction {
    /// First run: `create`
    Create,
    /// Inputs differ: `update` re-runs the side effect
    Update { fields: Vec<String> },
    /// Inputs equal: `update` is a no-op
    NoChange,
}

/// Result of applying a resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// No changes needed
    NoChange,
    /// Resource was created
    Created,
    /// Side effect re-ran on update
    Updated,
    /// Apply failed
    Failed { error: String },
    /// Apply was skipped
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents success (no failure)
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Created | Self::Updated)
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
}

impl ExecuteSummary {
    /// Total number of side effects that ran
    pub fn total_changes(&self) -> usize {
        self.created + self.updated
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of resources processed
    pub fn total(&self) -> usize {
        self.created + self.updated + self.skipped + self.failed + self.no_change
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::NoChange => self.no_change += 1,
            ApplyResult::Created => self.created += 1,
            ApplyResult::Updated => self.updated += 1,
            ApplyResult::Failed { .. } => self.failed += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Don't run anything, just report what would run
    pub dry_run: bool,
    /// Number of resources applied concurrently (1 = sequential)
    pub jobs: usize,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 1,
        }
    }
}
