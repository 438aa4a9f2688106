//! Execution planner - pairs declared resources with their prior state

use crate::diff::{ResourceDiff, changed_fields};
use crate::provider::DynProvider;
use crate::types::{PlanAction, ResourceState};
use serde_json::Value;

/// One declared resource ready to apply
#[derive(Debug)]
pub struct PlanEntry {
    /// Provider for the resource's type, constructed with its name
    pub provider: Box<dyn DynProvider>,
    /// Proposed inputs
    pub inputs: Value,
    /// State from the previous apply, if any
    pub prior: Option<ResourceState>,
}

impl PlanEntry {
    /// Create an entry
    pub fn new(
        provider: Box<dyn DynProvider>,
        inputs: Value,
        prior: Option<ResourceState>,
    ) -> Self {
        Self {
            provider,
            inputs,
            prior,
        }
    }

    /// Declared name
    pub fn name(&self) -> &str {
        self.provider.resource_name()
    }

    /// Lifecycle call apply would make
    ///
    /// The listed fields are the top-level inputs that differ; the decision
    /// itself is the provider's change gate, which may ignore some of them.
    pub fn action(&self) -> PlanAction {
        match &self.prior {
            None => PlanAction::Create,
            Some(prior) if self.provider.inputs_differ(&prior.inputs, &self.inputs) => {
                PlanAction::Update {
                    fields: changed_fields(&prior.inputs, &self.inputs),
                }
            }
            Some(_) => PlanAction::NoChange,
        }
    }

    /// Diff record for display
    pub fn diff(&self) -> ResourceDiff {
        ResourceDiff {
            resource_id: self.name().to_string(),
            resource_type: self.provider.kind().to_string(),
            action: self.action(),
        }
    }
}

/// An execution plan over declared resources
#[derive(Debug, Default)]
pub struct ExecutionPlan {
    /// Resources in declaration order
    pub entries: Vec<PlanEntry>,
    /// Names present in state but no longer declared
    pub orphans: Vec<String>,
}

impl ExecutionPlan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource to the plan
    pub fn add(&mut self, entry: PlanEntry) {
        self.entries.push(entry);
    }

    /// Record a resource that is in state but no longer declared
    pub fn add_orphan(&mut self, name: String) {
        if !self.orphans.contains(&name) {
            self.orphans.push(name);
        }
    }

    /// Filter plan to only include entries matching a predicate
    pub fn filter<F>(self, predicate: F) -> Self
    where
        F: Fn(&PlanEntry) -> bool,
    {
        Self {
            entries: self.entries.into_iter().filter(|e| predicate(e)).collect(),
            orphans: self.orphans,
        }
    }

    /// Filter plan to only include resources matching a target pattern
    ///
    /// Target format: "name", "type" or "type.name"
    pub fn filter_by_target(self, target: Option<&str>) -> Self {
        match target {
            None => self,
            Some(t) => {
                let (resource_type, name) = parse_target(t);
                self.filter(|e| matches_filter(e, resource_type.as_deref(), name.as_deref()))
            }
        }
    }

    /// Diffs for every entry, in declaration order
    pub fn diffs(&self) -> Vec<ResourceDiff> {
        self.entries.iter().map(PlanEntry::diff).collect()
    }

    /// Total number of resources in the plan
    pub fn total_resources(&self) -> usize {
        self.entries.len()
    }

    /// Check if plan is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a target string like "type.name" into (type, name)
fn parse_target(target: &str) -> (Option<String>, Option<String>) {
    match target.split_once('.') {
        Some((resource_type, name)) => (Some(resource_type.to_string()), Some(name.to_string())),
        None => (None, Some(target.to_string())),
    }
}

/// Check if an entry matches the filter criteria
///
/// A bare target matches either the resource type or the exact name.
fn matches_filter(entry: &PlanEntry, resource_type: Option<&str>, name: Option<&str>) -> bool {
    match (resource_type, name) {
        (Some(rt), Some(n)) => entry.provider.kind() == rt && entry.name() == n,
        (None, Some(n)) => entry.provider.kind() == n || entry.name() == n,
        (Some(rt), None) => entry.provider.kind() == rt,
        (None, None) => true,
    }
}
