//! Progress callbacks
//!
//! Lets the executor report progress without depending on a specific
//! terminal UI.

use crate::types::{ApplyResult, PlanAction};

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback: Send {
    /// Called when starting to apply a batch of resources
    fn on_batch_start(&mut self, count: usize);

    /// Called before a resource's lifecycle call (sequential runs only)
    fn on_resource_start(&mut self, name: &str, action: &PlanAction);

    /// Called when a resource's lifecycle call completes
    fn on_resource_complete(&mut self, name: &str, result: &ApplyResult);

    /// Called when a batch completes
    fn on_batch_complete(&mut self);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_batch_start(&mut self, _count: usize) {}
    fn on_resource_start(&mut self, _name: &str, _action: &PlanAction) {}
    fn on_resource_complete(&mut self, _name: &str, _result: &ApplyResult) {}
    fn on_batch_complete(&mut self) {}
}
