//! # Declarative
//!
//! A framework for side-effecting resources in a declarative stack.
//!
//! A resource here is not a piece of infrastructure with readable state; it
//! is a side effect (a script, a CLI call, a remote function invocation)
//! whose inputs are declared. The side effect runs once on creation and
//! again only when its inputs change.
//!
//! ## Core Concepts
//!
//! - **Provider**: Runs the side effect for a resource type and decides
//!   which input changes matter
//! - **LifecycleResult**: `{id, outs}` returned by `create`/`update`
//! - **ResourceState**: Last-applied inputs and outputs, persisted by the host
//! - **ExecutionPlan**: Declared resources paired with their prior state
//! - **Executor**: Runs the lifecycle calls, optionally in parallel
//!
//! ## Example
//!
//! ```ignore
//! use declarative::{ExecuteOptions, ExecutionPlan, NoProgress, PlanEntry, execute};
//!
//! let mut plan = ExecutionPlan::new();
//! plan.add(PlanEntry::new(Box::new(provider), inputs, prior_state));
//!
//! let applied = execute(&plan, &ExecuteOptions::default(), None, &mut NoProgress)?;
//! for a in &applied {
//!     println!("{}: {:?}", a.name, a.result);
//! }
//! ```
//!
//! ## Change Detection
//!
//! [`diff`] compares inputs structurally: key order never matters, absent
//! keys equal `null`, and sequences compare element by element. Providers
//! narrow the comparison to the inputs that actually shape their command
//! through [`Provider::has_changed`].

pub mod diff;
pub mod executor;
pub mod planner;
pub mod progress;
pub mod provider;
pub mod types;

// Re-export main types at crate root
pub use diff::{
    DiffSummary, ResourceDiff, changed_fields, group_by_type, has_changed, inputs_changed,
    values_equal,
};
pub use executor::{Applied, execute, summarize};
pub use planner::{ExecutionPlan, PlanEntry};
pub use progress::{NoProgress, ProgressCallback};
pub use provider::{DynProvider, Provider};
pub use types::{
    ApplyResult, ExecuteOptions, ExecuteSummary, LifecycleResult, Outputs, PlanAction,
    RESULT_KEY, ResourceState,
};
