//! Execution engine for effector
//!
//! The engine orchestrates:
//! 1. Planning - Pair declared resources with stored state
//! 2. Diffing - Show which side effects would run
//! 3. Executing - Run lifecycle calls and persist the results

pub mod differ;
pub mod executor;
pub mod planner;

pub use executor::{ApplyOptions, apply};
pub use planner::build_plan;
