//! Execution engine - applies a plan with UI and state persistence

use anyhow::Result;
use colored::Colorize;
use declarative::{DiffSummary, ExecuteOptions, ExecuteSummary, ExecutionPlan, summarize};
use std::path::Path;

use crate::progress::ApplyProgress;
use crate::state::StackState;

use super::differ::display_plan;

/// Options for an apply run
#[derive(Debug, Clone)]
pub struct ApplyOptions {
    /// Show the plan without running anything
    pub dry_run: bool,
    /// Number of resources applied concurrently
    pub jobs: usize,
    /// Skip the confirmation prompt
    pub yes: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            jobs: 1,
            yes: false,
        }
    }
}

/// Apply the plan and persist the resulting state
///
/// Every declared resource goes through its lifecycle call, so unchanged
/// resources still have their stored inputs refreshed. State is saved even
/// when some resources fail; a failed resource keeps what it had.
pub fn apply(
    plan: ExecutionPlan,
    state: &mut StackState,
    state_path: &Path,
    opts: &ApplyOptions,
    revision: Option<&str>,
) -> Result<ExecuteSummary> {
    // 1. Display what will run
    display_plan(&plan);

    let diff_summary = DiffSummary::from_diffs(&plan.diffs());
    let has_work = diff_summary.has_changes() || !plan.orphans.is_empty();

    if opts.dry_run {
        println!();
        println!("  {} Dry run - nothing was run", "ℹ".blue());
        return Ok(ExecuteSummary {
            skipped: diff_summary.total(),
            no_change: diff_summary.unchanged,
            ..Default::default()
        });
    }

    // 2. Confirm (unless --yes or nothing would run)
    if has_work && !opts.yes && !confirm_proceed()? {
        println!();
        println!("  {} Aborted", "✗".red());
        return Ok(ExecuteSummary {
            skipped: diff_summary.total(),
            ..Default::default()
        });
    }

    // 3. Run lifecycle calls
    let exec_opts = ExecuteOptions {
        dry_run: false,
        jobs: opts.jobs.max(1),
    };
    if diff_summary.has_changes() {
        println!();
        println!(
            "  {} Running {} resources...",
            "→".cyan(),
            diff_summary.total()
        );
    }
    let applied = declarative::execute(&plan, &exec_opts, revision, &mut ApplyProgress::new())?;

    // 4. Persist
    for outcome in &applied {
        if let Some(resource_state) = &outcome.state {
            state.set(&outcome.name, resource_state.clone());
        }
    }
    for orphan in &plan.orphans {
        if state.forget(orphan).is_some() {
            log::info!("Forgot {orphan} (no longer declared)");
        }
    }
    state.touch(state_path)?;

    // 5. Summary
    let summary = summarize(&applied);
    print_summary(&summary, plan.orphans.len());

    Ok(summary)
}

/// Confirm with user
fn confirm_proceed() -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt("Continue?")
        .default(true)
        .interact()?;

    Ok(confirmed)
}

/// Print final summary
fn print_summary(summary: &ExecuteSummary, forgotten: usize) {
    println!();
    if summary.is_success() {
        println!("  {} Stack applied successfully!", "✓".green().bold());
    } else {
        println!("  {} Stack applied with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} resources created", summary.created);
    }
    if summary.updated > 0 {
        println!("    • {} resources re-ran", summary.updated);
    }
    if summary.no_change > 0 {
        println!("    • {} resources unchanged", summary.no_change);
    }
    if forgotten > 0 {
        println!("    • {forgotten} resources forgotten");
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "resources".red());
    }
}
