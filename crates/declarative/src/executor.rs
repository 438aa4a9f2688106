//! Execution engine - runs lifecycle calls for a plan

use crate::planner::{ExecutionPlan, PlanEntry};
use crate::progress::ProgressCallback;
use crate::types::{ApplyResult, ExecuteOptions, ExecuteSummary, PlanAction, ResourceState};
use anyhow::Result;
use rayon::prelude::*;

/// Outcome of applying one resource
#[derive(Debug, Clone)]
pub struct Applied {
    /// Declared name
    pub name: String,
    /// What happened
    pub result: ApplyResult,
    /// State to persist; the prior state when the call failed or was skipped
    pub state: Option<ResourceState>,
}

/// Execute a plan with the given options
///
/// Resources are independent, so one failure never stops the others.
/// Results come back in declaration order regardless of `jobs`.
///
/// # Arguments
/// * `plan` - The execution plan to run
/// * `opts` - Execution options (dry_run, jobs)
/// * `revision` - Source revision recorded on resources whose side effect runs
/// * `progress` - Progress callback
pub fn execute<P: ProgressCallback>(
    plan: &ExecutionPlan,
    opts: &ExecuteOptions,
    revision: Option<&str>,
    progress: &mut P,
) -> Result<Vec<Applied>> {
    if plan.is_empty() {
        return Ok(Vec::new());
    }

    progress.on_batch_start(plan.total_resources());
    let applied = if opts.dry_run {
        plan.entries.iter().map(preview).collect()
    } else if opts.jobs <= 1 || plan.total_resources() == 1 {
        execute_sequential(&plan.entries, revision, progress)
    } else {
        execute_parallel(&plan.entries, opts.jobs, revision, progress)?
    };
    progress.on_batch_complete();

    Ok(applied)
}

/// Tally a set of outcomes
pub fn summarize(applied: &[Applied]) -> ExecuteSummary {
    let mut summary = ExecuteSummary::default();
    for a in applied {
        summary.add_result(&a.result);
    }
    summary
}

fn execute_sequential<P: ProgressCallback>(
    entries: &[PlanEntry],
    revision: Option<&str>,
    progress: &mut P,
) -> Vec<Applied> {
    let mut applied = Vec::with_capacity(entries.len());
    for entry in entries {
        progress.on_resource_start(entry.name(), &entry.action());
        let outcome = apply_entry(entry, revision);
        progress.on_resource_complete(&outcome.name, &outcome.result);
        applied.push(outcome);
    }
    applied
}

/// Execute entries in parallel using rayon
fn execute_parallel<P: ProgressCallback>(
    entries: &[PlanEntry],
    jobs: usize,
    revision: Option<&str>,
    progress: &mut P,
) -> Result<Vec<Applied>> {
    // The callback is not shared across threads; results are reported after.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to create thread pool: {}", e))?;

    let applied: Vec<Applied> = pool.install(|| {
        entries
            .par_iter()
            .map(|entry| apply_entry(entry, revision))
            .collect()
    });

    for a in &applied {
        progress.on_resource_complete(&a.name, &a.result);
    }

    Ok(applied)
}

/// Report what would run without running it
fn preview(entry: &PlanEntry) -> Applied {
    let result = match entry.action() {
        PlanAction::NoChange => ApplyResult::NoChange,
        PlanAction::Create | PlanAction::Update { .. } => ApplyResult::Skipped {
            reason: "Dry run".into(),
        },
    };
    Applied {
        name: entry.name().to_string(),
        result,
        state: entry.prior.clone(),
    }
}

/// Run the lifecycle call for one entry
fn apply_entry(entry: &PlanEntry, revision: Option<&str>) -> Applied {
    let name = entry.name().to_string();
    let revision = revision.map(str::to_string);

    let outcome = match &entry.prior {
        None => entry.provider.create_dyn(&entry.inputs).map(|created| {
            let state = ResourceState::created(
                entry.provider.kind(),
                entry.inputs.clone(),
                created,
                revision,
            );
            (ApplyResult::Created, state)
        }),
        Some(prior) => entry
            .provider
            .update_dyn(&prior.id, &prior.inputs, &entry.inputs)
            .map(|updated| {
                let result = if updated.is_noop() {
                    ApplyResult::NoChange
                } else {
                    ApplyResult::Updated
                };
                let mut state = prior.clone();
                state.record_update(entry.inputs.clone(), updated, revision);
                (result, state)
            }),
    };

    match outcome {
        Ok((result, state)) => {
            log::debug!("{name}: {result:?}");
            Applied {
                name,
                result,
                state: Some(state),
            }
        }
        Err(e) => {
            log::debug!("{name}: failed: {e:#}");
            Applied {
                name,
                result: ApplyResult::Failed {
                    error: format!("{e:#}"),
                },
                state: entry.prior.clone(),
            }
        }
    }
}
