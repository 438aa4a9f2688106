use anyhow::{Result, bail};

use crate::Context;
use crate::cli::ApplyArgs;
use crate::engine::{self, ApplyOptions};
use crate::git;
use crate::ui;

use super::Stack;

pub fn run(ctx: &Context, args: &ApplyArgs) -> Result<()> {
    let stack = Stack::open(ctx)?;
    let mut state = stack.load_state()?;
    let shell = stack.shell();

    let mut plan = engine::build_plan(&stack.config, &stack.defaults, &state, &shell)?
        .filter_by_target(args.target.as_deref());
    if args.target.is_some() {
        // A partial apply says nothing about undeclared resources.
        plan.orphans.clear();
        if plan.is_empty() {
            ui::warn(&format!(
                "No resources match '{}'",
                args.target.as_deref().unwrap_or_default()
            ));
            return Ok(());
        }
    }

    let revision = git::version_string(&*shell, stack.dir());
    if let Some(rev) = &revision {
        log::info!("Applying at revision {rev}");
    }

    let opts = ApplyOptions {
        dry_run: args.dry_run,
        jobs: usize::from(args.jobs),
        yes: args.yes,
    };
    let summary = engine::apply(plan, &mut state, &stack.state_path, &opts, revision.as_deref())?;

    if !summary.is_success() {
        bail!("{} of {} resources failed", summary.failed, summary.total());
    }
    Ok(())
}
