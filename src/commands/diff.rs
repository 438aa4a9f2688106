use anyhow::Result;

use crate::Context;
use crate::cli::DiffArgs;
use crate::engine::{self, differ};

use super::Stack;

pub fn run(ctx: &Context, args: &DiffArgs) -> Result<()> {
    let stack = Stack::open(ctx)?;
    let state = stack.load_state()?;

    let mut plan = engine::build_plan(&stack.config, &stack.defaults, &state, &stack.shell())?
        .filter_by_target(args.target.as_deref());
    if args.target.is_some() {
        plan.orphans.clear();
    }

    differ::display_plan(&plan);
    Ok(())
}
