use anyhow::{Result, bail};

use crate::Context;
use crate::ui;

use super::Stack;

pub fn run(ctx: &Context, name: &str) -> Result<()> {
    let stack = Stack::open(ctx)?;
    let mut state = stack.load_state()?;

    let Some(forgotten) = state.forget(name) else {
        bail!("'{name}' is not in state ({})", stack.state_path.display());
    };
    state.touch(&stack.state_path)?;

    if !ctx.quiet {
        ui::success(&format!("Forgot {name} ({})", forgotten.resource_type));
        if stack.config.find(name).is_some() {
            ui::dim("Still declared: the next apply will run it again as new");
        }
    }
    Ok(())
}
