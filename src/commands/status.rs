use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::git;
use crate::ui;

use super::Stack;

const RESULT_WIDTH: usize = 40;

pub fn run(ctx: &Context) -> Result<()> {
    let stack = Stack::open(ctx)?;
    let state = stack.load_state()?;

    ui::header("Stack Status");
    ui::kv("Stack", &stack.file.display().to_string());
    ui::kv("State", &stack.state_path.display().to_string());
    if let Some(region) = &stack.defaults.region {
        ui::kv("Region", region);
    }
    if let Some(remote) = git::remote_url(&*stack.shell(), stack.dir()) {
        ui::kv("Remote", &remote);
    }
    println!();

    if stack.config.resources.is_empty() && state.resources.is_empty() {
        ui::info("No resources declared");
        return Ok(());
    }

    for decl in &stack.config.resources {
        match state.get(&decl.name) {
            Some(applied) => {
                let result = applied.result().unwrap_or("");
                println!(
                    "  {} {:<24} {:<12} {}",
                    "✓".green(),
                    decl.name,
                    decl.kind.dimmed(),
                    ui::truncate(result, RESULT_WIDTH)
                );
                if ctx.verbose > 0 {
                    ui::dim(&format!(
                        "updated {} · created {}{}",
                        applied.updated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        applied.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        applied
                            .revision
                            .as_deref()
                            .map(|r| format!(" · revision {r}"))
                            .unwrap_or_default()
                    ));
                }
            }
            None => println!(
                "  {} {:<24} {:<12} {}",
                "○".yellow(),
                decl.name,
                decl.kind.dimmed(),
                "(not yet applied)".dimmed()
            ),
        }
    }

    let declared: Vec<&str> = stack.config.resources.iter().map(|r| r.name.as_str()).collect();
    let orphans = state.orphans(&declared);
    if !orphans.is_empty() {
        println!();
        for name in orphans {
            println!(
                "  {} {:<24} {}",
                "-".red(),
                name,
                "(no longer declared; forgotten on next apply)".dimmed()
            );
        }
    }

    println!();
    ui::dim(&format!(
        "Last updated {}",
        state.last_updated.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    Ok(())
}
