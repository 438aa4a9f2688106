//! Plan display

use colored::Colorize;
use declarative::{DiffSummary, ExecutionPlan, PlanAction, PlanEntry, group_by_type};
use serde_json::Value;
use similar::{ChangeTag, TextDiff};

/// Text shown for one input value in a diff
fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

/// Changed lines of one top-level input field
pub fn field_changes(old: &Value, new: &Value, field: &str) -> Vec<(ChangeTag, String)> {
    let old_text = field_text(old.get(field));
    let new_text = field_text(new.get(field));
    let diff = TextDiff::from_lines(&old_text, &new_text);

    diff.iter_all_changes()
        .filter(|change| change.tag() != ChangeTag::Equal)
        .map(|change| (change.tag(), change.value().trim_end_matches('\n').to_string()))
        .collect()
}

fn type_title(resource_type: &str) -> &str {
    match resource_type {
        "script" => "Scripts",
        "aws_command" => "AWS CLI commands",
        "lambda" => "Lambda invocations",
        "ecs_task" => "ECS tasks",
        _ => resource_type,
    }
}

fn display_entry(entry: &PlanEntry) {
    let action = entry.action();
    let (symbol, note) = match &action {
        PlanAction::Create => ("+".green(), "(will run)".to_string()),
        PlanAction::Update { fields } => (
            "~".yellow(),
            format!("(re-run: {})", fields.join(", ")),
        ),
        PlanAction::NoChange => ("○".dimmed(), "(unchanged)".to_string()),
    };
    println!("│   {} {:<30} {}", symbol, entry.name(), note.dimmed());

    if let (PlanAction::Update { fields }, Some(prior)) = (&action, &entry.prior) {
        for field in fields {
            for (tag, line) in field_changes(&prior.inputs, &entry.inputs, field) {
                match tag {
                    ChangeTag::Delete => println!("│       {}", format!("- {line}").red()),
                    ChangeTag::Insert => println!("│       {}", format!("+ {line}").green()),
                    ChangeTag::Equal => {}
                }
            }
        }
    }
}

/// Display the plan grouped by resource type
pub fn display_plan(plan: &ExecutionPlan) {
    let diffs = plan.diffs();
    let summary = DiffSummary::from_diffs(&diffs);

    if plan.is_empty() && plan.orphans.is_empty() {
        println!();
        println!("  {} No resources declared", "ℹ".blue());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Stack Plan".bold()
    );
    println!("│");

    let groups = group_by_type(&diffs);
    let mut types: Vec<&String> = groups.keys().collect();
    types.sort();

    for resource_type in types {
        println!("│ {}", type_title(resource_type).bold());
        for entry in plan
            .entries
            .iter()
            .filter(|e| e.provider.kind() == resource_type.as_str())
        {
            display_entry(entry);
        }
        println!("│");
    }

    if !plan.orphans.is_empty() {
        println!("│ {}", "No longer declared".bold());
        for name in &plan.orphans {
            println!("│   {} {:<30} {}", "-".red(), name, "(forgotten, nothing runs)".dimmed());
        }
        println!("│");
    }

    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} to run ({} new, {} changed), {} unchanged",
        summary.total().to_string().bold(),
        summary.additions.to_string().green(),
        summary.modifications.to_string().yellow(),
        summary.unchanged
    );
    println!("└─────────────────────────────────────────────────────┘");
}
