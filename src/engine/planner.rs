//! Execution planner - pairs stack declarations with stored state

use anyhow::{Context, Result};
use declarative::{ExecutionPlan, PlanEntry};

use crate::config::{Defaults, StackConfig};
use crate::resource::{self, SharedShell};
use crate::state::StackState;

/// Build a plan for every declared resource
///
/// Inputs are resolved against `defaults` and checked against the
/// resource's type before anything runs, so a typo fails the whole plan
/// instead of one resource halfway through an apply.
pub fn build_plan(
    config: &StackConfig,
    defaults: &Defaults,
    state: &StackState,
    shell: &SharedShell,
) -> Result<ExecutionPlan> {
    let mut plan = ExecutionPlan::new();

    for decl in &config.resources {
        let provider = resource::build(&decl.name, &decl.kind, shell.clone())?;
        let inputs = decl.resolved_inputs(defaults);
        provider
            .validate(&inputs)
            .with_context(|| format!("{} ({})", decl.name, decl.kind))?;

        let prior = match state.get(&decl.name) {
            Some(prior) if prior.resource_type != decl.kind => {
                log::warn!(
                    "{}: type changed from {} to {}, will create",
                    decl.name,
                    prior.resource_type,
                    decl.kind
                );
                None
            }
            other => other.cloned(),
        };

        plan.add(PlanEntry::new(provider, inputs, prior));
    }

    let declared: Vec<&str> = config.resources.iter().map(|r| r.name.as_str()).collect();
    for orphan in state.orphans(&declared) {
        plan.add_orphan(orphan.to_string());
    }

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;
    use cmdkit::ScriptedShell;
    use declarative::{LifecycleResult, PlanAction, ResourceState};
    use serde_json::json;
    use std::sync::Arc;

    const STACK: &str = r#"
[defaults]
region = "us-east-1"

[[resource]]
name = "migrate"
type = "script"
script = "./bin/migrate v2"

[[resource]]
name = "seed"
type = "lambda"
function = "seed-db"
payload = { env = "dev" }
"#;

    fn shell() -> SharedShell {
        Arc::new(ScriptedShell::default())
    }

    fn stored(kind: &str, inputs: serde_json::Value) -> ResourceState {
        ResourceState::created(kind, inputs, LifecycleResult::changed("x", "r"), None)
    }

    #[test]
    fn test_fresh_stack_creates_everything() {
        let config = StackConfig::parse(STACK, ConfigFormat::Toml).unwrap();
        let plan = build_plan(&config, &config.defaults, &StackState::default(), &shell()).unwrap();

        assert_eq!(plan.total_resources(), 2);
        assert!(plan.entries.iter().all(|e| e.action() == PlanAction::Create));
        assert_eq!(plan.entries[1].inputs["region"], json!("us-east-1"));
    }

    #[test]
    fn test_prior_state_drives_actions() {
        let config = StackConfig::parse(STACK, ConfigFormat::Toml).unwrap();
        let mut state = StackState::default();
        state.set("migrate", stored("script", json!({"script": "./bin/migrate v1"})));
        state.set(
            "seed",
            stored(
                "lambda",
                json!({"region": "us-east-1", "function": "seed-db", "payload": {"env": "dev"}}),
            ),
        );
        state.set("retired", stored("script", json!({"script": "true"})));

        let plan = build_plan(&config, &config.defaults, &state, &shell()).unwrap();

        assert_eq!(
            plan.entries[0].action(),
            PlanAction::Update {
                fields: vec!["script".into()]
            }
        );
        assert_eq!(plan.entries[1].action(), PlanAction::NoChange);
        assert_eq!(plan.orphans, vec!["retired".to_string()]);
    }

    #[test]
    fn test_type_change_recreates() {
        let config = StackConfig::parse(STACK, ConfigFormat::Toml).unwrap();
        let mut state = StackState::default();
        state.set("migrate", stored("aws_command", json!({"cmd": "x"})));

        let plan = build_plan(&config, &config.defaults, &state, &shell()).unwrap();
        assert_eq!(plan.entries[0].action(), PlanAction::Create);
    }

    #[test]
    fn test_invalid_inputs_fail_the_plan() {
        let toml = "[[resource]]\nname = \"bad\"\ntype = \"lambda\"\nfunction = \"f\"\n";
        let config = StackConfig::parse(toml, ConfigFormat::Toml).unwrap();

        let err = build_plan(&config, &Defaults::default(), &StackState::default(), &shell())
            .unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("bad (lambda)"));
        assert!(message.contains("region"));
    }

    #[test]
    fn test_misspelled_optional_input_fails_the_plan() {
        let toml = r#"
[defaults]
region = "us-east-1"

[[resource]]
name = "seed"
type = "lambda"
function = "seed-db"
qualifer = "live"
"#;
        let config = StackConfig::parse(toml, ConfigFormat::Toml).unwrap();
        let shell = Arc::new(ScriptedShell::default());
        let shared: SharedShell = shell.clone();

        let err = build_plan(&config, &config.defaults, &StackState::default(), &shared)
            .unwrap_err();

        let message = format!("{err:#}");
        assert!(message.contains("seed (lambda)"));
        assert!(message.contains("qualifer"));
        assert_eq!(shell.attempts(), 0);
    }
}
