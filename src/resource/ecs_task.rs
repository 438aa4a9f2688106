//! One-off ECS task resource

use anyhow::{Context, Result, bail};
use cmdkit::CommandRequest;
use cmdkit::aws::{self, EcsRunTask};
use declarative::Provider;
use serde::{Deserialize, Serialize};

use super::{SharedShell, default_timeout};

pub const KIND: &str = "ecs_task";

/// Launches a task on an existing cluster, typically a migration or
/// deployment step, and optionally waits for it to stop
#[derive(Debug, Clone)]
pub struct EcsTask {
    name: String,
    shell: SharedShell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcsTaskInputs {
    /// Seconds to keep retrying until run-task reports an ARN
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    pub region: String,
    #[serde(flatten)]
    pub task: EcsRunTask,
    /// Block until the task has stopped
    #[serde(default = "default_wait")]
    pub wait: bool,
}

fn default_wait() -> bool {
    true
}

/// Every key an `ecs_task` declaration may set
const FIELDS: &[&str] = &[
    "timeout",
    "region",
    "wait",
    "task_definition",
    "cluster",
    "launch_type",
    "subnets",
    "security_groups",
    "assign_public_ip",
];

impl EcsTask {
    pub fn new(name: &str, shell: SharedShell) -> Self {
        Self {
            name: name.to_string(),
            shell,
        }
    }
}

impl Provider for EcsTask {
    type Inputs = EcsTaskInputs;

    fn name(&self) -> &str {
        &self.name
    }

    fn resource_type(&self) -> &'static str {
        KIND
    }

    fn execute(&self, inputs: &EcsTaskInputs) -> Result<String> {
        let launch =
            CommandRequest::new(aws::ecs_run_task(&inputs.task)).with_region(&inputs.region);
        let output = cmdkit::poll_output(
            &*self.shell,
            &launch,
            cmdkit::timeout_from_secs(inputs.timeout),
        )?;
        let task_arn = cmdkit::first_non_blank_line(&output)
            .unwrap_or(&output)
            .to_string();
        // `--output text` renders a missing taskArn as the literal None.
        if task_arn == "None" {
            bail!(
                "run-task started no task for {} on {}",
                inputs.task.task_definition,
                inputs.task.cluster
            );
        }
        log::info!("{}: started {task_arn}", self.name);

        if inputs.wait {
            let wait = CommandRequest::new(aws::ecs_wait_tasks_stopped(
                &inputs.task.cluster,
                &task_arn,
            ))
            .with_region(&inputs.region);
            cmdkit::execute(&*self.shell, &wait)
                .with_context(|| format!("waiting for {task_arn} to stop"))?;
            log::info!("{}: {task_arn} stopped", self.name);
        }

        Ok(task_arn)
    }

    fn has_changed(&self, olds: &EcsTaskInputs, news: &EcsTaskInputs) -> bool {
        olds.region != news.region || olds.task != news.task || olds.wait != news.wait
    }

    fn accepted_fields(&self) -> Option<&'static [&'static str]> {
        Some(FIELDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdkit::{CommandResult, ScriptedShell};
    use declarative::DynProvider;
    use serde_json::json;
    use std::sync::Arc;

    const ARN: &str = "arn:aws:ecs:us-east-1:123:task/main/abc";

    fn inputs(wait: bool) -> EcsTaskInputs {
        let mut task = EcsRunTask::new("migrate:3", "main");
        task.subnets = vec!["subnet-1".into()];
        task.security_groups = vec!["sg-1".into()];
        EcsTaskInputs {
            timeout: 60,
            region: "us-east-1".into(),
            task,
            wait,
        }
    }

    #[test]
    fn test_launch_then_wait() {
        let shell = Arc::new(ScriptedShell::new([
            CommandResult::ok(""),
            CommandResult::ok(format!("{ARN}\n")),
            CommandResult::ok(""),
        ]));
        let task = EcsTask::new("migrate", shell.clone());

        let created = task.create(&inputs(true)).unwrap();

        assert_eq!(created.outs.result(), Some(ARN));
        let scripts = shell.scripts();
        assert_eq!(scripts.len(), 3);
        assert!(scripts[1].contains("aws ecs run-task --task-definition migrate:3 --cluster main"));
        assert_eq!(
            scripts[2],
            format!(
                "export AWS_DEFAULT_REGION=us-east-1\n\
                 aws ecs wait tasks-stopped --cluster main --tasks {ARN}"
            )
        );
    }

    #[test]
    fn test_no_wait_skips_second_command() {
        let shell = Arc::new(ScriptedShell::always(CommandResult::ok(ARN)));
        EcsTask::new("migrate", shell.clone())
            .create(&inputs(false))
            .unwrap();
        assert_eq!(shell.attempts(), 1);
    }

    #[test]
    fn test_wait_failure_is_reported() {
        let shell = Arc::new(ScriptedShell::new([
            CommandResult::ok(ARN),
            CommandResult::failed(255, "Waiter TasksStopped failed"),
        ]));
        let err = EcsTask::new("migrate", shell)
            .create(&inputs(true))
            .unwrap_err();

        assert!(format!("{err:#}").contains("waiting for"));
        assert!(err.downcast_ref::<cmdkit::Error>().unwrap().is_execution());
    }

    #[test]
    fn test_gate_ignores_timeout_only() {
        let shell = Arc::new(ScriptedShell::default());
        let task = EcsTask::new("migrate", shell);

        let mut longer = inputs(true);
        longer.timeout = 600;
        assert!(!task.has_changed(&inputs(true), &longer));

        let mut revised = inputs(true);
        revised.task.task_definition = "migrate:4".into();
        assert!(task.has_changed(&inputs(true), &revised));
        assert!(task.has_changed(&inputs(true), &inputs(false)));
    }

    #[test]
    fn test_missing_task_is_a_launch_failure() {
        let shell = Arc::new(ScriptedShell::always(CommandResult::ok("None\n")));
        let err = EcsTask::new("migrate", shell.clone())
            .create(&inputs(true))
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("started no task for migrate:3 on main"));
        assert_eq!(shell.attempts(), 1);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let task: Box<dyn DynProvider> =
            Box::new(EcsTask::new("migrate", Arc::new(ScriptedShell::default())));
        let declared = json!({
            "region": "us-east-1",
            "task_definition": "migrate",
            "cluster": "main",
            "wiat": false
        });

        let err = task.validate(&declared).unwrap_err();
        assert!(err.to_string().contains("unknown field `wiat`"));

        let mut fixed = declared;
        fixed.as_object_mut().unwrap().remove("wiat");
        assert!(task.validate(&fixed).is_ok());
    }

    #[test]
    fn test_decodes_flattened_task() {
        let decoded: EcsTaskInputs = serde_json::from_value(json!({
            "region": "us-east-1",
            "task_definition": "migrate",
            "cluster": "main"
        }))
        .unwrap();
        assert_eq!(decoded.task.launch_type, "FARGATE");
        assert!(decoded.wait);
        assert_eq!(decoded.timeout, super::super::DEFAULT_TIMEOUT_SECS);
    }
}
