//! AWS CLI command construction.
//!
//! Argument order and flags here are what the AWS CLI expects; keep them
//! stable so stored inputs keep producing the same command lines.

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// File the lambda response is written to before being printed.
pub const LAMBDA_OUT_FILE: &str = "lambda-out.tmp";

/// Escape `text` for use inside a single-quoted shell string.
pub fn escape_single_quoted(text: &str) -> String {
    text.replace('\'', r"'\''")
}

/// Build an `aws lambda invoke` command that prints the function response.
///
/// The payload is serialized to JSON and embedded as a literal argument.
pub fn lambda_invoke<P: Serialize + ?Sized>(
    function: &str,
    payload: &P,
    qualifier: Option<&str>,
) -> Result<String> {
    let json = serde_json::to_string(payload)?;
    let mut cmd = format!(
        "aws lambda invoke --function-name {function} --payload '{}'",
        escape_single_quoted(&json)
    );
    if let Some(qualifier) = qualifier {
        cmd.push_str(" --qualifier ");
        cmd.push_str(qualifier);
    }
    cmd.push_str(&format!(" {LAMBDA_OUT_FILE} && cat {LAMBDA_OUT_FILE}"));
    Ok(cmd)
}

/// Parameters for launching a one-off ECS task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcsRunTask {
    /// Task definition family, family:revision, or ARN
    pub task_definition: String,
    /// Cluster name or ARN
    pub cluster: String,
    /// Launch type
    #[serde(default = "default_launch_type")]
    pub launch_type: String,
    /// Subnets for awsvpc networking
    #[serde(default)]
    pub subnets: Vec<String>,
    /// Security groups for awsvpc networking
    #[serde(default)]
    pub security_groups: Vec<String>,
    /// Whether the task gets a public IP
    #[serde(default = "default_assign_public_ip")]
    pub assign_public_ip: bool,
}

fn default_launch_type() -> String {
    "FARGATE".to_string()
}

fn default_assign_public_ip() -> bool {
    true
}

impl EcsRunTask {
    /// Create a run-task request with default networking.
    pub fn new(task_definition: impl Into<String>, cluster: impl Into<String>) -> Self {
        Self {
            task_definition: task_definition.into(),
            cluster: cluster.into(),
            launch_type: default_launch_type(),
            subnets: Vec::new(),
            security_groups: Vec::new(),
            assign_public_ip: default_assign_public_ip(),
        }
    }

    /// The `awsvpcConfiguration` value, or `None` without any networking.
    fn network_configuration(&self) -> Option<String> {
        if self.subnets.is_empty() && self.security_groups.is_empty() {
            return None;
        }
        let public_ip = if self.assign_public_ip {
            "ENABLED"
        } else {
            "DISABLED"
        };
        Some(format!(
            "awsvpcConfiguration={{subnets=[{}],securityGroups=[{}],assignPublicIp={public_ip}}}",
            self.subnets.join(","),
            self.security_groups.join(",")
        ))
    }
}

/// Build an `aws ecs run-task` command that prints the new task's ARN.
pub fn ecs_run_task(task: &EcsRunTask) -> String {
    let mut cmd = format!(
        "aws ecs run-task --task-definition {} --cluster {} --launch-type {}",
        task.task_definition, task.cluster, task.launch_type
    );
    if let Some(network) = task.network_configuration() {
        cmd.push_str(&format!(" --network-configuration \"{network}\""));
    }
    cmd.push_str(" --query \"tasks[0].taskArn\" --output text");
    cmd
}

/// Build an `aws ecs wait tasks-stopped` command.
pub fn ecs_wait_tasks_stopped(cluster: &str, task_arn: &str) -> String {
    format!("aws ecs wait tasks-stopped --cluster {cluster} --tasks {task_arn}")
}
