//! Side-effecting resource variants
//!
//! Every variant runs a command when created and re-runs it only when the
//! inputs that shape that command change:
//! - `script` runs a shell script once
//! - `aws_command` polls an AWS CLI command until it prints something
//! - `lambda` invokes a Lambda function and captures its response
//! - `ecs_task` launches a one-off ECS task and waits for it to stop

use anyhow::{Result, bail};
use cmdkit::Shell;
use declarative::DynProvider;
use std::sync::Arc;

pub mod aws_command;
pub mod ecs_task;
pub mod lambda;
pub mod script;

pub use aws_command::AwsCommand;
pub use ecs_task::EcsTask;
pub use lambda::LambdaInvocation;
pub use script::ScriptRunner;

/// Shell handle shared by every provider in a stack
pub type SharedShell = Arc<dyn Shell>;

/// Every resource type a stack may declare
pub const KINDS: &[&str] = &[
    script::KIND,
    aws_command::KIND,
    lambda::KIND,
    ecs_task::KIND,
];

/// Timeout applied when neither the resource nor the defaults set one
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Whether a resource type takes the shared `region`/`timeout` defaults
pub fn uses_aws_defaults(kind: &str) -> bool {
    kind != script::KIND
}

/// Construct the provider for a declared resource
pub fn build(name: &str, kind: &str, shell: SharedShell) -> Result<Box<dyn DynProvider>> {
    let provider: Box<dyn DynProvider> = match kind {
        script::KIND => Box::new(ScriptRunner::new(name, shell)),
        aws_command::KIND => Box::new(AwsCommand::new(name, shell)),
        lambda::KIND => Box::new(LambdaInvocation::new(name, shell)),
        ecs_task::KIND => Box::new(EcsTask::new(name, shell)),
        other => bail!(
            "unknown resource type '{other}' for {name} (expected one of: {})",
            KINDS.join(", ")
        ),
    };
    Ok(provider)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdkit::ScriptedShell;

    #[test]
    fn test_build_known_kinds() {
        let shell: SharedShell = Arc::new(ScriptedShell::default());
        for kind in KINDS {
            let provider = build("r", kind, shell.clone()).unwrap();
            assert_eq!(provider.kind(), *kind);
            assert_eq!(provider.resource_name(), "r");
        }
    }

    #[test]
    fn test_build_unknown_kind() {
        let shell: SharedShell = Arc::new(ScriptedShell::default());
        let err = build("r", "terraform", shell).unwrap_err();
        assert!(err.to_string().contains("unknown resource type 'terraform'"));
    }

    #[test]
    fn test_aws_defaults_skip_scripts() {
        assert!(!uses_aws_defaults("script"));
        assert!(uses_aws_defaults("lambda"));
    }
}
