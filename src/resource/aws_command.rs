//! AWS CLI command resource

use anyhow::{Result, bail};
use cmdkit::{CommandRequest, CommandText};
use declarative::Provider;
use serde::{Deserialize, Serialize};

use super::{SharedShell, default_timeout};

pub const KIND: &str = "aws_command";

/// Polls an AWS CLI command until it prints a result
///
/// The command is retried back-to-back while its output is blank, so it
/// suits calls that only answer once something remote has settled.
#[derive(Debug, Clone)]
pub struct AwsCommand {
    name: String,
    shell: SharedShell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AwsCommandInputs {
    /// Seconds to keep retrying blank output
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    /// Exported as `AWS_DEFAULT_REGION` before the command
    pub region: String,
    /// Script text, or tokens joined with spaces
    pub cmd: CommandText,
}

impl AwsCommand {
    pub fn new(name: &str, shell: SharedShell) -> Self {
        Self {
            name: name.to_string(),
            shell,
        }
    }
}

impl Provider for AwsCommand {
    type Inputs = AwsCommandInputs;

    fn name(&self) -> &str {
        &self.name
    }

    fn resource_type(&self) -> &'static str {
        KIND
    }

    fn execute(&self, inputs: &AwsCommandInputs) -> Result<String> {
        let request = CommandRequest::new(inputs.cmd.clone()).with_region(&inputs.region);
        let output = cmdkit::poll_output(
            &*self.shell,
            &request,
            cmdkit::timeout_from_secs(inputs.timeout),
        )?;
        Ok(cmdkit::first_non_blank_line(&output)
            .unwrap_or(&output)
            .to_string())
    }

    fn has_changed(&self, olds: &AwsCommandInputs, news: &AwsCommandInputs) -> bool {
        olds.cmd != news.cmd
    }

    fn check(&self, inputs: &AwsCommandInputs) -> Result<()> {
        // A blank command succeeds with blank output until the deadline.
        if inputs.cmd.is_blank() {
            bail!("cmd is empty");
        }
        Ok(())
    }
}
