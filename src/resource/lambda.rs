//! Lambda invocation resource

use anyhow::{Context, Result};
use cmdkit::CommandRequest;
use declarative::{Provider, values_equal};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{SharedShell, default_timeout};

pub const KIND: &str = "lambda";

/// Invokes a Lambda function and records its response
///
/// The response is whatever the function returned, as captured from the
/// CLI, trimmed but otherwise untouched. Each invocation writes its response
/// file inside a scratch directory of its own, so invocations applied in
/// parallel never read each other's response.
#[derive(Debug, Clone)]
pub struct LambdaInvocation {
    name: String,
    shell: SharedShell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LambdaInputs {
    #[serde(default = "default_timeout")]
    pub timeout: u64,
    pub region: String,
    /// Function name or ARN
    #[serde(alias = "name")]
    pub function: String,
    /// Event payload, sent as JSON
    #[serde(default, alias = "input")]
    pub payload: Value,
    /// Version or alias to invoke
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier: Option<String>,
}

impl LambdaInvocation {
    pub fn new(name: &str, shell: SharedShell) -> Self {
        Self {
            name: name.to_string(),
            shell,
        }
    }
}

impl Provider for LambdaInvocation {
    type Inputs = LambdaInputs;

    fn name(&self) -> &str {
        &self.name
    }

    fn resource_type(&self) -> &'static str {
        KIND
    }

    fn execute(&self, inputs: &LambdaInputs) -> Result<String> {
        let cmd = cmdkit::aws::lambda_invoke(
            &inputs.function,
            &inputs.payload,
            inputs.qualifier.as_deref(),
        )?;
        let scratch = tempfile::Builder::new()
            .prefix("effector-lambda-")
            .tempdir()
            .context("Failed to create a directory for the Lambda response")?;
        let request = CommandRequest::new(cmd)
            .with_region(&inputs.region)
            .with_cwd(scratch.path());
        Ok(cmdkit::poll_output(
            &*self.shell,
            &request,
            cmdkit::timeout_from_secs(inputs.timeout),
        )?)
    }

    fn has_changed(&self, olds: &LambdaInputs, news: &LambdaInputs) -> bool {
        olds.function != news.function
            || olds.qualifier != news.qualifier
            || !values_equal(&olds.payload, &news.payload)
    }
}
