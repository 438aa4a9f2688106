//! Script resource

use anyhow::Result;
use cmdkit::CommandRequest;
use declarative::Provider;
use serde::{Deserialize, Serialize};

use super::SharedShell;

pub const KIND: &str = "script";

/// Runs a shell script once, without polling
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    name: String,
    shell: SharedShell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptInputs {
    /// Script body handed to the shell
    pub script: String,
}

impl ScriptRunner {
    pub fn new(name: &str, shell: SharedShell) -> Self {
        Self {
            name: name.to_string(),
            shell,
        }
    }
}

impl Provider for ScriptRunner {
    type Inputs = ScriptInputs;

    fn name(&self) -> &str {
        &self.name
    }

    fn resource_type(&self) -> &'static str {
        KIND
    }

    fn execute(&self, inputs: &ScriptInputs) -> Result<String> {
        let request = CommandRequest::new(inputs.script.as_str());
        Ok(cmdkit::execute_output(&*self.shell, &request)?)
    }

    fn has_changed(&self, olds: &ScriptInputs, news: &ScriptInputs) -> bool {
        olds.script != news.script
    }
}
