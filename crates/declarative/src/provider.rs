//! Provider contract for side-effecting resources
//!
//! A provider turns declared inputs into a side effect (running a command)
//! and reports a result back to the host. The host calls `create` once, then
//! `update` on every later apply; `update` only re-runs the side effect when
//! the provider's diff says the inputs changed.

use crate::diff;
use crate::types::LifecycleResult;
use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;

/// Core trait for side-effect providers
///
/// Implementors hold their configuration (declared name, shell handle) as
/// fields and describe their inputs as a serde type. Only `execute` does
/// real work; the lifecycle methods are provided.
///
/// # Example
///
/// ```ignore
/// use declarative::Provider;
///
/// #[derive(Debug)]
/// struct Echo { name: String }
///
/// #[derive(Debug, serde::Serialize, serde::Deserialize)]
/// struct EchoInputs { text: String }
///
/// impl Provider for Echo {
///     type Inputs = EchoInputs;
///
///     fn name(&self) -> &str { &self.name }
///     fn resource_type(&self) -> &'static str { "echo" }
///
///     fn execute(&self, inputs: &EchoInputs) -> anyhow::Result<String> {
///         Ok(inputs.text.clone())
///     }
/// }
/// ```
pub trait Provider: Send + Sync + fmt::Debug {
    /// Typed inputs decoded from the declaration
    type Inputs: Serialize + DeserializeOwned + fmt::Debug;

    /// Declared name; becomes the identity returned by `create`
    fn name(&self) -> &str;

    /// Resource type category
    fn resource_type(&self) -> &'static str;

    /// Run the side effect once and return its `result`
    fn execute(&self, inputs: &Self::Inputs) -> Result<String>;

    /// Whether moving from `olds` to `news` requires re-running
    ///
    /// Defaults to a full structural comparison. Override to restrict the
    /// comparison to the inputs that shape the command.
    fn has_changed(&self, olds: &Self::Inputs, news: &Self::Inputs) -> bool {
        diff::inputs_changed(olds, news)
    }

    /// Top-level input keys, for inputs whose serde shape can't reject
    /// unknown ones itself (flattened structs)
    fn accepted_fields(&self) -> Option<&'static [&'static str]> {
        None
    }

    /// Reject decoded inputs that could never produce a command
    fn check(&self, _inputs: &Self::Inputs) -> Result<()> {
        Ok(())
    }

    /// Run the side effect for the first time
    fn create(&self, inputs: &Self::Inputs) -> Result<LifecycleResult> {
        let result = self.execute(inputs)?;
        Ok(LifecycleResult::changed(self.name(), result))
    }

    /// Re-run the side effect if the inputs changed
    ///
    /// Unchanged inputs return the same identity and empty outputs without
    /// running anything.
    fn update(
        &self,
        id: &str,
        olds: &Self::Inputs,
        news: &Self::Inputs,
    ) -> Result<LifecycleResult> {
        if !self.has_changed(olds, news) {
            log::debug!("{id}: inputs unchanged, skipping");
            return Ok(LifecycleResult::unchanged(id));
        }
        log::debug!("{id}: inputs changed, re-running");
        let result = self.execute(news)?;
        Ok(LifecycleResult::changed(id, result))
    }
}

/// Object-safe view of a [`Provider`] over JSON inputs
///
/// Lets the host hold heterogeneous providers as `Box<dyn DynProvider>`.
/// Every [`Provider`] gets this through a blanket impl.
pub trait DynProvider: Send + Sync + fmt::Debug {
    /// Declared name
    fn resource_name(&self) -> &str;

    /// Resource type category
    fn kind(&self) -> &'static str;

    /// Check that `inputs` decode and make sense, without running anything
    fn validate(&self, inputs: &Value) -> Result<()>;

    /// Provider's change gate over JSON inputs
    ///
    /// Inputs that fail to decode count as changed.
    fn inputs_differ(&self, olds: &Value, news: &Value) -> bool;

    /// `create` over JSON inputs
    fn create_dyn(&self, inputs: &Value) -> Result<LifecycleResult>;

    /// `update` over JSON inputs
    fn update_dyn(&self, id: &str, olds: &Value, news: &Value) -> Result<LifecycleResult>;
}

fn decode<T: DeserializeOwned>(name: &str, inputs: &Value) -> Result<T> {
    serde_json::from_value(inputs.clone()).with_context(|| format!("invalid inputs for {name}"))
}

impl<P: Provider> DynProvider for P {
    fn resource_name(&self) -> &str {
        self.name()
    }

    fn kind(&self) -> &'static str {
        self.resource_type()
    }

    fn validate(&self, inputs: &Value) -> Result<()> {
        if let (Some(accepted), Value::Object(map)) = (self.accepted_fields(), inputs)
            && let Some(unknown) = map.keys().find(|k| !accepted.contains(&k.as_str()))
        {
            bail!(
                "invalid inputs for {}: unknown field `{unknown}`, expected one of: {}",
                self.name(),
                accepted.join(", ")
            );
        }
        let decoded = decode::<P::Inputs>(self.name(), inputs)?;
        self.check(&decoded)
            .with_context(|| format!("invalid inputs for {}", self.name()))
    }

    fn inputs_differ(&self, olds: &Value, news: &Value) -> bool {
        match (
            decode::<P::Inputs>(self.name(), olds),
            decode::<P::Inputs>(self.name(), news),
        ) {
            (Ok(olds), Ok(news)) => Provider::has_changed(self, &olds, &news),
            _ => true,
        }
    }

    fn create_dyn(&self, inputs: &Value) -> Result<LifecycleResult> {
        let inputs = decode::<P::Inputs>(self.name(), inputs)?;
        Provider::create(self, &inputs)
    }

    fn update_dyn(&self, id: &str, olds: &Value, news: &Value) -> Result<LifecycleResult> {
        let news = decode::<P::Inputs>(self.name(), news)?;
        match decode::<P::Inputs>(self.name(), olds) {
            Ok(olds) => Provider::update(self, id, &olds, &news),
            Err(err) => {
                log::warn!("{id}: stored inputs unreadable ({err:#}), re-running");
                let result = self.execute(&news)?;
                Ok(LifecycleResult::changed(id, result))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cmdkit::{CommandRequest, CommandResult, ScriptedShell, Shell};
    use serde::Deserialize;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug)]
    struct Runner {
        name: String,
        shell: Arc<ScriptedShell>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct RunnerInputs {
        script: String,
        #[serde(default)]
        note: Option<String>,
    }

    impl Provider for Runner {
        type Inputs = RunnerInputs;

        fn name(&self) -> &str {
            &self.name
        }

        fn resource_type(&self) -> &'static str {
            "runner"
        }

        fn execute(&self, inputs: &RunnerInputs) -> Result<String> {
            let result =
                cmdkit::execute(&*self.shell, &CommandRequest::new(inputs.script.as_str()))?;
            Ok(result.trimmed_stdout().to_string())
        }

        fn has_changed(&self, olds: &RunnerInputs, news: &RunnerInputs) -> bool {
            olds.script != news.script
        }
    }

    /// Keeps the default structural gate
    #[derive(Debug)]
    struct Echo {
        shell: Arc<ScriptedShell>,
    }

    impl Provider for Echo {
        type Inputs = Value;

        fn name(&self) -> &str {
            "echo"
        }

        fn resource_type(&self) -> &'static str {
            "echo"
        }

        fn execute(&self, inputs: &Value) -> Result<String> {
            let result = cmdkit::execute(&*self.shell, &CommandRequest::new(inputs.to_string()))?;
            Ok(result.trimmed_stdout().to_string())
        }

        fn accepted_fields(&self) -> Option<&'static [&'static str]> {
            Some(&["text", "opts"])
        }

        fn check(&self, inputs: &Value) -> Result<()> {
            if inputs.get("text").is_none() {
                bail!("missing text");
            }
            Ok(())
        }
    }

    fn runner(shell: ScriptedShell) -> (Runner, Arc<ScriptedShell>) {
        let shell = Arc::new(shell);
        (
            Runner {
                name: "migrate".into(),
                shell: shell.clone(),
            },
            shell,
        )
    }

    fn inputs(script: &str) -> RunnerInputs {
        RunnerInputs {
            script: script.into(),
            note: None,
        }
    }

    #[test]
    fn test_create_executes_once_and_uses_declared_name() {
        let (provider, shell) = runner(ScriptedShell::always(CommandResult::ok("task-42\n")));
        let created = provider.create(&inputs("run")).unwrap();
        assert_eq!(created.id, "migrate");
        assert_eq!(created.outs.result(), Some("task-42"));
        assert_eq!(shell.attempts(), 1);
    }

    #[test]
    fn test_idempotent_noop_update() {
        let (provider, shell) = runner(ScriptedShell::always(CommandResult::ok("x")));
        let updated = provider
            .update("migrate", &inputs("run"), &inputs("run"))
            .unwrap();
        assert!(updated.is_noop());
        assert_eq!(updated.id, "migrate");
        assert_eq!(shell.attempts(), 0);
    }

    #[test]
    fn test_change_triggers_single_reexecution() {
        let (provider, shell) = runner(ScriptedShell::always(CommandResult::ok("fresh")));
        let updated = provider
            .update("migrate", &inputs("run v1"), &inputs("run v2"))
            .unwrap();
        assert_eq!(updated.outs.result(), Some("fresh"));
        assert_eq!(updated.id, "migrate");
        assert_eq!(shell.attempts(), 1);
        assert_eq!(shell.last_script().as_deref(), Some("run v2"));
    }

    #[test]
    fn test_execution_error_propagates_unmodified() {
        let (provider, _) = runner(ScriptedShell::always(CommandResult::failed(9, "bad")));
        let err = provider.create(&inputs("run")).unwrap_err();
        let cmd_err = err.downcast_ref::<cmdkit::Error>().unwrap();
        assert!(cmd_err.is_execution());
        assert_eq!(cmd_err.stderr(), Some("bad"));
    }

    #[test]
    fn test_dyn_update_uses_provider_gate() {
        let (provider, shell) = runner(ScriptedShell::always(CommandResult::ok("x")));
        let provider: Box<dyn DynProvider> = Box::new(provider);

        let olds = json!({"script": "run", "note": "a"});
        let news = json!({"script": "run", "note": "b"});
        assert!(!provider.inputs_differ(&olds, &news));
        assert!(provider.update_dyn("migrate", &olds, &news).unwrap().is_noop());
        assert_eq!(shell.attempts(), 0);
    }

    #[test]
    fn test_dyn_rejects_invalid_inputs_before_running() {
        let (provider, shell) = runner(ScriptedShell::always(CommandResult::ok("x")));
        let bad = json!({"scrpt": "typo"});
        assert!(provider.validate(&bad).is_err());
        assert!(provider.create_dyn(&bad).is_err());
        assert_eq!(shell.attempts(), 0);
    }

    #[test]
    fn test_dyn_unreadable_olds_reruns() {
        let (provider, shell) = runner(ScriptedShell::always(CommandResult::ok("again")));
        let updated = provider
            .update_dyn("migrate", &json!("garbage"), &json!({"script": "run"}))
            .unwrap();
        assert_eq!(updated.outs.result(), Some("again"));
        assert_eq!(shell.attempts(), 1);
    }

    #[test]
    fn test_default_gate_ignores_key_order() {
        let shell = Arc::new(ScriptedShell::always(CommandResult::ok("echoed")));
        let echo = Echo {
            shell: shell.clone(),
        };

        let olds = json!({"text": "hi", "opts": {"loud": true, "times": [1, 2]}});
        let reordered = json!({"opts": {"times": [1, 2], "loud": true}, "text": "hi"});
        assert!(echo.update("echo", &olds, &reordered).unwrap().is_noop());
        assert_eq!(shell.attempts(), 0);

        let changed = json!({"text": "hi", "opts": {"loud": true, "times": [2, 1]}});
        let updated = echo.update("echo", &olds, &changed).unwrap();
        assert_eq!(updated.outs.result(), Some("echoed"));
        assert_eq!(shell.attempts(), 1);
    }

    #[test]
    fn test_validate_rejects_unaccepted_keys_and_failed_checks() {
        let echo = Echo {
            shell: Arc::new(ScriptedShell::default()),
        };

        let typo = json!({"text": "hi", "tetx": "typo"});
        let err = echo.validate(&typo).unwrap_err();
        assert!(err.to_string().contains("unknown field `tetx`"));

        let err = echo.validate(&json!({"opts": {}})).unwrap_err();
        assert!(format!("{err:#}").contains("missing text"));

        assert!(echo.validate(&json!({"text": "hi"})).is_ok());
        assert_eq!(echo.shell.attempts(), 0);
    }

    #[test]
    fn test_shell_trait_object_usable() {
        let shell: &dyn Shell = &ScriptedShell::always(CommandResult::ok("y"));
        assert_eq!(
            cmdkit::execute(shell, &CommandRequest::new("x")).unwrap().stdout,
            "y"
        );
    }
}
