//! Shell abstraction for process execution.
//!
//! The [`Shell`] trait is the seam between command logic and the OS,
//! allowing for different implementations (real `sh`, scripted replay for
//! testing).

pub mod scripted;
pub mod system;

use crate::error::Result;
use crate::types::{CommandRequest, CommandResult};
use std::fmt;

pub use scripted::ScriptedShell;
pub use system::SystemShell;

/// Runs one command to completion.
///
/// Implementations spawn exactly one process per call, wait for it, and
/// return the captured streams whatever the exit status. Only a failure to
/// start or wait on the process is an error; interpreting the exit status is
/// left to [`crate::execute`].
pub trait Shell: Send + Sync + fmt::Debug {
    /// Run the request and capture its output.
    fn spawn(&self, request: &CommandRequest) -> Result<CommandResult>;
}

impl<S: Shell + ?Sized> Shell for &S {
    fn spawn(&self, request: &CommandRequest) -> Result<CommandResult> {
        (**self).spawn(request)
    }
}

impl<S: Shell + ?Sized> Shell for std::sync::Arc<S> {
    fn spawn(&self, request: &CommandRequest) -> Result<CommandResult> {
        (**self).spawn(request)
    }
}

/// Get the default shell (`sh -c`).
pub fn default_shell() -> SystemShell {
    SystemShell::default()
}
