//! Real shell backend using `sh -c`.

use crate::backend::Shell;
use crate::error::{Error, Result};
use crate::types::{CommandRequest, CommandResult};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Backend that hands the rendered command text to a POSIX shell.
#[derive(Debug, Clone)]
pub struct SystemShell {
    /// Shell program, invoked as `<program> -c <script>`
    program: String,
    /// Working directory for requests that don't set their own
    cwd: Option<PathBuf>,
}

impl SystemShell {
    /// Create a backend for the given shell program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            cwd: None,
        }
    }

    /// Run requests without a working directory of their own in `cwd`.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

impl Default for SystemShell {
    fn default() -> Self {
        Self::new("sh")
    }
}

impl Shell for SystemShell {
    fn spawn(&self, request: &CommandRequest) -> Result<CommandResult> {
        let script = request.script();
        let mut cmd = Command::new(&self.program);
        cmd.arg("-c")
            .arg(&script)
            .envs(&request.env)
            .stdin(Stdio::null());

        if let Some(cwd) = request.cwd.as_ref().or(self.cwd.as_ref()) {
            let expanded = shellexpand::tilde(&cwd.to_string_lossy()).into_owned();
            cmd.current_dir(PathBuf::from(expanded));
        }

        let output = cmd.output().map_err(|source| Error::Spawn {
            program: self.program.clone(),
            source,
        })?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}
