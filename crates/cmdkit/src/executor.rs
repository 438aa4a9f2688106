//! Single-shot command execution.

use crate::backend::Shell;
use crate::error::{Error, Result};
use crate::types::{CommandRequest, CommandResult};

/// Run `request` once and fail if the process exits non-zero.
///
/// Exactly one process is spawned. No retry happens at this layer; see
/// [`crate::poll`] for that. On failure the returned error carries both
/// captured streams so the caller never has to re-run the command to
/// explain it.
pub fn execute<S: Shell + ?Sized>(shell: &S, request: &CommandRequest) -> Result<CommandResult> {
    log::debug!("executing: {}", request.script());

    let result = shell.spawn(request)?;

    if !result.success() {
        log::trace!(
            "command exited with {:?} ({} bytes stderr)",
            result.exit_code,
            result.stderr.len()
        );
        return Err(Error::Execution {
            exit_code: result.exit_code,
            stdout: result.stdout,
            stderr: result.stderr,
        });
    }

    log::trace!("command succeeded ({} bytes stdout)", result.stdout.len());
    Ok(result)
}

/// Run `request` once and return its trimmed stdout.
pub fn execute_output<S: Shell + ?Sized>(shell: &S, request: &CommandRequest) -> Result<String> {
    Ok(execute(shell, request)?.trimmed_stdout().to_string())
}
