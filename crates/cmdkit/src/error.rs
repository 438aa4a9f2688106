//! Error types for command execution.
//!
//! Errors carry everything a caller needs to report a failure (captured
//! streams, exit code, attempt counts) so the command never has to be
//! re-run just to explain what went wrong.

use std::time::Duration;
use thiserror::Error;

/// Categories of command errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The process ran and exited non-zero
    Execution,
    /// Polling ran out of time without a result
    Timeout,
    /// The process could not be started
    Spawn,
    /// A command could not be constructed
    Construction,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Execution => "Command returned non-zero exit code",
            Self::Timeout => "Command never produced output",
            Self::Spawn => "Command could not be started",
            Self::Construction => "Command could not be built",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Execution => "Inspect the captured stderr above and fix the command",
            Self::Timeout => "Raise the timeout or check that the remote side completes",
            Self::Spawn => "Check that the shell exists and the working directory is valid",
            Self::Construction => "Check that the inputs are valid JSON-serializable values",
        }
    }
}

/// Errors that can occur while running commands.
#[derive(Debug, Error)]
pub enum Error {
    /// The process exited with a non-zero status
    #[error("Script returned non-zero exit code{}", .exit_code.map(|c| format!(" ({c})")).unwrap_or_default())]
    Execution {
        /// Exit code, `None` when terminated by a signal
        exit_code: Option<i32>,
        /// Captured standard output
        stdout: String,
        /// Captured standard error
        stderr: String,
    },

    /// The poller deadline passed before any attempt produced output
    #[error("Timeout on command retries exceeded after {attempts} attempts ({}s)", .timeout.as_secs_f64())]
    Timeout {
        /// Configured timeout
        timeout: Duration,
        /// Number of attempts made before giving up
        attempts: u32,
    },

    /// The shell process could not be spawned or waited on
    #[error("failed to execute {program}: {source}")]
    Spawn {
        /// Program that was being started
        program: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// A payload could not be serialized into a command
    #[error("invalid payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Execution { .. } => ErrorCategory::Execution,
            Error::Timeout { .. } => ErrorCategory::Timeout,
            Error::Spawn { .. } => ErrorCategory::Spawn,
            Error::Payload(_) => ErrorCategory::Construction,
        }
    }

    /// Whether this is a non-zero exit.
    pub fn is_execution(&self) -> bool {
        matches!(self, Error::Execution { .. })
    }

    /// Whether this is a polling timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Timeout { .. })
    }

    /// Captured stderr, if the error came from a finished process.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Error::Execution { stderr, .. } => Some(stderr),
            _ => None,
        }
    }

    /// Multi-line report with both captured streams, for callers that log.
    pub fn report(&self) -> String {
        match self {
            Error::Execution {
                stdout, stderr, ..
            } => format!("{self}\nstdout:\n\n{stdout}\n\nstderr:\n\n{stderr}\n"),
            _ => self.to_string(),
        }
    }
}

/// Result type for command operations.
pub type Result<T> = std::result::Result<T, Error>;
