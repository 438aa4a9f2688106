//! Core types for command execution.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable the AWS CLI reads its region from.
pub const REGION_VAR: &str = "AWS_DEFAULT_REGION";

/// The text of a command: either a literal script or an ordered token list.
///
/// Deserializes from either a string or an array of strings, so stack files
/// can write whichever is more readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandText {
    /// A literal script body, passed to the shell as-is
    Script(String),
    /// Tokens joined with single spaces before execution
    Tokens(Vec<String>),
}

impl CommandText {
    /// Render the command as the text handed to the shell.
    pub fn render(&self) -> String {
        match self {
            Self::Script(script) => script.clone(),
            Self::Tokens(tokens) => tokens.join(" "),
        }
    }

    /// Whether the rendered command contains only whitespace.
    pub fn is_blank(&self) -> bool {
        self.render().trim().is_empty()
    }
}

impl From<&str> for CommandText {
    fn from(script: &str) -> Self {
        Self::Script(script.to_string())
    }
}

impl From<String> for CommandText {
    fn from(script: String) -> Self {
        Self::Script(script)
    }
}

impl From<Vec<String>> for CommandText {
    fn from(tokens: Vec<String>) -> Self {
        Self::Tokens(tokens)
    }
}

impl fmt::Display for CommandText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// A single command invocation.
///
/// Requests are immutable values; the builder methods consume and return
/// a new request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRequest {
    /// What to run
    pub text: CommandText,
    /// Environment overrides applied on top of the inherited environment
    pub env: BTreeMap<String, String>,
    /// Working directory (`~` is expanded)
    pub cwd: Option<PathBuf>,
    /// Polling deadline; `None` means run once without retry
    pub timeout: Option<Duration>,
}

impl CommandRequest {
    /// Create a request for the given command text.
    pub fn new(text: impl Into<CommandText>) -> Self {
        Self {
            text: text.into(),
            env: BTreeMap::new(),
            cwd: None,
            timeout: None,
        }
    }

    /// Add an environment override.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the working directory.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set the polling deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Prefix the command body with a region assignment line.
    ///
    /// The result is always a script of the form
    /// `export AWS_DEFAULT_REGION=<region>\n<command>`.
    pub fn with_region(mut self, region: &str) -> Self {
        let body = self.text.render();
        self.text = CommandText::Script(format!("export {REGION_VAR}={region}\n{body}"));
        self
    }

    /// The text handed to the shell.
    pub fn script(&self) -> String {
        self.text.render()
    }
}

/// Captured output of one finished process.
///
/// A fresh result is produced for every attempt; results are never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandResult {
    /// Full standard output
    pub stdout: String,
    /// Full standard error
    pub stderr: String,
    /// Exit code, `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
}

impl CommandResult {
    /// A successful result with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    /// A failed result with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: Some(exit_code),
        }
    }

    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Stdout with surrounding whitespace removed.
    pub fn trimmed_stdout(&self) -> &str {
        self.stdout.trim()
    }

    /// Whether stdout is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.trimmed_stdout().is_empty()
    }

    /// First non-blank line of the trimmed stdout.
    pub fn first_line(&self) -> Option<&str> {
        first_non_blank_line(&self.stdout)
    }
}

/// First non-blank line of `text`, trimmed.
pub fn first_non_blank_line(text: &str) -> Option<&str> {
    text.lines().map(str::trim).find(|line| !line.is_empty())
}

/// Convert a caller-supplied timeout in seconds into a deadline duration.
pub fn timeout_from_secs(secs: u64) -> Duration {
    Duration::from_millis(secs.saturating_mul(1000))
}
