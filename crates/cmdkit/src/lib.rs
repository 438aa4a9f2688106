//! # cmdkit
//!
//! Run external commands as managed side effects.
//!
//! This crate provides functionality for:
//! - Running one command to completion with both streams captured
//! - Typed failures that carry the captured output
//! - Polling a command until it produces output or a deadline passes
//! - Building AWS CLI command lines with stable argument order
//!
//! ## Example
//!
//! ```no_run
//! use cmdkit::{CommandRequest, SystemShell, execute, poll_until_non_empty};
//! use std::time::Duration;
//!
//! let shell = SystemShell::default();
//!
//! // Run once
//! let result = execute(&shell, &CommandRequest::new("git rev-parse HEAD")).unwrap();
//! println!("{}", result.trimmed_stdout());
//!
//! // Poll an eventually consistent API
//! let request = CommandRequest::new("aws ecs list-tasks --query 'taskArns[0]' --output text")
//!     .with_region("us-east-1");
//! let outcome = poll_until_non_empty(&shell, &request, Duration::from_secs(60), None).unwrap();
//! println!("{} after {} attempts", outcome.output, outcome.attempts);
//! ```
//!
//! ## Failure Semantics
//!
//! A non-zero exit is always an [`Error::Execution`] and is never retried.
//! Only a successful run with blank output counts as "not ready yet" while
//! polling; the poll gives up with [`Error::Timeout`] once its deadline has
//! passed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod aws;
pub mod backend;
pub mod error;
pub mod executor;
pub mod poll;
pub mod types;

pub use backend::{ScriptedShell, Shell, SystemShell, default_shell};
pub use error::{Error, ErrorCategory, Result};
pub use executor::{execute, execute_output};
pub use poll::{
    LogCallback, NoCallback, PollCallback, PollOutcome, poll_output, poll_until_non_empty,
    run_request,
};
pub use types::{
    CommandRequest, CommandResult, CommandText, REGION_VAR, first_non_blank_line, timeout_from_secs,
};
