//! Deadline-bounded polling for commands that may not have a result yet.
//!
//! Asynchronous control planes often accept a request before the answer is
//! queryable. A command that succeeds with blank output is therefore treated
//! as "not ready" and re-run, while a command that exits non-zero fails the
//! poll immediately.

use crate::backend::Shell;
use crate::error::{Error, Result};
use crate::executor::execute;
use crate::types::CommandRequest;
use std::time::{Duration, Instant};

/// Callback trait for polling progress notifications.
pub trait PollCallback {
    /// Called after an attempt that succeeded with blank output.
    ///
    /// # Arguments
    /// * `attempt` - Attempt number (1-indexed)
    /// * `elapsed` - Time since the poll started
    fn on_blank_attempt(&self, attempt: u32, elapsed: Duration);
}

/// No-op callback that does nothing.
pub struct NoCallback;

impl PollCallback for NoCallback {
    fn on_blank_attempt(&self, _attempt: u32, _elapsed: Duration) {}
}

/// Callback that logs each blank attempt at debug level.
pub struct LogCallback;

impl PollCallback for LogCallback {
    fn on_blank_attempt(&self, attempt: u32, elapsed: Duration) {
        log::debug!(
            "attempt {} returned no output after {:.1}s, polling again",
            attempt,
            elapsed.as_secs_f64()
        );
    }
}

/// Successful poll result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOutcome {
    /// Trimmed, non-empty stdout of the final attempt
    pub output: String,
    /// Number of attempts made, including the final one
    pub attempts: u32,
    /// Time from the start of the poll to the final result
    pub elapsed: Duration,
}

/// Re-run `request` until it prints something or `timeout` elapses.
///
/// The deadline is fixed once at the start of the call. It is checked at the
/// top of every iteration only, so an attempt already in flight always runs
/// to completion. Attempts are issued back-to-back with no delay.
///
/// # Errors
/// * [`Error::Execution`] as soon as any attempt exits non-zero
/// * [`Error::Timeout`] once the deadline has passed without output
pub fn poll_until_non_empty<S: Shell + ?Sized>(
    shell: &S,
    request: &CommandRequest,
    timeout: Duration,
    callback: Option<&dyn PollCallback>,
) -> Result<PollOutcome> {
    let start = Instant::now();
    // A deadline beyond what Instant can represent never expires.
    let deadline = start.checked_add(timeout);
    let mut attempts: u32 = 0;

    loop {
        if deadline.is_some_and(|deadline| Instant::now() > deadline) {
            return Err(Error::Timeout { timeout, attempts });
        }

        attempts += 1;
        let result = execute(shell, request)?;

        if !result.is_blank() {
            return Ok(PollOutcome {
                output: result.trimmed_stdout().to_string(),
                attempts,
                elapsed: start.elapsed(),
            });
        }

        if let Some(cb) = callback {
            cb.on_blank_attempt(attempts, start.elapsed());
        }
    }
}

/// Poll with logging and return only the output.
pub fn poll_output<S: Shell + ?Sized>(
    shell: &S,
    request: &CommandRequest,
    timeout: Duration,
) -> Result<String> {
    poll_until_non_empty(shell, request, timeout, Some(&LogCallback)).map(|o| o.output)
}

/// Run a request according to its own timeout.
///
/// With a timeout the request is polled; without one it runs exactly once
/// and its trimmed stdout is returned even when blank.
pub fn run_request<S: Shell + ?Sized>(shell: &S, request: &CommandRequest) -> Result<String> {
    match request.timeout {
        Some(timeout) => poll_output(shell, request, timeout),
        None => Ok(execute(shell, request)?.trimmed_stdout().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ScriptedShell, SystemShell};
    use crate::types::CommandResult;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn request() -> CommandRequest {
        CommandRequest::new("aws ecs describe-tasks")
    }

    #[test]
    fn test_eventual_success_returns_trimmed_output() {
        let shell = ScriptedShell::new([
            CommandResult::ok(""),
            CommandResult::ok("  \n\t"),
            CommandResult::ok("\n  arn:aws:ecs:task/abc \n"),
        ])
        .then_repeat(CommandResult::ok("should not be reached"));

        let outcome =
            poll_until_non_empty(&shell, &request(), Duration::from_secs(30), None).unwrap();

        assert_eq!(outcome.output, "arn:aws:ecs:task/abc");
        assert_eq!(outcome.attempts, 3);
        assert_eq!(shell.attempts(), 3);
    }

    #[test]
    fn test_error_short_circuits_polling() {
        let shell = ScriptedShell::new([CommandResult::failed(2, "AccessDenied")])
            .then_repeat(CommandResult::ok("late result"));

        let err =
            poll_until_non_empty(&shell, &request(), Duration::from_secs(3600), None).unwrap_err();

        assert!(err.is_execution());
        assert_eq!(err.stderr(), Some("AccessDenied"));
        assert_eq!(shell.attempts(), 1);
    }

    #[test]
    fn test_error_after_blank_attempts_is_not_retried() {
        let shell = ScriptedShell::new([
            CommandResult::ok(""),
            CommandResult::ok(""),
            CommandResult::failed(255, "throttled"),
        ])
        .then_repeat(CommandResult::ok("late"));

        let err =
            poll_until_non_empty(&shell, &request(), Duration::from_secs(60), None).unwrap_err();

        assert!(err.is_execution());
        assert_eq!(shell.attempts(), 3);
    }

    #[test]
    fn test_timeout_bound() {
        let timeout = Duration::from_millis(200);
        let shell = ScriptedShell::always(CommandResult::ok(""))
            .with_delay(Duration::from_millis(10));

        let start = Instant::now();
        let err = poll_until_non_empty(&shell, &request(), timeout, None).unwrap_err();
        let elapsed = start.elapsed();

        match err {
            Error::Timeout {
                timeout: reported,
                attempts,
            } => {
                assert_eq!(reported, timeout);
                assert!(attempts >= 1);
                assert_eq!(attempts, shell.attempts());
            }
            other => panic!("expected timeout, got {other:?}"),
        }
        assert!(elapsed >= timeout, "gave up early after {elapsed:?}");
        // One attempt of overshoot plus scheduling slack.
        assert!(elapsed < timeout + Duration::from_secs(2), "took {elapsed:?}");
    }

    #[test]
    fn test_zero_timeout_fails_with_timeout() {
        let shell = ScriptedShell::always(CommandResult::ok(""));
        let err = poll_until_non_empty(&shell, &request(), Duration::ZERO, None).unwrap_err();
        assert!(err.is_timeout());
        assert!(shell.attempts() <= 1);
    }

    #[test]
    fn test_attempts_are_back_to_back() {
        let shell = ScriptedShell::always(CommandResult::ok(""));
        let _ = poll_until_non_empty(&shell, &request(), Duration::from_millis(50), None);
        // No inter-attempt delay: a scripted shell answers in microseconds.
        assert!(shell.attempts() > 10, "only {} attempts", shell.attempts());
    }

    #[test]
    fn test_callback_invoked_per_blank_attempt() {
        struct CountingCallback(Arc<AtomicU32>);
        impl PollCallback for CountingCallback {
            fn on_blank_attempt(&self, _: u32, _: Duration) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let count = Arc::new(AtomicU32::new(0));
        let callback = CountingCallback(count.clone());
        let shell = ScriptedShell::new([
            CommandResult::ok(""),
            CommandResult::ok(""),
            CommandResult::ok("done"),
        ]);

        let outcome =
            poll_until_non_empty(&shell, &request(), Duration::from_secs(5), Some(&callback))
                .unwrap();

        assert_eq!(outcome.output, "done");
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_poll_real_process() {
        let shell = SystemShell::default();
        let output = poll_output(
            &shell,
            &CommandRequest::new("printf '  ready  '"),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(output, "ready");
    }

    #[test]
    fn test_run_request_without_timeout_runs_once() {
        let shell = ScriptedShell::new([CommandResult::ok("")]).then_repeat(CommandResult::ok("x"));
        let output = run_request(&shell, &request()).unwrap();
        assert_eq!(output, "");
        assert_eq!(shell.attempts(), 1);
    }

    #[test]
    fn test_run_request_with_timeout_polls() {
        let shell = ScriptedShell::new([CommandResult::ok("")]).then_repeat(CommandResult::ok("x"));
        let output =
            run_request(&shell, &request().with_timeout(Duration::from_secs(5))).unwrap();
        assert_eq!(output, "x");
        assert_eq!(shell.attempts(), 2);
    }
}
