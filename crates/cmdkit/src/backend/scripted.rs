//! Scripted shell that replays canned results instead of spawning processes.

use crate::backend::Shell;
use crate::error::Result;
use crate::types::{CommandRequest, CommandResult};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

/// Backend that returns queued results in order, then a fallback forever.
///
/// Every call is recorded so tests can assert how many processes would
/// have been spawned and with what script.
#[derive(Debug, Default)]
pub struct ScriptedShell {
    responses: Mutex<VecDeque<CommandResult>>,
    fallback: Option<CommandResult>,
    delay: Option<Duration>,
    attempts: AtomicU32,
    scripts: Mutex<Vec<String>>,
}

impl ScriptedShell {
    /// Replay `responses` in order. Once exhausted, calls yield blank output.
    pub fn new(responses: impl IntoIterator<Item = CommandResult>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Return the same result on every call.
    pub fn always(result: CommandResult) -> Self {
        Self::new([]).then_repeat(result)
    }

    /// Result to return once the queue is exhausted.
    pub fn then_repeat(mut self, result: CommandResult) -> Self {
        self.fallback = Some(result);
        self
    }

    /// Sleep this long on every call, simulating a slow tool.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of calls made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Scripts passed to each call, in order.
    pub fn scripts(&self) -> Vec<String> {
        lock(&self.scripts).clone()
    }

    /// Script passed to the most recent call.
    pub fn last_script(&self) -> Option<String> {
        lock(&self.scripts).last().cloned()
    }
}

impl Shell for ScriptedShell {
    fn spawn(&self, request: &CommandRequest) -> Result<CommandResult> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        lock(&self.scripts).push(request.script());

        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }

        let next = lock(&self.responses).pop_front();
        Ok(next
            .or_else(|| self.fallback.clone())
            .unwrap_or_else(|| CommandResult::ok("")))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
