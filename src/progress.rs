//! Progress indicators for the effector CLI

use colored::Colorize;
use declarative::{ApplyResult, PlanAction, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Symbol shown next to a finished resource
pub fn result_symbol(result: &ApplyResult) -> colored::ColoredString {
    match result {
        ApplyResult::NoChange => "○".dimmed(),
        ApplyResult::Created | ApplyResult::Updated => "✓".green(),
        ApplyResult::Failed { .. } => "✗".red(),
        ApplyResult::Skipped { .. } => "⊘".yellow(),
    }
}

/// Spinner for a single long-running command
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Progress bar over an apply batch
///
/// Prints one line per finished resource above the bar.
#[derive(Default)]
pub struct ApplyProgress {
    bar: Option<ProgressBar>,
}

impl ApplyProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn println(&self, line: String) {
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }
}

impl ProgressCallback for ApplyProgress {
    fn on_batch_start(&mut self, count: usize) {
        let pb = ProgressBar::new(count as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        self.bar = Some(pb);
    }

    fn on_resource_start(&mut self, name: &str, action: &PlanAction) {
        if let Some(bar) = &self.bar {
            let verb = match action {
                PlanAction::Create => "creating",
                PlanAction::Update { .. } => "updating",
                PlanAction::NoChange => "checking",
            };
            bar.set_message(format!("{verb} {name}"));
        }
    }

    fn on_resource_complete(&mut self, name: &str, result: &ApplyResult) {
        let detail = match result {
            ApplyResult::Created => "created".to_string(),
            ApplyResult::Updated => "re-ran".to_string(),
            ApplyResult::NoChange => "unchanged".dimmed().to_string(),
            ApplyResult::Failed { error } => error.red().to_string(),
            ApplyResult::Skipped { reason } => reason.dimmed().to_string(),
        };
        self.println(format!("  {} {name} {detail}", result_symbol(result)));
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn on_batch_complete(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
