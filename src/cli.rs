use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "effector")]
#[command(version)]
#[command(about = "Run commands as declarative resources - once on create, again only when inputs change", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Stack file (default: effector.toml or effector.json in the current directory)
    #[arg(short, long, env = "EFFECTOR_FILE", global = true)]
    pub file: Option<PathBuf>,

    /// State file (default: .effector/state.json next to the stack file)
    #[arg(long, env = "EFFECTOR_STATE", global = true)]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run resources whose inputs are new or changed
    Apply(ApplyArgs),

    /// Preview what apply would run
    Diff(DiffArgs),

    /// Show recorded results
    Status,

    /// Run one command with the AWS CLI polling rules
    Exec(ExecArgs),

    /// Drop a resource from state without running anything
    Forget {
        /// Resource name
        name: String,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Apply / Diff
// ============================================================================

#[derive(Parser)]
pub struct ApplyArgs {
    /// Only apply matching resources: name, type, or type.name
    #[arg(short, long)]
    pub target: Option<String>,

    /// Show the plan without running anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Number of resources applied concurrently
    #[arg(short, long, default_value = "1")]
    pub jobs: u16,
}

#[derive(Parser)]
pub struct DiffArgs {
    /// Only show matching resources: name, type, or type.name
    #[arg(short, long)]
    pub target: Option<String>,
}

// ============================================================================
// Exec
// ============================================================================

#[derive(Parser)]
pub struct ExecArgs {
    /// Export AWS_DEFAULT_REGION before the command
    #[arg(short, long)]
    pub region: Option<String>,

    /// Retry blank output for up to this many seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// Command tokens, joined with spaces
    #[arg(last = true, required = true)]
    pub cmd: Vec<String>,
}
