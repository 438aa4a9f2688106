pub mod apply;
pub mod diff;
pub mod exec;
pub mod forget;
pub mod status;

use anyhow::{Context as AnyhowContext, Result};
use cmdkit::SystemShell;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::Context;
use crate::config::{self, Defaults, GlobalConfig, StackConfig};
use crate::resource::SharedShell;
use crate::state::StackState;

/// A loaded stack: its declarations, effective defaults, and where state lives
pub struct Stack {
    pub file: PathBuf,
    pub config: StackConfig,
    pub defaults: Defaults,
    pub state_path: PathBuf,
}

impl Stack {
    /// Locate and load the stack selected by the global flags
    pub fn open(ctx: &Context) -> Result<Self> {
        let cwd = std::env::current_dir().context("Could not determine current directory")?;
        let file = config::find_stack_file(ctx.file.as_deref(), &cwd)?;
        let config = StackConfig::load(&file)?;
        let global = GlobalConfig::load()?;
        let defaults = config
            .defaults
            .clone()
            .or(&global.defaults)
            .resolve(config::env_region());

        let state_path = ctx
            .state
            .clone()
            .unwrap_or_else(|| config::default_state_path(&file));

        log::debug!("Stack {} (state {})", file.display(), state_path.display());
        Ok(Self {
            file,
            config,
            defaults,
            state_path,
        })
    }

    /// Directory holding the stack file
    pub fn dir(&self) -> &Path {
        self.file
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    pub fn load_state(&self) -> Result<StackState> {
        StackState::load(&self.state_path)
    }

    /// Shell every resource in the stack runs under
    pub fn shell(&self) -> SharedShell {
        let program = self.defaults.shell.as_deref().unwrap_or("sh");
        Arc::new(SystemShell::new(program).with_cwd(self.dir()))
    }
}
