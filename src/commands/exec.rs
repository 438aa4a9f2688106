//! One-off command through the same executor and poller resources use

use anyhow::Result;
use cmdkit::{CommandRequest, CommandText, SystemShell};

use crate::Context;
use crate::cli::ExecArgs;
use crate::config;
use crate::progress;

/// Build the request `exec` would run
pub fn request(args: &ExecArgs, env_region: Option<String>) -> CommandRequest {
    let mut request = CommandRequest::new(CommandText::Tokens(args.cmd.clone()));
    if let Some(region) = args.region.clone().or(env_region) {
        request = request.with_region(&region);
    }
    if let Some(secs) = args.timeout {
        request = request.with_timeout(cmdkit::timeout_from_secs(secs));
    }
    request
}

pub fn run(ctx: &Context, args: &ExecArgs) -> Result<()> {
    let request = request(args, config::env_region());
    log::debug!("exec: {}", request.script());

    let spinner = (!ctx.quiet && args.timeout.is_some())
        .then(|| progress::spinner(&args.cmd.join(" ")));
    let outcome = cmdkit::run_request(&SystemShell::default(), &request);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match outcome {
        Ok(output) => {
            println!("{output}");
            Ok(())
        }
        Err(e) => {
            if e.is_execution() && !ctx.quiet {
                eprintln!("{}", e.report());
            }
            log::debug!("{}: {}", e.category().description(), e.category().advice());
            Err(e.into())
        }
    }
}
