//! Source-control metadata for stamping applied resources

use cmdkit::{CommandRequest, Shell};
use std::path::Path;

fn git<S: Shell + ?Sized>(shell: &S, dir: &Path, args: &str) -> Option<String> {
    let request = CommandRequest::new(format!("git {args}")).with_cwd(dir);
    match cmdkit::execute_output(shell, &request) {
        Ok(output) => Some(output),
        Err(e) => {
            log::trace!("git {args} failed in {}: {e}", dir.display());
            None
        }
    }
}

/// `<commit count>-<short sha>`, with `-dirty` when the tree has changes
///
/// Sorts in commit order. `None` outside a repository.
pub fn version_string<S: Shell + ?Sized>(shell: &S, dir: &Path) -> Option<String> {
    let count = git(shell, dir, "rev-list --count HEAD")?;
    let sha = git(shell, dir, "rev-parse --short HEAD")?;
    let dirty = git(shell, dir, "status --porcelain").is_some_and(|s| !s.is_empty());
    Some(format!(
        "{count}-{sha}{}",
        if dirty { "-dirty" } else { "" }
    ))
}

/// URL of the `origin` remote
pub fn remote_url<S: Shell + ?Sized>(shell: &S, dir: &Path) -> Option<String> {
    git(shell, dir, "config --get remote.origin.url").filter(|url| !url.is_empty())
}
