//! File work expressed as shell commands

use declarative::shell::quote;
use declarative::{FileOperations, HostFacts, Observation, Outcome, content_hash};

/// Emits `curl`, `printf` and `rm` commands for file operations
pub struct ShellFiles<'a> {
    facts: &'a dyn HostFacts,
}

impl<'a> ShellFiles<'a> {
    pub fn new(facts: &'a dyn HostFacts) -> Self {
        Self { facts }
    }
}

impl FileOperations for ShellFiles<'_> {
    fn download(&self, src: &str, dest: &str) -> declarative::Result<Outcome> {
        Ok(Outcome::command(format!(
            "curl -sSLf {} -o {}",
            quote(src),
            quote(dest)
        )))
    }

    /// No-op when the host's recorded hash of `dest` matches `contents`
    fn put(&self, contents: &str, dest: &str) -> declarative::Result<Outcome> {
        if self
            .facts
            .file_hash(dest)?
            .is_some_and(|hash| hash == content_hash(contents))
        {
            return Ok(Outcome::observation(Observation::FileUpToDate {
                path: dest.to_string(),
            }));
        }
        Ok(Outcome::command(format!(
            "printf '%s' {} > {}",
            quote(contents),
            quote(dest)
        )))
    }

    fn ensure_absent(&self, path: &str) -> declarative::Result<Outcome> {
        if !self.facts.file_exists(path)? {
            return Ok(Outcome::observation(Observation::FileAbsent {
                path: path.to_string(),
            }));
        }
        Ok(Outcome::command(format!("rm -f {}", quote(path))))
    }
}
