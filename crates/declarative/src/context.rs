//! Collaborator traits and plan context
//!
//! Fact gathering and file transfer happen outside this crate. These traits
//! are the seams through which reconcilers ask for facts and delegate file
//! work, so the crate can be used without depending on any particular
//! transport.

use crate::error::Result;
use crate::matcher::{NoExpansion, PackageResolver};
use crate::types::Outcome;
use serde::{Deserialize, Serialize};

/// Package metadata as reported by `rpm -q` / `rpm -qp`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpmInfo {
    pub name: String,
    pub version: String,
}

/// Facts about one host that reconcilers look up on demand
pub trait HostFacts: Send + Sync {
    /// Whether a file exists at an absolute path
    fn file_exists(&self, path: &str) -> Result<bool>;

    /// Content hash of the file at `path`, as produced by [`content_hash`]
    ///
    /// `None` when the file is missing or its contents are unknown.
    fn file_hash(&self, _path: &str) -> Result<Option<String>> {
        Ok(None)
    }

    /// RPM metadata of a package file on the host (`rpm -qp`)
    fn rpm_package(&self, path: &str) -> Result<Option<RpmInfo>>;
}

/// Hex digest used to compare file contents with [`HostFacts::file_hash`]
pub fn content_hash(contents: &str) -> String {
    blake3::hash(contents.as_bytes()).to_hex().to_string()
}

/// File work delegated to the file-operations layer
///
/// Each method returns the commands (or observations) needed on the host.
pub trait FileOperations: Send + Sync {
    /// Download `src` to `dest`
    fn download(&self, src: &str, dest: &str) -> Result<Outcome>;

    /// Make `dest` contain exactly `contents`
    fn put(&self, contents: &str, dest: &str) -> Result<Outcome>;

    /// Make sure nothing exists at `path`
    fn ensure_absent(&self, path: &str) -> Result<Outcome>;
}

/// Facts provider for hosts where nothing is known
pub struct NoFacts;

impl HostFacts for NoFacts {
    fn file_exists(&self, _path: &str) -> Result<bool> {
        Ok(false)
    }

    fn rpm_package(&self, _path: &str) -> Result<Option<RpmInfo>> {
        Ok(None)
    }
}

/// Progress callback for planning
///
/// Implement this trait to receive progress updates while hosts are planned.
pub trait ProgressCallback: Send {
    /// Called before the hosts are planned
    fn on_start(&mut self, hosts: usize);

    /// Called when one host has been planned
    fn on_host_complete(&mut self, host: &str, changed: bool);

    /// Called after all hosts are planned
    fn on_finish(&mut self);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_start(&mut self, _hosts: usize) {}
    fn on_host_complete(&mut self, _host: &str, _changed: bool) {}
    fn on_finish(&mut self) {}
}

/// Collaborators available to operations while one host is planned
pub struct PlanContext<'a> {
    pub facts: &'a dyn HostFacts,
    pub files: &'a dyn FileOperations,
    pub resolver: &'a dyn PackageResolver,
}

impl<'a> PlanContext<'a> {
    /// Context with no capability expansion
    pub fn new(facts: &'a dyn HostFacts, files: &'a dyn FileOperations) -> Self {
        Self {
            facts,
            files,
            resolver: &NoExpansion,
        }
    }

    /// Context with a package resolver
    pub fn with_resolver(
        facts: &'a dyn HostFacts,
        files: &'a dyn FileOperations,
        resolver: &'a dyn PackageResolver,
    ) -> Self {
        Self {
            facts,
            files,
            resolver,
        }
    }
}
