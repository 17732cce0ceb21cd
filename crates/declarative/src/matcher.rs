//! Membership matching of desired packages against a snapshot
//!
//! A desired name does not always index the snapshot directly: virtual
//! packages and capabilities ("whatprovides") resolve to one or more concrete
//! provider packages. [`PackageResolver`] performs that expansion per package
//! manager and the matcher combines the per-provider checks.

use crate::package::DesiredPackage;
use crate::snapshot::PackageSnapshot;
use std::collections::{BTreeMap, BTreeSet};

/// Expands a declared package name into concrete package identities
pub trait PackageResolver: Send + Sync {
    /// Concrete identities providing `name`; empty when `name` is itself
    /// a concrete package or unknown to the resolver
    fn expand(&self, name: &str) -> Vec<DesiredPackage>;
}

/// Resolver that never expands
pub struct NoExpansion;

impl PackageResolver for NoExpansion {
    fn expand(&self, _name: &str) -> Vec<DesiredPackage> {
        Vec::new()
    }
}

/// Resolver backed by a fixed capability → providers table
#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    provides: BTreeMap<String, Vec<DesiredPackage>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare that `capability` is provided by `providers`
    pub fn provide(mut self, capability: &str, providers: Vec<DesiredPackage>) -> Self {
        self.provides.insert(capability.to_string(), providers);
        self
    }
}

impl PackageResolver for StaticResolver {
    fn expand(&self, name: &str) -> Vec<DesiredPackage> {
        self.provides.get(name).cloned().unwrap_or_default()
    }
}

/// How expanded identities combine into one answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Every identity must be installed (ensuring presence)
    All,
    /// One installed identity is enough (ensuring absence)
    Any,
}

/// A concrete package name with the versions it was expanded with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPackage {
    pub name: String,
    /// Empty when any installed version counts
    pub versions: BTreeSet<String>,
}

impl MatchedPackage {
    fn is_installed(&self, snapshot: &PackageSnapshot) -> bool {
        if self.versions.is_empty() {
            return snapshot.contains(&self.name);
        }
        self.versions.iter().any(|v| snapshot.has(&self.name, Some(v)))
    }
}

/// Result of matching one desired package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub satisfied: bool,
    /// Concrete identities checked, in first-seen order
    pub matched: Vec<MatchedPackage>,
}

/// Decide whether `desired` is satisfied by `snapshot`
pub fn matches(
    desired: &DesiredPackage,
    snapshot: &PackageSnapshot,
    resolver: &dyn PackageResolver,
    mode: MatchMode,
) -> Match {
    let mut candidates = resolver.expand(&desired.name);
    if candidates.is_empty() {
        candidates.push(desired.clone());
    }

    let matched = group_by_name(candidates);
    let mut checks = matched.iter().map(|m| m.is_installed(snapshot));
    let satisfied = match mode {
        MatchMode::All => checks.all(|ok| ok),
        MatchMode::Any => checks.any(|ok| ok),
    };

    Match { satisfied, matched }
}

fn group_by_name(candidates: Vec<DesiredPackage>) -> Vec<MatchedPackage> {
    let mut grouped: Vec<MatchedPackage> = Vec::new();
    for candidate in candidates {
        let index = match grouped.iter().position(|m| m.name == candidate.name) {
            Some(index) => index,
            None => {
                grouped.push(MatchedPackage {
                    name: candidate.name,
                    versions: BTreeSet::new(),
                });
                grouped.len() - 1
            }
        };
        if let Some(version) = candidate.version {
            grouped[index].versions.insert(version);
        }
    }
    grouped
}
