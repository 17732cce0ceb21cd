//! In-memory views of a host's installed packages and service statuses
//!
//! Both are built once per host per run from gathered facts, then updated
//! with the predicted effect of every emitted command so that later
//! reconciliations in the same run see the post-command state.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Version recorded for a package installed without an explicit version
pub const UNKNOWN_VERSION: &str = "unknown";

/// Installed packages: name → set of installed versions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageSnapshot {
    packages: BTreeMap<String, BTreeSet<String>>,
}

impl PackageSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any version of `name` is installed
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Whether `name` is installed and, if given, at `version`
    pub fn has(&self, name: &str, version: Option<&str>) -> bool {
        match (self.packages.get(name), version) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(versions), Some(v)) => versions.contains(v),
        }
    }

    /// Installed versions of `name`, sorted
    pub fn versions(&self, name: &str) -> Vec<String> {
        self.packages
            .get(name)
            .map(|v| v.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Record `name` as installed, at `version` or [`UNKNOWN_VERSION`]
    pub fn record_installed(&mut self, name: &str, version: Option<&str>) {
        self.packages
            .entry(name.to_string())
            .or_default()
            .insert(version.unwrap_or(UNKNOWN_VERSION).to_string());
    }

    /// Forget every installed version of `name`
    pub fn remove(&mut self, name: &str) -> bool {
        self.packages.remove(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl<N, V> FromIterator<(N, V)> for PackageSnapshot
where
    N: Into<String>,
    V: IntoIterator,
    V::Item: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        Self {
            packages: iter
                .into_iter()
                .map(|(name, versions)| {
                    (name.into(), versions.into_iter().map(Into::into).collect())
                })
                .collect(),
        }
    }
}

/// Known status of one service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceStatus {
    /// Nothing known this run; must be probed on the host
    Unknown,
    Stopped,
    Running,
}

impl ServiceStatus {
    pub fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}

impl From<Option<bool>> for ServiceStatus {
    fn from(running: Option<bool>) -> Self {
        match running {
            None => Self::Unknown,
            Some(false) => Self::Stopped,
            Some(true) => Self::Running,
        }
    }
}

/// Service statuses: name → running (true) or stopped (false)
///
/// Services absent from the map are [`ServiceStatus::Unknown`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceStatuses {
    statuses: BTreeMap<String, bool>,
}

impl ServiceStatuses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current status of `name`
    pub fn get(&self, name: &str) -> ServiceStatus {
        self.statuses.get(name).copied().into()
    }

    /// Record a status; `None` returns the service to unknown
    pub fn set(&mut self, name: &str, running: Option<bool>) {
        match running {
            Some(running) => {
                self.statuses.insert(name.to_string(), running);
            }
            None => {
                self.statuses.remove(name);
            }
        }
    }
}

impl<N: Into<String>> FromIterator<(N, bool)> for ServiceStatuses {
    fn from_iter<T: IntoIterator<Item = (N, bool)>>(iter: T) -> Self {
        Self {
            statuses: iter.into_iter().map(|(n, s)| (n.into(), s)).collect(),
        }
    }
}
