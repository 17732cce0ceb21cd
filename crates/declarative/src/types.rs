//! Core types for reconciliation results

use serde::{Deserialize, Serialize};
use std::fmt;

/// A report that the host already satisfies a desired item
///
/// Observations are emitted instead of commands, so callers get per-item
/// visibility even when a reconciliation produces nothing to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Observation {
    /// Package is installed (versions known to the snapshot, possibly none)
    PackageInstalled {
        package: String,
        versions: Vec<String>,
    },
    /// Package is not installed
    PackageNotInstalled { package: String },
    /// Service is already running
    ServiceRunning { name: String },
    /// Service is already stopped
    ServiceStopped { name: String },
    /// RPM file source is already in the wanted state
    RpmState { source: String, installed: bool },
    /// File is already present on the host
    FileExists { path: String },
    /// File is already absent from the host
    FileAbsent { path: String },
    /// File already holds the wanted contents
    FileUpToDate { path: String },
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PackageInstalled { package, versions } if versions.is_empty() => {
                write!(f, "package {package} is installed")
            }
            Self::PackageInstalled { package, versions } => {
                write!(f, "package {package} is installed ({})", versions.join(", "))
            }
            Self::PackageNotInstalled { package } => {
                write!(f, "package {package} is not installed")
            }
            Self::ServiceRunning { name } => write!(f, "service {name} is running"),
            Self::ServiceStopped { name } => write!(f, "service {name} is stopped"),
            Self::RpmState { source, installed } => write!(
                f,
                "rpm {source} is {}",
                if *installed { "installed" } else { "not installed" }
            ),
            Self::FileExists { path } => write!(f, "file {path} already exists"),
            Self::FileAbsent { path } => write!(f, "file {path} does not exist"),
            Self::FileUpToDate { path } => write!(f, "file {path} is up to date"),
        }
    }
}

/// Result of one reconciliation: commands to run plus no-op observations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    /// Shell commands, in the order they must run
    pub commands: Vec<String>,
    /// Items that already match the desired state
    pub observations: Vec<Observation>,
}

impl Outcome {
    /// Create an empty outcome
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcome with a single command
    pub fn command(command: impl Into<String>) -> Self {
        Self {
            commands: vec![command.into()],
            observations: Vec::new(),
        }
    }

    /// Outcome with a single observation
    pub fn observation(observation: Observation) -> Self {
        Self {
            commands: Vec::new(),
            observations: vec![observation],
        }
    }

    /// Append a command
    pub fn push_command(&mut self, command: impl Into<String>) {
        self.commands.push(command.into());
    }

    /// Append an observation
    pub fn observe(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    /// Append another outcome after this one
    pub fn merge(&mut self, other: Outcome) {
        self.commands.extend(other.commands);
        self.observations.extend(other.observations);
    }

    /// True when nothing needs to run
    pub fn is_noop(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Options for planning
#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Number of hosts planned in parallel
    pub jobs: usize,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self { jobs: 4 }
    }
}
