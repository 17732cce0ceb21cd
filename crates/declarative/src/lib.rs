//! # Declarative
//!
//! Host reconciliation: compare declared packages and services with the
//! facts gathered from a host and compute the idempotent shell commands that
//! converge it, or report that it already matches.
//!
//! Nothing here runs commands. Reconcilers return an [`Outcome`] holding the
//! commands for an execution layer and [`Observation`]s for items that
//! already match.
//!
//! ## Core Concepts
//!
//! - **HostSession**: per-host, per-run state (package snapshot, service
//!   statuses) updated with the predicted effect of every emitted command
//! - **PackageResolver**: expands virtual packages into concrete providers
//! - **Operation**: one declared item of desired state
//! - **ExecutionPlan**: the operations of a deploy, reconciled per host
//!
//! ## Example
//!
//! ```
//! use declarative::{
//!     HostSession, NoExpansion, PackageManager, PackageRequest, PackageSnapshot,
//!     ServiceIntent, ServiceManager, ServiceStatuses,
//! };
//!
//! let installed: PackageSnapshot = [("curl", vec!["7.1"])].into_iter().collect();
//! let mut session = HostSession::new("web1", installed, ServiceStatuses::new());
//!
//! let apt = PackageManager::Apt.commands();
//! let request = PackageRequest::parse(&["curl", "nginx"], &apt);
//! let outcome = session.ensure_packages(&request, &apt, &NoExpansion);
//! assert_eq!(outcome.commands.len(), 1);
//!
//! let systemd = ServiceManager::Systemd;
//! let intent = ServiceIntent::default()
//!     .running(true)
//!     .status_argument(systemd.status_argument());
//! let outcome = session.control_service("nginx", &systemd.template(), &intent);
//! assert!(outcome.commands[0].starts_with("if (systemctl is-active nginx)"));
//! ```
//!
//! ## Provider Traits
//!
//! - [`HostFacts`]: file and RPM facts looked up on demand
//! - [`FileOperations`]: downloads, file contents and removals
//! - [`PackageResolver`]: capability expansion
//! - [`ProgressCallback`]: receives progress updates while planning

pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod matcher;
pub mod package;
pub mod packages;
pub mod planner;
pub mod repo;
pub mod resource;
pub mod rpm;
pub mod service;
pub mod session;
pub mod shell;
pub mod snapshot;
pub mod types;

// Re-export main types at crate root
pub use context::{
    FileOperations, HostFacts, NoFacts, NoProgress, PlanContext, ProgressCallback, RpmInfo,
    content_hash,
};
pub use diff::{PlanSummary, group_by_type};
pub use error::{Error, Result};
pub use executor::{HostInput, HostReport, StepReport, plan_host, plan_hosts};
pub use matcher::{
    Match, MatchMode, MatchedPackage, NoExpansion, PackageResolver, StaticResolver, matches,
};
pub use package::DesiredPackage;
pub use packages::{PackageCommands, PackageManager, PackageRequest, ensure_packages};
pub use planner::ExecutionPlan;
pub use repo::{RepoSpec, RepoTarget, ensure_repo, render_repo_file, repo_target};
pub use resource::{BoxedOperation, Operation};
pub use rpm::{RpmRequest, ensure_rpm, is_url};
pub use service::{CommandTemplate, ServiceIntent, ServiceManager, control_service};
pub use session::HostSession;
pub use snapshot::{PackageSnapshot, ServiceStatus, ServiceStatuses};
pub use types::{Observation, Outcome, PlanOptions};
