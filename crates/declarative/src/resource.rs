//! Operation trait for declared host state
//!
//! An operation is one declared item of desired state (a package set, a
//! service, an RPM file, a repository) that can be reconciled against a
//! host session.

use crate::context::PlanContext;
use crate::error::Result;
use crate::session::HostSession;
use crate::types::Outcome;
use std::fmt;

/// Core trait for declared operations
///
/// Every operation provides:
/// - Identity (id, description, type)
/// - Reconciliation against one host's session
///
/// # Example
///
/// ```ignore
/// use declarative::{Operation, Outcome, PlanContext, HostSession, Result};
///
/// #[derive(Debug)]
/// struct Touch { path: String }
///
/// impl Operation for Touch {
///     fn id(&self) -> String { self.path.clone() }
///     fn description(&self) -> String { format!("Touch {}", self.path) }
///     fn operation_type(&self) -> &'static str { "file" }
///
///     fn reconcile(&self, _session: &mut HostSession, ctx: &PlanContext) -> Result<Outcome> {
///         if ctx.facts.file_exists(&self.path)? {
///             return Ok(Outcome::new());
///         }
///         Ok(Outcome::command(format!("touch {}", self.path)))
///     }
/// }
/// ```
pub trait Operation: Send + Sync + fmt::Debug {
    /// Identifier of the item this operation manages
    ///
    /// Examples:
    /// - "nginx" for a service
    /// - "vim,curl" for a package set
    /// - "epel" for a repository
    fn id(&self) -> String;

    /// Human-readable description of what this operation ensures
    fn description(&self) -> String;

    /// Operation type category
    ///
    /// Used for grouping and filtering: "packages", "service", "rpm", "repo"
    fn operation_type(&self) -> &'static str;

    /// Compute the commands needed on this host
    ///
    /// Implementations update `session` with the predicted result so the
    /// next operation for the same host sees it.
    fn reconcile(&self, session: &mut HostSession, ctx: &PlanContext) -> Result<Outcome>;
}

/// A boxed operation for type-erased storage
pub type BoxedOperation = Box<dyn Operation>;
