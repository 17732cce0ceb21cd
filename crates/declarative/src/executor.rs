//! Planning engine - reconciles a plan against hosts
//!
//! Operations for one host always run sequentially against that host's
//! session. Hosts share nothing, so several hosts are planned in parallel.

use crate::context::{PlanContext, ProgressCallback};
use crate::error::Result;
use crate::planner::ExecutionPlan;
use crate::session::HostSession;
use crate::types::{Outcome, PlanOptions};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Result of reconciling one operation on one host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub id: String,
    pub operation_type: String,
    pub description: String,
    pub outcome: Outcome,
    /// Set when the operation could not be reconciled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepReport {
    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_change(&self) -> bool {
        !self.outcome.is_noop()
    }
}

/// Everything planned for one host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostReport {
    pub host: String,
    pub steps: Vec<StepReport>,
}

impl HostReport {
    /// All commands for the host, in execution order
    pub fn commands(&self) -> impl Iterator<Item = &str> {
        self.steps
            .iter()
            .flat_map(|s| s.outcome.commands.iter().map(String::as_str))
    }

    /// Whether the host needs any command
    pub fn has_changes(&self) -> bool {
        self.steps.iter().any(StepReport::is_change)
    }

    pub fn has_failures(&self) -> bool {
        self.steps.iter().any(StepReport::is_failed)
    }
}

/// One host to plan: its session and collaborators
pub struct HostInput<'a> {
    pub session: HostSession,
    pub ctx: PlanContext<'a>,
}

/// Reconcile every operation of `plan` against one host
///
/// A failing operation is recorded in its step and planning continues with
/// the next one.
pub fn plan_host(plan: &ExecutionPlan, session: &mut HostSession, ctx: &PlanContext) -> HostReport {
    log::info!("planning {} operation(s) for {}", plan.len(), session.host());

    let steps = plan
        .operations
        .iter()
        .map(|operation| {
            let (outcome, error) = match operation.reconcile(session, ctx) {
                Ok(outcome) => (outcome, None),
                Err(e) => {
                    log::warn!("{}: {} failed: {e}", session.host(), operation.id());
                    (Outcome::new(), Some(e.to_string()))
                }
            };
            StepReport {
                id: operation.id(),
                operation_type: operation.operation_type().to_string(),
                description: operation.description(),
                outcome,
                error,
            }
        })
        .collect();

    HostReport {
        host: session.host().to_string(),
        steps,
    }
}

/// Reconcile `plan` against many hosts
///
/// Reports come back in the order of `hosts`.
pub fn plan_hosts<P: ProgressCallback>(
    plan: &ExecutionPlan,
    hosts: Vec<HostInput>,
    opts: &PlanOptions,
    progress: &mut P,
) -> Result<Vec<HostReport>> {
    progress.on_start(hosts.len());

    let reports: Vec<HostReport> = if opts.jobs <= 1 || hosts.len() <= 1 {
        hosts
            .into_iter()
            .map(|mut input| plan_host(plan, &mut input.session, &input.ctx))
            .collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opts.jobs)
            .build()?;

        pool.install(|| {
            hosts
                .into_par_iter()
                .map(|mut input| plan_host(plan, &mut input.session, &input.ctx))
                .collect()
        })
    };

    // Progress is not thread-safe, so report after the parallel section
    for report in &reports {
        progress.on_host_complete(&report.host, report.has_changes());
    }
    progress.on_finish();

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{FileOperations, NoFacts, NoProgress};
    use crate::error::Error;
    use crate::resource::Operation;
    use crate::snapshot::{PackageSnapshot, ServiceStatuses};

    struct NoFiles;

    impl FileOperations for NoFiles {
        fn download(&self, src: &str, _dest: &str) -> Result<Outcome> {
            Err(Error::Download {
                src: src.to_string(),
                dest: String::new(),
                message: "offline".into(),
            })
        }

        fn put(&self, _contents: &str, dest: &str) -> Result<Outcome> {
            Ok(Outcome::command(format!("put {dest}")))
        }

        fn ensure_absent(&self, path: &str) -> Result<Outcome> {
            Ok(Outcome::command(format!("rm -f {path}")))
        }
    }

    /// Installs a marker package once per host
    #[derive(Debug)]
    struct Marker;

    impl Operation for Marker {
        fn id(&self) -> String {
            "marker".to_string()
        }

        fn description(&self) -> String {
            "Install marker".to_string()
        }

        fn operation_type(&self) -> &'static str {
            "packages"
        }

        fn reconcile(&self, session: &mut HostSession, ctx: &PlanContext) -> Result<Outcome> {
            let commands = crate::PackageCommands::new("apk add", "apk del");
            let request = crate::PackageRequest::parse(&["marker"], &commands);
            Ok(session.ensure_packages(&request, &commands, ctx.resolver))
        }
    }

    #[derive(Debug)]
    struct Failing;

    impl Operation for Failing {
        fn id(&self) -> String {
            "failing".to_string()
        }

        fn description(&self) -> String {
            "Always fails".to_string()
        }

        fn operation_type(&self) -> &'static str {
            "rpm"
        }

        fn reconcile(&self, _session: &mut HostSession, ctx: &PlanContext) -> Result<Outcome> {
            ctx.files.download("https://example.com/x.rpm", "/tmp/x.rpm")
        }
    }

    fn session(host: &str) -> HostSession {
        HostSession::new(host, PackageSnapshot::new(), ServiceStatuses::new())
    }

    #[test]
    fn test_plan_host_runs_operations_in_order() {
        let mut plan = ExecutionPlan::new();
        plan.add(Box::new(Marker));
        plan.add(Box::new(Failing));
        plan.add(Box::new(Marker));

        let mut session = session("web1");
        let ctx = PlanContext::new(&NoFacts, &NoFiles);
        let report = plan_host(&plan, &mut session, &ctx);

        assert_eq!(report.steps.len(), 3);
        assert_eq!(report.steps[0].outcome.commands, vec!["apk add marker"]);
        assert!(report.steps[1].is_failed());
        assert!(report.steps[2].outcome.is_noop());
        assert!(report.has_changes());
        assert!(report.has_failures());
        assert_eq!(report.commands().count(), 1);
    }

    #[test]
    fn test_plan_hosts_keeps_host_order() {
        let mut plan = ExecutionPlan::new();
        plan.add(Box::new(Marker));

        let names = ["a", "b", "c", "d", "e"];
        let hosts = names
            .iter()
            .map(|name| HostInput {
                session: session(name),
                ctx: PlanContext::new(&NoFacts, &NoFiles),
            })
            .collect();

        let reports =
            plan_hosts(&plan, hosts, &PlanOptions { jobs: 3 }, &mut NoProgress).unwrap();

        let planned: Vec<_> = reports.iter().map(|r| r.host.as_str()).collect();
        assert_eq!(planned, names);
        assert!(reports.iter().all(HostReport::has_changes));
    }
}
