//! Repository file operation

use declarative::{HostSession, Operation, Outcome, PlanContext, RepoSpec};

#[derive(Debug, Clone)]
pub struct Repo {
    pub spec: RepoSpec,
}

impl Repo {
    pub fn new(spec: RepoSpec) -> Self {
        Self { spec }
    }
}

impl Operation for Repo {
    fn id(&self) -> String {
        self.spec.identifier.clone()
    }

    fn description(&self) -> String {
        if self.spec.present {
            format!("Add repository {}", self.spec.identifier)
        } else {
            format!("Remove repository {}", self.spec.identifier)
        }
    }

    fn operation_type(&self) -> &'static str {
        "repo"
    }

    fn reconcile(
        &self,
        session: &mut HostSession,
        ctx: &PlanContext,
    ) -> declarative::Result<Outcome> {
        session.ensure_repo(&self.spec, ctx.facts, ctx.files)
    }
}
