//! RPM file operation

use crate::config::RpmConfig;
use anyhow::Result;
use declarative::{HostSession, Operation, Outcome, PlanContext, RpmRequest};

#[derive(Debug, Clone)]
pub struct Rpm {
    pub request: RpmRequest,
}

impl Rpm {
    pub fn from_config(config: &RpmConfig) -> Result<Self> {
        Ok(Self {
            request: RpmRequest {
                source: config.source.clone(),
                present: config.present,
                manager_command: config.manager_command()?,
            },
        })
    }
}

impl Operation for Rpm {
    fn id(&self) -> String {
        self.request.source.clone()
    }

    fn description(&self) -> String {
        if self.request.present {
            format!("Install {}", self.request.source)
        } else {
            format!("Remove {}", self.request.source)
        }
    }

    fn operation_type(&self) -> &'static str {
        "rpm"
    }

    fn reconcile(
        &self,
        session: &mut HostSession,
        ctx: &PlanContext,
    ) -> declarative::Result<Outcome> {
        session.ensure_rpm(&self.request, ctx.facts, ctx.files)
    }
}
