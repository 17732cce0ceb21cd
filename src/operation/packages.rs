//! Package set operation

use crate::config::PackagesConfig;
use anyhow::Result;
use declarative::{HostSession, Operation, Outcome, PackageCommands, PackageRequest, PlanContext};

/// A set of packages to install or remove
#[derive(Debug, Clone)]
pub struct Packages {
    pub packages: Vec<String>,
    pub present: bool,
    pub latest: bool,
    pub commands: PackageCommands,
}

impl Packages {
    pub fn from_config(config: &PackagesConfig) -> Result<Self> {
        Ok(Self {
            packages: config.packages.clone(),
            present: config.present,
            latest: config.latest,
            commands: config.commands()?,
        })
    }

    fn request(&self) -> PackageRequest {
        PackageRequest::parse(&self.packages, &self.commands)
            .present(self.present)
            .latest(self.latest)
    }
}

impl Operation for Packages {
    fn id(&self) -> String {
        self.packages.join(",")
    }

    fn description(&self) -> String {
        let verb = match (self.present, self.latest) {
            (false, _) => "Remove",
            (true, true) => "Install latest",
            (true, false) => "Install",
        };
        format!("{verb} {}", self.packages.join(", "))
    }

    fn operation_type(&self) -> &'static str {
        "packages"
    }

    fn reconcile(
        &self,
        session: &mut HostSession,
        ctx: &PlanContext,
    ) -> declarative::Result<Outcome> {
        Ok(session.ensure_packages(&self.request(), &self.commands, ctx.resolver))
    }
}
