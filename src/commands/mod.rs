//! Commands that plan a deploy against its hosts

pub mod plan;
pub mod status;

use crate::cli::DeployArgs;
use crate::config::{DeployConfig, HostConfig, Settings};
use crate::facts::{self, StaticFacts};
use crate::files::ShellFiles;
use crate::operation;
use anyhow::{Result, bail};
use declarative::session::DEFAULT_TEMP_DIR;
use declarative::{
    ExecutionPlan, HostInput, HostReport, HostSession, PlanContext, PlanOptions, ProgressCallback,
    StaticResolver, plan_hosts,
};
use std::path::PathBuf;

/// A loaded deploy, narrowed to the requested hosts and operations
pub struct Deploy {
    pub path: PathBuf,
    pub settings: Settings,
    pub plan: ExecutionPlan,
    pub hosts: Vec<PreparedHost>,
}

/// One host with the collaborators built from its facts
pub struct PreparedHost {
    pub name: String,
    pub config: HostConfig,
    facts: StaticFacts,
    resolver: StaticResolver,
}

impl PreparedHost {
    fn new(name: &str, config: HostConfig) -> Self {
        Self {
            name: name.to_string(),
            facts: StaticFacts::from_host(&config),
            resolver: facts::resolver(&config),
            config,
        }
    }
}

/// Load the deploy file and apply `--target` / `--host` filters
pub fn load(args: &DeployArgs) -> Result<Deploy> {
    let (config, path) = DeployConfig::load(args.deploy.as_deref())?;

    let plan = operation::build_plan(&config.operations)?
        .filter_by_target(args.target.as_deref());

    let hosts: Vec<PreparedHost> = config
        .hosts
        .into_iter()
        .filter(|(name, _)| args.host.as_deref().is_none_or(|host| host == name))
        .map(|(name, host)| PreparedHost::new(&name, host))
        .collect();

    if let Some(host) = &args.host
        && hosts.is_empty()
    {
        bail!("Host '{host}' is not declared in {}", path.display());
    }

    Ok(Deploy {
        path,
        settings: config.settings,
        plan,
        hosts,
    })
}

impl Deploy {
    /// Jobs from the command line, then the deploy settings
    pub fn jobs(&self, requested: Option<usize>) -> usize {
        requested
            .or(self.settings.jobs)
            .unwrap_or_else(|| PlanOptions::default().jobs)
            .max(1)
    }

    /// Plan every host, reporting progress as hosts complete
    pub fn plan_hosts<P: ProgressCallback>(
        &self,
        jobs: usize,
        progress: &mut P,
    ) -> Result<Vec<HostReport>> {
        let temp_dir = self.settings.temp_dir.as_deref().unwrap_or(DEFAULT_TEMP_DIR);
        let files: Vec<ShellFiles> = self
            .hosts
            .iter()
            .map(|host| ShellFiles::new(&host.facts))
            .collect();

        let inputs = self
            .hosts
            .iter()
            .zip(&files)
            .map(|(host, files)| HostInput {
                session: HostSession::new(
                    &host.name,
                    host.config.packages.clone(),
                    host.config.services.clone(),
                )
                .with_temp_dir(temp_dir),
                ctx: PlanContext::with_resolver(&host.facts, files, &host.resolver),
            })
            .collect();

        Ok(plan_hosts(&self.plan, inputs, &PlanOptions { jobs }, progress)?)
    }
}
