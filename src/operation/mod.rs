//! Operations declared in a deploy file
//!
//! Each declared item is modeled as a [`declarative::Operation`] that
//! reconciles against one host session:
//! - packages: a set of packages installed or removed through a manager
//! - service: the running state of one service
//! - rpm: an RPM file installed or removed
//! - repo: a yum/dnf repository file

mod packages;
mod repo;
mod rpm;
mod service;

pub use packages::Packages;
pub use repo::Repo;
pub use rpm::Rpm;
pub use service::Service;

use crate::config::OperationConfig;
use anyhow::Result;
use declarative::{BoxedOperation, ExecutionPlan};

/// Build the operation for one declared item
pub fn build(config: &OperationConfig) -> Result<BoxedOperation> {
    let operation: BoxedOperation = match config {
        OperationConfig::Packages(config) => Box::new(Packages::from_config(config)?),
        OperationConfig::Service(config) => Box::new(Service::from_config(config)?),
        OperationConfig::Rpm(config) => Box::new(Rpm::from_config(config)?),
        OperationConfig::Repo(spec) => Box::new(Repo::new(spec.clone())),
    };
    Ok(operation)
}

/// Build a plan from declared items, keeping declaration order
pub fn build_plan(configs: &[OperationConfig]) -> Result<ExecutionPlan> {
    let mut plan = ExecutionPlan::new();
    for (index, config) in configs.iter().enumerate() {
        let operation = build(config)
            .map_err(|e| e.context(format!("operation #{} is invalid", index + 1)))?;
        plan.add(operation);
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeployConfig, DeployFormat};

    #[test]
    fn test_build_plan_keeps_order() {
        let config = DeployConfig::parse(
            r#"
[[operations]]
type = "repo"
identifier = "epel"
baseurl = "https://mirror/epel"

[[operations]]
type = "packages"
manager = "yum"
packages = ["epel-release"]

[[operations]]
type = "service"
name = "crond"
init = "sysvinit"
running = true
"#,
            DeployFormat::Toml,
        )
        .unwrap();

        let plan = build_plan(&config.operations).unwrap();
        let types: Vec<_> = plan.operations.iter().map(|op| op.operation_type()).collect();
        assert_eq!(types, vec!["repo", "packages", "service"]);
    }

    #[test]
    fn test_build_plan_reports_invalid_operation() {
        let config = DeployConfig::parse(
            r#"
[[operations]]
type = "service"
name = "nginx"
template = "service nginx restart"
"#,
            DeployFormat::Toml,
        )
        .unwrap();

        let err = build_plan(&config.operations).unwrap_err();
        assert!(err.to_string().contains("operation #1"));
    }
}
