//! Summary statistics over planned hosts

use crate::executor::{HostReport, StepReport};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Plan summary statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    /// Number of hosts planned
    pub hosts: usize,
    /// Hosts needing at least one command
    pub hosts_changed: usize,
    /// Operations across all hosts
    pub operations: usize,
    /// Operations that emitted commands
    pub changed: usize,
    /// Operations already satisfied
    pub unchanged: usize,
    /// Operations that could not be reconciled
    pub failed: usize,
    /// Commands across all hosts
    pub commands: usize,
}

impl PlanSummary {
    /// Create a summary from host reports
    pub fn from_reports(reports: &[HostReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            summary.hosts += 1;
            if report.has_changes() {
                summary.hosts_changed += 1;
            }
            for step in &report.steps {
                summary.add_step(step);
            }
        }
        summary
    }

    /// Add one step to the summary
    pub fn add_step(&mut self, step: &StepReport) {
        self.operations += 1;
        self.commands += step.outcome.commands.len();
        if step.is_failed() {
            self.failed += 1;
        } else if step.is_change() {
            self.changed += 1;
        } else {
            self.unchanged += 1;
        }
    }

    /// Check if any host needs changes
    pub fn has_changes(&self) -> bool {
        self.changed > 0
    }

    /// Check if every operation was reconciled
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Group steps of one host by operation type
pub fn group_by_type(report: &HostReport) -> BTreeMap<&str, Vec<&StepReport>> {
    let mut groups: BTreeMap<&str, Vec<&StepReport>> = BTreeMap::new();
    for step in &report.steps {
        groups
            .entry(step.operation_type.as_str())
            .or_default()
            .push(step);
    }
    groups
}
